//! Serializable reports of client operations.

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Outcome};
use crate::macros::MacroDescriptor;

/// Which client operation a report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Probe,
    ListMacros,
    ExecuteMacro,
}

/// The outcome of one operation, ready to print or forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationReport {
    pub operation: Operation,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ReportData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ClientError>,
}

/// Report payload variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportData {
    /// Server answered and identified itself.
    Probe { reachable: bool },
    /// Macros scanned from the control page.
    Macros {
        count: usize,
        macros: Vec<MacroDescriptor>,
    },
    /// Macro accepted by the server.
    Executed { macro_id: String },
}

impl OperationReport {
    pub fn success(operation: Operation, data: ReportData) -> Self {
        Self {
            operation,
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(operation: Operation, error: ClientError) -> Self {
        Self {
            operation,
            success: false,
            data: None,
            error: Some(error),
        }
    }

    pub fn probe(outcome: &Outcome<bool>) -> Self {
        match outcome {
            Ok(reachable) => Self::success(
                Operation::Probe,
                ReportData::Probe {
                    reachable: *reachable,
                },
            ),
            Err(e) => Self::error(Operation::Probe, e.clone()),
        }
    }

    pub fn macros(outcome: &Outcome<Vec<MacroDescriptor>>) -> Self {
        match outcome {
            Ok(macros) => Self::success(
                Operation::ListMacros,
                ReportData::Macros {
                    count: macros.len(),
                    macros: macros.clone(),
                },
            ),
            Err(e) => Self::error(Operation::ListMacros, e.clone()),
        }
    }

    pub fn executed(macro_id: &str, outcome: &Outcome<bool>) -> Self {
        match outcome {
            Ok(_) => Self::success(
                Operation::ExecuteMacro,
                ReportData::Executed {
                    macro_id: macro_id.to_string(),
                },
            ),
            Err(e) => Self::error(Operation::ExecuteMacro, e.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_macros_report_json() {
        let outcome = Ok(vec![MacroDescriptor::new("m1", "Build").with_category("Dev")]);
        let json = serde_json::to_value(OperationReport::macros(&outcome)).unwrap();

        assert_eq!(json["operation"], "list_macros");
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["type"], "macros");
        assert_eq!(json["data"]["count"], 1);
        assert_eq!(json["data"]["macros"][0]["id"], "m1");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_error_report_json() {
        let outcome: Outcome<bool> = Err(ClientError::unreachable("192.168.1.30:4490"));
        let report = OperationReport::probe(&outcome);
        assert!(!report.success);
        assert!(report.data.is_none());
        assert_eq!(report.error.as_ref().map(|e| e.kind), Some(ErrorKind::Unreachable));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["error"]["kind"], "UNREACHABLE");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_executed_report_carries_id() {
        let report = OperationReport::executed("m1", &Ok(true));
        assert_eq!(report.operation, Operation::ExecuteMacro);
        assert_eq!(
            report.data,
            Some(ReportData::Executed {
                macro_id: "m1".to_string()
            })
        );
    }

    #[test]
    fn test_report_round_trip() {
        let report = OperationReport::probe(&Ok(true));
        let json = serde_json::to_string(&report).unwrap();
        let back: OperationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
