//! Macro descriptors as published by the server.

use serde::{Deserialize, Serialize};

/// Shown when a macro has an empty name.
pub const UNNAMED_MACRO: &str = "Unnamed Macro";

/// Shown when a macro has no description.
pub const NO_DESCRIPTION: &str = "No description available";

/// Shown when a macro has no category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A macro that can be triggered remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroDescriptor {
    /// Opaque token passed back in execute requests.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Server-supplied timestamp, kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_executed: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl MacroDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            category: None,
            enabled: true,
            last_executed: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn display_name(&self) -> &str {
        non_empty(Some(&self.name)).unwrap_or(UNNAMED_MACRO)
    }

    pub fn display_description(&self) -> &str {
        non_empty(self.description.as_ref()).unwrap_or(NO_DESCRIPTION)
    }

    pub fn display_category(&self) -> &str {
        non_empty(self.category.as_ref()).unwrap_or(UNCATEGORIZED)
    }

    /// Whether this descriptor can be sent in an execute request.
    pub fn is_executable(&self) -> bool {
        self.enabled && !self.id.is_empty()
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

/// Group macros by display category, keeping first-appearance order for both
/// the groups and the macros inside them.
pub fn group_by_category(macros: &[MacroDescriptor]) -> Vec<(String, Vec<&MacroDescriptor>)> {
    let mut groups: Vec<(String, Vec<&MacroDescriptor>)> = Vec::new();
    for descriptor in macros {
        let category = descriptor.display_category();
        match groups.iter().position(|(name, _)| name.as_str() == category) {
            Some(index) => groups[index].1.push(descriptor),
            None => groups.push((category.to_string(), vec![descriptor])),
        }
    }
    groups
}

/// First macro whose name matches, ignoring case and surrounding whitespace.
pub fn find_by_name<'a>(macros: &'a [MacroDescriptor], name: &str) -> Option<&'a MacroDescriptor> {
    let wanted = name.trim();
    macros
        .iter()
        .find(|m| m.name.trim().eq_ignore_ascii_case(wanted))
}
