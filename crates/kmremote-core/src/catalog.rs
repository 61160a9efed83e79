//! Macro catalog scanning.
//!
//! The server's root page carries a macro picker shaped like:
//!
//! ```text
//! <optgroup label="Global Macro Group">
//!   <option label="Global Macro Group: Build" value="3C1D8A52-...">Build</option>
//! ```
//!
//! The page is treated as a flat stream of tokens rather than a tree. Each
//! option takes the label of the nearest `<optgroup>` before it, whether or
//! not the markup actually nests the option inside that group. A single
//! left-to-right pass tracks the current group, so the scan is linear in the
//! size of the page. Only options with a `label` attribute count as macros,
//! so other pickers on the same page are ignored.
//!
//! Parsing never fails. Markup that does not match the expected shapes is
//! skipped, which leaves an empty or partial list.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::macros::MacroDescriptor;

pub use crate::macros::UNCATEGORIZED;

/// Description attached to every scanned macro; the page carries none.
pub const MACRO_DESCRIPTION: &str = "Keyboard Maestro macro";

/// Attribute list of a start tag. Quoted values may contain `>`.
const TAG_ATTRS: &str = r#"(?:[^>"']|"[^"]*"|'[^']*')*"#;

/// `<optgroup ...>` or `<option ...>text</option>`, in document order.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)<optgroup\b(?P<group>{attrs})>|<option\b(?P<attrs>{attrs})>(?P<text>[^<]+)</option\s*>",
        attrs = TAG_ATTRS
    ))
    .expect("token pattern is valid")
});

/// `name="value"` or `name='value'`.
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<name>[A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#)
        .expect("attribute pattern is valid")
});

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[A-Za-z]{2,6});").expect("entity pattern is valid")
});

/// Scan a control page for macros, in document order.
pub fn parse_catalog(html: &str) -> Vec<MacroDescriptor> {
    let mut category: Option<String> = None;
    let mut macros = Vec::new();

    for token in TOKEN.captures_iter(html) {
        if let Some(group) = token.name("group") {
            if let Some(label) = attribute(group.as_str(), "label").filter(|l| !l.is_empty()) {
                category = Some(label);
            }
            continue;
        }

        // Macro options always carry a label; other pickers on the page don't
        let attrs = token.name("attrs").map_or("", |m| m.as_str());
        if attribute(attrs, "label").is_none() {
            continue;
        }
        let Some(id) = attribute(attrs, "value").filter(|v| !v.is_empty()) else {
            continue;
        };
        let name = token
            .name("text")
            .map(|m| decode_entities(m.as_str().trim()).into_owned())
            .unwrap_or_default();

        macros.push(MacroDescriptor {
            id,
            name,
            description: Some(MACRO_DESCRIPTION.to_string()),
            category: Some(
                category
                    .clone()
                    .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            ),
            enabled: true,
            last_executed: None,
        });
    }

    tracing::debug!("Scanned {} macros from {} bytes", macros.len(), html.len());
    macros
}

/// Look up an attribute by name (case-insensitive), trimmed and decoded.
fn attribute(attrs: &str, wanted: &str) -> Option<String> {
    ATTRIBUTE.captures_iter(attrs).find_map(|caps| {
        if !caps["name"].eq_ignore_ascii_case(wanted) {
            return None;
        }
        let raw = caps
            .name("dq")
            .or_else(|| caps.name("sq"))
            .map_or("", |m| m.as_str());
        Some(decode_entities(raw.trim()).into_owned())
    })
}

/// Decode the basic named entities and numeric character references.
///
/// Unknown entities and invalid code points are left untouched.
fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    ENTITY.replace_all(text, |caps: &Captures| {
        let body = &caps[1];
        let decoded = match body {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => numeric_reference(body),
        };
        match decoded {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    })
}

fn numeric_reference(body: &str) -> Option<char> {
    let digits = body.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(macros: &[MacroDescriptor]) -> Vec<&str> {
        macros.iter().map(|m| m.id.as_str()).collect()
    }

    fn categories(macros: &[MacroDescriptor]) -> Vec<&str> {
        macros.iter().map(|m| m.display_category()).collect()
    }

    #[test]
    fn test_options_take_preceding_group() {
        let html = r#"
            <option label="Loose" value="m0">Loose</option>
            <optgroup label="Apps">
              <option label="Apps: Safari" value="m1">Safari</option>
              <option label="Apps: Mail" value="m2">Mail</option>
            </optgroup>"#;
        let macros = parse_catalog(html);
        assert_eq!(ids(&macros), vec!["m0", "m1", "m2"]);
        assert_eq!(categories(&macros), vec![UNCATEGORIZED, "Apps", "Apps"]);
    }

    #[test]
    fn test_single_option_fields() {
        let html = r#"<optgroup label="Dev"><option label="a" value="m1">Build</option></optgroup>"#;
        let macros = parse_catalog(html);
        assert_eq!(macros.len(), 1);
        let m = &macros[0];
        assert_eq!(m.id, "m1");
        assert_eq!(m.name, "Build");
        assert_eq!(m.category.as_deref(), Some("Dev"));
        assert_eq!(m.description.as_deref(), Some(MACRO_DESCRIPTION));
        assert!(m.enabled);
        assert!(m.last_executed.is_none());
    }

    #[test]
    fn test_nearest_group_wins_without_nesting() {
        // Groups are never closed; each option still takes the latest label.
        let html = r#"
            <optgroup label="One"><optgroup label="Two">
            <option label="x" value="a">A</option>
            <optgroup label="Three">
            <option label="y" value="b">B</option>"#;
        let macros = parse_catalog(html);
        assert_eq!(categories(&macros), vec!["Two", "Three"]);
    }

    #[test]
    fn test_closing_group_keeps_category() {
        let html = r#"<optgroup label="Dev"></optgroup><option label="x" value="a">A</option>"#;
        assert_eq!(categories(&parse_catalog(html)), vec!["Dev"]);
    }

    #[test]
    fn test_group_without_label_is_ignored() {
        let html = r#"
            <optgroup label="Dev"><option label="x" value="a">A</option>
            <optgroup label=""><option label="y" value="b">B</option>
            <optgroup><option label="z" value="c">C</option>"#;
        assert_eq!(categories(&parse_catalog(html)), vec!["Dev", "Dev", "Dev"]);
    }

    #[test]
    fn test_empty_value_dropped() {
        let html = r#"
            <select name="macro">
            <option value="">Select a Macro</option>
            <option label="x" value="  ">Blank</option>
            <option label="y" value="m1">Kept</option>
            </select>"#;
        assert_eq!(ids(&parse_catalog(html)), vec!["m1"]);
    }

    #[test]
    fn test_tolerates_attribute_order_and_whitespace() {
        let html = "<OPTGROUP  label = 'Tools' class=\"g\">\n\
                    <option value=\"m1\"\n   label=\"Tools: Zip\" data-x=\"1\">  Zip  </option >\n\
                    <Option class=x label='Tools: Unzip' value='m2'>Unzip</OPTION>";
        let macros = parse_catalog(html);
        assert_eq!(ids(&macros), vec!["m1", "m2"]);
        assert_eq!(macros[0].name, "Zip");
        assert_eq!(categories(&macros), vec!["Tools", "Tools"]);
    }

    #[test]
    fn test_entities_decoded() {
        let html = r#"<optgroup label="Q&amp;A"><option label="x" value="id&#x2F;1">Save &amp; Quit &#8212; now &bogus;</option>"#;
        let macros = parse_catalog(html);
        assert_eq!(macros[0].id, "id/1");
        assert_eq!(macros[0].name, "Save & Quit \u{2014} now &bogus;");
        assert_eq!(macros[0].display_category(), "Q&A");
    }

    #[test]
    fn test_empty_text_dropped() {
        let html = r#"<option label="x" value="m1"></option><option label="y" value="m2"> </option>"#;
        let macros = parse_catalog(html);
        assert_eq!(ids(&macros), vec!["m2"]);
        assert_eq!(macros[0].display_name(), crate::macros::UNNAMED_MACRO);
    }

    #[test]
    fn test_angle_bracket_inside_quoted_values() {
        let html = r#"
            <optgroup label="Dev"><option label="Dev: Build" value="m0">Build</option>
            <optgroup label="Audio > Output">
            <option label="Audio > Output: Vol > Up" value="m1">Vol Up</option>
            <option label='Audio > Output: Mute' value='a>b'>Mute</option>"#;
        let macros = parse_catalog(html);
        assert_eq!(ids(&macros), vec!["m0", "m1", "a>b"]);
        assert_eq!(categories(&macros), vec!["Dev", "Audio > Output", "Audio > Output"]);
        assert_eq!(macros[1].name, "Vol Up");
    }

    #[test]
    fn test_options_without_label_ignored() {
        let html = r#"
            <select name="theme"><option value="dark">Dark</option><option value="light" selected>Light</option></select>
            <optgroup label="Dev"><option label="a" value="m1">Build</option>
            <option value="m2" label="">Test</option>"#;
        let macros = parse_catalog(html);
        assert_eq!(ids(&macros), vec!["m1", "m2"]);
        assert_eq!(categories(&macros), vec!["Dev", "Dev"]);
    }

    #[test]
    fn test_no_options_yields_empty() {
        assert!(parse_catalog("").is_empty());
        assert!(parse_catalog("<html><body><h1>Keyboard Maestro Server</h1></body></html>").is_empty());
        assert!(parse_catalog(r#"<optgroup label="Dev"></optgroup>"#).is_empty());
    }

    #[test]
    fn test_garbage_input_does_not_panic() {
        let inputs = [
            "<<<>>>",
            "<option",
            "<option value=\"m1\">unterminated",
            "<optgroup label=\"unterminated",
            "&#xFFFFFFFF; &#99999999; &",
            "\u{0}\u{ffff}<option label='' value='\u{1f600}'>\u{1f600}</option>",
            "<option label=\"a > b value=\"m1\">x</option>",
        ];
        for input in inputs {
            let _ = parse_catalog(input);
        }
        let emoji = parse_catalog(inputs[5]);
        assert_eq!(ids(&emoji), vec!["\u{1f600}"]);
    }

    #[test]
    fn test_deterministic() {
        let html = r#"
            <option label="a" value="m0">Zero</option>
            <optgroup label="Dev"><option label="b" value="m1">One</option>
            <optgroup label="Ops"><option label="c" value="m2">Two</option>"#;
        assert_eq!(parse_catalog(html), parse_catalog(html));
    }

    #[test]
    fn test_numeric_reference() {
        assert_eq!(numeric_reference("#65"), Some('A'));
        assert_eq!(numeric_reference("#x41"), Some('A'));
        assert_eq!(numeric_reference("#xD800"), None);
        assert_eq!(numeric_reference("amp"), None);
    }
}
