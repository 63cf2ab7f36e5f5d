//! Value type tags carried on block outputs.

pub const VOID: &str = "VOID";
pub const NUMBER: &str = "NUMBER";
pub const STRING: &str = "STRING";
pub const TEXT: &str = "TEXT";
pub const DECIMAL: &str = "DECIMAL";
pub const BOOLEAN: &str = "BOOLEAN";

/// Tags preferred, in this order, when a producer declares several.
pub const PREFERRED: [&str; 5] = [NUMBER, STRING, TEXT, DECIMAL, BOOLEAN];

/// Tags offered in the editor's type selectors.
pub const SELECTABLE: [&str; 5] = [VOID, NUMBER, STRING, DECIMAL, BOOLEAN];

/// Pick the representative tag of an output type set.
///
/// The first tag found in [`PREFERRED`] order wins; otherwise the first tag
/// of the set; `None` for an untyped output.
pub fn representative(types: &[String]) -> Option<&str> {
    types
        .iter()
        .find(|t| PREFERRED.contains(&t.as_str()))
        .or_else(|| types.first())
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(t: &[&str]) -> Vec<String> {
        t.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_representative_prefers_known_tags() {
        assert_eq!(representative(&tags(&["Servo", "BOOLEAN"])), Some("BOOLEAN"));
    }

    #[test]
    fn test_representative_scans_set_order() {
        // Set order decides among preferred tags, not the PREFERRED order.
        assert_eq!(representative(&tags(&["DECIMAL", "NUMBER"])), Some("DECIMAL"));
    }

    #[test]
    fn test_representative_falls_back_to_first() {
        assert_eq!(representative(&tags(&["Servo", "Stepper"])), Some("Servo"));
    }

    #[test]
    fn test_representative_empty() {
        assert_eq!(representative(&[]), None);
    }
}
