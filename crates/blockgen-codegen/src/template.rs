//! Block code templates.
//!
//! A template is target code with `#` marking the slots to fill, e.g.
//! `"digitalWrite(#, #);"`. Slots are filled left to right. A slot written
//! as `(#)` is *wrapped*: its parentheses are kept unless the replacement is
//! already parenthesized, so `"if (#) {"` with `"(a < b)"` gives
//! `"if (a < b) {"` rather than `"if ((a < b)) {"`.

/// One token of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Slot { wrapped: bool },
}

/// A template parsed into literal and slot segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut segments = Vec::new();
        let mut literal_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] != b'#' {
                i += 1;
                continue;
            }
            let wrapped =
                i > 0 && i + 1 < bytes.len() && bytes[i - 1] == b'(' && bytes[i + 1] == b')';
            let literal_end = if wrapped { i - 1 } else { i };
            if literal_end > literal_start {
                segments.push(Segment::Literal(source[literal_start..literal_end].to_string()));
            }
            segments.push(Segment::Slot { wrapped });
            i += if wrapped { 2 } else { 1 };
            literal_start = i;
        }
        if literal_start < bytes.len() {
            segments.push(Segment::Literal(source[literal_start..].to_string()));
        }

        Self {
            source: source.to_string(),
            segments,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn slot_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Slot { .. }))
            .count()
    }

    /// Fill the slots with `replacements` in order.
    ///
    /// Surplus replacements are dropped. Slots left without a replacement
    /// keep their literal `#` (and `(#)`) text.
    pub fn render<I>(&self, replacements: I) -> String
    where
        I: IntoIterator<Item = String>,
    {
        let mut replacements = replacements.into_iter();
        let mut out = String::with_capacity(self.source.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot { wrapped } => match (replacements.next(), wrapped) {
                    (Some(r), true) => out.push_str(&collapse_parens(r)),
                    (Some(r), false) => out.push_str(&r),
                    (None, true) => out.push_str("(#)"),
                    (None, false) => out.push('#'),
                },
            }
        }
        out
    }
}

/// Wrap a replacement for a `(#)` slot, avoiding doubled parentheses.
fn collapse_parens(replacement: String) -> String {
    if replacement.starts_with('(') && replacement.ends_with(')') {
        replacement
    } else {
        format!("({replacement})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_segments() {
        let t = Template::parse("digitalWrite(#, #);");
        assert_eq!(
            t.segments(),
            &[
                Segment::Literal("digitalWrite(".into()),
                Segment::Slot { wrapped: false },
                Segment::Literal(", ".into()),
                Segment::Slot { wrapped: false },
                Segment::Literal(");".into()),
            ]
        );
        assert_eq!(t.slot_count(), 2);
    }

    #[test]
    fn test_parse_wrapped_slot() {
        let t = Template::parse("if (#) {");
        assert_eq!(
            t.segments(),
            &[
                Segment::Literal("if ".into()),
                Segment::Slot { wrapped: true },
                Segment::Literal(" {".into()),
            ]
        );
    }

    #[test]
    fn test_slot_at_edges_is_not_wrapped() {
        let t = Template::parse("#)");
        assert_eq!(t.segments()[0], Segment::Slot { wrapped: false });
        let t = Template::parse("(#");
        assert_eq!(t.segments()[1], Segment::Slot { wrapped: false });
    }

    #[test]
    fn test_render_in_order() {
        let t = Template::parse("digitalWrite(#, #);");
        assert_eq!(t.render(strings(&["13", "HIGH"])), "digitalWrite(13, HIGH);");
    }

    #[test]
    fn test_render_collapses_parenthesized_replacement() {
        let t = Template::parse("while (#) {");
        assert_eq!(t.render(strings(&["(a < b)"])), "while (a < b) {");
    }

    #[test]
    fn test_render_keeps_parens_for_plain_replacement() {
        let t = Template::parse("while (#) {");
        assert_eq!(t.render(strings(&["a < b"])), "while (a < b) {");
        assert_eq!(t.render(strings(&[""])), "while () {");
    }

    #[test]
    fn test_render_unwrapped_slot_keeps_parenthesized_replacement() {
        let t = Template::parse("x = #;");
        assert_eq!(t.render(strings(&["(1 + 2)"])), "x = (1 + 2);");
    }

    #[test]
    fn test_render_surplus_replacements_dropped() {
        let t = Template::parse("delay(#);");
        assert_eq!(t.render(strings(&["10", "20"])), "delay(10);");
    }

    #[test]
    fn test_render_missing_replacements_leave_marker() {
        let t = Template::parse("analogWrite(#, #);");
        assert_eq!(t.render(strings(&["3"])), "analogWrite(3, #);");
        let t = Template::parse("if (#) {");
        assert_eq!(t.render(Vec::new()), "if (#) {");
    }

    #[test]
    fn test_replacement_containing_marker_is_not_rescanned() {
        let t = Template::parse("# + #");
        assert_eq!(t.render(strings(&["'#'", "1"])), "'#' + 1");
    }

    #[test]
    fn test_template_without_slots() {
        let t = Template::parse("noTone();");
        assert_eq!(t.slot_count(), 0);
        assert_eq!(t.render(strings(&["x"])), "noTone();");
    }
}
