/// Violation scanner
///
/// Applies every compiled rule to every text unit and records each
/// non-overlapping match with its cell, line and surrounding context.

use log::debug;
use serde::Serialize;

use crate::core::notebook::{TextOrigin, TextUnit};
use crate::core::patterns::CompiledRule;

/// Characters kept on each side of a match in the stored context
pub const CONTEXT_RADIUS: usize = 50;

/// Characters of collapsed context shown when rendering
pub const CONTEXT_DISPLAY_WIDTH: usize = 80;

/// One located occurrence of a disclosure-risk pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// 1-indexed cell position
    pub cell_index: usize,
    pub origin: TextOrigin,
    pub pattern: String,
    pub description: String,
    pub matched_text: String,
    /// Only set for source matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_in_cell: Option<usize>,
    /// Raw context window, only set for source matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Violation {
    pub fn is_output(&self) -> bool {
        self.origin == TextOrigin::Output
    }

    /// Context as shown to a reader: newlines collapsed, then cut to the
    /// display width.
    pub fn display_context(&self) -> Option<String> {
        self.context.as_ref().map(|context| {
            context
                .replace('\n', " ")
                .chars()
                .take(CONTEXT_DISPLAY_WIDTH)
                .collect()
        })
    }
}

/// Overall classification of a scan result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Compliance {
    Compliant,
    ViolationsFound,
}

impl Compliance {
    pub fn from_violations(violations: &[Violation]) -> Self {
        if violations.is_empty() {
            Compliance::Compliant
        } else {
            Compliance::ViolationsFound
        }
    }

    pub fn is_compliant(self) -> bool {
        self == Compliance::Compliant
    }

    /// Process exit code for this outcome
    pub fn exit_code(self) -> i32 {
        match self {
            Compliance::Compliant => 0,
            Compliance::ViolationsFound => 1,
        }
    }
}

/// Scan text units against rules.
///
/// Results are ordered by unit, then by rule, then by match position within
/// the unit. Matches from different rules in the same unit are not
/// interleaved by position.
pub fn scan(units: &[TextUnit], rules: &[CompiledRule]) -> Vec<Violation> {
    let mut violations = Vec::new();

    for unit in units {
        for rule in rules {
            for m in rule.regex.find_iter(&unit.text) {
                let (line_in_cell, context) = match unit.origin {
                    TextOrigin::Source => (
                        Some(line_in_cell(&unit.text, m.start())),
                        Some(context_window(&unit.text, m.start(), m.end(), CONTEXT_RADIUS).to_string()),
                    ),
                    TextOrigin::Output => (None, None),
                };

                violations.push(Violation {
                    cell_index: unit.cell_index,
                    origin: unit.origin,
                    pattern: rule.pattern().to_string(),
                    description: rule.description().to_string(),
                    matched_text: m.as_str().to_string(),
                    line_in_cell,
                    context,
                });
            }
        }
    }

    debug!("Scanned {} text units, {} violations", units.len(), violations.len());
    violations
}

/// 1-based line of the byte offset `start` within `text`.
pub fn line_in_cell(text: &str, start: usize) -> usize {
    text[..start].matches('\n').count() + 1
}

/// Slice of `text` spanning up to `radius` characters before `start` and
/// after `end`, clamped to the text bounds.
pub fn context_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(start, |(i, _)| i);
    let to = text[end..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| end + i);
    &text[from..to]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::patterns::{compile_rules, PatternRule, DEFAULT_COMPILED_RULES};

    fn source(cell_index: usize, text: &str) -> TextUnit {
        TextUnit {
            cell_index,
            origin: TextOrigin::Source,
            text: text.to_string(),
        }
    }

    fn output(cell_index: usize, text: &str) -> TextUnit {
        TextUnit {
            cell_index,
            origin: TextOrigin::Output,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_unix_home_directory_in_source() {
        let units = vec![source(1, r#"path = "/home/alice/data""#)];
        let violations = scan(&units, &DEFAULT_COMPILED_RULES);

        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert_eq!(v.description, "Unix home directory");
        assert_eq!(v.matched_text, "/home/alice/");
        assert_eq!(v.line_in_cell, Some(1));
        assert_eq!(v.context.as_deref(), Some(r#"path = "/home/alice/data""#));
    }

    #[test]
    fn test_output_matches_have_no_line_or_context() {
        let units = vec![source(1, "user = 'adetayo'"), output(1, "Hello Adetayo\n")];
        let violations = scan(&units, &DEFAULT_COMPILED_RULES);

        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].origin, TextOrigin::Source);
        assert_eq!(violations[0].pattern, "adetayo");
        assert_eq!(violations[0].line_in_cell, Some(1));
        assert_eq!(violations[1].origin, TextOrigin::Output);
        assert_eq!(violations[1].pattern, "Adetayo");
        assert_eq!(violations[1].line_in_cell, None);
        assert_eq!(violations[1].context, None);
    }

    #[test]
    fn test_line_counts_preceding_newlines() {
        let units = vec![source(3, "a = 1\nb = 2\n\nprint('/Users/bob/x')")];
        let violations = scan(&units, &DEFAULT_COMPILED_RULES);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].cell_index, 3);
        assert_eq!(violations[0].line_in_cell, Some(4));
    }

    #[test]
    fn test_rule_order_wins_over_match_position() {
        let units = vec![source(1, "Adetayo then adetayo then /home/x/")];
        let violations = scan(&units, &DEFAULT_COMPILED_RULES);
        let descriptions: Vec<_> = violations.iter().map(|v| v.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec!["Unix home directory", "Personal username", "Personal name"]
        );
    }

    #[test]
    fn test_matches_do_not_overlap() {
        let rules = compile_rules(&[PatternRule::new("aa", "double a")]).unwrap();
        let violations = scan(&[source(1, "aaaaa")], &rules);
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.matched_text == "aa"));
    }

    #[test]
    fn test_repeated_matches_keep_left_to_right_order() {
        let text = "/home/a/\n/home/b/\n/home/c/";
        let violations = scan(&[source(1, text)], &DEFAULT_COMPILED_RULES);
        let lines: Vec<_> = violations.iter().map(|v| v.line_in_cell.unwrap()).collect();
        assert_eq!(lines, vec![1, 2, 3]);
        assert_eq!(violations[1].matched_text, "/home/b/");
    }

    #[test]
    fn test_context_window_is_clamped() {
        let prefix = "x".repeat(70);
        let suffix = "y".repeat(70);
        let text = format!("{}adetayo{}", prefix, suffix);
        let violations = scan(&[source(1, &text)], &DEFAULT_COMPILED_RULES);
        let context = violations[0].context.as_deref().unwrap();
        assert_eq!(context, format!("{}adetayo{}", "x".repeat(50), "y".repeat(50)));
    }

    #[test]
    fn test_context_window_counts_characters() {
        let text = "é".repeat(60) + "adetayo" + &"ü".repeat(3);
        let start = text.find("adetayo").unwrap();
        let window = context_window(&text, start, start + 7, CONTEXT_RADIUS);
        assert_eq!(window, "é".repeat(50) + "adetayo" + &"ü".repeat(3));
    }

    #[test]
    fn test_display_context_collapses_and_truncates() {
        let text = format!(
            "{}\n{} /home/alice/ {}",
            "a".repeat(30),
            "b".repeat(30),
            "z".repeat(100)
        );
        let violations = scan(&[source(1, &text)], &DEFAULT_COMPILED_RULES);
        let v = &violations[0];
        assert!(v.context.as_deref().unwrap().contains('\n'));

        let shown = v.display_context().unwrap();
        assert!(!shown.contains('\n'));
        assert!(shown.starts_with(&format!("{} {} /home/alice/", "a".repeat(18), "b".repeat(30))));
        assert_eq!(shown.chars().count(), CONTEXT_DISPLAY_WIDTH);
    }

    #[test]
    fn test_scan_is_deterministic() {
        let units = vec![
            source(1, "CSCI Forms at /home/q/ and Cancer Screening"),
            output(2, "C:\\Users\\q\\out.csv"),
        ];
        let first = scan(&units, &DEFAULT_COMPILED_RULES);
        let second = scan(&units, &DEFAULT_COMPILED_RULES);
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_compliance_classification() {
        assert_eq!(Compliance::from_violations(&[]), Compliance::Compliant);
        assert_eq!(Compliance::Compliant.exit_code(), 0);

        let violations = scan(&[output(1, "adetayo")], &DEFAULT_COMPILED_RULES);
        let compliance = Compliance::from_violations(&violations);
        assert_eq!(compliance, Compliance::ViolationsFound);
        assert_eq!(compliance.exit_code(), 1);
    }
}
