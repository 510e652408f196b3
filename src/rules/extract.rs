//! Rule extraction
//!
//! Recovers each top-level rule of a `Rules=(...)` setting as an opaque
//! substring with a single pass over the characters.
//!
//! ```text
//! Rules=( (1,"#Redirect",...) , (2,"#Vacation",...) )
//!       ^ depth 1
//!         ^ depth 2: span opens one past this bracket
//!                           ^ depth back to 1: span closes here
//! ```

use crate::protocol::FieldMap;
use super::{Rule, RuleSet};

/// Key of the rule list inside an account settings map
pub const RULES_KEY: &str = "Rules";

/// Walk state: bracket depth plus the open span, if any
#[derive(Debug, Default)]
struct ScanState {
    depth: i32,
    start: Option<usize>,
    in_quote: bool,
    escaped: bool,
}

/// Rules held in the `Rules` entry of a settings map; empty when absent
pub fn extract_rules(fields: &FieldMap) -> RuleSet {
    match fields.get(RULES_KEY) {
        Some(value) => parse_rule_list(value),
        None => RuleSet::default(),
    }
}

/// Split a serialized rule list into rules
///
/// Accepts either `Rules=(...)` or the bare `(...)` list. Parentheses
/// inside quoted strings do not count. Carriage returns are dropped and
/// line feeds become `\e`; candidates without the `<digit>,"#` shape are
/// discarded.
pub fn parse_rule_list(text: &str) -> RuleSet {
    let text = strip_rules_key(text);
    let mut state = ScanState::default();
    let mut spans = Vec::new();

    for (i, c) in text.char_indices() {
        if state.in_quote {
            if state.escaped {
                state.escaped = false;
            } else if c == '\\' {
                state.escaped = true;
            } else if c == '"' {
                state.in_quote = false;
            }
            continue;
        }

        match c {
            '"' => state.in_quote = true,
            '(' => {
                state.depth += 1;
                if state.depth == 2 && state.start.is_none() {
                    state.start = Some(i + 1);
                }
            }
            ')' => {
                state.depth -= 1;
                if state.depth == 1 {
                    if let Some(start) = state.start.take() {
                        spans.push(&text[start..i]);
                    }
                }
            }
            _ => {}
        }
    }

    if state.depth != 0 || state.in_quote {
        tracing::debug!(depth = state.depth, "Unbalanced rule list, keeping complete rules only");
    }

    spans
        .into_iter()
        .map(|span| Rule::new(span.replace('\r', "").replace('\n', "\\e")))
        .filter(Rule::is_well_formed)
        .collect()
}

fn strip_rules_key(text: &str) -> &str {
    let text = text.trim();
    match text.split_once('=') {
        Some((key, value)) if key.trim().eq_ignore_ascii_case(RULES_KEY) => value.trim(),
        _ => text,
    }
}
