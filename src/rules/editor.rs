//! Rule editing
//!
//! Rebuilds a rule list with one named rule replaced, removed or added.
//! Every other rule is written back byte-for-byte.

use std::borrow::Cow;

use crate::protocol::escape;
use super::{Rule, RuleSet};

/// Setting value that removes the rule list from the account
pub const DEFAULT_SETTING: &str = "Default";

/// Selects a rule by its leading `"#Name"` tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSelector {
    name: String,
}

impl RuleSelector {
    /// `#Vacation` and `Vacation` select the same rule
    pub fn new(tag: &str) -> Self {
        Self {
            name: tag.trim().trim_start_matches('#').to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compares the name tag only, ASCII case-insensitively
    pub fn matches(&self, rule: &Rule) -> bool {
        rule.name()
            .is_some_and(|name| name.eq_ignore_ascii_case(&self.name))
    }
}

/// Full rule text with one substitution marker for the new value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTemplate {
    text: Cow<'static, str>,
}

impl RuleTemplate {
    /// Substitution marker
    pub const MARKER: &'static str = "$$";

    pub const fn from_static(text: &'static str) -> Self {
        Self {
            text: Cow::Borrowed(text),
        }
    }

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Cow::Owned(text.into()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Substitute an already-escaped value at the marker, once
    pub fn render(&self, value: &str) -> String {
        self.text.replacen(Self::MARKER, value, 1)
    }
}

/// Rebuild a rule list around one rule
///
/// With a non-empty `replacement` the first rule matching `selector` is
/// replaced by `template` rendered with the escaped replacement, or the
/// rendered rule is appended when none matches. With `None` or an empty
/// replacement every matching rule is dropped. Later duplicates of the
/// selected rule are always dropped.
///
/// Returns a command-ready setting value: `(rule,rule,...)`, or
/// [`DEFAULT_SETTING`] when no rule remains.
pub fn edit_rules(
    rules: &RuleSet,
    selector: &RuleSelector,
    replacement: Option<&str>,
    template: &RuleTemplate,
) -> String {
    let replacement = replacement
        .filter(|value| !value.is_empty())
        .map(|value| template.render(&escape(value)));

    let mut parts = Vec::with_capacity(rules.len() + 1);
    let mut matched = false;

    for rule in rules {
        if !selector.matches(rule) {
            parts.push(rule.wrapped());
            continue;
        }

        if !matched {
            if let Some(rendered) = &replacement {
                parts.push(rendered.clone());
            }
        }
        matched = true;
    }

    if !matched {
        if let Some(rendered) = replacement {
            parts.push(rendered);
        }
    }

    serialize(parts)
}

/// Join wrapped rules into one setting value
pub(crate) fn serialize<I>(parts: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let joined = parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(",");

    if joined.is_empty() {
        DEFAULT_SETTING.to_string()
    } else {
        format!("({})", joined)
    }
}
