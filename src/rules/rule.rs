//! Rule and RuleSet
//!
//! A rule is kept as the opaque text between its own parentheses:
//!
//! ```text
//! 1,"#Redirect",(),(("Mirror to","a@b.com"),(Discard,"---"))
//! ```
//!
//! Only the leading name tag and individual action arguments are ever
//! looked at; everything else passes through untouched.

use super::RuleSelector;

/// One filtering rule, outer parentheses excluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule(String);

impl Rule {
    pub fn new(body: impl Into<String>) -> Self {
        Rule(body.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Body wrapped in its own parentheses, as it appears in a rule list
    pub fn wrapped(&self) -> String {
        format!("({})", self.0)
    }

    /// Whether the body starts `<priority>,"#`
    pub fn is_well_formed(&self) -> bool {
        name_tag_offset(&self.0).is_some()
    }

    /// The name tag without its `#`, e.g. `Vacation`
    pub fn name(&self) -> Option<&str> {
        let open = name_tag_offset(&self.0)?;
        let close = closing_quote(self.0.as_bytes(), open)?;
        Some(&self.0[open + 2..close])
    }

    /// Raw argument following a quoted action key
    ///
    /// For `("Reply with","Gone fishing")` and action `Reply with` this is
    /// `"Gone fishing"`, quotes and escapes included. Bare arguments such as
    /// `("Mirror to",a@b.com)` come back as-is. Keys are compared ASCII
    /// case-insensitively; quoted strings elsewhere in the rule never match.
    pub fn action_value(&self, action: &str) -> Option<&str> {
        let text = self.0.as_str();
        let bytes = text.as_bytes();
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] != b'"' {
                i += 1;
                continue;
            }

            let close = closing_quote(bytes, i)?;
            let key = &text[i + 1..close];
            i = close + 1;

            if !key.eq_ignore_ascii_case(action) {
                continue;
            }

            let Some(rest) = text[i..].trim_start().strip_prefix(',') else {
                continue;
            };
            let rest = rest.trim_start();
            let offset = text.len() - rest.len();

            if rest.starts_with('"') {
                let end = closing_quote(bytes, offset)?;
                return Some(&text[offset..=end]);
            }

            let stop = rest.find([',', ')']).unwrap_or(rest.len());
            return Some(rest[..stop].trim_end());
        }

        None
    }
}

impl AsRef<str> for Rule {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Byte offset of the `"` opening the name tag, when the body has the
/// `<digits>,"#` shape (whitespace around the comma tolerated)
fn name_tag_offset(body: &str) -> Option<usize> {
    let trimmed = body.trim_start();
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    let rest = trimmed[digits..].trim_start().strip_prefix(',')?.trim_start();
    if !rest.starts_with("\"#") {
        return None;
    }

    Some(body.len() - rest.len())
}

/// Index of the quote closing the string opened at `open`
fn closing_quote(bytes: &[u8], open: usize) -> Option<usize> {
    let mut escaped = false;
    for (i, &byte) in bytes.iter().enumerate().skip(open + 1) {
        if escaped {
            escaped = false;
        } else if byte == b'\\' {
            escaped = true;
        } else if byte == b'"' {
            return Some(i);
        }
    }
    None
}

// =============================================================================
// RuleSet
// =============================================================================

/// Ordered rules of one account
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    /// First rule whose name tag matches
    pub fn find(&self, selector: &RuleSelector) -> Option<&Rule> {
        self.rules.iter().find(|rule| selector.matches(rule))
    }

    /// Setting value for the unmodified set: `(...)` or `Default`
    pub fn to_setting(&self) -> String {
        super::editor::serialize(self.rules.iter().map(Rule::wrapped))
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl IntoIterator for RuleSet {
    type Item = Rule;
    type IntoIter = std::vec::IntoIter<Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}
