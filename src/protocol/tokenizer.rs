//! Structure tokenizer
//!
//! Turns an inline (201) payload into a flat, ordered sequence of raw
//! string fields. The grammar is picked from the leading punctuation:
//!
//! | Leading | Grammar     | Separator | Stripped          |
//! |---------|-------------|-----------|-------------------|
//! | `(`     | List        | `,`       | one `(` and `)`   |
//! | `{`     | Map         | `;`       | one `{` and `}`   |
//! | `((`    | NestedList  | `,(`      | one `(` and `)`   |
//! | other   | Scalar      | space     | none (trimmed)    |
//!
//! Separators only split at the top level: never inside double-quoted
//! strings, nor inside a nested `(...)` or `{...}`. Each nested-list element
//! also loses its own parentheses, so `((a,b),(c,d))` yields `a,b` and
//! `c,d`. No type coercion happens here.

/// Payload grammar, chosen by leading punctuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    List,
    Map,
    NestedList,
    Scalar,
}

impl Grammar {
    /// Select the grammar for a trimmed payload
    pub fn detect(payload: &str) -> Self {
        if payload.starts_with("((") {
            Grammar::NestedList
        } else if payload.starts_with('(') {
            Grammar::List
        } else if payload.starts_with('{') {
            Grammar::Map
        } else {
            Grammar::Scalar
        }
    }

    pub fn separator(self) -> &'static str {
        match self {
            Grammar::List => ",",
            Grammar::Map => ";",
            Grammar::NestedList => ",(",
            Grammar::Scalar => " ",
        }
    }
}

/// A tokenized payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structured {
    grammar: Grammar,
    fields: Vec<String>,
}

impl Structured {
    pub fn grammar(&self) -> Grammar {
        self.grammar
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }

    pub fn first(&self) -> Option<&str> {
        self.fields.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// View the fields as `key=value` pairs
    pub fn field_map(&self) -> FieldMap {
        FieldMap::from_fields(&self.fields)
    }
}

/// Tokenize an inline payload
///
/// Returns `None` for an empty payload and for the empty list `()` / empty
/// map `{}`: callers treat that as "not found", never as an empty success.
pub fn tokenize(payload: &str) -> Option<Structured> {
    let payload = payload.trim();
    if payload.is_empty() {
        return None;
    }

    let grammar = Grammar::detect(payload);
    let body = match grammar {
        Grammar::List | Grammar::NestedList => strip_delimiters(payload, '(', ')'),
        Grammar::Map => strip_delimiters(payload, '{', '}'),
        Grammar::Scalar => payload,
    };

    if grammar != Grammar::Scalar && body.trim().is_empty() {
        return None;
    }

    let mut fields: Vec<String> = split_top_level(body, grammar.separator())
        .into_iter()
        .map(|field| match grammar {
            Grammar::NestedList => strip_delimiters(field.trim(), '(', ')').trim().to_string(),
            _ => field.trim().to_string(),
        })
        .collect();

    if grammar == Grammar::Scalar {
        // runs of spaces collapse
        fields.retain(|field| !field.is_empty());
    } else if fields.last().is_some_and(|field| field.is_empty()) {
        fields.pop();
    }

    Some(Structured { grammar, fields })
}

fn strip_delimiters(payload: &str, open: char, close: char) -> &str {
    let body = payload.strip_prefix(open).unwrap_or(payload);
    body.strip_suffix(close).unwrap_or(body)
}

/// Split on `separator` outside quoted strings and nested brackets
fn split_top_level<'a>(body: &'a str, separator: &str) -> Vec<&'a str> {
    let bytes = body.as_bytes();
    let sep = separator.as_bytes();
    // a `,(` separator opens the next element's bracket
    let sep_opens = sep.iter().filter(|&&b| b == b'(').count() as i32;
    let mut pieces = Vec::new();
    let mut in_quote = false;
    let mut escaped = false;
    let mut depth = 0i32;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        if in_quote {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_quote = false;
            }
            i += 1;
        } else if byte == b'"' {
            in_quote = true;
            i += 1;
        } else if depth <= 0 && bytes[i..].starts_with(sep) {
            pieces.push(&body[start..i]);
            depth += sep_opens;
            i += sep.len();
            start = i;
        } else {
            match byte {
                b'(' | b'{' => depth += 1,
                b')' | b'}' => depth -= 1,
                _ => {}
            }
            i += 1;
        }
    }

    pieces.push(&body[start..]);
    pieces
}

// =============================================================================
// Field Map
// =============================================================================

/// Ordered `key=value` view of a map payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    /// Build from raw fields, splitting each at its first `=`
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Self {
        let entries = fields
            .iter()
            .map(|field| match field.as_ref().split_once('=') {
                Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
                None => (field.as_ref().trim().to_string(), String::new()),
            })
            .collect();
        Self { entries }
    }

    /// Case-insensitive lookup; the first matching key wins
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Append another map's entries after this one's
    pub fn extend(&mut self, other: FieldMap) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// String Quoting
// =============================================================================

/// Escape text for use inside a CLI quoted string
///
/// Backslashes and quotes are escaped, carriage returns dropped and line
/// feeds written as `\e`.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\r' => {}
            '\n' => out.push_str("\\e"),
            other => out.push(other),
        }
    }
    out
}

/// Escape and wrap in double quotes
pub fn quote(value: &str) -> String {
    format!("\"{}\"", escape(value))
}

/// Strip one pair of surrounding quotes and resolve escapes
pub fn unquote(value: &str) -> String {
    let value = value.trim();
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('e') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
