//! Search Sanitizer
//!
//! Free-text search becomes a literal, case-insensitive substring match.
//! Pattern metacharacters are escaped, overlong terms are rejected, and so
//! is anything carrying a query-operator token such as `$where`.

use crate::error::ListQueryError;

/// Upper bound on the escaped search term, in characters
pub const MAX_SEARCH_CHARS: usize = 100;

/// Operator names that never belong in a search term (matched after `$`,
/// case-insensitively)
const DENIED_OPERATORS: &[&str] = &[
    "where", "expr", "function", "accumulator", "regex", "options", "text", "ne", "eq", "gt",
    "gte", "lt", "lte", "in", "nin", "or", "and", "nor", "not", "exists", "type", "elemmatch",
    "all", "size", "mod", "jsonschema", "lookup", "merge", "out", "set", "unset",
];

/// Columns a search term is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTargets {
    /// Text columns, OR-ed together with `ILIKE`
    pub text_columns: &'static [&'static str],
    /// Integer column also matched when the term is a positive integer
    pub numeric_column: Option<&'static str>,
}

/// A validated search term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchToken {
    text: String,
    escaped: String,
    number: Option<i64>,
}

impl SearchToken {
    /// Sanitize the raw `search` parameter
    ///
    /// Surrounding whitespace is dropped first, so the length limit and the
    /// match apply to the trimmed term. Absent or blank input yields
    /// `Ok(None)`.
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, ListQueryError> {
        let Some(text) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        let escaped = escape_like(text);
        let length = escaped.chars().count();
        if length > MAX_SEARCH_CHARS {
            return Err(ListQueryError::SearchTooLong {
                max: MAX_SEARCH_CHARS,
                actual: length,
            });
        }

        if let Some(operator) = denied_operator(text) {
            return Err(ListQueryError::ForbiddenSearchPattern(operator));
        }

        let number = text.parse::<i64>().ok().filter(|n| *n > 0);

        Ok(Some(Self {
            text: text.to_string(),
            escaped,
            number,
        }))
    }

    /// The trimmed term as typed
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The term with `\`, `%` and `_` escaped by a backslash
    pub fn escaped(&self) -> &str {
        &self.escaped
    }

    /// `%<escaped>%` for `ILIKE ... ESCAPE '\'`
    pub fn like_pattern(&self) -> String {
        format!("%{}%", self.escaped)
    }

    /// Set when the term is a positive integer
    pub fn number(&self) -> Option<i64> {
        self.number
    }

    /// Case-insensitive literal substring test, same semantics as the SQL
    /// pattern
    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.text.to_lowercase())
    }
}

fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// First `$name` whose name is deny-listed
fn denied_operator(raw: &str) -> Option<String> {
    let mut rest = raw;
    while let Some(pos) = rest.find('$') {
        let after = &rest[pos + 1..];
        let name: String = after
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_lowercase();
        if DENIED_OPERATORS.contains(&name.as_str()) {
            return Some(format!("${name}"));
        }
        rest = after;
    }
    None
}
