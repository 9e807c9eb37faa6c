//! Placeholder dialects.
//!
//! Statements are assembled with generic `?` markers and rewritten exactly once,
//! after the whole text (prefixes, values and suffixes) is known, so numbering
//! stays consistent across every fragment that contributed a marker.

use std::fmt::Write;

/// SQL placeholder style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaceholderFormat {
    /// `?` markers, passed through unchanged (MySQL/SQLite).
    #[default]
    Question,
    /// `$1, $2, ...` (PostgreSQL).
    Dollar,
    /// `:1, :2, ...` (Oracle).
    Colon,
    /// `@p1, @p2, ...` (SQL Server).
    AtP,
}

impl PlaceholderFormat {
    /// Rewrite every generic `?` marker into this dialect.
    ///
    /// For numbered dialects a doubled `??` is an escaped literal `?` and does
    /// not consume an index.
    pub fn replace_placeholders(self, sql: &str) -> String {
        let prefix = match self {
            Self::Question => return sql.to_string(),
            Self::Dollar => "$",
            Self::Colon => ":",
            Self::AtP => "@p",
        };
        replace_positional(sql, prefix)
    }
}

fn replace_positional(sql: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut idx = 0usize;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '?' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'?') {
            chars.next();
            out.push('?');
            continue;
        }
        idx += 1;
        out.push_str(prefix);
        let _ = write!(&mut out, "{idx}");
    }
    out
}

/// Comma-joined run of `count` generic markers, e.g. `?,?,?`.
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(",")
}

/// Count the unescaped `?` markers in generic-dialect text.
pub(crate) fn count_markers(sql: &str) -> usize {
    let mut count = 0;
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '?' {
            if chars.peek() == Some(&'?') {
                chars.next();
            } else {
                count += 1;
            }
        }
    }
    count
}
