//! The lightweight markup dialect the tutor backend answers in.
//!
//! [`format_markup`] turns a small fixed grammar into display markup:
//!
//! | source              | display                  |
//! |---------------------|--------------------------|
//! | `**x**`, `__x__`    | `<strong>x</strong>`     |
//! | `*x*`, `_x_`        | `<em>x</em>`             |
//! | `` `x` ``           | `<code>x</code>`         |
//! | `# x` .. `### x`    | `<h1>x</h1>` .. `<h3>`   |
//! | newline             | `<br>`                   |
//!
//! This is not a parser.  Rules are applied one after another, spans do not nest, nothing is
//! escaped, and text that does not match a rule is left verbatim.  Bold runs before italic so that
//! a doubled delimiter is never read as two single ones.

use std::sync::LazyLock;

use regex::Regex;

static BOLD_STARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("BOLD_STARS is a compile-time constant"));

static BOLD_UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__(.*?)__").expect("BOLD_UNDERSCORES is a compile-time constant"));

static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`(.*?)`").expect("INLINE_CODE is a compile-time constant"));

/// Display tag for strong emphasis.
pub const STRONG: &str = "strong";
/// Display tag for emphasis.
pub const EM: &str = "em";
/// Display tag for inline code.
pub const CODE: &str = "code";
/// Display marker for a line break.
pub const LINE_BREAK: &str = "<br>";

/// Formats `text` from the markup dialect into display markup.
pub fn format_markup(text: &str) -> String {
    let text = BOLD_STARS.replace_all(text, "<strong>${1}</strong>");
    let text = BOLD_UNDERSCORES.replace_all(&text, "<strong>${1}</strong>");
    let text = emphasize(&text, b'*');
    let text = emphasize(&text, b'_');
    let text = INLINE_CODE.replace_all(&text, "<code>${1}</code>");
    text.split('\n')
        .map(heading)
        .collect::<Vec<_>>()
        .join(LINE_BREAK)
}

/// Wraps single-delimited runs in `<em>`.
///
/// A run opens on a delimiter not preceded by another delimiter, holds at least one character
/// that is neither the delimiter nor a newline, and closes on a delimiter not followed by another.
fn emphasize(text: &str, delim: u8) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == delim && (i == 0 || bytes[i - 1] != delim) {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j] != delim && bytes[j] != b'\n' {
                j += 1;
            }
            if j < bytes.len()
                && bytes[j] == delim
                && j > i + 1
                && bytes.get(j + 1) != Some(&delim)
            {
                out.push_str(&text[copied..i]);
                out.push_str("<em>");
                out.push_str(&text[i + 1..j]);
                out.push_str("</em>");
                i = j + 1;
                copied = i;
                continue;
            }
        }
        i += 1;
    }
    out.push_str(&text[copied..]);
    out
}

fn heading(line: &str) -> String {
    if let Some(rest) = line.strip_prefix("### ") {
        format!("<h3>{rest}</h3>")
    } else if let Some(rest) = line.strip_prefix("## ") {
        format!("<h2>{rest}</h2>")
    } else if let Some(rest) = line.strip_prefix("# ") {
        format!("<h1>{rest}</h1>")
    } else {
        line.to_string()
    }
}
