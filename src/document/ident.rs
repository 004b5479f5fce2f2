use std::sync::LazyLock;

use regex::Regex;

/// Token used when sanitizing leaves nothing behind.
pub const EMPTY_IDENT: &str = "unknown";

static ILLEGAL_IDENT_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9.\-]+").expect("valid identifier regex"));

/// Map an arbitrary string onto the SPDX identifier alphabet.
///
/// Runs of characters outside `[A-Za-z0-9.-]` collapse into a single `-`.
/// An empty input yields [`EMPTY_IDENT`].
pub fn sanitize(raw: &str) -> String {
    let cleaned = ILLEGAL_IDENT_CHARS.replace_all(raw, "-");
    if cleaned.is_empty() {
        EMPTY_IDENT.to_string()
    } else {
        cleaned.into_owned()
    }
}

/// Escape free text destined for a document field.
///
/// Quote characters are dropped and control characters (newlines, tabs)
/// become plain spaces.
pub fn quote(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '"' && *c != '\'')
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_legal_chars() {
        assert_eq!(sanitize("SPDXRef-Package-libfoo-2.1"), "SPDXRef-Package-libfoo-2.1");
    }

    #[test]
    fn test_sanitize_collapses_runs() {
        assert_eq!(sanitize("Apache Commons / IO"), "Apache-Commons-IO");
        assert_eq!(sanitize("@scope/pkg"), "-scope-pkg");
        assert_eq!(sanitize("a__b"), "a-b");
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize(""), EMPTY_IDENT);
        assert_eq!(sanitize("???"), "-");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for raw in ["", "x y z", "ünïcödé 1.0", "a--b", "--", "Foo (bar) [baz]", "unknown"] {
            let once = sanitize(raw);
            assert_eq!(sanitize(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn test_quote_strips_quotes_and_controls() {
        assert_eq!(quote("say \"hi\"\nto 'all'"), "say hi to all");
        assert_eq!(quote("  plain  "), "plain");
    }
}
