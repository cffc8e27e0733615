//! # Environment Variable Expansion
//!
//! Rewrites `${NAME}` and bare `$NAME` tokens in raw configuration text
//! against an [`EnvSnapshot`], before the text is parsed.
//!
//! Expansion is deliberately conservative: empty and unset variables leave
//! the token untouched so a missing secret never silently blanks a required
//! field, and malformed tokens pass through byte-for-byte. Expansion never
//! fails.

use crate::env::EnvSnapshot;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static BRACED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z0-9_]+)\}").expect("valid regex"));

static BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Za-z0-9_]+)").expect("valid regex"));

/// Expands environment variable references in `input`.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Substitutes `${NAME}` and bare `$NAME` references with values from the
/// snapshot, only where the value is non-empty.
///
/// ## Algorithm
/// 1. All `${NAME}` occurrences are replaced first, left to right,
///    non-overlapping. The replacement text is not re-scanned, so nested
///    braces produce partially-expanded output rather than recursing.
/// 2. Remaining bare `$NAME` occurrences (name = maximal run of
///    `[A-Za-z0-9_]`) are replaced, but only for names that never appear as
///    `${NAME}` in the *original* input. This prevents double expansion when
///    both forms of the same variable are present.
/// 3. Malformed tokens (`$` with no identifier, unterminated `${`, `${}`)
///    are left unchanged.
///
/// ## Usage
/// ```rust
/// use config::{expand_env, EnvSnapshot};
///
/// let env = EnvSnapshot::from_pairs([("TOKEN", "abc123")]);
/// assert_eq!(expand_env("token: ${TOKEN}", &env), "token: abc123");
/// assert_eq!(expand_env("token: ${MISSING}", &env), "token: ${MISSING}");
/// ```
pub fn expand_env(input: &str, env: &EnvSnapshot) -> String {
    let braced = BRACED.replace_all(input, |caps: &Captures| {
        let name = &caps[1];
        match env.get(name) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => caps[0].to_string(),
        }
    });

    let expanded = BARE.replace_all(&braced, |caps: &Captures| {
        let name = &caps[1];
        // Decisions are made against the original input: a name that also
        // appears in braced form anywhere is skipped here.
        if input.contains(&format!("${{{name}}}")) {
            return caps[0].to_string();
        }
        match env.get(name) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => caps[0].to_string(),
        }
    });

    expanded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> EnvSnapshot {
        EnvSnapshot::from_pairs([
            ("VAR", "value"),
            ("TOKEN", "tok-1"),
            ("EMPTY", ""),
            ("A1_B2", "ok"),
        ])
    }

    #[test]
    fn test_no_dollar_is_identity() {
        assert_eq!(expand_env("plain text, no refs", &env()), "plain text, no refs");
        assert_eq!(expand_env("", &env()), "");
    }

    #[test]
    fn test_braced_expansion() {
        assert_eq!(expand_env("x: ${VAR}", &env()), "x: value");
        assert_eq!(expand_env("${VAR}${TOKEN}", &env()), "valuetok-1");
    }

    #[test]
    fn test_bare_expansion() {
        assert_eq!(expand_env("x: $VAR", &env()), "x: value");
        assert_eq!(expand_env("$A1_B2", &env()), "ok");
    }

    #[test]
    fn test_braced_wins_over_bare_for_same_name() {
        // Exact scenario from the contract: only the braced form expands.
        assert_eq!(expand_env("${VAR} and $VAR", &env()), "value and $VAR");
    }

    #[test]
    fn test_unset_and_empty_are_left_alone() {
        assert_eq!(expand_env("${MISSING}", &env()), "${MISSING}");
        assert_eq!(expand_env("$MISSING", &env()), "$MISSING");
        assert_eq!(expand_env("${EMPTY}", &env()), "${EMPTY}");
        assert_eq!(expand_env("$EMPTY", &env()), "$EMPTY");
    }

    #[test]
    fn test_malformed_tokens_unchanged() {
        assert_eq!(expand_env("$", &env()), "$");
        assert_eq!(expand_env("${", &env()), "${");
        assert_eq!(expand_env("${}", &env()), "${}");
        assert_eq!(expand_env("${INCOMPLETE", &env()), "${INCOMPLETE");
        assert_eq!(expand_env("cost: $5", &env()), "cost: $5");
    }

    #[test]
    fn test_nested_braces_are_not_rescanned() {
        // Outer-first policy: the inner ${VAR} expands on the first pass and
        // the surrounding text is not treated as a new token.
        let out = expand_env("${X${VAR}}", &env());
        assert_eq!(out, "${Xvalue}");
    }

    #[test]
    fn test_expansion_inside_yaml_document() {
        let env = EnvSnapshot::from_pairs([("DO_TOKEN", "dop_v1_secret")]);
        let input = "providers:\n  digitalocean:\n    token: ${DO_TOKEN}\n";
        let out = expand_env(input, &env);
        assert!(out.contains("token: dop_v1_secret"));
    }
}
