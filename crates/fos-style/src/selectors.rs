//! Selector Validation
//!
//! A selector block must style the element that owns it. Each
//! comma-separated alternative has to mention that element exactly once,
//! either as `&` or as its own class, and that mention has to sit in the
//! final compound selector: `.parent:hover &` is fine, `& .child` is not.

use crate::definition::ScopeToken;
use std::fmt;

/// Placeholder for the current element in selector strings
pub const SCOPE_PLACEHOLDER: char = '&';

/// Why a selector was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorTargetReason {
    ZeroOccurrences,
    MultipleOccurrences,
    TargetsDescendant,
}

impl SelectorTargetReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZeroOccurrences => "zero-occurrences",
            Self::MultipleOccurrences => "multiple-occurrences",
            Self::TargetsDescendant => "targets-descendant",
        }
    }
}

impl fmt::Display for SelectorTargetReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selector does not target the current element
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Selector `{selector}` must target the current element: {reason}")]
pub struct SelectorTargetError {
    pub selector: String,
    pub reason: SelectorTargetReason,
}

/// Check a selector against the scope it belongs to
pub fn validate(selector: &str, scope: &ScopeToken) -> Result<(), SelectorTargetError> {
    for alternative in split_alternatives(selector) {
        if let Err(reason) = validate_alternative(alternative, scope) {
            return Err(SelectorTargetError {
                selector: selector.to_string(),
                reason,
            });
        }
    }
    Ok(())
}

/// Replace `&` with the scope's class selector
pub fn resolve(selector: &str, scope: &ScopeToken) -> String {
    let class = scope.class_selector();
    let mut out = String::with_capacity(selector.len() + class.len());
    let mut quote: Option<char> = None;
    let mut chars = selector.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                out.push(ch);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '"' | '\'' => {
                match quote {
                    Some(q) if q == ch => quote = None,
                    None => quote = Some(ch),
                    _ => {}
                }
                out.push(ch);
            }
            SCOPE_PLACEHOLDER if quote.is_none() => out.push_str(&class),
            _ => out.push(ch),
        }
    }
    out
}

/// Split on commas outside parentheses, brackets and strings
pub fn split_alternatives(selector: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, ch) in selector.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' | '\'' => match quote {
                Some(q) if q == ch => quote = None,
                None => quote = Some(ch),
                _ => {}
            },
            _ if quote.is_some() => {}
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(selector[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(selector[start..].trim());
    parts
}

/// Mention of the current element inside one alternative
#[derive(Debug, Clone, Copy)]
struct Occurrence {
    offset: usize,
    depth: usize,
}

fn validate_alternative(alternative: &str, scope: &ScopeToken) -> Result<(), SelectorTargetReason> {
    let class = scope.class_selector();
    let mut occurrences: Vec<Occurrence> = Vec::new();
    let mut last_combinator: Option<usize> = None;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    let mut i = 0;
    while i < alternative.len() {
        let Some(ch) = alternative[i..].chars().next() else {
            break;
        };
        let width = ch.len_utf8();

        if let Some(q) = quote {
            if ch == '\\' {
                i += width + alternative[i + width..].chars().next().map_or(0, char::len_utf8);
                continue;
            }
            if ch == q {
                quote = None;
            }
            i += width;
            continue;
        }

        match ch {
            '\\' => {
                i += width + alternative[i + width..].chars().next().map_or(0, char::len_utf8);
                continue;
            }
            '"' | '\'' => quote = Some(ch),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            // `&b` would resolve to `.ab`, a different class
            SCOPE_PLACEHOLDER => {
                let glued = alternative[i + width..].chars().next().is_some_and(is_ident_char);
                if !glued {
                    occurrences.push(Occurrence { offset: i, depth });
                }
            }
            '.' if alternative[i..].starts_with(&class) => {
                let end = i + class.len();
                let boundary = alternative[end..]
                    .chars()
                    .next()
                    .is_none_or(|next| !is_ident_char(next));
                if boundary {
                    occurrences.push(Occurrence { offset: i, depth });
                    i = end;
                    continue;
                }
            }
            c if depth == 0 && (c.is_whitespace() || matches!(c, '>' | '+' | '~')) => {
                last_combinator = Some(i);
            }
            _ => {}
        }
        i += width;
    }

    match occurrences.as_slice() {
        [] => Err(SelectorTargetReason::ZeroOccurrences),
        [only] => {
            let in_last_compound = last_combinator.is_none_or(|at| at < only.offset);
            if only.depth == 0 && in_last_compound {
                Ok(())
            } else {
                Err(SelectorTargetReason::TargetsDescendant)
            }
        }
        _ => Err(SelectorTargetReason::MultipleOccurrences),
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '\\' || !c.is_ascii()
}

/// Whether `token` is a parameterless pseudo-class or pseudo-element
pub fn is_simple_pseudo(token: &str) -> bool {
    SIMPLE_PSEUDOS.contains(&token)
}

/// Pseudo tokens accepted as plain definition keys
pub const SIMPLE_PSEUDOS: &[&str] = &[
    ":-moz-any-link",
    ":-moz-full-screen",
    ":-moz-placeholder",
    ":-moz-read-only",
    ":-moz-read-write",
    ":-ms-fullscreen",
    ":-ms-input-placeholder",
    ":-webkit-any-link",
    ":-webkit-full-screen",
    "::-moz-placeholder",
    "::-moz-progress-bar",
    "::-moz-range-progress",
    "::-moz-range-thumb",
    "::-moz-range-track",
    "::-moz-selection",
    "::-ms-backdrop",
    "::-ms-browse",
    "::-ms-check",
    "::-ms-clear",
    "::-ms-fill",
    "::-ms-fill-lower",
    "::-ms-fill-upper",
    "::-ms-reveal",
    "::-ms-thumb",
    "::-ms-ticks-after",
    "::-ms-ticks-before",
    "::-ms-tooltip",
    "::-ms-track",
    "::-ms-value",
    "::-webkit-backdrop",
    "::-webkit-input-placeholder",
    "::-webkit-progress-bar",
    "::-webkit-progress-inner-value",
    "::-webkit-progress-value",
    "::-webkit-resizer",
    "::-webkit-scrollbar",
    "::-webkit-scrollbar-button",
    "::-webkit-scrollbar-corner",
    "::-webkit-scrollbar-thumb",
    "::-webkit-scrollbar-track",
    "::-webkit-scrollbar-track-piece",
    "::-webkit-search-cancel-button",
    "::-webkit-search-decoration",
    "::-webkit-search-results-button",
    "::-webkit-search-results-decoration",
    "::-webkit-slider-runnable-track",
    "::-webkit-slider-thumb",
    "::after",
    "::backdrop",
    "::before",
    "::cue",
    "::file-selector-button",
    "::first-letter",
    "::first-line",
    "::grammar-error",
    "::marker",
    "::placeholder",
    "::selection",
    "::spelling-error",
    ":active",
    ":after",
    ":any-link",
    ":before",
    ":blank",
    ":checked",
    ":default",
    ":defined",
    ":disabled",
    ":empty",
    ":enabled",
    ":first",
    ":first-child",
    ":first-letter",
    ":first-line",
    ":first-of-type",
    ":focus",
    ":focus-visible",
    ":focus-within",
    ":fullscreen",
    ":hover",
    ":in-range",
    ":indeterminate",
    ":invalid",
    ":last-child",
    ":last-of-type",
    ":left",
    ":link",
    ":only-child",
    ":only-of-type",
    ":optional",
    ":out-of-range",
    ":placeholder-shown",
    ":read-only",
    ":read-write",
    ":required",
    ":right",
    ":root",
    ":scope",
    ":target",
    ":valid",
    ":visited",
];
