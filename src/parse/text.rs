//! Text cleanup shared by the field parsers

use regex::Regex;
use std::sync::OnceLock;

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Line breaks, tabs and every Unicode space separator
    RE.get_or_init(|| Regex::new(r"[\n\t\p{Zs}]+").expect("valid whitespace regex"))
}

/// Trim and collapse whitespace runs into single ASCII spaces
///
/// Only for single-value fields; never for text whose line structure
/// matters (code listings, algorithms).
pub fn normalize(content: &str) -> String {
    whitespace_re().replace_all(content.trim(), " ").into_owned()
}

/// Expand presentation-form ligatures (U+FB00..U+FB06)
pub fn repair_ligatures(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '\u{FB00}' => out.push_str("ff"),
            '\u{FB01}' => out.push_str("fi"),
            '\u{FB02}' => out.push_str("fl"),
            '\u{FB03}' => out.push_str("ffi"),
            '\u{FB04}' => out.push_str("ffl"),
            '\u{FB05}' | '\u{FB06}' => out.push_str("st"),
            _ => out.push(c),
        }
    }
    out
}

fn is_hyphen(c: char) -> bool {
    matches!(c, '-' | '\u{2010}' | '\u{2011}' | '\u{00AD}')
}

/// Join lines of a justified block, undoing end-of-line hyphenation
///
/// `"experi-"` followed by `"ment"` becomes `"experiment"`; a hyphen
/// followed by an uppercase letter or digit is kept (`"COVID-"`, `"19"`).
pub fn dehyphenate<'a, I>(lines: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if out.is_empty() {
            out.push_str(line);
            continue;
        }

        let starts_lower = line.chars().next().is_some_and(|c| c.is_lowercase());
        let hyphenated = out.chars().last().is_some_and(is_hyphen)
            && out
                .chars()
                .rev()
                .nth(1)
                .is_some_and(|c| c.is_alphabetic());

        if hyphenated && starts_lower {
            out.pop();
            out.push_str(line);
        } else if hyphenated {
            out.push_str(line);
        } else {
            out.push(' ');
            out.push_str(line);
        }
    }

    out
}
