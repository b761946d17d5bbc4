//! Character universe shared by the generator, the enumerator and the VM.
//!
//! Every language is enumerated over [`PRINTABLE`]. The class predicates here
//! are the only definition of `\s`, `\w` and `\d` in the crate.

/// All printable ASCII characters: digits, lowercase, uppercase, punctuation,
/// then whitespace.
pub const PRINTABLE: &str = concat!(
    "0123456789",
    "abcdefghijklmnopqrstuvwxyz",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
    "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~",
    " \t\n\r\x0b\x0c",
);

/// Graphic characters usable as literals and set members.
pub const LITERALS: &str = concat!(
    "0123456789",
    "abcdefghijklmnopqrstuvwxyz",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
    "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~",
);

pub fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

pub fn is_word(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// Characters that must be escaped to be read back as literals.
pub fn needs_escape(ch: char) -> bool {
    matches!(
        ch,
        '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' | '-'
    )
}

/// Escape sequence for control whitespace, if it has one.
pub fn control_escape(ch: char) -> Option<char> {
    match ch {
        '\t' => Some('t'),
        '\n' => Some('n'),
        '\r' => Some('r'),
        '\x0b' => Some('v'),
        '\x0c' => Some('f'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_has_one_hundred_distinct_chars() {
        let mut chars: Vec<char> = PRINTABLE.chars().collect();
        assert_eq!(chars.len(), 100);
        chars.sort_unstable();
        chars.dedup();
        assert_eq!(chars.len(), 100);
    }

    #[test]
    fn literals_are_the_graphic_subset() {
        assert_eq!(LITERALS.chars().count(), 94);
        assert!(LITERALS.chars().all(|c| c.is_ascii_graphic()));
        assert!(LITERALS.chars().all(|c| PRINTABLE.contains(c)));
    }

    #[test]
    fn whitespace_includes_vertical_tab() {
        assert!(is_whitespace('\x0b'));
        assert!(!is_whitespace('a'));
        assert_eq!(PRINTABLE.chars().filter(|c| is_whitespace(*c)).count(), 6);
    }

    #[test]
    fn escapes_cover_control_whitespace() {
        for ch in "\t\n\r\x0b\x0c".chars() {
            assert!(control_escape(ch).is_some());
        }
        assert_eq!(control_escape(' '), None);
    }
}
