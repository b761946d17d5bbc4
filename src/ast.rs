//! AST types for generated patterns.

use crate::charset;

/// A single node in a pattern tree.
///
/// Trees are plain owned values; nothing is shared between two patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Matches a single literal character.
    Literal(char),
    /// Matches any character except newline.
    AnySingle,
    /// Shorthand class: `\d`, `\w`, `\s` and their negations.
    SpecialClass(ClassKind),
    /// `[lo-hi]` with `lo <= hi`.
    Range(char, char),
    /// Character set like `[ab\d]` or `[^ab]`.
    Set { items: Vec<SetItem>, negated: bool },
    /// Concatenation of nodes.
    Sequence(Vec<Pattern>),
    /// Alternation. Zero alternatives match only the empty string.
    Union(Vec<Pattern>),
    /// Quantifier applied to a sub-pattern.
    Repeat { node: Box<Pattern>, kind: RepeatKind },
    /// `x?`
    Optional(Box<Pattern>),
    /// Non-capturing group `(?:...)`.
    Group(Box<Pattern>),
}

/// Kind of repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatKind {
    /// `{n}`
    Exactly(u32),
    /// `{n,m}` with `n <= m`.
    Between(u32, u32),
    /// `{n,}`
    AtLeast(u32),
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

/// Item within a character set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetItem {
    Literal(char),
    Range(char, char),
    Class(ClassKind),
}

/// Shorthand character class kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// `\s`
    Whitespace,
    /// `\S`
    NotWhitespace,
    /// `\w`
    Word,
    /// `\W`
    NotWord,
    /// `\d`
    Digit,
    /// `\D`
    NotDigit,
}

impl ClassKind {
    pub const ALL: [ClassKind; 6] = [
        ClassKind::Whitespace,
        ClassKind::NotWhitespace,
        ClassKind::Word,
        ClassKind::NotWord,
        ClassKind::Digit,
        ClassKind::NotDigit,
    ];

    /// The class matching exactly the characters this one rejects.
    pub fn complement(self) -> ClassKind {
        match self {
            ClassKind::Whitespace => ClassKind::NotWhitespace,
            ClassKind::NotWhitespace => ClassKind::Whitespace,
            ClassKind::Word => ClassKind::NotWord,
            ClassKind::NotWord => ClassKind::Word,
            ClassKind::Digit => ClassKind::NotDigit,
            ClassKind::NotDigit => ClassKind::Digit,
        }
    }

    pub fn matches(self, ch: char) -> bool {
        match self {
            ClassKind::Whitespace => charset::is_whitespace(ch),
            ClassKind::NotWhitespace => !charset::is_whitespace(ch),
            ClassKind::Word => charset::is_word(ch),
            ClassKind::NotWord => !charset::is_word(ch),
            ClassKind::Digit => charset::is_digit(ch),
            ClassKind::NotDigit => !charset::is_digit(ch),
        }
    }

    /// The letter following the backslash, e.g. `d` for `\d`.
    pub fn letter(self) -> char {
        match self {
            ClassKind::Whitespace => 's',
            ClassKind::NotWhitespace => 'S',
            ClassKind::Word => 'w',
            ClassKind::NotWord => 'W',
            ClassKind::Digit => 'd',
            ClassKind::NotDigit => 'D',
        }
    }

    pub fn from_letter(letter: char) -> Option<ClassKind> {
        ClassKind::ALL.into_iter().find(|kind| kind.letter() == letter)
    }
}

impl SetItem {
    pub fn matches(self, ch: char) -> bool {
        match self {
            SetItem::Literal(c) => ch == c,
            SetItem::Range(lo, hi) => lo <= ch && ch <= hi,
            SetItem::Class(kind) => kind.matches(ch),
        }
    }
}

impl Pattern {
    /// Range over two characters given in any order.
    pub fn range(a: char, b: char) -> Pattern {
        if a <= b { Pattern::Range(a, b) } else { Pattern::Range(b, a) }
    }

    pub fn group(node: Pattern) -> Pattern {
        Pattern::Group(Box::new(node))
    }

    pub fn optional(node: Pattern) -> Pattern {
        Pattern::Optional(Box::new(node))
    }

    pub fn repeat(node: Pattern, kind: RepeatKind) -> Pattern {
        Pattern::Repeat { node: Box::new(node), kind }
    }

    /// True for nodes that consume exactly one character.
    pub fn is_single_char(&self) -> bool {
        matches!(
            self,
            Pattern::Literal(_)
                | Pattern::AnySingle
                | Pattern::SpecialClass(_)
                | Pattern::Range(..)
                | Pattern::Set { .. }
        )
    }

    /// Whether a single-char node accepts `ch`.
    ///
    /// Always false for nodes that are not single-char.
    pub fn accepts_char(&self, ch: char) -> bool {
        match self {
            Pattern::Literal(c) => *c == ch,
            Pattern::AnySingle => ch != '\n',
            Pattern::SpecialClass(kind) => kind.matches(ch),
            Pattern::Range(lo, hi) => *lo <= ch && ch <= *hi,
            Pattern::Set { items, negated } => {
                items.iter().any(|item| item.matches(ch)) != *negated
            }
            _ => false,
        }
    }
}

impl RepeatKind {
    pub fn min(self) -> u32 {
        match self {
            RepeatKind::Exactly(n) | RepeatKind::Between(n, _) | RepeatKind::AtLeast(n) => n,
            RepeatKind::ZeroOrMore => 0,
            RepeatKind::OneOrMore => 1,
        }
    }

    /// Upper bound, or `None` when unbounded.
    pub fn max(self) -> Option<u32> {
        match self {
            RepeatKind::Exactly(n) => Some(n),
            RepeatKind::Between(_, m) => Some(m),
            RepeatKind::AtLeast(_) | RepeatKind::ZeroOrMore | RepeatKind::OneOrMore => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_orders_endpoints() {
        assert_eq!(Pattern::range('z', 'a'), Pattern::Range('a', 'z'));
        assert_eq!(Pattern::range('a', 'a'), Pattern::Range('a', 'a'));
    }

    #[test]
    fn complement_is_an_involution() {
        for kind in ClassKind::ALL {
            assert_ne!(kind, kind.complement());
            assert_eq!(kind, kind.complement().complement());
            assert_eq!(ClassKind::from_letter(kind.letter()), Some(kind));
        }
    }

    #[test]
    fn negated_set_rejects_members() {
        let set = Pattern::Set {
            items: vec![SetItem::Literal('a'), SetItem::Class(ClassKind::Digit)],
            negated: true,
        };
        assert!(!set.accepts_char('a'));
        assert!(!set.accepts_char('7'));
        assert!(set.accepts_char('b'));
    }

    #[test]
    fn any_single_excludes_newline() {
        assert!(Pattern::AnySingle.accepts_char(' '));
        assert!(!Pattern::AnySingle.accepts_char('\n'));
    }
}
