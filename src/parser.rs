//! Regex parser: converts a pattern string into a [`Pattern`] tree.
//!
//! Accepts the syntax the renderer emits plus the usual shorthands (`*`, `+`,
//! capturing groups, lazy suffixes). Anchors, lookaround and backreferences
//! are rejected as unsupported.

use thiserror::Error;

use crate::ast::{ClassKind, Pattern, RepeatKind, SetItem};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected end of pattern")]
    UnexpectedEnd,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("expected '{expected}' at position {pos}")]
    Expected { expected: char, pos: usize },
    #[error("nothing to repeat at position {pos}")]
    NothingToRepeat { pos: usize },
    #[error("multiple repeat at position {pos}")]
    MultipleRepeat { pos: usize },
    #[error("invalid repeat bounds {{{min},{max}}} at position {pos}")]
    BadBounds { min: u32, max: u32, pos: usize },
    #[error("repeat count too large at position {pos}")]
    CountOverflow { pos: usize },
    #[error("invalid range {lo:?}-{hi:?} at position {pos}")]
    BadRange { lo: char, hi: char, pos: usize },
    #[error("bad escape \\{ch} at position {pos}")]
    BadEscape { ch: char, pos: usize },
    #[error("unsupported {what} at position {pos}")]
    Unsupported { what: &'static str, pos: usize },
}

/// Parse a full pattern.
pub fn parse(pattern: &str) -> Result<Pattern, ParseError> {
    Parser::new(pattern).parse()
}

pub struct Parser {
    chars: Vec<char>,
    pos: usize,
}

/// One position inside a bracket class.
enum ClassAtom {
    Char(char),
    Class(ClassKind),
}

impl Parser {
    pub fn new(pattern: &str) -> Self {
        Parser { chars: pattern.chars().collect(), pos: 0 }
    }

    pub fn parse(&mut self) -> Result<Pattern, ParseError> {
        let node = self.parse_alternation()?;
        match self.peek() {
            Some(ch) => Err(ParseError::UnexpectedChar { ch, pos: self.pos }),
            None => Ok(node),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn next_char(&mut self) -> Result<char, ParseError> {
        self.advance().ok_or(ParseError::UnexpectedEnd)
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.advance() {
            Some(c) if c == expected => Ok(()),
            Some(_) => Err(ParseError::Expected { expected, pos: self.pos - 1 }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    /// `a|b|c`
    fn parse_alternation(&mut self) -> Result<Pattern, ParseError> {
        let mut branches = vec![self.parse_concat()?];
        while self.peek() == Some('|') {
            self.advance();
            branches.push(self.parse_concat()?);
        }
        if branches.len() == 1 {
            Ok(branches.swap_remove(0))
        } else {
            Ok(Pattern::Union(branches))
        }
    }

    /// `abc`
    fn parse_concat(&mut self) -> Result<Pattern, ParseError> {
        let mut nodes = Vec::new();
        while let Some(ch) = self.peek() {
            if ch == ')' || ch == '|' {
                break;
            }
            nodes.push(self.parse_quantified()?);
        }
        if nodes.len() == 1 {
            Ok(nodes.swap_remove(0))
        } else {
            Ok(Pattern::Sequence(nodes))
        }
    }

    /// An atom possibly followed by one quantifier.
    fn parse_quantified(&mut self) -> Result<Pattern, ParseError> {
        let node = self.parse_atom()?;
        let node = match self.peek() {
            Some('*') => self.finish_quantifier(node, RepeatKind::ZeroOrMore),
            Some('+') => self.finish_quantifier(node, RepeatKind::OneOrMore),
            Some('?') => {
                self.advance();
                self.skip_lazy_suffix();
                Pattern::optional(node)
            }
            Some('{') => match self.try_parse_braces()? {
                Some(kind) => Pattern::repeat(node, kind),
                // not a quantifier, the '{' is a literal
                None => node,
            },
            _ => node,
        };
        if !matches!(node, Pattern::Repeat { .. } | Pattern::Optional(_)) {
            return Ok(node);
        }
        match self.peek() {
            Some('*' | '+' | '?') => Err(ParseError::MultipleRepeat { pos: self.pos }),
            Some('{') if self.brace_quantifier_ahead() => {
                Err(ParseError::MultipleRepeat { pos: self.pos })
            }
            _ => Ok(node),
        }
    }

    fn finish_quantifier(&mut self, node: Pattern, kind: RepeatKind) -> Pattern {
        self.advance();
        self.skip_lazy_suffix();
        Pattern::repeat(node, kind)
    }

    /// Greediness does not change which strings fullmatch.
    fn skip_lazy_suffix(&mut self) {
        if self.peek() == Some('?') {
            self.advance();
        }
    }

    fn brace_quantifier_ahead(&mut self) -> bool {
        let start = self.pos;
        let ahead = matches!(self.try_parse_braces(), Ok(Some(_)));
        self.pos = start;
        ahead
    }

    /// `{n}`, `{n,}`, `{n,m}`. Returns `None` and leaves the position
    /// untouched when the braces do not form a quantifier.
    fn try_parse_braces(&mut self) -> Result<Option<RepeatKind>, ParseError> {
        let start = self.pos;
        self.advance();
        let Some(min) = self.parse_number()? else {
            self.pos = start;
            return Ok(None);
        };
        let kind = if self.peek() == Some(',') {
            self.advance();
            match self.parse_number()? {
                Some(max) if max < min => {
                    return Err(ParseError::BadBounds { min, max, pos: start });
                }
                Some(max) => RepeatKind::Between(min, max),
                None => RepeatKind::AtLeast(min),
            }
        } else {
            RepeatKind::Exactly(min)
        };
        if self.peek() != Some('}') {
            self.pos = start;
            return Ok(None);
        }
        self.advance();
        self.skip_lazy_suffix();
        Ok(Some(kind))
    }

    fn parse_number(&mut self) -> Result<Option<u32>, ParseError> {
        let start = self.pos;
        while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance();
        }
        if self.pos == start {
            return Ok(None);
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits.parse::<u32>().map(Some).map_err(|_| ParseError::CountOverflow { pos: start })
    }

    /// A single atom: literal, class, group, escape.
    fn parse_atom(&mut self) -> Result<Pattern, ParseError> {
        let pos = self.pos;
        match self.peek() {
            None => Err(ParseError::UnexpectedEnd),
            Some('(') => self.parse_group(),
            Some('[') => self.parse_char_class(),
            Some('.') => {
                self.advance();
                Ok(Pattern::AnySingle)
            }
            Some('^' | '$') => Err(ParseError::Unsupported { what: "anchor", pos }),
            Some('*' | '+' | '?') => Err(ParseError::NothingToRepeat { pos }),
            Some('\\') => {
                self.advance();
                match self.parse_escape()? {
                    ClassAtom::Char(ch) => Ok(Pattern::Literal(ch)),
                    ClassAtom::Class(kind) => Ok(Pattern::SpecialClass(kind)),
                }
            }
            Some(ch) => {
                self.advance();
                Ok(Pattern::Literal(ch))
            }
        }
    }

    /// Escape body, after the backslash.
    fn parse_escape(&mut self) -> Result<ClassAtom, ParseError> {
        let pos = self.pos;
        let ch = self.next_char()?;
        if let Some(kind) = ClassKind::from_letter(ch) {
            return Ok(ClassAtom::Class(kind));
        }
        match ch {
            'n' => Ok(ClassAtom::Char('\n')),
            'r' => Ok(ClassAtom::Char('\r')),
            't' => Ok(ClassAtom::Char('\t')),
            'v' => Ok(ClassAtom::Char('\x0b')),
            'f' => Ok(ClassAtom::Char('\x0c')),
            'b' | 'B' | 'A' | 'z' | 'Z' => Err(ParseError::Unsupported { what: "assertion", pos }),
            '1'..='9' => Err(ParseError::Unsupported { what: "backreference", pos }),
            c if c.is_ascii_alphanumeric() => Err(ParseError::BadEscape { ch: c, pos }),
            c => Ok(ClassAtom::Char(c)),
        }
    }

    /// `(...)`, `(?:...)`. Lookaround and inline flags are unsupported.
    fn parse_group(&mut self) -> Result<Pattern, ParseError> {
        let pos = self.pos;
        self.advance();
        if self.peek() == Some('?') {
            match self.peek_at(1) {
                Some(':') => {
                    self.pos += 2;
                }
                Some('=' | '!' | '<') => {
                    return Err(ParseError::Unsupported { what: "lookaround", pos });
                }
                _ => return Err(ParseError::Unsupported { what: "group flags", pos }),
            }
        }
        let node = self.parse_alternation()?;
        self.expect(')')?;
        Ok(Pattern::group(node))
    }

    /// `[abc]`, `[a-z]`, `[^\d]`.
    ///
    /// A lone non-negated range comes back as [`Pattern::Range`].
    fn parse_char_class(&mut self) -> Result<Pattern, ParseError> {
        self.advance();
        let negated = if self.peek() == Some('^') {
            self.advance();
            true
        } else {
            false
        };

        let mut items = Vec::new();
        // Allow ']' as first character in class
        if self.peek() == Some(']') {
            self.advance();
            items.push(SetItem::Literal(']'));
        }

        while self.peek() != Some(']') {
            let start = self.pos;
            let lo = match self.parse_class_atom()? {
                ClassAtom::Class(kind) => {
                    items.push(SetItem::Class(kind));
                    continue;
                }
                ClassAtom::Char(ch) => ch,
            };
            if self.peek() == Some('-') && self.peek_at(1).is_some_and(|c| c != ']') {
                self.advance();
                let hi = match self.parse_class_atom()? {
                    ClassAtom::Char(ch) => ch,
                    ClassAtom::Class(_) => {
                        return Err(ParseError::Unsupported { what: "class in range", pos: start });
                    }
                };
                if lo > hi {
                    return Err(ParseError::BadRange { lo, hi, pos: start });
                }
                items.push(SetItem::Range(lo, hi));
            } else {
                items.push(SetItem::Literal(lo));
            }
        }
        self.advance();

        match items.as_slice() {
            [SetItem::Range(lo, hi)] if !negated => Ok(Pattern::Range(*lo, *hi)),
            _ => Ok(Pattern::Set { items, negated }),
        }
    }

    fn parse_class_atom(&mut self) -> Result<ClassAtom, ParseError> {
        match self.next_char()? {
            '\\' => self.parse_escape(),
            ch => Ok(ClassAtom::Char(ch)),
        }
    }
}
