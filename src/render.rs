//! Renderer: converts a pattern tree into canonical regex text.
//!
//! Rendering is deterministic and the output parses back into an equivalent
//! tree with [`crate::parser::parse`].

use std::fmt::{self, Write};

use crate::ast::{Pattern, RepeatKind, SetItem};
use crate::charset;

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(ch) => write_char(f, *ch),
            Pattern::AnySingle => f.write_char('.'),
            Pattern::SpecialClass(kind) => write!(f, "\\{}", kind.letter()),
            Pattern::Range(lo, hi) => {
                f.write_char('[')?;
                write_char(f, *lo)?;
                f.write_char('-')?;
                write_char(f, *hi)?;
                f.write_char(']')
            }
            Pattern::Set { items, negated } => {
                f.write_str(if *negated { "[^" } else { "[" })?;
                for item in items {
                    write!(f, "{item}")?;
                }
                f.write_char(']')
            }
            Pattern::Sequence(nodes) => {
                for node in nodes {
                    // `a|b` needs a group to stay a single term in a concatenation
                    if nodes.len() > 1 && is_alternation(node) {
                        write!(f, "(?:{node})")?;
                    } else {
                        write!(f, "{node}")?;
                    }
                }
                Ok(())
            }
            Pattern::Union(branches) => {
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        f.write_char('|')?;
                    }
                    write!(f, "{branch}")?;
                }
                Ok(())
            }
            Pattern::Repeat { node, kind } => {
                write_operand(f, node)?;
                write!(f, "{kind}")
            }
            Pattern::Optional(node) => {
                write_operand(f, node)?;
                f.write_char('?')
            }
            Pattern::Group(node) => write!(f, "(?:{node})"),
        }
    }
}

impl fmt::Display for RepeatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepeatKind::Exactly(n) => write!(f, "{{{n}}}"),
            RepeatKind::Between(n, m) => write!(f, "{{{n},{m}}}"),
            RepeatKind::AtLeast(n) => write!(f, "{{{n},}}"),
            RepeatKind::ZeroOrMore => f.write_char('*'),
            RepeatKind::OneOrMore => f.write_char('+'),
        }
    }
}

impl fmt::Display for SetItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetItem::Literal(ch) => write_char(f, *ch),
            SetItem::Range(lo, hi) => {
                write_char(f, *lo)?;
                f.write_char('-')?;
                write_char(f, *hi)
            }
            SetItem::Class(kind) => write!(f, "\\{}", kind.letter()),
        }
    }
}

/// True when `node` renders as a bare `x|y` at its top level.
fn is_alternation(node: &Pattern) -> bool {
    match node {
        Pattern::Union(branches) => match branches.as_slice() {
            [only] => is_alternation(only),
            branches => branches.len() > 1,
        },
        Pattern::Sequence(nodes) => matches!(nodes.as_slice(), [only] if is_alternation(only)),
        _ => false,
    }
}

/// Quantifier operands must be atoms; anything else gets a non-capturing group.
fn write_operand(f: &mut fmt::Formatter<'_>, node: &Pattern) -> fmt::Result {
    if node.is_single_char() || matches!(node, Pattern::Group(_)) {
        write!(f, "{node}")
    } else {
        write!(f, "(?:{node})")
    }
}

fn write_char(f: &mut fmt::Formatter<'_>, ch: char) -> fmt::Result {
    if let Some(letter) = charset::control_escape(ch) {
        f.write_char('\\')?;
        f.write_char(letter)
    } else if charset::needs_escape(ch) {
        f.write_char('\\')?;
        f.write_char(ch)
    } else {
        f.write_char(ch)
    }
}
