//! VM executor: runs compiled bytecode against an input string.
//!
//! Bounded backtracking over an explicit job stack. Each `(pc, pos)` state is
//! explored at most once, so matching is linear in `insts * input` and
//! `*` over an empty-matching body cannot loop.

use crate::ast::SetItem;
use crate::compiler::{Inst, Program};

/// Whether `input` matches the program from its first char to its last.
pub fn fullmatch(program: &Program, input: &str) -> bool {
    let chars: Vec<char> = input.chars().collect();
    let width = chars.len() + 1;
    let mut visited = vec![false; program.insts.len() * width];
    let mut jobs: Vec<(usize, usize)> = vec![(0, 0)];

    while let Some((mut pc, mut pos)) = jobs.pop() {
        loop {
            let Some(inst) = program.insts.get(pc) else {
                break;
            };
            let slot = pc * width + pos;
            if visited[slot] {
                break;
            }
            visited[slot] = true;

            match inst {
                Inst::Match => {
                    if pos == chars.len() {
                        return true;
                    }
                    break;
                }
                Inst::Jump(target) => pc = *target,
                Inst::Split(first, second) => {
                    jobs.push((*second, pos));
                    pc = *first;
                }
                Inst::Nop => pc += 1,
                consuming => {
                    if pos < chars.len() && step_matches(consuming, chars[pos]) {
                        pos += 1;
                        pc += 1;
                    } else {
                        break;
                    }
                }
            }
        }
    }
    false
}

fn step_matches(inst: &Inst, ch: char) -> bool {
    match inst {
        Inst::Char(expected) => ch == *expected,
        Inst::AnyChar => ch != '\n',
        Inst::CharClass { items, negated } => char_class_matches(ch, items, *negated),
        Inst::ShorthandClass(kind) => kind.matches(ch),
        Inst::Match | Inst::Jump(_) | Inst::Split(..) | Inst::Nop => false,
    }
}

/// Check if a character matches a bracket class.
fn char_class_matches(ch: char, items: &[SetItem], negated: bool) -> bool {
    let matched = items.iter().any(|item| item.matches(ch));
    if negated { !matched } else { matched }
}
