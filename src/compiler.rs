//! Compiler: converts a pattern tree into bytecode instructions for the VM.

use crate::ast::{ClassKind, Pattern, RepeatKind, SetItem};

/// VM instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inst {
    /// Match a specific character.
    Char(char),
    /// Match any character (except newline).
    AnyChar,
    /// Match a bracket class.
    CharClass { items: Vec<SetItem>, negated: bool },
    /// Match a shorthand class (\d, \w, \s, etc.)
    ShorthandClass(ClassKind),
    /// Successful match if the whole input was consumed.
    Match,
    /// Jump to target instruction.
    Jump(usize),
    /// Try first path, fall back to second.
    Split(usize, usize),
    /// No-op (used as placeholder).
    Nop,
}

/// Compiled program.
#[derive(Debug, Clone)]
pub struct Program {
    pub insts: Vec<Inst>,
}

/// Compile a pattern into a bytecode program.
pub fn compile(pattern: &Pattern) -> Program {
    let mut insts = Vec::new();
    emit(&mut insts, pattern);
    insts.push(Inst::Match);
    Program { insts }
}

fn emit(insts: &mut Vec<Inst>, node: &Pattern) {
    match node {
        Pattern::Literal(ch) => insts.push(Inst::Char(*ch)),
        Pattern::AnySingle => insts.push(Inst::AnyChar),
        Pattern::SpecialClass(kind) => insts.push(Inst::ShorthandClass(*kind)),
        Pattern::Range(lo, hi) => insts.push(Inst::CharClass {
            items: vec![SetItem::Range(*lo, *hi)],
            negated: false,
        }),
        Pattern::Set { items, negated } => insts.push(Inst::CharClass {
            items: items.clone(),
            negated: *negated,
        }),
        Pattern::Sequence(nodes) => {
            for n in nodes {
                emit(insts, n);
            }
        }
        Pattern::Union(branches) => emit_alternation(insts, branches),
        Pattern::Repeat { node: sub, kind } => emit_repeat(insts, sub, *kind),
        Pattern::Optional(sub) => emit_optional(insts, sub),
        Pattern::Group(sub) => emit(insts, sub),
    }
}

fn emit_alternation(insts: &mut Vec<Inst>, branches: &[Pattern]) {
    // a|b|c compiles to:
    //   split L1, L2
    //   L1: <a> jump END
    //   L2: split L3, L4
    //   L3: <b> jump END
    //   L4: <c>
    //   END:
    let Some((last, init)) = branches.split_last() else {
        // zero alternatives match the empty string
        return;
    };
    let mut fixup_jumps = Vec::new();
    for branch in init {
        let split_pc = insts.len();
        insts.push(Inst::Nop);
        let branch_start = insts.len();
        emit(insts, branch);
        fixup_jumps.push(insts.len());
        insts.push(Inst::Nop);
        let next_branch = insts.len();
        insts[split_pc] = Inst::Split(branch_start, next_branch);
    }
    emit(insts, last);
    let end = insts.len();
    for jpc in fixup_jumps {
        insts[jpc] = Inst::Jump(end);
    }
}

fn emit_repeat(insts: &mut Vec<Inst>, sub: &Pattern, kind: RepeatKind) {
    match kind {
        RepeatKind::Exactly(n) => {
            for _ in 0..n {
                emit(insts, sub);
            }
        }
        RepeatKind::Between(n, m) => {
            for _ in 0..n {
                emit(insts, sub);
            }
            for _ in n..m {
                emit_optional(insts, sub);
            }
        }
        RepeatKind::AtLeast(n) => {
            for _ in 0..n {
                emit(insts, sub);
            }
            emit_star(insts, sub);
        }
        RepeatKind::ZeroOrMore => emit_star(insts, sub),
        RepeatKind::OneOrMore => {
            // L1: <sub>
            //     split L1, L2
            // L2:
            let l1 = insts.len();
            emit(insts, sub);
            let l2 = insts.len() + 1;
            insts.push(Inst::Split(l1, l2));
        }
    }
}

fn emit_star(insts: &mut Vec<Inst>, sub: &Pattern) {
    // L1: split L2, L3
    // L2: <sub> jump L1
    // L3:
    let l1 = insts.len();
    insts.push(Inst::Nop);
    let l2 = insts.len();
    emit(insts, sub);
    insts.push(Inst::Jump(l1));
    let l3 = insts.len();
    insts[l1] = Inst::Split(l2, l3);
}

fn emit_optional(insts: &mut Vec<Inst>, sub: &Pattern) {
    // split L1, L2
    // L1: <sub>
    // L2:
    let split_pc = insts.len();
    insts.push(Inst::Nop);
    let l1 = insts.len();
    emit(insts, sub);
    let l2 = insts.len();
    insts[split_pc] = Inst::Split(l1, l2);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_union_compiles_to_bare_match() {
        let program = compile(&Pattern::group(Pattern::Union(vec![])));
        assert_eq!(program.insts, vec![Inst::Match]);
    }

    #[test]
    fn bounded_repeat_unrolls_optional_tail() {
        let program = compile(&Pattern::repeat(Pattern::Literal('a'), RepeatKind::Between(1, 2)));
        assert_eq!(
            program.insts,
            vec![Inst::Char('a'), Inst::Split(2, 3), Inst::Char('a'), Inst::Match]
        );
    }

    #[test]
    fn alternation_jumps_to_common_end() {
        let program = compile(&Pattern::Union(vec![Pattern::Literal('a'), Pattern::Literal('b')]));
        assert_eq!(
            program.insts,
            vec![Inst::Split(1, 3), Inst::Char('a'), Inst::Jump(4), Inst::Char('b'), Inst::Match]
        );
    }
}
