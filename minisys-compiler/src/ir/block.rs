//! Basic-block partitioning via the leader algorithm (Dragon Book §8.5,
//! spec.md §4.4): the first quadruple is a leader, every target of a jump
//! is a leader, and every quadruple immediately after a jump is a leader.
//! Each block then runs from one leader up to (but not including) the
//! next.

use super::quad::Quadruple;
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    pub start: usize,
    pub end: usize,
}

impl BasicBlock {
    pub fn quadruples<'a>(&self, program: &'a [Quadruple]) -> &'a [Quadruple] {
        &program[self.start..self.end]
    }
}

/// Partitions a flat quadruple list for one function into basic blocks.
pub fn partition(quads: &[Quadruple]) -> Vec<BasicBlock> {
    if quads.is_empty() {
        return Vec::new();
    }

    let labels: HashSet<Rc<str>> = quads
        .iter()
        .filter_map(|q| matches!(q.op, super::quad::Op::Label).then(|| q.result.clone()).flatten())
        .collect();

    let mut leaders: Vec<usize> = vec![0];
    for (i, q) in quads.iter().enumerate() {
        if let Some(target) = &q.result {
            if q.is_jump() && labels.contains(target) {
                if let Some(pos) = quads.iter().position(|c| matches!(c.op, super::quad::Op::Label) && c.result.as_ref() == Some(target)) {
                    leaders.push(pos);
                }
            }
        }
        if q.is_jump() && i + 1 < quads.len() {
            leaders.push(i + 1);
        }
    }
    leaders.sort_unstable();
    leaders.dedup();

    leaders
        .iter()
        .enumerate()
        .map(|(idx, &start)| {
            let end = leaders.get(idx + 1).copied().unwrap_or(quads.len());
            BasicBlock { start, end }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::quad::Op;

    #[test]
    fn straight_line_code_is_one_block() {
        let quads = vec![
            Quadruple::assign("1", "_var_0"),
            Quadruple::assign("2", "_var_1"),
        ];
        let blocks = partition(&quads);
        assert_eq!(blocks, vec![BasicBlock { start: 0, end: 2 }]);
    }

    #[test]
    fn a_jump_and_its_target_each_start_a_block() {
        let quads = vec![
            Quadruple::if_false_goto("_var_0", "_label_0"),
            Quadruple::assign("1", "_var_1"),
            Quadruple::goto("_label_1"),
            Quadruple::label("_label_0"),
            Quadruple::assign("2", "_var_1"),
            Quadruple::label("_label_1"),
            Quadruple::new(Op::Return, Some(Rc::from("_var_1")), None, None),
        ];
        let blocks = partition(&quads);
        assert_eq!(
            blocks,
            vec![
                BasicBlock { start: 0, end: 1 },
                BasicBlock { start: 1, end: 3 },
                BasicBlock { start: 3, end: 5 },
                BasicBlock { start: 5, end: 7 },
            ]
        );
    }
}
