//! Stack-frame layout (spec.md §4.5): outgoing-argument slots at the
//! bottom of the frame, one word per live local/temporary slot above
//! that, then the callee-saved-register save area at the top — all
//! addressed as positive offsets from `$sp` (the frame is fixed for the
//! function's whole body; `$sp` itself doesn't move again until a callee
//! pushes its own frame below it).

use crate::ir::{IrFunction, Op};
use std::collections::HashMap;
use std::rc::Rc;

/// Minimum outgoing-argument area a non-leaf function reserves, even if
/// every call it makes passes fewer arguments (spec.md §4.5).
pub const MIN_OUTGOING_SLOTS: i32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrameInfo {
    /// Whether this function calls no other function.
    pub is_leaf: bool,
    /// Word count reserved for spilling call arguments beyond the first
    /// four (0 for leaf functions, else `max(4, max callee arity)`).
    pub outgoing_slots: i32,
    /// Word count of live local/temporary slots (`arg1`/`arg2`/`result`
    /// names that aren't literals or jump targets).
    pub local_data: i32,
    /// Number of `$s0..` registers this function preserves: 0 for `main`;
    /// 8 if `local_data > 18`; `local_data - 8` if `local_data > 10`;
    /// else 0 (spec.md §4.5).
    pub num_gprs_to_save: i32,
    /// Whether this function saves/restores `$ra` (non-leaf functions
    /// only — a leaf never clobbers its own return address).
    pub saves_return_addr: bool,
    /// Total frame size in bytes `addiu $sp, $sp, -frame_size` reserves.
    ///
    /// Word count is `(1 if non-leaf else 0) + local_data +
    /// num_gprs_to_save + outgoing_slots + num_gprs_to_save` — the second
    /// `num_gprs_to_save` term double-counts the callee-saved-register
    /// area. spec.md §4.5 calls this out explicitly as a quirk to
    /// preserve, not a bug to fix (see DESIGN.md's Open Question log);
    /// the result is rounded up to an even word count before multiplying
    /// by 4.
    pub frame_size: i32,
    pub offsets: HashMap<Rc<str>, i32>,
    /// Byte offset of the saved `$ra` slot, if this function is non-leaf.
    pub ra_offset: Option<i32>,
    /// Byte offsets of the `$s0..` slots this function preserves, in order.
    pub saved_s_offsets: Vec<i32>,
}

impl StackFrameInfo {
    pub fn offset_of(&self, slot: &str) -> Option<i32> {
        self.offsets.get(slot).copied()
    }
}

/// Computes the frame layout for one function: scans every quadruple for
/// slot names to size the locals area, counts call-site argument counts
/// to size the outgoing-argument area, and applies spec.md §4.5's
/// `numGPRsToSave` thresholds.
pub fn compute(func: &IrFunction) -> StackFrameInfo {
    let is_leaf = func.calls.is_empty();
    let max_arity = func.calls.iter().map(|(_, arity)| *arity as i32).max().unwrap_or(0);
    let outgoing_slots = if is_leaf { 0 } else { MIN_OUTGOING_SLOTS.max(max_arity) };
    let outgoing_bytes = outgoing_slots * 4;

    let mut offsets = HashMap::new();
    let mut local_data = 0i32;
    let mut assign = |name: &Rc<str>, offsets: &mut HashMap<Rc<str>, i32>, local_data: &mut i32| {
        if is_slot(name) && !offsets.contains_key(name) {
            offsets.insert(name.clone(), outgoing_bytes + *local_data * 4);
            *local_data += 1;
        }
    };

    for quad in &func.quadruples {
        if let Some(a) = &quad.arg1 {
            assign(a, &mut offsets, &mut local_data);
        }
        if let Some(a) = &quad.arg2 {
            assign(a, &mut offsets, &mut local_data);
        }
        if let Some(r) = &quad.result {
            if !matches!(quad.op, Op::Label | Op::Goto | Op::IfTrueGoto | Op::IfFalseGoto) {
                assign(r, &mut offsets, &mut local_data);
            }
        }
    }

    let num_gprs_to_save = if func.name.as_ref() == "main" {
        0
    } else if local_data > 18 {
        8
    } else if local_data > 10 {
        local_data - 8
    } else {
        0
    };

    let saves_return_addr = !is_leaf;
    let ret_word = i32::from(saves_return_addr);
    let word_count = ret_word + local_data + num_gprs_to_save + outgoing_slots + num_gprs_to_save;
    let word_count = word_count + (word_count % 2);
    let frame_size = word_count * 4;

    let saved_area_start = outgoing_bytes + local_data * 4;
    let ra_offset = saves_return_addr.then_some(saved_area_start);
    let s_area_start = saved_area_start + ret_word * 4;
    let saved_s_offsets = (0..num_gprs_to_save).map(|i| s_area_start + i * 4).collect();

    StackFrameInfo {
        is_leaf,
        outgoing_slots,
        local_data,
        num_gprs_to_save,
        saves_return_addr,
        frame_size,
        offsets,
        ra_offset,
        saved_s_offsets,
    }
}

fn is_slot(name: &str) -> bool {
    !name.chars().next().map_or(false, |c| c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{IrFunction, Quadruple, Type};

    #[test]
    fn literals_never_get_a_slot() {
        let func = IrFunction {
            name: Rc::from("f"),
            return_type: Type::Int,
            params: vec![],
            quadruples: vec![Quadruple::new(crate::ir::Op::Return, Some(Rc::from("42")), None, None)],
            blocks: vec![],
            returned: true,
            calls: vec![],
        };
        let frame = compute(&func);
        assert!(frame.offsets.is_empty());
    }

    #[test]
    fn leaf_function_has_no_outgoing_slots_or_saved_ra() {
        let func = IrFunction {
            name: Rc::from("f"),
            return_type: Type::Int,
            params: vec![],
            quadruples: vec![Quadruple::assign("1", "_var_0")],
            blocks: vec![],
            returned: false,
            calls: vec![],
        };
        let frame = compute(&func);
        assert!(frame.is_leaf);
        assert_eq!(frame.outgoing_slots, 0);
        assert!(!frame.saves_return_addr);
        assert_eq!(frame.local_data, 1);
        // ret(0) + local(1) + save(0) + outgoing(0) + save(0) = 1, rounded to 2 words.
        assert_eq!(frame.frame_size, 8);
    }

    #[test]
    fn non_leaf_function_reserves_outgoing_slots_and_saves_ra() {
        let func = IrFunction {
            name: Rc::from("f"),
            return_type: Type::Int,
            params: vec![],
            quadruples: vec![Quadruple::assign("1", "_var_0")],
            blocks: vec![],
            returned: false,
            calls: vec![(Rc::from("g"), 2)],
        };
        let frame = compute(&func);
        assert!(!frame.is_leaf);
        assert_eq!(frame.outgoing_slots, 4);
        assert!(frame.saves_return_addr);
        // ret(1) + local(1) + save(0) + outgoing(4) + save(0) = 6, already even.
        assert_eq!(frame.frame_size, 24);
    }

    #[test]
    fn main_never_saves_gprs_even_with_many_locals() {
        let quads: Vec<Quadruple> = (0..20).map(|i| Quadruple::assign("1", format!("_var_{i}"))).collect();
        let func = IrFunction {
            name: Rc::from("main"),
            return_type: Type::Int,
            params: vec![],
            quadruples: quads,
            blocks: vec![],
            returned: false,
            calls: vec![],
        };
        let frame = compute(&func);
        assert_eq!(frame.num_gprs_to_save, 0);
    }

    #[test]
    fn many_locals_in_a_non_main_function_save_eight_gprs() {
        let quads: Vec<Quadruple> = (0..20).map(|i| Quadruple::assign("1", format!("_var_{i}"))).collect();
        let func = IrFunction {
            name: Rc::from("f"),
            return_type: Type::Int,
            params: vec![],
            quadruples: quads,
            blocks: vec![],
            returned: false,
            calls: vec![],
        };
        let frame = compute(&func);
        assert_eq!(frame.local_data, 20);
        assert_eq!(frame.num_gprs_to_save, 8);
    }
}
