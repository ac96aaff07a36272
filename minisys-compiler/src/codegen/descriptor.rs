//! Register and address descriptors (Aho-Sethi-Ullman §8.6.3, spec.md
//! §4.5): track which temporary register (if any) currently holds each
//! variable's value, and implement the textbook `getreg` cost function for
//! picking a register to evict when none are free.

use super::error::CodegenError;
use super::frame::StackFrameInfo;
use std::collections::HashMap;
use std::rc::Rc;

pub const TEMP_REGS: &[&str] = &["$t0", "$t1", "$t2", "$t3", "$t4", "$t5", "$t6", "$t7"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDescriptor {
    /// Registers currently caching this variable's value (possibly more
    /// than one, possibly none if it only lives in memory).
    pub registers: Vec<usize>,
    pub in_memory: bool,
}

#[derive(Debug, Default)]
pub struct RegisterFile {
    /// `contents[r]` is the variable slot currently cached in `TEMP_REGS[r]`.
    contents: Vec<Option<Rc<str>>>,
    addresses: HashMap<Rc<str>, AddressDescriptor>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self {
            contents: vec![None; TEMP_REGS.len()],
            addresses: HashMap::new(),
        }
    }

    /// Picks a register to hold `var`'s value: a register already caching
    /// it, an empty register, or else the register whose occupant is
    /// cheapest to evict under the ASU `getreg` cost function — 0 if the
    /// occupant is already safely in memory, 1 if it still needs a store,
    /// and a fatal [`CodegenError::Unspillable`] if it's a compiler
    /// temporary with no backing stack slot at all. Our codegen always
    /// stores a result back to memory in the same quadruple that produces
    /// it (see `emit.rs`), so the textbook heuristic's other zero-cost
    /// case — the occupant is dead for the rest of the procedure — always
    /// coincides with "already in memory" here; we don't need a separate
    /// liveness pass to get the same answer.
    pub fn allocate(&mut self, var: &Rc<str>, frame: &StackFrameInfo) -> Result<(usize, Option<Rc<str>>), CodegenError> {
        if let Some(desc) = self.addresses.get(var) {
            if let Some(&r) = desc.registers.first() {
                return Ok((r, None));
            }
        }

        if let Some(r) = self.contents.iter().position(|c| c.is_none()) {
            self.bind(r, var);
            return Ok((r, None));
        }

        let mut best: Option<(usize, u8)> = None;
        for r in 0..self.contents.len() {
            let occupant = self.contents[r].as_ref().expect("every register is occupied at this point");
            let cost = self.eviction_cost(occupant, frame)?;
            if best.map_or(true, |(_, best_cost)| cost < best_cost) {
                best = Some((r, cost));
            }
        }
        let (r, cost) = best.expect("TEMP_REGS is never empty");
        let spilled = self.contents[r].clone();
        self.bind(r, var);
        Ok((r, if cost > 0 { spilled } else { None }))
    }

    fn eviction_cost(&self, occupant: &Rc<str>, frame: &StackFrameInfo) -> Result<u8, CodegenError> {
        if self.addresses.get(occupant).map_or(false, |d| d.in_memory) {
            return Ok(0);
        }
        if frame.offset_of(occupant).is_some() {
            return Ok(1);
        }
        Err(CodegenError::Unspillable(occupant.clone()))
    }

    fn bind(&mut self, reg: usize, var: &Rc<str>) {
        if let Some(old) = self.contents[reg].take() {
            if let Some(desc) = self.addresses.get_mut(&old) {
                desc.registers.retain(|&r| r != reg);
            }
        }
        self.contents[reg] = Some(var.clone());
        let desc = self.addresses.entry(var.clone()).or_insert(AddressDescriptor {
            registers: Vec::new(),
            in_memory: false,
        });
        if !desc.registers.contains(&reg) {
            desc.registers.push(reg);
        }
    }

    pub fn mark_in_memory(&mut self, var: &Rc<str>) {
        self.addresses
            .entry(var.clone())
            .or_insert(AddressDescriptor { registers: Vec::new(), in_memory: true })
            .in_memory = true;
    }

    pub fn release_all(&mut self) {
        self.contents.iter_mut().for_each(|c| *c = None);
        self.addresses.clear();
    }
}
