//! Per-quadruple MIPS(-family "Minisys") emission (spec.md §4.5). Operands
//! are always re-read from their backing stack slot (never trusted to
//! still be fresh in a register across a branch), so [`RegisterFile`]'s job
//! is picking *which* register a variable prefers — for deterministic
//! output and to avoid needless register traffic — not caching validity.
//! Every load is followed by its two load-use delay-slot `nop`s; every
//! branch/jump by its one branch-delay `nop`. The frame is addressed
//! entirely as positive offsets from `$sp` (spec.md's `AddressDescriptor`
//! memory-location examples are `-4($sp)`/`name($0)`; there's no `$fp`
//! in this target's calling convention).

use super::descriptor::{RegisterFile, TEMP_REGS};
use super::error::CodegenError;
use super::frame::{self, StackFrameInfo};
use crate::ir::{IrFunction, IrProgram, Op, Quadruple};
use std::fmt::Write as _;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct CodegenOptions {
    pub peephole: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self { peephole: true }
    }
}

pub struct CodeGenerator {
    options: CodegenOptions,
}

impl CodeGenerator {
    pub fn new(options: &CodegenOptions) -> Self {
        Self { options: options.clone() }
    }

    pub fn generate(&self, program: &IrProgram) -> Result<String, CodegenError> {
        let mut out = String::new();
        out.push_str(".text\n");
        for func in &program.functions {
            self.emit_function(func, &mut out)?;
        }
        Ok(if self.options.peephole {
            super::peephole::run(&out)
        } else {
            out
        })
    }

    fn emit_function(&self, func: &IrFunction, out: &mut String) -> Result<(), CodegenError> {
        let frame = frame::compute(func);
        let mut regs = RegisterFile::new();
        let epilogue = format!("{}_epilogue", func.name);

        writeln!(out, "{}:", func.name).unwrap();
        writeln!(out, "    addiu $sp, $sp, -{}", frame.frame_size).unwrap();
        if let Some(ra_offset) = frame.ra_offset {
            writeln!(out, "    sw $ra, {ra_offset}($sp)").unwrap();
        }
        for (i, &offset) in frame.saved_s_offsets.iter().enumerate() {
            writeln!(out, "    sw $s{i}, {offset}($sp)").unwrap();
        }

        let mut pending_params: Vec<String> = Vec::new();
        for quad in &func.quadruples {
            self.emit_quad(quad, &frame, &mut regs, &epilogue, &mut pending_params, out)?;
        }

        writeln!(out, "{epilogue}:").unwrap();
        for (i, &offset) in frame.saved_s_offsets.iter().enumerate() {
            writeln!(out, "    lw $s{i}, {offset}($sp)").unwrap();
            writeln!(out, "    nop").unwrap();
            writeln!(out, "    nop").unwrap();
        }
        if let Some(ra_offset) = frame.ra_offset {
            writeln!(out, "    lw $ra, {ra_offset}($sp)").unwrap();
            writeln!(out, "    nop").unwrap();
            writeln!(out, "    nop").unwrap();
        }
        writeln!(out, "    addiu $sp, $sp, {}", frame.frame_size).unwrap();
        writeln!(out, "    jr $ra").unwrap();
        writeln!(out, "    nop").unwrap();
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_quad(
        &self,
        quad: &Quadruple,
        frame: &StackFrameInfo,
        regs: &mut RegisterFile,
        epilogue: &str,
        pending_params: &mut Vec<String>,
        out: &mut String,
    ) -> Result<(), CodegenError> {
        match quad.op {
            Op::Label => {
                writeln!(out, "{}:", require(&quad.result, "Label")?).unwrap();
            }
            Op::Goto => {
                writeln!(out, "    j {}", require(&quad.result, "Goto")?).unwrap();
                writeln!(out, "    nop").unwrap();
            }
            Op::IfTrueGoto | Op::IfFalseGoto => {
                let cond = materialize(require(&quad.arg1, "If*Goto")?, frame, regs, out)?;
                let target = require(&quad.result, "If*Goto")?;
                let mnemonic = if matches!(quad.op, Op::IfTrueGoto) { "bne" } else { "beq" };
                writeln!(out, "    {mnemonic} {cond}, $zero, {target}").unwrap();
                writeln!(out, "    nop").unwrap();
            }
            Op::Assign => {
                let src = require(&quad.arg1, "Assign")?;
                let dst = require(&quad.result, "Assign")?;
                let reg = materialize(src, frame, regs, out)?;
                store(dst, &reg, frame, regs, out)?;
            }
            Op::Add
            | Op::Sub
            | Op::Mul
            | Op::Div
            | Op::Mod
            | Op::Lt
            | Op::Le
            | Op::Gt
            | Op::Ge
            | Op::Eq
            | Op::Ne
            | Op::And
            | Op::Or
            | Op::BitAnd
            | Op::BitOr
            | Op::BitXor
            | Op::Shl
            | Op::Shr => {
                let arg1 = require(&quad.arg1, "binary op")?;
                let arg2 = require(&quad.arg2, "binary op")?;
                let result = require(&quad.result, "binary op")?;
                let r1 = materialize(arg1, frame, regs, out)?;
                let r2 = materialize(arg2, frame, regs, out)?;
                let (dst_idx, spill) = regs.allocate(&Rc::from(result.as_str()), frame)?;
                if let Some(spilled) = spill {
                    spill_store(&spilled, TEMP_REGS[dst_idx], frame, regs, out)?;
                }
                let dst = TEMP_REGS[dst_idx];
                emit_binary(quad.op, &r1, &r2, dst, out);
                store(result, dst, frame, regs, out)?;
            }
            Op::Neg | Op::Not | Op::BitNot => {
                let arg1 = require(&quad.arg1, "unary op")?;
                let result = require(&quad.result, "unary op")?;
                let r1 = materialize(arg1, frame, regs, out)?;
                let (dst_idx, spill) = regs.allocate(&Rc::from(result.as_str()), frame)?;
                if let Some(spilled) = spill {
                    spill_store(&spilled, TEMP_REGS[dst_idx], frame, regs, out)?;
                }
                let dst = TEMP_REGS[dst_idx];
                match quad.op {
                    Op::Neg => {
                        writeln!(out, "    sub {dst}, $zero, {r1}").unwrap();
                    }
                    Op::Not => {
                        writeln!(out, "    xori {dst}, {r1}, 1").unwrap();
                    }
                    Op::BitNot => {
                        writeln!(out, "    nor {dst}, {r1}, $zero").unwrap();
                    }
                    _ => unreachable!(),
                }
                store(result, dst, frame, regs, out)?;
            }
            Op::Deref => {
                let addr = require(&quad.arg1, "Deref")?;
                let result = require(&quad.result, "Deref")?;
                let addr_reg = materialize(addr, frame, regs, out)?;
                let (dst_idx, spill) = regs.allocate(&Rc::from(result.as_str()), frame)?;
                if let Some(spilled) = spill {
                    spill_store(&spilled, TEMP_REGS[dst_idx], frame, regs, out)?;
                }
                let dst = TEMP_REGS[dst_idx];
                writeln!(out, "    lw {dst}, 0({addr_reg})").unwrap();
                writeln!(out, "    nop").unwrap();
                writeln!(out, "    nop").unwrap();
                store(result, dst, frame, regs, out)?;
            }
            Op::Param => {
                let value = require(&quad.arg1, "Param")?;
                let reg = materialize(value, frame, regs, out)?;
                pending_params.push(reg);
            }
            Op::Call => {
                let name = require(&quad.arg1, "Call")?;
                for (i, reg) in pending_params.drain(..).enumerate() {
                    if i < 4 {
                        writeln!(out, "    move $a{i}, {reg}").unwrap();
                    } else {
                        writeln!(out, "    sw {reg}, {}($sp)", i * 4).unwrap();
                    }
                }
                writeln!(out, "    jal {name}").unwrap();
                writeln!(out, "    nop").unwrap();
                if let Some(result) = &quad.result {
                    store(result, "$v0", frame, regs, out)?;
                }
            }
            Op::Return => {
                if let Some(value) = &quad.arg1 {
                    let reg = materialize(value, frame, regs, out)?;
                    writeln!(out, "    move $v0, {reg}").unwrap();
                }
                writeln!(out, "    j {epilogue}").unwrap();
                writeln!(out, "    nop").unwrap();
            }
            Op::ArrayLoad => {
                let base = require(&quad.arg1, "ArrayLoad")?;
                let index = require(&quad.arg2, "ArrayLoad")?;
                let result = require(&quad.result, "ArrayLoad")?;
                let idx_reg = materialize(index, frame, regs, out)?;
                let (addr_idx, spill) = regs.allocate(&Rc::from(format!("{result}$addr").as_str()), frame)?;
                if let Some(spilled) = spill {
                    spill_store(&spilled, TEMP_REGS[addr_idx], frame, regs, out)?;
                }
                let addr = TEMP_REGS[addr_idx];
                writeln!(out, "    la {addr}, {base}").unwrap();
                writeln!(out, "    sll {idx_reg}, {idx_reg}, 2").unwrap();
                writeln!(out, "    add {addr}, {addr}, {idx_reg}").unwrap();
                writeln!(out, "    lw {addr}, 0({addr})").unwrap();
                writeln!(out, "    nop").unwrap();
                writeln!(out, "    nop").unwrap();
                store(result, addr, frame, regs, out)?;
            }
            Op::ArrayStore => {
                let base = require(&quad.arg1, "ArrayStore")?;
                let index = require(&quad.arg2, "ArrayStore")?;
                let value = require(&quad.result, "ArrayStore")?;
                let idx_reg = materialize(index, frame, regs, out)?;
                let val_reg = materialize(value, frame, regs, out)?;
                let (addr_idx, spill) = regs.allocate(&Rc::from(format!("{base}$addr").as_str()), frame)?;
                if let Some(spilled) = spill {
                    spill_store(&spilled, TEMP_REGS[addr_idx], frame, regs, out)?;
                }
                let addr = TEMP_REGS[addr_idx];
                writeln!(out, "    la {addr}, {base}").unwrap();
                writeln!(out, "    sll {idx_reg}, {idx_reg}, 2").unwrap();
                writeln!(out, "    add {addr}, {addr}, {idx_reg}").unwrap();
                writeln!(out, "    sw {val_reg}, 0({addr})").unwrap();
            }
            Op::Asm => {
                writeln!(out, "    {}", require(&quad.arg1, "Asm")?).unwrap();
            }
        }
        Ok(())
    }
}

fn require<'a>(slot: &'a Option<Rc<str>>, context: &str) -> Result<&'a Rc<str>, CodegenError> {
    slot.as_ref().ok_or_else(|| CodegenError::UnresolvedOperand(Rc::from(context)))
}

fn materialize(name: &str, frame: &StackFrameInfo, regs: &mut RegisterFile, out: &mut String) -> Result<String, CodegenError> {
    if let Some(n) = parse_int_literal(name) {
        emit_load_immediate(n, "$t8", out);
        return Ok("$t8".to_string());
    }
    let key: Rc<str> = Rc::from(name);
    let (idx, spill) = regs.allocate(&key, frame)?;
    if let Some(spilled) = spill {
        spill_store(&spilled, TEMP_REGS[idx], frame, regs, out)?;
    }
    let offset = frame.offset_of(name).ok_or_else(|| CodegenError::MissingSlot(key.clone()))?;
    writeln!(out, "    lw {}, {offset}($sp)", TEMP_REGS[idx]).unwrap();
    writeln!(out, "    nop").unwrap();
    writeln!(out, "    nop").unwrap();
    Ok(TEMP_REGS[idx].to_string())
}

/// Parses an `INT_CONST` token's raw text (decimal, `0x`-hex, or
/// leading-zero octal, per the lexer's three numeric rules) as a constant
/// operand. Returns `None` for anything that isn't a bare integer literal
/// (i.e. it's a slot name).
fn parse_int_literal(text: &str) -> Option<i64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok();
    }
    if text.len() > 1 && text.starts_with('0') && text.bytes().all(|b| b.is_ascii_digit()) {
        return i64::from_str_radix(&text[1..], 8).ok();
    }
    text.parse::<i64>().ok()
}

/// Materializes a constant into `reg`: a single `addiu` if it fits a
/// signed 16-bit immediate, else `lui`+`ori` of its high/low halves
/// (spec.md §4.5's `=const` rule — this target has no `li` pseudo-op).
fn emit_load_immediate(n: i64, reg: &str, out: &mut String) {
    if (-32768..=32767).contains(&n) {
        writeln!(out, "    addiu {reg}, $zero, {n}").unwrap();
    } else {
        let bits = n as u32;
        let hi = bits >> 16;
        let lo = bits & 0xffff;
        writeln!(out, "    lui {reg}, {hi}").unwrap();
        writeln!(out, "    ori {reg}, {reg}, {lo}").unwrap();
    }
}

fn store(name: &str, reg: &str, frame: &StackFrameInfo, regs: &mut RegisterFile, out: &mut String) -> Result<(), CodegenError> {
    let offset = frame.offset_of(name).ok_or_else(|| CodegenError::MissingSlot(Rc::from(name)))?;
    writeln!(out, "    sw {reg}, {offset}($sp)").unwrap();
    regs.mark_in_memory(&Rc::from(name));
    Ok(())
}

fn spill_store(name: &str, reg: &str, frame: &StackFrameInfo, regs: &mut RegisterFile, out: &mut String) -> Result<(), CodegenError> {
    if frame.offset_of(name).is_some() {
        store(name, reg, frame, regs, out)
    } else {
        // an internal scratch key ("<slot>$addr") that never had a stack
        // slot of its own: nothing to spill, the value was already transient.
        Ok(())
    }
}

/// Emits one binary quadruple's operation as the exact instruction
/// sequence spec.md §4.5 gives for it — this target has no `seq`/`sne`/
/// `sle`/`sge`/`sgt`/`mul`/single-result `div`/`rem` pseudo-ops, so
/// comparisons and multiply/divide are synthesized from `slt`/`sltu`/
/// `xori` and `mult`+`mflo`/`div`+`mflo`/`div`+`mfhi`.
fn emit_binary(op: Op, r1: &str, r2: &str, dst: &str, out: &mut String) {
    match op {
        Op::Add => {
            writeln!(out, "    add {dst}, {r1}, {r2}").unwrap();
        }
        Op::Sub => {
            writeln!(out, "    sub {dst}, {r1}, {r2}").unwrap();
        }
        Op::Mul => {
            writeln!(out, "    mult {r1}, {r2}").unwrap();
            writeln!(out, "    mflo {dst}").unwrap();
        }
        Op::Div => {
            writeln!(out, "    div {r1}, {r2}").unwrap();
            writeln!(out, "    mflo {dst}").unwrap();
        }
        Op::Mod => {
            writeln!(out, "    div {r1}, {r2}").unwrap();
            writeln!(out, "    mfhi {dst}").unwrap();
        }
        Op::And | Op::BitAnd => {
            writeln!(out, "    and {dst}, {r1}, {r2}").unwrap();
        }
        Op::Or | Op::BitOr => {
            writeln!(out, "    or {dst}, {r1}, {r2}").unwrap();
        }
        Op::BitXor => {
            writeln!(out, "    xor {dst}, {r1}, {r2}").unwrap();
        }
        Op::Shl => {
            writeln!(out, "    sllv {dst}, {r1}, {r2}").unwrap();
        }
        Op::Shr => {
            writeln!(out, "    srlv {dst}, {r1}, {r2}").unwrap();
        }
        Op::Lt => {
            writeln!(out, "    slt {dst}, {r1}, {r2}").unwrap();
        }
        Op::Gt => {
            writeln!(out, "    slt {dst}, {r2}, {r1}").unwrap();
        }
        Op::Le => {
            writeln!(out, "    slt {dst}, {r2}, {r1}").unwrap();
            writeln!(out, "    xori {dst}, {dst}, 1").unwrap();
        }
        Op::Ge => {
            writeln!(out, "    slt {dst}, {r1}, {r2}").unwrap();
            writeln!(out, "    xori {dst}, {dst}, 1").unwrap();
        }
        Op::Eq => {
            writeln!(out, "    sub {dst}, {r1}, {r2}").unwrap();
            writeln!(out, "    sltu {dst}, $zero, {dst}").unwrap();
            writeln!(out, "    xori {dst}, {dst}, 1").unwrap();
        }
        Op::Ne => {
            writeln!(out, "    sub {dst}, {r1}, {r2}").unwrap();
        }
        _ => unreachable!("emit_binary is only called for binary arithmetic/comparison ops"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Type;

    #[test]
    fn emits_prologue_and_epilogue() {
        let func = IrFunction {
            name: Rc::from("main"),
            return_type: Type::Int,
            params: vec![],
            quadruples: vec![Quadruple::new(Op::Return, Some(Rc::from("0")), None, None)],
            blocks: vec![],
            returned: true,
            calls: vec![],
        };
        let program = IrProgram { functions: vec![func] };
        let asm = CodeGenerator::new(&CodegenOptions::default()).generate(&program).unwrap();
        assert!(asm.contains("main:"));
        assert!(asm.contains("main_epilogue:"));
        assert!(asm.contains("jr $ra"));
    }

    #[test]
    fn binary_op_loads_both_operands_and_stores_result() {
        let func = IrFunction {
            name: Rc::from("f"),
            return_type: Type::Int,
            params: vec![],
            quadruples: vec![
                Quadruple::binary(Op::Add, "1", "2", "_var_0"),
                Quadruple::new(Op::Return, Some(Rc::from("_var_0")), None, None),
            ],
            blocks: vec![],
            returned: true,
            calls: vec![],
        };
        let program = IrProgram { functions: vec![func] };
        let asm = CodeGenerator::new(&CodegenOptions::default()).generate(&program).unwrap();
        assert!(asm.contains("addiu $t8, $zero, 1"));
        assert!(asm.contains("addiu $t8, $zero, 2"));
        assert!(asm.contains("add $t0"));
    }
}
