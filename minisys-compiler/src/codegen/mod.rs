//! # CodeGen
//!
//! Translates an [`crate::ir::IrProgram`] into Minisys assembly text
//! (spec.md §4.5): [`frame`] lays out each function's stack frame,
//! [`descriptor`] tracks which temporary register holds which variable,
//! [`emit`] walks each quadruple and emits the corresponding instructions
//! (with delay-slot `nop`s), and [`peephole`] runs a move-elimination pass
//! over the result.

mod descriptor;
mod emit;
mod error;
mod frame;
mod peephole;

pub use emit::{CodeGenerator, CodegenOptions};
pub use error::CodegenError;
