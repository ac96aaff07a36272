//! Interrupt vector/handler emitter (spec.md §1, §6): a post-pass over
//! already-emitted assembly, not a codegen feature. The core treats
//! `interruptServer0..4` as ordinary functions; this module locates their
//! emitted blocks by label and rewraps them with the push/pop preamble and
//! `eret` trailer an interrupt handler needs instead of an ordinary
//! function's stack-frame prologue/epilogue.

use minisys_compiler::ir::IrProgram;

const INTERRUPT_NAMES: [&str; 5] = [
    "interruptServer0",
    "interruptServer1",
    "interruptServer2",
    "interruptServer3",
    "interruptServer4",
];

pub struct InterruptUnit {
    pub entry: String,
    pub handler: String,
}

/// Builds the vector table and handler files for whichever `interruptServer0..4`
/// functions are present, or `None` if there aren't any.
pub fn build(ir: &IrProgram, assembly: &str) -> Option<InterruptUnit> {
    let present: Vec<&str> = INTERRUPT_NAMES
        .iter()
        .copied()
        .filter(|name| ir.functions.iter().any(|f| f.name.as_ref() == *name))
        .collect();
    if present.is_empty() {
        return None;
    }

    let mut entry = String::new();
    for name in &present {
        entry.push_str(&format!("    j {name}\n    nop\n"));
    }

    let mut handler = String::new();
    for name in &present {
        handler.push_str(&wrap_handler(name, assembly));
    }

    Some(InterruptUnit { entry, handler })
}

fn wrap_handler(name: &str, assembly: &str) -> String {
    let body = function_body(name, assembly).unwrap_or_default();
    let used = used_registers(&body);
    let frame = used.len() as i32 * 4;

    let mut out = String::new();
    out.push_str(&format!("{name}:\n"));
    if frame > 0 {
        out.push_str(&format!("    addiu $sp, $sp, -{frame}\n"));
        for (i, reg) in used.iter().enumerate() {
            out.push_str(&format!("    sw {reg}, {}($sp)\n", i * 4));
        }
    }
    out.push_str(&body);
    if frame > 0 {
        for (i, reg) in used.iter().enumerate() {
            out.push_str(&format!("    lw {reg}, {}($sp)\n", i * 4));
        }
        out.push_str("    nop\n");
        out.push_str(&format!("    addiu $sp, $sp, {frame}\n"));
    }
    out.push_str("    eret\n    nop\n");
    out
}

/// Pulls the straight-line body out of a previously-emitted function
/// block: everything after its stack-frame prologue (`addiu $sp, $sp,
/// -N` followed by the `sw $ra,`/`sw $s.,` save lines the frame needs)
/// up to its own `<name>_epilogue:` label, dropping the general-purpose-
/// function prologue/epilogue this post-pass replaces.
fn function_body(name: &str, assembly: &str) -> Option<String> {
    let start_label = format!("{name}:");
    let epilogue_label = format!("{name}_epilogue:");
    let start = assembly.find(&start_label)?;
    let after_start = &assembly[start..];

    let mut body_start_rel = 0;
    let mut lines = after_start.split_inclusive('\n');
    let header = lines.next()?;
    body_start_rel += header.len();
    for line in lines {
        let trimmed = line.trim_start();
        if trimmed.starts_with("addiu $sp, $sp, -") || trimmed.starts_with("sw $ra,") || trimmed.starts_with("sw $s") {
            body_start_rel += line.len();
        } else {
            break;
        }
    }

    let body_start = start + body_start_rel;
    let epilogue_rel = assembly[body_start..].find(&epilogue_label)?;
    Some(assembly[body_start..body_start + epilogue_rel].to_string())
}

fn used_registers(body: &str) -> Vec<String> {
    let mut found = Vec::new();
    for token in body.split(|c: char| !c.is_alphanumeric() && c != '$') {
        let is_temp_or_saved = (token.starts_with("$s") || token.starts_with("$t"))
            && token.len() > 2
            && token[2..].chars().all(|c| c.is_ascii_digit());
        if is_temp_or_saved && !found.contains(&token.to_string()) {
            found.push(token.to_string());
        }
    }
    found.sort();
    found.push("$ra".to_string());
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use minisys_compiler::ir::{IrFunction, Op, Quadruple, Type};
    use std::rc::Rc;

    fn sample_ir() -> IrProgram {
        IrProgram {
            functions: vec![IrFunction {
                name: Rc::from("interruptServer0"),
                return_type: Type::Void,
                params: vec![],
                quadruples: vec![Quadruple::new(Op::Asm, Some(Rc::from("mfc0 $k0,$13")), None, None)],
                blocks: vec![],
                returned: true,
                calls: vec![],
            }],
        }
    }

    #[test]
    fn no_interrupt_functions_means_no_unit() {
        let ir = IrProgram { functions: vec![] };
        assert!(build(&ir, "").is_none());
    }

    #[test]
    fn entry_file_jumps_to_each_present_handler() {
        let ir = sample_ir();
        let asm = "interruptServer0:\n    addiu $sp, $sp, -8\n    mfc0 $k0,$13\ninterruptServer0_epilogue:\n    addiu $sp, $sp, 8\n    jr $ra\n    nop\n";
        let unit = build(&ir, asm).unwrap();
        assert!(unit.entry.contains("j interruptServer0"));
        assert!(unit.handler.contains("mfc0 $k0,$13"));
        assert!(unit.handler.contains("eret"));
        assert!(!unit.handler.contains("jr $ra"));
    }
}
