//! Move-elimination peephole pass (spec.md §4.5): when an instruction that
//! writes register `Y` is immediately followed by `move X, Y`, rewrite the
//! preceding instruction to write `X` directly and drop the `move`. A
//! degenerate `move X, X` is dropped outright. Idempotent: running it
//! twice yields the same output as running it once.

const WRITES_FIRST_OPERAND: &[&str] = &[
    "add", "addu", "addiu", "sub", "subu", "and", "andi", "or", "ori", "xor", "xori", "nor", "sllv", "srlv", "sll",
    "srl", "slt", "sltu", "slti", "lui", "lw", "mflo", "mfhi",
];

pub fn run(asm: &str) -> String {
    let lines: Vec<&str> = asm.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in &lines {
        if let Some((dst, src)) = move_operands(line) {
            if dst == src {
                continue;
            }
            if let Some(prev) = out.last_mut() {
                if let Some(prev_dst) = dest_register(prev) {
                    if prev_dst == src {
                        *prev = rewrite_dest(prev, &dst);
                        continue;
                    }
                }
            }
        }
        out.push((*line).to_string());
    }
    let mut result = out.join("\n");
    if asm.ends_with('\n') {
        result.push('\n');
    }
    result
}

fn move_operands(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix("move")?.trim_start();
    let (dst, src) = rest.split_once(',')?;
    Some((dst.trim().to_string(), src.trim().to_string()))
}

/// The register an instruction writes as its first operand, if it's one
/// of the mnemonics that write a destination register there.
fn dest_register(line: &str) -> Option<String> {
    let trimmed = line.trim();
    let (mnemonic, rest) = trimmed.split_once(' ')?;
    if !WRITES_FIRST_OPERAND.contains(&mnemonic) {
        return None;
    }
    let dst = rest.split(',').next()?.trim();
    Some(dst.to_string())
}

fn rewrite_dest(line: &str, new_dst: &str) -> String {
    let indent_len = line.len() - line.trim_start().len();
    let indent = &line[..indent_len];
    let trimmed = line.trim();
    let (mnemonic, rest) = trimmed.split_once(' ').expect("dest_register already matched this shape");
    let tail = rest.split_once(',').map_or("", |(_, tail)| tail);
    if tail.is_empty() {
        format!("{indent}{mnemonic} {new_dst}")
    } else {
        format!("{indent}{mnemonic} {new_dst},{tail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_destination_of_preceding_instruction_and_drops_the_move() {
        let asm = "    add $t0, $t1, $t2\n    move $t3, $t0\n    jr $ra\n";
        let result = run(asm);
        assert_eq!(result, "    add $t3, $t1, $t2\n    jr $ra\n");
    }

    #[test]
    fn drops_a_self_move_outright() {
        let asm = "    move $t0, $t0\n    jr $ra\n";
        assert_eq!(run(asm), "    jr $ra\n");
    }

    #[test]
    fn leaves_a_move_alone_when_the_preceding_instruction_writes_a_different_register() {
        let asm = "    add $t0, $t1, $t2\n    move $t3, $t4\n";
        assert_eq!(run(asm), asm);
    }

    #[test]
    fn is_idempotent() {
        let asm = "    add $t0, $t1, $t2\n    move $t3, $t0\n    lw $t5, 0($sp)\n    nop\n    nop\n    move $t6, $t5\n";
        let once = run(asm);
        let twice = run(&once);
        assert_eq!(once, twice);
    }
}
