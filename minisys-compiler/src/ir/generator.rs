//! Walks a [`SyntaxTreeNode`], emitting [`Quadruple`]s and running the
//! checks spec.md §4.4 calls out. Declaration/use-before-init/void-misuse/
//! local-array checks happen inline as each node is visited; checks that
//! need whole-program information (call arity, unknown callees, `main`
//! recursion, missing `return`) are deferred to [`super::checks::run`]
//! once every function has been walked.

use super::block::{self, BasicBlock};
use super::checks;
use super::error::SemanticError;
use super::pool::TempPool;
use super::quad::{Op, Quadruple};
use super::scope::{ScopeStack, Symbol};
use crate::parser::SyntaxTreeNode;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Int,
    Void,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: Rc<str>,
    pub return_type: Type,
    pub param_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrFunction {
    pub name: Rc<str>,
    pub return_type: Type,
    pub params: Vec<Rc<str>>,
    pub quadruples: Vec<Quadruple>,
    pub blocks: Vec<BasicBlock>,
    pub returned: bool,
    /// Each callee's name paired with the number of arguments passed at
    /// that call site, so whole-program checks can compare it against the
    /// callee's own `params.len()` (spec.md §4.4's call-arity check).
    pub calls: Vec<(Rc<str>, usize)>,
}

pub const INTERRUPT_HANDLER_NAMES: [&str; 5] = [
    "interruptServer0",
    "interruptServer1",
    "interruptServer2",
    "interruptServer3",
    "interruptServer4",
];

fn is_interrupt_handler(name: &str) -> bool {
    INTERRUPT_HANDLER_NAMES.contains(&name)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IrProgram {
    pub functions: Vec<IrFunction>,
}

pub struct IrGenerator {
    scopes: ScopeStack,
    temps: TempPool,
    signatures: HashMap<Rc<str>, FunctionSignature>,
    quads: Vec<Quadruple>,
    returned: bool,
    calls: Vec<(Rc<str>, usize)>,
}

impl IrGenerator {
    pub fn new() -> Self {
        Self {
            scopes: ScopeStack::new(),
            temps: TempPool::new(),
            signatures: HashMap::new(),
            quads: Vec::new(),
            returned: false,
            calls: Vec::new(),
        }
    }

    pub fn generate(&mut self, tree: &SyntaxTreeNode) -> Result<IrProgram, SemanticError> {
        self.scopes.enter();
        let mut functions = Vec::new();
        for child in top_level_functions(tree) {
            functions.push(self.gen_function(child)?);
        }
        self.scopes.exit();

        checks::run(&functions)?;
        Ok(IrProgram { functions })
    }

    fn gen_function(&mut self, node: &SyntaxTreeNode) -> Result<IrFunction, SemanticError> {
        let children = node.children();
        let return_type = match leaf_literal(&children[0]).as_deref() {
            Some("void") => Type::Void,
            _ => Type::Int,
        };
        let name: Rc<str> = leaf_literal(&children[1]).unwrap_or_default().into();

        if self.signatures.contains_key(&name) {
            return Err(SemanticError::DuplicateDeclaration(name));
        }

        self.quads.clear();
        self.returned = false;
        self.calls.clear();
        self.scopes.enter();

        let params = match children.iter().find(|c| c.symbol() == "ParamList") {
            Some(list) => self.gen_params(list)?,
            None => Vec::new(),
        };

        if is_interrupt_handler(&name) && (return_type != Type::Void || !params.is_empty()) {
            return Err(SemanticError::InvalidInterruptHandler(name));
        }

        self.signatures.insert(
            name.clone(),
            FunctionSignature {
                name: name.clone(),
                return_type,
                param_count: params.len(),
            },
        );

        let body = children.last().expect("Func always has a body");
        self.gen_node(body)?;

        self.scopes.exit();

        let quads = std::mem::take(&mut self.quads);
        let blocks = block::partition(&quads);
        Ok(IrFunction {
            name,
            return_type,
            params,
            quadruples: quads,
            blocks,
            returned: self.returned,
            calls: std::mem::take(&mut self.calls),
        })
    }

    /// Declares each parameter in the function's just-entered scope and
    /// returns the fresh slot name generated for it, in declaration order
    /// (spec.md §4.4: parameters are ordinary local slots, the first four
    /// of which arrive in `$a0..$a3`).
    fn gen_params(&mut self, list: &SyntaxTreeNode) -> Result<Vec<Rc<str>>, SemanticError> {
        let mut slots = Vec::new();
        for param in list.children() {
            let children = param.children();
            let type_name = leaf_literal(&children[0]).unwrap_or_default();
            if type_name == "void" {
                return Err(SemanticError::VoidMisuse);
            }
            let name: Rc<str> = leaf_literal(&children[1]).unwrap_or_default().into();
            let is_array = children.len() > 2 && children[2].symbol() == "ArrayDims";
            let slot = self.temps.fresh_var();
            self.scopes
                .declare(Symbol {
                    name: name.clone(),
                    slot: slot.clone(),
                    is_array,
                    is_const: false,
                    initialized: true,
                })
                .map_err(SemanticError::DuplicateDeclaration)?;
            slots.push(slot);
        }
        Ok(slots)
    }

    /// Walks a statement/expression node for effect, emitting quadruples.
    /// Unrecognized node kinds fall back to walking their children, so a
    /// richer grammar's node labels degrade gracefully instead of panicking.
    fn gen_node(&mut self, node: &SyntaxTreeNode) -> Result<(), SemanticError> {
        match node.symbol() {
            "Block" => {
                self.scopes.enter();
                for child in node.children() {
                    self.gen_node(child)?;
                }
                self.scopes.exit();
                Ok(())
            }
            "StmtList" => {
                for child in node.children() {
                    self.gen_node(child)?;
                }
                Ok(())
            }
            "Stmt" | "Return" => {
                let expr = node.children().iter().find(|c| is_expression(c));
                let value = match expr {
                    Some(e) => Some(self.gen_expr(e)?),
                    None => None,
                };
                self.quads.push(Quadruple::new(Op::Return, value, None, None));
                self.returned = true;
                Ok(())
            }
            "Decl" => self.gen_decl(node, false),
            "ConstDecl" => self.gen_decl(node, true),
            "Assign" => {
                let target = &node.children()[0];
                if target.symbol() == "ArrayAccess" {
                    return self.gen_array_store(target, &node.children()[1]);
                }
                let name = leaf_literal(target).unwrap_or_default();
                let symbol = self.scopes.resolve(&name).cloned();
                let Some(symbol) = symbol else {
                    return Err(SemanticError::UseBeforeInit(Rc::from(name.as_str())));
                };
                let rhs = self.gen_expr(&node.children()[1])?;
                self.quads.push(Quadruple::assign(rhs, symbol.slot.clone()));
                if let Some(sym) = self.scopes.resolve_mut(&name) {
                    sym.initialized = true;
                }
                Ok(())
            }
            "If" => self.gen_if(node),
            "While" => self.gen_while(node),
            "Break" | "Continue" => Ok(()),
            "AsmBlock" => {
                let lines: Vec<&SyntaxTreeNode> = node.children().iter().collect();
                if lines.is_empty() {
                    return Err(SemanticError::AsmMisuse);
                }
                for line in lines {
                    if let Some(text) = leaf_literal(line) {
                        self.quads.push(Quadruple::new(Op::Asm, Some(Rc::from(text.as_str())), None, None));
                    }
                }
                Ok(())
            }
            "Call" => {
                self.gen_expr(node)?;
                Ok(())
            }
            _ => {
                for child in node.children() {
                    self.gen_node(child)?;
                }
                Ok(())
            }
        }
    }

    /// Lowers `a[i] = expr;` to `Op::ArrayStore` (spec.md §8 testable
    /// scenario 3), mirroring `ArrayAccess`'s read side.
    fn gen_array_store(&mut self, target: &SyntaxTreeNode, value_node: &SyntaxTreeNode) -> Result<(), SemanticError> {
        let children = target.children();
        let name = leaf_literal(&children[0]).unwrap_or_default();
        let symbol = self
            .scopes
            .resolve(&name)
            .cloned()
            .ok_or_else(|| SemanticError::UseBeforeInit(Rc::from(name.as_str())))?;
        let index = self.gen_expr(&children[1])?;
        let value = self.gen_expr(value_node)?;
        self.quads
            .push(Quadruple::new(Op::ArrayStore, Some(symbol.slot), Some(index), Some(value)));
        Ok(())
    }

    fn gen_decl(&mut self, node: &SyntaxTreeNode, is_const: bool) -> Result<(), SemanticError> {
        let children = node.children();
        let type_name = leaf_literal(&children[0]).unwrap_or_default();
        if type_name == "void" {
            return Err(SemanticError::VoidMisuse);
        }
        let name: Rc<str> = leaf_literal(&children[1]).unwrap_or_default().into();
        let is_array = children.len() > 2 && children[2].symbol() == "ArrayDims";
        if is_array && !self.scopes.is_global() {
            return Err(SemanticError::LocalArrayRejected(name));
        }

        let slot = self.temps.fresh_var();
        self.scopes
            .declare(Symbol {
                name: name.clone(),
                slot: slot.clone(),
                is_array,
                is_const,
                initialized: false,
            })
            .map_err(SemanticError::DuplicateDeclaration)?;

        if let Some(init) = children.iter().find(|c| is_expression(c)) {
            let value = self.gen_expr(init)?;
            self.quads.push(Quadruple::assign(value, slot.clone()));
            if let Some(sym) = self.scopes.resolve_mut(&name) {
                sym.initialized = true;
            }
        }
        Ok(())
    }

    fn gen_if(&mut self, node: &SyntaxTreeNode) -> Result<(), SemanticError> {
        let children = node.children();
        let cond = self.gen_expr(&children[0])?;
        let else_label = self.temps.fresh_label();
        let end_label = self.temps.fresh_label();
        self.quads.push(Quadruple::if_false_goto(cond, else_label.clone()));
        self.gen_node(&children[1])?;
        self.quads.push(Quadruple::goto(end_label.clone()));
        self.quads.push(Quadruple::label(else_label));
        if let Some(else_branch) = children.get(2) {
            self.gen_node(else_branch)?;
        }
        self.quads.push(Quadruple::label(end_label));
        Ok(())
    }

    fn gen_while(&mut self, node: &SyntaxTreeNode) -> Result<(), SemanticError> {
        let children = node.children();
        let start_label = self.temps.fresh_label();
        let end_label = self.temps.fresh_label();
        self.quads.push(Quadruple::label(start_label.clone()));
        let cond = self.gen_expr(&children[0])?;
        self.quads.push(Quadruple::if_false_goto(cond, end_label.clone()));
        self.gen_node(&children[1])?;
        self.quads.push(Quadruple::goto(start_label));
        self.quads.push(Quadruple::label(end_label));
        Ok(())
    }

    /// Evaluates an expression node, returning the name (literal or slot)
    /// holding its value.
    fn gen_expr(&mut self, node: &SyntaxTreeNode) -> Result<Rc<str>, SemanticError> {
        match node.symbol() {
            "INT_CONST" => Ok(leaf_literal(node).unwrap_or_default().into()),
            "IDENT" => {
                let name = leaf_literal(node).unwrap_or_default();
                let symbol = self
                    .scopes
                    .resolve(&name)
                    .ok_or_else(|| SemanticError::UseBeforeInit(Rc::from(name.as_str())))?;
                if !symbol.initialized {
                    return Err(SemanticError::UseBeforeInit(symbol.name.clone()));
                }
                Ok(symbol.slot.clone())
            }
            "Expr" if node.children().len() == 1 => self.gen_expr(&node.children()[0]),
            "BinOp" => {
                let children = node.children();
                let lhs = self.gen_expr(&children[0])?;
                let op_name = leaf_literal(&children[1]).unwrap_or_default();
                let rhs = self.gen_expr(&children[2])?;
                let op = binop_for(&op_name);
                let dst = self.temps.fresh_var();
                self.quads.push(Quadruple::binary(op, lhs, rhs, dst.clone()));
                Ok(dst)
            }
            "Call" => {
                let children = node.children();
                let name = leaf_literal(&children[0]).unwrap_or_default();
                let args = &children[1..];
                self.calls.push((Rc::from(name.as_str()), args.len()));
                for arg in args {
                    let value = self.gen_expr(arg)?;
                    self.quads.push(Quadruple::new(Op::Param, Some(value), None, None));
                }
                let dst = self.temps.fresh_var();
                self.quads.push(Quadruple::new(Op::Call, Some(Rc::from(name.as_str())), None, Some(dst.clone())));
                Ok(dst)
            }
            "ArrayAccess" => {
                let children = node.children();
                let base = self.gen_expr(&children[0])?;
                let index = self.gen_expr(&children[1])?;
                let dst = self.temps.fresh_var();
                self.quads.push(Quadruple::new(Op::ArrayLoad, Some(base), Some(index), Some(dst.clone())));
                Ok(dst)
            }
            "UnaryOp" => {
                let children = node.children();
                let op_name = leaf_literal(&children[0]).unwrap_or_default();
                let operand = self.gen_expr(&children[1])?;
                match op_name.as_str() {
                    "+" | "PLUS" => Ok(operand),
                    op => {
                        let dst = self.temps.fresh_var();
                        self.quads.push(Quadruple::new(unary_op_for(op), Some(operand), None, Some(dst.clone())));
                        Ok(dst)
                    }
                }
            }
            _ => {
                // Fallback for any expression-shaped node made of exactly one
                // meaningful child (parenthesization wrappers, etc.)
                if let Some(only) = node.children().first() {
                    self.gen_expr(only)
                } else {
                    Ok(Rc::from("0"))
                }
            }
        }
    }
}

impl Default for IrGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn binop_for(symbol: &str) -> Op {
    match symbol {
        "+" | "PLUS" => Op::Add,
        "-" | "MINUS" => Op::Sub,
        "*" | "STAR" => Op::Mul,
        "/" | "SLASH" => Op::Div,
        "%" | "PERCENT" => Op::Mod,
        "<" | "LT" => Op::Lt,
        "<=" | "LE" => Op::Le,
        ">" | "GT" => Op::Gt,
        ">=" | "GE" => Op::Ge,
        "==" | "EQ" => Op::Eq,
        "!=" | "NE" => Op::Ne,
        "&&" | "AND" => Op::And,
        "||" | "OR" => Op::Or,
        "&" | "BITAND_OP" => Op::BitAnd,
        "|" | "BITOR_OP" => Op::BitOr,
        "^" | "BITXOR_OP" => Op::BitXor,
        "<<" | "LEFT_OP" => Op::Shl,
        ">>" | "RIGHT_OP" => Op::Shr,
        _ => Op::Add,
    }
}

/// Maps a unary operator's token text to its quadruple op (spec.md §4.4).
fn unary_op_for(symbol: &str) -> Op {
    match symbol {
        "!" | "NOT" => Op::Not,
        "~" | "BITINV_OP" => Op::BitNot,
        "$" | "DOLLAR" => Op::Deref,
        "-" | "MINUS" | _ => Op::Neg,
    }
}

fn is_expression(node: &SyntaxTreeNode) -> bool {
    matches!(
        node.symbol(),
        "Expr" | "INT_CONST" | "IDENT" | "BinOp" | "UnaryOp" | "Call" | "ArrayAccess"
    )
}

fn leaf_literal(node: &SyntaxTreeNode) -> Option<String> {
    node.as_leaf().map(|t| t.literal.to_string())
}

/// `Program -> Func` in the bootstrap grammar wraps exactly one function;
/// a full translation-unit grammar instead produces a list of `Func`
/// children directly under `Program`. Accept both shapes.
fn top_level_functions(tree: &SyntaxTreeNode) -> Vec<&SyntaxTreeNode> {
    tree.children().iter().filter(|c| c.symbol() == "Func").collect()
}
