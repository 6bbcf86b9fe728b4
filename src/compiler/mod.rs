/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Lowering from parsed AST into expression and constraint trees.
//!
//! Identifiers become [`Variable`]s. When a binding table supplies a value
//! for the name, it becomes the variable's default, so the data dictionary
//! can still override it at evaluation time.

mod builtins;
mod context;
mod expr;

use crate::CompileError;
use crate::ast::{self, BinOp, ExprKind, SliceArg, SourceSpan};
use crate::constraint::Constraint;
use crate::data::DataDict;
use crate::expr::{Expr, SliceItem, SliceSpec, UnaryOp, Variable};
use crate::parser::{parse_constraint_in_source, parse_expression_in_source};
use tracing::debug;

use self::context::LowerContext;

/// Named defaults available to compiled expressions (`xmax = 1.2`).
pub type Bindings = DataDict;

/// Compiles expression text into an [`Expr`].
pub fn compile_expression(source: &str, bindings: &Bindings) -> Result<Expr, CompileError> {
    compile_expression_in_source(source, "<inline>", bindings)
}

/// Compiles constraint text into a [`Constraint`].
pub fn compile_constraint(source: &str, bindings: &Bindings) -> Result<Constraint, CompileError> {
    compile_constraint_in_source(source, "<inline>", bindings)
}

pub(crate) fn compile_expression_in_source(
    source: &str,
    source_name: &str,
    bindings: &Bindings,
) -> Result<Expr, CompileError> {
    let ast = parse_expression_in_source(source, source_name)?;
    let ctx = LowerContext::new(source, source_name, bindings);
    let expr = ctx.lower_expr(&ast)?;
    debug!(source = source_name, expr = %expr, "compiled expression");
    Ok(expr)
}

pub(crate) fn compile_constraint_in_source(
    source: &str,
    source_name: &str,
    bindings: &Bindings,
) -> Result<Constraint, CompileError> {
    let def = parse_constraint_in_source(source, source_name)?;
    let ctx = LowerContext::new(source, source_name, bindings);
    let constraint = ctx.lower_constraint(&def)?;
    debug!(source = source_name, constraint = %constraint, "compiled constraint");
    Ok(constraint)
}
