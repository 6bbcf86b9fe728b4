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

//! Expression and subscript lowering.

use super::context::integer;
use super::*;
use crate::expr;

impl LowerContext<'_> {
    /// Recursively lowers an AST expression into an expression tree.
    pub(super) fn lower_expr(&self, node: &ast::Expr) -> Result<Expr, CompileError> {
        match &node.kind {
            ExprKind::Number(v) => Ok(Expr::constant(*v)),
            ExprKind::Ident(name) => Ok(self.resolve_variable(name).expr()),
            ExprKind::UnaryNeg(inner) => Ok(expr::neg(self.lower_expr(inner)?)),
            ExprKind::Binary { op, left, right } => {
                let left = self.lower_expr(left)?;
                let right = self.lower_expr(right)?;
                Ok(lower_binary(*op, left, right))
            }
            ExprKind::Call { name, args } => self.lower_call(name, args, &node.span),
            ExprKind::Slice { base, items } => {
                let base = self.lower_expr(base)?;
                let spec = self.lower_slice(items)?;
                Ok(expr::slice(base, spec))
            }
        }
    }

    /// Converts subscript items, checking that every bound is an integer
    /// and every step positive.
    fn lower_slice(&self, items: &[SliceArg]) -> Result<SliceSpec, CompileError> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let lowered = match item {
                SliceArg::Index { value, .. } => SliceItem::Index(self.slice_bound(*value, item)?),
                SliceArg::Range {
                    start, end, step, ..
                } => {
                    let start = start.map(|v| self.slice_bound(v, item)).transpose()?;
                    let end = end.map(|v| self.slice_bound(v, item)).transpose()?;
                    let step = step.map(|v| self.slice_bound(v, item)).transpose()?;
                    let step = step.unwrap_or(1);
                    if step <= 0 {
                        return Err(self.error_at(
                            format!("Slice step must be positive, found {step}"),
                            item.span(),
                        ));
                    }
                    SliceItem::range(start, end, step)
                }
            };
            out.push(lowered);
        }
        Ok(SliceSpec::new(out))
    }

    fn slice_bound(&self, value: f64, item: &SliceArg) -> Result<isize, CompileError> {
        integer(value)
            .and_then(|v| isize::try_from(v).ok())
            .ok_or_else(|| {
                self.error_at(
                    format!("Slice bounds must be integers, found {value}"),
                    item.span(),
                )
            })
    }
}

fn lower_binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    match op {
        BinOp::Add => expr::add(left, right),
        BinOp::Sub => expr::sub(left, right),
        BinOp::Mul => expr::mul(left, right),
        BinOp::Div => expr::div(left, right),
        BinOp::MatMul => expr::matmul(left, right),
        BinOp::Pow => expr::pow(left, right),
    }
}
