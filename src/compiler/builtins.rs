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

//! Lowering for builtin expression functions.

use super::*;

impl LowerContext<'_> {
    /// Lowers builtin function calls.
    ///
    /// Every builtin takes exactly one tensor argument and maps to a
    /// [`UnaryOp`]: `abs relu exp ln sin cos tanh sqrt transpose`.
    pub(super) fn lower_call(
        &self,
        name: &str,
        args: &[ast::Expr],
        span: &SourceSpan,
    ) -> Result<Expr, CompileError> {
        let Some(op) = UnaryOp::from_function_name(name) else {
            return Err(self.error_at(format!("Unknown function '{name}'"), span));
        };
        let [arg] = args else {
            return Err(self.error_at(
                format!("{name} expects 1 argument, found {}", args.len()),
                span,
            ));
        };
        let operand = self.lower_expr(arg)?;
        Ok(crate::expr::apply(op, operand))
    }
}
