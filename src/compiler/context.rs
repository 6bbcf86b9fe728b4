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

//! Lowering context for one source string.

use super::*;

/// Lowering context for one compilation unit.
///
/// Holds the source text for diagnostics and the binding table used to
/// resolve identifier defaults.
pub(super) struct LowerContext<'a> {
    source: &'a str,
    source_name: &'a str,
    bindings: &'a Bindings,
}

impl<'a> LowerContext<'a> {
    pub(super) fn new(source: &'a str, source_name: &'a str, bindings: &'a Bindings) -> Self {
        Self {
            source,
            source_name,
            bindings,
        }
    }

    /// Creates a source-mapped compile error.
    pub(super) fn error_at(&self, message: impl Into<String>, span: &SourceSpan) -> CompileError {
        CompileError::from_span_in_source(message, self.source_name, self.source, span)
    }

    /// Resolves an identifier to a variable, attaching a bound default.
    pub(super) fn resolve_variable(&self, name: &str) -> Variable {
        match self.bindings.get(name) {
            Some(value) => Variable::with_value(name, value),
            None => Variable::new(name),
        }
    }

    /// Lowers a parsed constraint, applying its penalty power.
    pub(super) fn lower_constraint(
        &self,
        def: &ast::ConstraintDef,
    ) -> Result<Constraint, CompileError> {
        let lhs = self.lower_expr(&def.lhs)?;
        let rhs = self.lower_expr(&def.rhs)?;
        let constraint = Constraint::new(def.comparator, lhs, rhs);
        let Some(power) = &def.power else {
            return Ok(constraint);
        };
        let Some(k) = integer(power.value).and_then(|k| i32::try_from(k).ok()) else {
            return Err(self.error_at(
                format!("Penalty power must be an integer, found {}", power.value),
                &power.span,
            ));
        };
        Ok(constraint.penalty(k))
    }
}

/// Returns `value` as an integer when it has no fractional part.
pub(super) fn integer(value: f64) -> Option<i64> {
    let in_range = value.is_finite() && value.abs() <= i64::MAX as f64;
    (in_range && value.fract() == 0.0).then_some(value as i64)
}
