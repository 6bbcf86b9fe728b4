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

//! `nom` parser for the expression and constraint syntax.
//!
//! Expressions support:
//! - numeric literals and identifiers
//! - unary negation
//! - binary `+ - * / @` and right-associative `**`
//! - builtin calls (`relu(x)`, `abs(x - y)`)
//! - subscripts (`x[1:]`, `x[:, 0]`, `x[::2]`)
//!
//! Constraints compare two expressions with `== < <= > >=` and may carry a
//! penalty power (`(x <= 1)^2`).

mod constraint;
mod expr;
mod utils;

use crate::ast::{ConstraintDef, Expr, SourceSpan, Span};
use crate::diagnostics::CompileError;
use nom::{
    IResult,
    combinator::all_consuming,
    error::{VerboseError, VerboseErrorKind},
    sequence::delimited,
};

use self::utils::ws0;

type PResult<'a, O> = IResult<Span<'a>, O, VerboseError<Span<'a>>>;

/// Parses a standalone expression into a spanned AST.
pub fn parse_expression(source: &str) -> Result<Expr, CompileError> {
    parse_expression_in_source(source, "<inline>")
}

/// Parses a standalone constraint into a spanned AST.
pub fn parse_constraint(source: &str) -> Result<ConstraintDef, CompileError> {
    parse_constraint_in_source(source, "<inline>")
}

/// Parses an expression while tagging diagnostics with a source label.
pub(crate) fn parse_expression_in_source(
    source: &str,
    source_name: &str,
) -> Result<Expr, CompileError> {
    let input = Span::new(source);
    // `all_consuming` ensures trailing garbage is treated as syntax error.
    match all_consuming(delimited(ws0, expr::expr, ws0))(input) {
        Ok((_, expr)) => Ok(expr),
        Err(err) => Err(parse_error_to_compile_error(err, source_name, source)),
    }
}

/// Parses a constraint while tagging diagnostics with a source label.
pub(crate) fn parse_constraint_in_source(
    source: &str,
    source_name: &str,
) -> Result<ConstraintDef, CompileError> {
    let input = Span::new(source);
    match all_consuming(delimited(ws0, constraint::constraint, ws0))(input) {
        Ok((_, def)) => Ok(def),
        Err(err) => Err(parse_error_to_compile_error(err, source_name, source)),
    }
}

/// Converts a `nom` verbose error to crate-level compile diagnostics.
fn parse_error_to_compile_error(
    err: nom::Err<VerboseError<Span<'_>>>,
    source_name: &str,
    source: &str,
) -> CompileError {
    match err {
        nom::Err::Incomplete(_) => CompileError::message_in_file("Incomplete input", source_name),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            // Anchor on the error that got furthest into the input; on ties the
            // outermost context wins since it is recorded last.
            let deepest = e
                .errors
                .iter()
                .max_by_key(|(span, _)| span.location_offset());
            if let Some((span, kind)) = deepest {
                let span = SourceSpan::from_bounds(*span, *span);
                let detail = match kind {
                    VerboseErrorKind::Context(ctx) => format!("Syntax error: expected {ctx}"),
                    VerboseErrorKind::Char(c) => format!("Syntax error: expected '{c}'"),
                    VerboseErrorKind::Nom(kind) => format!("Syntax error near {kind:?}"),
                };
                CompileError::from_span_in_source(detail, source_name, source, &span)
            } else {
                CompileError::message_in_file("Syntax error", source_name)
            }
        }
    }
}
