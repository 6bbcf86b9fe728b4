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

//! Constraint parser (`lhs <= rhs`, `(lhs == rhs)^2`).

use crate::ast::{ConstraintDef, PowerArg, SourceSpan, Span};
use crate::constraint::Comparator;
use nom::Parser;
use nom::{
    branch::alt,
    combinator::{map, opt},
    error::context,
    sequence::{delimited, preceded},
};

use super::PResult;
use super::expr::expr;
use super::utils::{number, ws, ws_char, ws_tag};

/// Parses a comparison with an optional trailing penalty power.
pub(super) fn constraint(input: Span<'_>) -> PResult<'_, ConstraintDef> {
    let start = input;
    let (input, mut def) = alt((parenthesized, comparison)).parse(input)?;
    let (input, power) = opt(preceded(ws_char('^'), power_arg)).parse(input)?;
    if let Some(power) = power {
        // The outermost power wins: `((a < b)^2)^3` penalizes with 3.
        def.power = Some(power);
        def.span = SourceSpan::from_bounds(start, input);
    }
    Ok((input, def))
}

fn parenthesized(input: Span<'_>) -> PResult<'_, ConstraintDef> {
    let start = input;
    let (input, mut def) = delimited(ws_char('('), constraint, ws_char(')')).parse(input)?;
    def.span = SourceSpan::from_bounds(start, input);
    Ok((input, def))
}

fn comparison(input: Span<'_>) -> PResult<'_, ConstraintDef> {
    let start = input;
    let (input, lhs) = expr(input)?;
    let (input, comparator) = context("comparison operator", comparator).parse(input)?;
    let (input, rhs) = expr(input)?;
    let span = SourceSpan::from_bounds(start, input);
    Ok((
        input,
        ConstraintDef {
            comparator,
            lhs,
            rhs,
            power: None,
            span,
        },
    ))
}

/// Parses one comparison token; two-character forms are tried first.
fn comparator(input: Span<'_>) -> PResult<'_, Comparator> {
    alt((
        map(ws_tag("=="), |_| Comparator::Eq),
        map(ws_tag("<="), |_| Comparator::Le),
        map(ws_tag(">="), |_| Comparator::Ge),
        map(ws_char('<'), |_| Comparator::Lt),
        map(ws_char('>'), |_| Comparator::Gt),
    ))
    .parse(input)
}

fn power_arg(input: Span<'_>) -> PResult<'_, PowerArg> {
    let start = input;
    let (input, value) = context("penalty power", ws(number)).parse(input)?;
    let span = SourceSpan::from_bounds(start, input);
    Ok((input, PowerArg { value, span }))
}
