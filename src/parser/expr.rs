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

//! Expression parser.
//!
//! Precedence, loosest first: `+ -`, `* / @`, unary `-`, `**` (right
//! associative, binding tighter than a unary minus on its left), subscripts.

use crate::ast::{BinOp, Expr, ExprKind, SliceArg, SourceSpan, Span};
use nom::Parser;
use nom::{
    branch::alt,
    character::complete::char,
    combinator::{fail, not, opt},
    error::context,
    multi::{separated_list0, separated_list1},
    sequence::{delimited, preceded, terminated},
};

use super::PResult;
use super::utils::{identifier, number, ws, ws_char, ws_tag};

/// Top-level expression parser.
pub(super) fn expr(input: Span<'_>) -> PResult<'_, Expr> {
    parse_add_sub(input)
}

fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    let span = left.span.merge(&right.span);
    Expr {
        kind: ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    }
}

/// Parses left-associative `+`/`-`.
fn parse_add_sub(input: Span<'_>) -> PResult<'_, Expr> {
    let (mut input, mut left) = parse_mul_div(input)?;
    loop {
        let (next, op) = opt(alt((ws_char('+'), ws_char('-')))).parse(input)?;
        let Some(op_char) = op else {
            break;
        };

        // Left-associative fold: `a-b-c` becomes `(a-b)-c`.
        let (next, right) = parse_mul_div(next)?;
        let op = if op_char == '+' {
            BinOp::Add
        } else {
            BinOp::Sub
        };
        left = binary(op, left, right);
        input = next;
    }
    Ok((input, left))
}

/// Parses left-associative `*`, `/` and `@`.
fn parse_mul_div(input: Span<'_>) -> PResult<'_, Expr> {
    let (mut input, mut left) = parse_unary(input)?;
    loop {
        // A lone `*` is multiplication; `**` belongs to the power rule.
        let (next, op) = opt(alt((
            ws(terminated(char('*'), not(char('*')))),
            ws_char('/'),
            ws_char('@'),
        )))
        .parse(input)?;
        let Some(op_char) = op else {
            break;
        };

        let (next, right) = parse_unary(next)?;
        let op = match op_char {
            '*' => BinOp::Mul,
            '/' => BinOp::Div,
            _ => BinOp::MatMul,
        };
        left = binary(op, left, right);
        input = next;
    }
    Ok((input, left))
}

/// Parses unary negation.
fn parse_unary(input: Span<'_>) -> PResult<'_, Expr> {
    let start = input;
    // Unary operators are parsed recursively to support chains like `--x`.
    if let Ok((input, _)) = ws_char('-').parse(input) {
        let (input, inner) = parse_unary(input)?;
        let span = SourceSpan::from_bounds(start, input);
        return Ok((
            input,
            Expr {
                kind: ExprKind::UnaryNeg(Box::new(inner)),
                span,
            },
        ));
    }
    parse_power(input)
}

/// Parses `base ** exponent`; the exponent may itself be negated or a power.
fn parse_power(input: Span<'_>) -> PResult<'_, Expr> {
    let (input, base) = parse_postfix(input)?;
    let (input, exponent) = opt(preceded(ws_tag("**"), parse_unary)).parse(input)?;
    match exponent {
        Some(exponent) => Ok((input, binary(BinOp::Pow, base, exponent))),
        None => Ok((input, base)),
    }
}

/// Parses subscript chains (`x[1:]`, `x[:, 0][2]`).
fn parse_postfix(input: Span<'_>) -> PResult<'_, Expr> {
    let (mut input, mut expr) = parse_primary(input)?;
    loop {
        let (next, items) = opt(delimited(
            ws_char('['),
            separated_list1(ws_char(','), slice_arg),
            context("']'", ws_char(']')),
        ))
        .parse(input)?;
        let Some(items) = items else {
            break;
        };

        let mut span = expr.span.clone();
        span.end = next.location_offset();
        expr = Expr {
            kind: ExprKind::Slice {
                base: Box::new(expr),
                items,
            },
            span,
        };
        input = next;
    }
    Ok((input, expr))
}

/// Parses one slice item: `i`, `start:end`, `start:end:step` with optional
/// parts.
fn slice_arg(input: Span<'_>) -> PResult<'_, SliceArg> {
    let start = input;
    let (input, first) = opt(ws(number)).parse(input)?;
    let (input, colon) = opt(ws_char(':')).parse(input)?;
    if colon.is_none() {
        let Some(value) = first else {
            return context("slice item", fail::<_, SliceArg, _>).parse(input);
        };
        let span = SourceSpan::from_bounds(start, input);
        return Ok((input, SliceArg::Index { value, span }));
    }

    let (input, end) = opt(ws(number)).parse(input)?;
    let (input, step) = opt(preceded(ws_char(':'), opt(ws(number)))).parse(input)?;
    let span = SourceSpan::from_bounds(start, input);
    Ok((
        input,
        SliceArg::Range {
            start: first,
            end,
            step: step.flatten(),
            span,
        },
    ))
}

/// Parses expression atoms.
fn parse_primary(input: Span<'_>) -> PResult<'_, Expr> {
    context(
        "expression",
        alt((parse_parenthesized, parse_number, parse_ident_or_call)),
    )
    .parse(input)
}

/// Parses parenthesized expressions.
fn parse_parenthesized(input: Span<'_>) -> PResult<'_, Expr> {
    let start = input;
    let (input, inner) =
        delimited(ws_char('('), expr, context("')'", ws_char(')'))).parse(input)?;
    let mut inner = inner;
    // Preserve outer range for better diagnostics around parenthesized terms.
    inner.span = SourceSpan::from_bounds(start, input);
    Ok((input, inner))
}

/// Parses numeric literal expressions.
fn parse_number(input: Span<'_>) -> PResult<'_, Expr> {
    let start = input;
    let (input, n) = ws(number).parse(input)?;
    let span = SourceSpan::from_bounds(start, input);
    Ok((
        input,
        Expr {
            kind: ExprKind::Number(n),
            span,
        },
    ))
}

/// Parses either identifier or function call expression.
fn parse_ident_or_call(input: Span<'_>) -> PResult<'_, Expr> {
    let start = input;
    let (input, name) = ws(identifier).parse(input)?;
    let (input, args) = opt(delimited(
        ws_char('('),
        separated_list0(ws_char(','), expr),
        context("')'", ws_char(')')),
    ))
    .parse(input)?;

    let span = SourceSpan::from_bounds(start, input);
    // A name followed by `(...)` is parsed as call, otherwise identifier.
    let kind = if let Some(args) = args {
        ExprKind::Call { name, args }
    } else {
        ExprKind::Ident(name)
    };

    Ok((input, Expr { kind, span }))
}
