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

//! AST definitions for the expression/constraint syntax with source spans.
//!
//! The parser creates this AST first. A later lowering phase resolves
//! builtins and bindings and converts it to [`crate::Expr`] trees.

use crate::constraint::Comparator;
use nom_locate::LocatedSpan;

/// Parser input span type carrying byte offsets and line/column info.
pub type Span<'a> = LocatedSpan<&'a str>;

/// Source range and anchor position for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based UTF-8 column.
    pub column: usize,
}

impl SourceSpan {
    /// Creates a source span from parser start/end positions.
    pub fn from_bounds(start: Span<'_>, end: Span<'_>) -> Self {
        Self {
            start: start.location_offset(),
            end: end.location_offset(),
            line: start.location_line() as usize,
            column: start.get_utf8_column(),
        }
    }

    /// Returns span length in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a span that starts at `self` and ends at `other`.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            start: self.start,
            end: other.end,
            line: self.line,
            column: self.column,
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// Addition (`+`).
    Add,
    /// Subtraction (`-`).
    Sub,
    /// Elementwise multiplication (`*`).
    Mul,
    /// Elementwise division (`/`).
    Div,
    /// Matrix product (`@`).
    MatMul,
    /// Elementwise power (`**`).
    Pow,
}

/// One slice component as written. Bounds stay numeric until lowering so
/// non-integer values can be reported with their location.
#[derive(Debug, Clone, PartialEq)]
pub enum SliceArg {
    /// `x[i]`
    Index { value: f64, span: SourceSpan },
    /// `x[start:end:step]`, every part optional.
    Range {
        start: Option<f64>,
        end: Option<f64>,
        step: Option<f64>,
        span: SourceSpan,
    },
}

impl SliceArg {
    pub fn span(&self) -> &SourceSpan {
        match self {
            SliceArg::Index { span, .. } | SliceArg::Range { span, .. } => span,
        }
    }
}

/// Expression node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Numeric literal.
    Number(f64),
    /// Identifier reference (a data dictionary key).
    Ident(String),
    /// Unary negation.
    UnaryNeg(Box<Expr>),
    /// Binary operation.
    Binary {
        /// Operator kind.
        op: BinOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Builtin function call.
    Call {
        /// Function name.
        name: String,
        /// Call arguments.
        args: Vec<Expr>,
    },
    /// Subscript (`x[1:]`, `x[:, 0]`).
    Slice {
        /// Sliced expression.
        base: Box<Expr>,
        /// Per-axis items.
        items: Vec<SliceArg>,
    },
}

/// Spanned expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// Expression payload.
    pub kind: ExprKind,
    /// Source location for diagnostics.
    pub span: SourceSpan,
}

/// Penalty exponent attached with `^`.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerArg {
    pub value: f64,
    pub span: SourceSpan,
}

/// Parsed constraint (`lhs <= rhs`, `(lhs == rhs)^2`).
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDef {
    /// Relation between both sides.
    pub comparator: Comparator,
    /// Left-hand expression.
    pub lhs: Expr,
    /// Right-hand expression.
    pub rhs: Expr,
    /// Outermost penalty exponent, if any.
    pub power: Option<PowerArg>,
    /// Source location for diagnostics.
    pub span: SourceSpan,
}
