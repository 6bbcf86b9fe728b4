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

//! Expression trees over named tensors.
//!
//! Trees are assembled eagerly and evaluated lazily: every builder returns a
//! new [`Expr`] whose operands are shared through `Arc`, and nothing touches
//! tensor data until [`Evaluator::evaluate`](crate::Evaluator::evaluate) is
//! called with a [`DataDict`](crate::DataDict).
//!
//! Two surfaces build the same trees:
//! - free builder functions ([`add`], [`sub`], [`matmul`], ...), the core API;
//! - `std::ops` overloads (`x + y`, `2.0 - x`, `-x`), a thin layer on top.

mod eval;
mod ops;
mod slice;

pub use slice::{SliceItem, SliceSpec};

use crate::constraint::{Comparator, Constraint};
use crate::tensor::{self, Tensor};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Leaf referencing a key of the data dictionary.
///
/// Identity is by key. The optional default is returned when the key is
/// absent from the dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    key: String,
    default: Option<Tensor>,
}

impl Variable {
    /// Creates a dictionary-backed variable with no default.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default: None,
        }
    }

    /// Creates a variable that falls back to `value` outside a dictionary.
    pub fn with_value(key: impl Into<String>, value: impl Into<Constant>) -> Self {
        Self {
            key: key.into(),
            default: Some(value.into().into_tensor()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn default_value(&self) -> Option<&Tensor> {
        self.default.as_ref()
    }

    /// Wraps the variable into an expression leaf.
    pub fn expr(&self) -> Expr {
        Expr::from(self.clone())
    }
}

/// Leaf wrapping a literal scalar or tensor; ignores the dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    value: Tensor,
}

impl Constant {
    pub fn new(value: Tensor) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &Tensor {
        &self.value
    }

    pub fn into_tensor(self) -> Tensor {
        self.value
    }

    /// Whether the constant is a rank-0 scalar.
    pub fn is_scalar(&self) -> bool {
        self.value.ndim() == 0
    }

    fn display_name(&self) -> String {
        if let Some(value) = self.value.first().filter(|_| self.is_scalar()) {
            return format!("{value}");
        }
        let dims: Vec<String> = self.value.shape().iter().map(usize::to_string).collect();
        format!("tensor[{}]", dims.join("x"))
    }
}

impl From<f64> for Constant {
    fn from(value: f64) -> Self {
        Self::new(tensor::scalar(value))
    }
}

impl From<i32> for Constant {
    fn from(value: i32) -> Self {
        Self::new(tensor::scalar(f64::from(value)))
    }
}

impl From<f32> for Constant {
    fn from(value: f32) -> Self {
        Self::new(tensor::scalar(f64::from(value)))
    }
}

impl From<i64> for Constant {
    fn from(value: i64) -> Self {
        Self::new(tensor::scalar(value as f64))
    }
}

impl From<Tensor> for Constant {
    fn from(value: Tensor) -> Self {
        Self::new(value)
    }
}

impl From<&Tensor> for Constant {
    fn from(value: &Tensor) -> Self {
        Self::new(value.clone())
    }
}

/// Unary operators and elementwise functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Negation (`-x`).
    Neg,
    Abs,
    /// `max(x, 0)`.
    Relu,
    Exp,
    /// Natural logarithm.
    Ln,
    Sin,
    Cos,
    Tanh,
    Sqrt,
    /// Axis reversal (matrix transpose for rank 2).
    Transpose,
}

impl UnaryOp {
    /// Function name used in display names and text syntax.
    pub fn function_name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Abs => "abs",
            UnaryOp::Relu => "relu",
            UnaryOp::Exp => "exp",
            UnaryOp::Ln => "ln",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tanh => "tanh",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Transpose => "transpose",
        }
    }

    /// Resolves a callable builtin by name (negation is operator-only).
    pub fn from_function_name(name: &str) -> Option<Self> {
        let op = match name {
            "abs" => UnaryOp::Abs,
            "relu" => UnaryOp::Relu,
            "exp" => UnaryOp::Exp,
            "ln" => UnaryOp::Ln,
            "sin" => UnaryOp::Sin,
            "cos" => UnaryOp::Cos,
            "tanh" => UnaryOp::Tanh,
            "sqrt" => UnaryOp::Sqrt,
            "transpose" => UnaryOp::Transpose,
            _ => return None,
        };
        Some(op)
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Elementwise power (`**`).
    Pow,
    /// Matrix product, operand order as written.
    MatMul,
    /// Reflected matrix product: the left operand holds the transposed
    /// literal and evaluation computes `(rightᵀ @ left)ᵀ`.
    RMatMul,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "**",
            BinaryOp::MatMul | BinaryOp::RMatMul => "@",
        }
    }
}

/// Node payloads. The set is closed; evaluation matches it exhaustively.
#[derive(Debug)]
pub enum ExprKind {
    Variable(Variable),
    Constant(Constant),
    Unary {
        op: UnaryOp,
        operand: Expr,
    },
    Binary {
        op: BinaryOp,
        left: Expr,
        right: Expr,
    },
    /// Slice view applied to the evaluated base.
    Slice {
        base: Expr,
        spec: SliceSpec,
    },
}

/// Immutable, cheaply clonable expression handle.
#[derive(Debug, Clone)]
pub struct Expr {
    kind: Arc<ExprKind>,
    name: String,
}

impl Expr {
    fn from_kind(kind: ExprKind, name: String) -> Self {
        Self {
            kind: Arc::new(kind),
            name,
        }
    }

    /// Creates a constant leaf.
    pub fn constant(value: impl Into<Constant>) -> Self {
        let constant = value.into();
        let name = constant.display_name();
        Self::from_kind(ExprKind::Constant(constant), name)
    }

    pub(crate) fn unary(op: UnaryOp, operand: Expr) -> Self {
        let name = match op {
            UnaryOp::Neg => format!("-{}", operand.name),
            other => format!("{}({})", other.function_name(), operand.name),
        };
        Self::from_kind(ExprKind::Unary { op, operand }, name)
    }

    pub(crate) fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        let name = format!("({} {} {})", left.name, op.symbol(), right.name);
        Self::from_kind(ExprKind::Binary { op, left, right }, name)
    }

    /// Node payload.
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Display name, generated from operator and operand names unless
    /// overridden with [`Expr::named`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the same node under a user-chosen display name.
    pub fn named(&self, name: impl Into<String>) -> Expr {
        Self {
            kind: Arc::clone(&self.kind),
            name: name.into(),
        }
    }

    /// Whether two handles share the same node.
    pub fn ptr_eq(&self, other: &Expr) -> bool {
        Arc::ptr_eq(&self.kind, &other.kind)
    }

    /// Matrix product `self @ rhs`.
    pub fn matmul(&self, rhs: impl IntoExpr) -> Expr {
        matmul(self, rhs)
    }

    /// Reflected matrix product `lhs @ self` for a literal `lhs`.
    pub fn rmatmul(&self, lhs: impl Into<Tensor>) -> Expr {
        rmatmul(lhs, self)
    }

    /// Elementwise power `self ** exponent`.
    pub fn pow(&self, exponent: impl IntoExpr) -> Expr {
        pow(self, exponent)
    }

    /// Slice view over the evaluated result.
    pub fn slice(&self, spec: impl Into<SliceSpec>) -> Expr {
        slice(self, spec)
    }

    pub fn abs(&self) -> Expr {
        Expr::unary(UnaryOp::Abs, self.clone())
    }

    pub fn relu(&self) -> Expr {
        Expr::unary(UnaryOp::Relu, self.clone())
    }

    pub fn exp(&self) -> Expr {
        Expr::unary(UnaryOp::Exp, self.clone())
    }

    pub fn ln(&self) -> Expr {
        Expr::unary(UnaryOp::Ln, self.clone())
    }

    pub fn sin(&self) -> Expr {
        Expr::unary(UnaryOp::Sin, self.clone())
    }

    pub fn cos(&self) -> Expr {
        Expr::unary(UnaryOp::Cos, self.clone())
    }

    pub fn tanh(&self) -> Expr {
        Expr::unary(UnaryOp::Tanh, self.clone())
    }

    pub fn sqrt(&self) -> Expr {
        Expr::unary(UnaryOp::Sqrt, self.clone())
    }

    /// Transpose (reverses all axes).
    pub fn t(&self) -> Expr {
        Expr::unary(UnaryOp::Transpose, self.clone())
    }

    /// Equality constraint `self == rhs`.
    pub fn equals(&self, rhs: impl IntoExpr) -> Constraint {
        Constraint::new(Comparator::Eq, self.clone(), rhs.into_expr())
    }

    /// Inequality constraint `self < rhs`.
    pub fn less_than(&self, rhs: impl IntoExpr) -> Constraint {
        Constraint::new(Comparator::Lt, self.clone(), rhs.into_expr())
    }

    /// Inequality constraint `self <= rhs`.
    pub fn less_equal(&self, rhs: impl IntoExpr) -> Constraint {
        Constraint::new(Comparator::Le, self.clone(), rhs.into_expr())
    }

    /// Inequality constraint `self > rhs`.
    pub fn greater_than(&self, rhs: impl IntoExpr) -> Constraint {
        Constraint::new(Comparator::Gt, self.clone(), rhs.into_expr())
    }

    /// Inequality constraint `self >= rhs`.
    pub fn greater_equal(&self, rhs: impl IntoExpr) -> Constraint {
        Constraint::new(Comparator::Ge, self.clone(), rhs.into_expr())
    }

    /// Keys that a dictionary must provide for evaluation to succeed
    /// (variables with defaults are excluded).
    pub fn required_keys(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        collect_required_keys(self, &mut out);
        out
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<Variable> for Expr {
    fn from(var: Variable) -> Self {
        let name = var.key.clone();
        Expr::from_kind(ExprKind::Variable(var), name)
    }
}

impl From<Constant> for Expr {
    fn from(constant: Constant) -> Self {
        Expr::constant(constant)
    }
}

/// Operand coercion: anything that can stand on either side of an operator.
///
/// Literals (scalars, tensors) become [`Constant`] leaves; variables become
/// variable leaves; expressions are shared as-is.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for &Expr {
    fn into_expr(self) -> Expr {
        self.clone()
    }
}

impl IntoExpr for Variable {
    fn into_expr(self) -> Expr {
        Expr::from(self)
    }
}

impl IntoExpr for &Variable {
    fn into_expr(self) -> Expr {
        Expr::from(self.clone())
    }
}

impl IntoExpr for Constant {
    fn into_expr(self) -> Expr {
        Expr::constant(self)
    }
}

impl IntoExpr for Tensor {
    fn into_expr(self) -> Expr {
        Expr::constant(self)
    }
}

impl IntoExpr for &Tensor {
    fn into_expr(self) -> Expr {
        Expr::constant(self)
    }
}

macro_rules! scalar_into_expr {
    ($($ty:ty),+) => {
        $(
            impl IntoExpr for $ty {
                fn into_expr(self) -> Expr {
                    Expr::constant(self)
                }
            }
        )+
    };
}

scalar_into_expr!(f64, f32, i32, i64);

/// `left + right`.
pub fn add(left: impl IntoExpr, right: impl IntoExpr) -> Expr {
    Expr::binary(BinaryOp::Add, left.into_expr(), right.into_expr())
}

/// `left - right`.
pub fn sub(left: impl IntoExpr, right: impl IntoExpr) -> Expr {
    Expr::binary(BinaryOp::Sub, left.into_expr(), right.into_expr())
}

/// `left * right`, elementwise.
pub fn mul(left: impl IntoExpr, right: impl IntoExpr) -> Expr {
    Expr::binary(BinaryOp::Mul, left.into_expr(), right.into_expr())
}

/// `left / right`, elementwise.
pub fn div(left: impl IntoExpr, right: impl IntoExpr) -> Expr {
    Expr::binary(BinaryOp::Div, left.into_expr(), right.into_expr())
}

/// `base ** exponent`, elementwise; the exponent broadcasts to the base.
pub fn pow(base: impl IntoExpr, exponent: impl IntoExpr) -> Expr {
    Expr::binary(BinaryOp::Pow, base.into_expr(), exponent.into_expr())
}

/// `left @ right`.
pub fn matmul(left: impl IntoExpr, right: impl IntoExpr) -> Expr {
    Expr::binary(BinaryOp::MatMul, left.into_expr(), right.into_expr())
}

/// `lhs @ right` where `lhs` is a literal tensor.
///
/// The literal is stored transposed and the result is transposed back at
/// evaluation time, keeping `lhsᵀ @ x` and `x @ lhs` consistent.
pub fn rmatmul(lhs: impl Into<Tensor>, right: impl IntoExpr) -> Expr {
    let lhs: Tensor = lhs.into();
    let right = right.into_expr();
    let name = format!("({} @ {})", Constant::new(lhs.clone()).display_name(), right.name);
    let stored = Expr::constant(tensor::transpose(&lhs));
    Expr::from_kind(
        ExprKind::Binary {
            op: BinaryOp::RMatMul,
            left: stored,
            right,
        },
        name,
    )
}

/// `-operand`.
pub fn neg(operand: impl IntoExpr) -> Expr {
    Expr::unary(UnaryOp::Neg, operand.into_expr())
}

/// Applies a named elementwise function.
pub fn apply(op: UnaryOp, operand: impl IntoExpr) -> Expr {
    Expr::unary(op, operand.into_expr())
}

/// Slice view `base[spec]`.
pub fn slice(base: impl IntoExpr, spec: impl Into<SliceSpec>) -> Expr {
    let base = base.into_expr();
    let spec = spec.into();
    let name = format!("{}[{}]", base.name, spec);
    Expr::from_kind(ExprKind::Slice { base, spec }, name)
}

fn collect_required_keys(expr: &Expr, out: &mut BTreeSet<String>) {
    match expr.kind() {
        ExprKind::Variable(var) => {
            if var.default.is_none() {
                out.insert(var.key.clone());
            }
        }
        ExprKind::Constant(_) => {}
        ExprKind::Unary { operand, .. } => collect_required_keys(operand, out),
        ExprKind::Binary { left, right, .. } => {
            collect_required_keys(left, out);
            collect_required_keys(right, out);
        }
        ExprKind::Slice { base, .. } => collect_required_keys(base, out),
    }
}
