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

//! Soft constraints over expression pairs.
//!
//! A [`Constraint`] compares two expressions and evaluates to a single
//! non-negative violation score: zero when the relation holds everywhere,
//! growing with how far it is broken.

use crate::data::DataDict;
use crate::errors::EvalError;
use crate::evaluator::Evaluator;
use crate::expr::{Expr, IntoExpr};
use crate::tensor::{self, Tensor};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::BitXor;
use tracing::trace;

/// Constraint output: one entry mapping the constraint name to a rank-0
/// violation tensor.
pub type Violations = BTreeMap<String, Tensor>;

/// Relation between the left and right expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparator {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Eq => "==",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
        }
    }

    /// Parses a comparison operator as written in text syntax.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let cmp = match symbol {
            "==" => Comparator::Eq,
            "<" => Comparator::Lt,
            "<=" => Comparator::Le,
            ">" => Comparator::Gt,
            ">=" => Comparator::Ge,
            _ => return None,
        };
        Some(cmp)
    }

    /// Elementwise violation of `left (cmp) right` before averaging.
    ///
    /// Strict and non-strict forms share a formula: equality at the boundary
    /// counts as satisfied for `<` and `>` as well.
    fn pointwise(self, left: f64, right: f64) -> f64 {
        match self {
            Comparator::Eq => (left - right).abs(),
            Comparator::Lt | Comparator::Le => (left - right).max(0.0),
            Comparator::Gt | Comparator::Ge => (right - left).max(0.0),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Soft constraint `left (cmp) right`, optionally raised to a penalty power.
#[derive(Debug, Clone)]
pub struct Constraint {
    comparator: Comparator,
    left: Expr,
    right: Expr,
    penalty_power: i32,
    weight: f64,
    name: String,
    custom_name: bool,
}

impl Constraint {
    pub fn new(comparator: Comparator, left: Expr, right: Expr) -> Self {
        let name = default_name(comparator, &left, &right, 1);
        Self {
            comparator,
            left,
            right,
            penalty_power: 1,
            weight: 1.0,
            name,
            custom_name: false,
        }
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn left(&self) -> &Expr {
        &self.left
    }

    pub fn right(&self) -> &Expr {
        &self.right
    }

    pub fn penalty_power(&self) -> i32 {
        self.penalty_power
    }

    /// Scale applied by [`crate::Problem`] when summing the total loss.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns a copy whose violation is raised to `power`.
    ///
    /// The power replaces any earlier one: `(c ^ 2) ^ 3` has power 3.
    pub fn penalty(&self, power: i32) -> Constraint {
        let mut out = self.clone();
        out.penalty_power = power;
        if !out.custom_name {
            out.name = default_name(out.comparator, &out.left, &out.right, power);
        }
        out
    }

    /// Returns a copy with a loss weight.
    pub fn weighted(&self, weight: f64) -> Constraint {
        let mut out = self.clone();
        out.weight = weight;
        out
    }

    /// Returns a copy under a user-chosen name.
    pub fn named(&self, name: impl Into<String>) -> Constraint {
        let mut out = self.clone();
        out.name = name.into();
        out.custom_name = true;
        out
    }

    /// Mean violation raised to the penalty power, unweighted.
    pub fn violation(&self, data: &DataDict) -> Result<f64, EvalError> {
        let left = self.left.evaluate(data)?;
        let right = self.right.evaluate(data)?;
        let comparator = self.comparator;
        let pointwise = tensor::zip_with(comparator.symbol(), &left, &right, |l, r| {
            comparator.pointwise(l, r)
        })?;
        let value = tensor::mean(&pointwise).powi(self.penalty_power);
        trace!(constraint = %self.name, value, "evaluated constraint");
        Ok(value)
    }
}

fn default_name(comparator: Comparator, left: &Expr, right: &Expr, power: i32) -> String {
    let base = format!("{} {} {}", left.name(), comparator.symbol(), right.name());
    if power == 1 {
        base
    } else {
        format!("({base})^{power}")
    }
}

impl Evaluator for Constraint {
    type Output = Violations;

    fn evaluate(&self, data: &DataDict) -> Result<Violations, EvalError> {
        let value = self.violation(data)?;
        let mut out = Violations::new();
        out.insert(self.name.clone(), tensor::scalar(value));
        Ok(out)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl BitXor<i32> for Constraint {
    type Output = Constraint;

    fn bitxor(self, power: i32) -> Constraint {
        self.penalty(power)
    }
}

impl BitXor<i32> for &Constraint {
    type Output = Constraint;

    fn bitxor(self, power: i32) -> Constraint {
        self.penalty(power)
    }
}

/// `left == right`.
pub fn eq(left: impl IntoExpr, right: impl IntoExpr) -> Constraint {
    Constraint::new(Comparator::Eq, left.into_expr(), right.into_expr())
}

/// `left < right`.
pub fn lt(left: impl IntoExpr, right: impl IntoExpr) -> Constraint {
    Constraint::new(Comparator::Lt, left.into_expr(), right.into_expr())
}

/// `left <= right`.
pub fn le(left: impl IntoExpr, right: impl IntoExpr) -> Constraint {
    Constraint::new(Comparator::Le, left.into_expr(), right.into_expr())
}

/// `left > right`.
pub fn gt(left: impl IntoExpr, right: impl IntoExpr) -> Constraint {
    Constraint::new(Comparator::Gt, left.into_expr(), right.into_expr())
}

/// `left >= right`.
pub fn ge(left: impl IntoExpr, right: impl IntoExpr) -> Constraint {
    Constraint::new(Comparator::Ge, left.into_expr(), right.into_expr())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Variable;
    use ndarray::arr1;

    fn data() -> DataDict {
        DataDict::new()
            .with("x", arr1(&[1.0, 2.0, 3.0]).into_dyn())
            .with("y", arr1(&[2.0, 2.0, 2.0]).into_dyn())
    }

    #[test]
    fn formulas_match_comparators() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let d = data();
        assert_eq!(eq(&x, &y).violation(&d).unwrap(), 2.0 / 3.0);
        assert_eq!(lt(&x, &y).violation(&d).unwrap(), 1.0 / 3.0);
        assert_eq!(le(&x, &y).violation(&d).unwrap(), 1.0 / 3.0);
        assert_eq!(gt(&x, &y).violation(&d).unwrap(), 1.0 / 3.0);
        assert_eq!(ge(&x, &y).violation(&d).unwrap(), 1.0 / 3.0);
    }

    #[test]
    fn penalty_power_replaces_and_renames() {
        let c = lt(Variable::new("x"), 1.0);
        assert_eq!(c.name(), "x < 1");
        let squared = c.clone() ^ 2;
        assert_eq!(squared.name(), "(x < 1)^2");
        assert_eq!((&squared ^ 3).penalty_power(), 3);
        let v = c.violation(&data()).unwrap();
        assert_eq!(squared.violation(&data()).unwrap(), v * v);
    }

    #[test]
    fn custom_name_survives_penalty() {
        let c = ge(Variable::new("x"), 0).named("x_pos") ^ 2;
        assert_eq!(c.name(), "x_pos");
        let out = c.evaluate(&data()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out["x_pos"], tensor::scalar(0.0));
    }

    #[test]
    fn boundary_counts_as_satisfied_for_strict_forms() {
        let y = Variable::new("y");
        assert_eq!(lt(&y, 2.0).violation(&data()).unwrap(), 0.0);
        assert_eq!(gt(&y, 2.0).violation(&data()).unwrap(), 0.0);
    }

    #[test]
    fn shape_mismatch_propagates() {
        let x = Variable::new("x");
        let z = arr1(&[1.0, 2.0]).into_dyn();
        assert!(matches!(
            eq(&x, z).violation(&data()),
            Err(EvalError::Shape { op: "==", .. })
        ));
    }
}
