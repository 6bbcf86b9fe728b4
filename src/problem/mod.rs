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

//! Multi-objective loss aggregation.
//!
//! A [`Problem`] owns weighted objectives and constraints. Evaluating it
//! against a data dictionary yields every term's contribution plus their sum
//! under the `loss` key, all prefixed with the dictionary's split name so
//! train/dev/test metrics can live side by side (`nstep_train_loss`).

mod trace;

pub use self::trace::ConstraintIssue;

use crate::constraint::Constraint;
use crate::data::DataDict;
use crate::errors::EvalError;
use crate::evaluator::Evaluator;
use crate::expr::{Expr, IntoExpr};
use crate::tensor;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::debug;

/// Name of the aggregated total in [`ProblemOutput`].
pub const LOSS_KEY: &str = "loss";

/// Errors produced while assembling a [`Problem`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProblemError {
    /// Two terms share an output name.
    #[error("Duplicate loss term '{name}'")]
    DuplicateTerm { name: String },
    /// A term uses the name reserved for the total.
    #[error("Loss term name '{name}' is reserved for the total loss")]
    ReservedName { name: String },
}

/// Weighted objective: contributes `weight * mean(expr)` to the loss.
#[derive(Debug, Clone)]
pub struct Objective {
    name: String,
    expr: Expr,
    weight: f64,
}

impl Objective {
    pub fn new(name: impl Into<String>, expr: impl IntoExpr) -> Self {
        Self {
            name: name.into(),
            expr: expr.into_expr(),
            weight: 1.0,
        }
    }

    /// Returns a copy with a loss weight.
    pub fn weighted(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

impl Evaluator for Objective {
    type Output = f64;

    fn evaluate(&self, data: &DataDict) -> Result<f64, EvalError> {
        let value = self.expr.evaluate(data)?;
        Ok(self.weight * tensor::mean(&value))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Per-term values and the total loss from one [`Problem`] evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemOutput {
    values: BTreeMap<String, f64>,
    loss_key: String,
}

impl ProblemOutput {
    /// Total loss (sum of every weighted term).
    pub fn loss(&self) -> f64 {
        self.values.get(&self.loss_key).copied().unwrap_or(0.0)
    }

    /// Key under which the total is stored (`loss` or `<split>_loss`).
    pub fn loss_key(&self) -> &str {
        &self.loss_key
    }

    /// Looks up a metric by its full (prefixed) key.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Iterates metrics in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<String, f64> {
        self.values
    }
}

/// Objectives and constraints aggregated into one scalar loss.
#[derive(Debug, Clone)]
pub struct Problem {
    objectives: Vec<Objective>,
    constraints: Vec<Constraint>,
}

impl Problem {
    /// Creates a problem, rejecting duplicate or reserved term names.
    pub fn new(
        objectives: Vec<Objective>,
        constraints: Vec<Constraint>,
    ) -> Result<Self, ProblemError> {
        let mut seen = BTreeSet::new();
        let names = objectives
            .iter()
            .map(|o| o.name())
            .chain(constraints.iter().map(|c| c.name()));
        for name in names {
            if name == LOSS_KEY {
                return Err(ProblemError::ReservedName {
                    name: name.to_string(),
                });
            }
            if !seen.insert(name) {
                return Err(ProblemError::DuplicateTerm {
                    name: name.to_string(),
                });
            }
        }
        Ok(Self {
            objectives,
            constraints,
        })
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Keys every dictionary must provide (defaults and constants excluded).
    pub fn required_keys(&self) -> BTreeSet<String> {
        let mut keys = BTreeSet::new();
        for objective in &self.objectives {
            keys.extend(objective.expr.required_keys());
        }
        for constraint in &self.constraints {
            keys.extend(constraint.left().required_keys());
            keys.extend(constraint.right().required_keys());
        }
        keys
    }

    /// Ranks violated constraints by weighted violation, largest first.
    ///
    /// Satisfied constraints are omitted; at most `top_k` issues are kept.
    pub fn violations(
        &self,
        data: &DataDict,
        top_k: usize,
    ) -> Result<Vec<ConstraintIssue>, EvalError> {
        let mut issues = Vec::new();
        for (index, constraint) in self.constraints.iter().enumerate() {
            let violation = constraint.violation(data)?;
            if violation != 0.0 {
                issues.push(ConstraintIssue::new(index, constraint, violation));
            }
        }
        issues.sort_by(|a, b| b.weighted.total_cmp(&a.weighted));
        issues.truncate(top_k);
        Ok(issues)
    }
}

fn prefixed(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}_{name}"),
        None => name.to_string(),
    }
}

impl Evaluator for Problem {
    type Output = ProblemOutput;

    fn evaluate(&self, data: &DataDict) -> Result<ProblemOutput, EvalError> {
        let prefix = data.name();
        let mut values = BTreeMap::new();
        let mut loss = 0.0;

        for objective in &self.objectives {
            let value = objective.evaluate(data)?;
            loss += value;
            values.insert(prefixed(prefix, objective.name()), value);
        }
        for constraint in &self.constraints {
            let value = constraint.weight() * constraint.violation(data)?;
            loss += value;
            values.insert(prefixed(prefix, constraint.name()), value);
        }

        let loss_key = prefixed(prefix, LOSS_KEY);
        debug!(split = prefix.unwrap_or("-"), loss, terms = values.len(), "evaluated problem");
        values.insert(loss_key.clone(), loss);
        Ok(ProblemOutput { values, loss_key })
    }

    fn name(&self) -> &str {
        "problem"
    }
}
