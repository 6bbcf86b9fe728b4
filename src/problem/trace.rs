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

//! Constraint diagnostics.

use crate::constraint::{Comparator, Constraint};
use crate::evaluator::Evaluator;

/// One violated constraint, as reported by [`super::Problem::violations`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintIssue {
    /// Position of the constraint in the problem.
    pub index: usize,
    /// Constraint display name.
    pub name: String,
    /// Relation that is broken.
    pub comparator: Comparator,
    /// Violation raised to the penalty power, before weighting.
    pub violation: f64,
    /// Contribution to the total loss (`weight * violation`).
    pub weighted: f64,
    /// Display names of both sides.
    pub left: String,
    pub right: String,
}

impl ConstraintIssue {
    pub(super) fn new(index: usize, constraint: &Constraint, violation: f64) -> Self {
        Self {
            index,
            name: constraint.name().to_string(),
            comparator: constraint.comparator(),
            violation,
            weighted: constraint.weight() * violation,
            left: constraint.left().name().to_string(),
            right: constraint.right().name().to_string(),
        }
    }
}
