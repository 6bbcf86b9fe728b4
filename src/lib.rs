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

//! Lazily evaluated tensor expressions and soft constraints.
//!
//! This crate provides:
//! - Named variables, constants and an immutable expression tree over
//!   `ndarray` tensors with numpy-style broadcasting.
//! - Soft constraints (`==`, `<`, `<=`, `>`, `>=`) that evaluate to a scalar
//!   violation, optionally raised to a penalty power.
//! - A text syntax for the same expressions and constraints, with
//!   line/column/caret diagnostics.
//! - Multi-objective loss aggregation over split-named data dictionaries.
//! - Sequence dataset utilities (splitting, normalization, N-step windows)
//!   and TOML problem definitions.
//!
//! # Pipeline
//!
//! 1. Build trees with builder functions, operator overloads or text.
//! 2. Evaluate against a [`DataDict`] through the [`Evaluator`] trait.
//! 3. Aggregate objectives and constraints with a [`Problem`].
//!
//! ```
//! use ndarray::arr1;
//! use tensor_constraint_dsl::{DataDict, Variable, lt};
//!
//! let x = Variable::new("x");
//! let upper = lt(&x, 1.0) ^ 2;
//! let data = DataDict::new().with("x", arr1(&[0.0, 3.0]).into_dyn());
//! assert_eq!(upper.violation(&data)?, 1.0);
//! # Ok::<(), tensor_constraint_dsl::EvalError>(())
//! ```

pub mod ast;
mod compiler;
pub mod config;
mod constraint;
mod data;
pub mod dataset;
mod diagnostics;
mod errors;
mod evaluator;
pub mod expr;
mod parser;
pub mod problem;
pub mod tensor;

pub use compiler::{Bindings, compile_constraint, compile_expression};
pub use config::{ConfigError, ProblemConfig, load_config};
pub use constraint::{Comparator, Constraint, Violations, eq, ge, gt, le, lt};
pub use data::DataDict;
pub use diagnostics::CompileError;
pub use errors::EvalError;
pub use evaluator::Evaluator;
pub use expr::{
    BinaryOp, Constant, Expr, ExprKind, IntoExpr, SliceItem, SliceSpec, UnaryOp, Variable,
};
pub use parser::{parse_constraint, parse_expression};
pub use problem::{ConstraintIssue, Objective, Problem, ProblemError, ProblemOutput};
pub use tensor::Tensor;

#[cfg(test)]
mod tests;
