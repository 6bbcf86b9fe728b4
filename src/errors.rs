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

//! Runtime evaluation errors.

use thiserror::Error;

/// Errors raised while evaluating an expression or constraint against a
/// data dictionary.
///
/// Nothing is recovered locally: every failure propagates to the caller.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A variable without a default was evaluated against a dictionary that
    /// lacks its key.
    #[error("Missing required key '{key}' in data dictionary")]
    MissingKey { key: String },
    /// Operand shapes cannot be combined by the requested operator.
    #[error("Incompatible shapes for '{op}': {left:?} and {right:?}")]
    Shape {
        op: &'static str,
        left: Vec<usize>,
        right: Vec<usize>,
    },
    /// A slice specification does not fit the evaluated tensor.
    #[error("Index error: {message}")]
    Index { message: String },
    /// Reshape/stack failure reported by `ndarray`.
    #[error("Tensor layout error: {0}")]
    Layout(#[from] ndarray::ShapeError),
}

impl EvalError {
    pub(crate) fn index(message: impl Into<String>) -> Self {
        EvalError::Index {
            message: message.into(),
        }
    }
}
