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

//! The contract shared by every evaluable node.

use crate::data::DataDict;
use crate::errors::EvalError;

/// A lazily evaluated node: pure data until called with a dictionary.
///
/// Implementations must be pure functions of `data`; calling `evaluate`
/// twice with the same dictionary yields the same output.
pub trait Evaluator {
    /// Value produced by one evaluation (a tensor for expressions, a
    /// violation map for constraints).
    type Output;

    /// Evaluates the node against `data`.
    fn evaluate(&self, data: &DataDict) -> Result<Self::Output, EvalError>;

    /// Stable display name.
    fn name(&self) -> &str;
}
