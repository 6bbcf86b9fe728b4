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

//! N-step sequence datasets.

use super::{DatasetError, batch_tensor};
use crate::data::DataDict;
use ndarray::{Array2, Array3, ArrayView2, Axis, Ix2, Ix3, concatenate, s};
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::warn;

/// Time-major variables windowed into `nsteps`-long samples.
///
/// All variables are concatenated column-wise (in key order) and windowed
/// together. Sample `i` pairs window `i` as the past (`<key>p`) with window
/// `i + 1` as the future (`<key>f`).
#[derive(Debug, Clone)]
pub struct SequenceDataset {
    name: String,
    nsteps: usize,
    variables: Vec<String>,
    columns: BTreeMap<String, Range<usize>>,
    full: Array2<f64>,
    batched: Array3<f64>,
}

impl SequenceDataset {
    /// Builds a dataset from 2-D `(T, Dk)` variables sharing the same `T`.
    pub fn new(
        data: &DataDict,
        nsteps: usize,
        moving_horizon: bool,
        name: impl Into<String>,
    ) -> Result<Self, DatasetError> {
        let name = name.into();
        if nsteps == 0 {
            return Err(DatasetError::InvalidHorizon { nsteps });
        }
        if data.is_empty() {
            return Err(DatasetError::NoVariables { name });
        }

        let mut views: Vec<ArrayView2<'_, f64>> = Vec::with_capacity(data.len());
        let mut columns = BTreeMap::new();
        let mut variables = Vec::with_capacity(data.len());
        let mut offset = 0;
        let mut rows = None;
        for (key, value) in data {
            let view = value
                .view()
                .into_dimensionality::<Ix2>()
                .map_err(|_| DatasetError::Rank {
                    key: key.clone(),
                    expected: "2",
                    found: value.ndim(),
                })?;
            let (len, width) = view.dim();
            match rows {
                None => rows = Some(len),
                Some(expected) if expected != len => {
                    return Err(DatasetError::Length {
                        key: key.clone(),
                        expected,
                        found: len,
                    });
                }
                Some(_) => {}
            }
            columns.insert(key.clone(), offset..offset + width);
            variables.push(key.clone());
            offset += width;
            views.push(view);
        }

        let full = concatenate(Axis(1), &views)?;
        let batched = batch_tensor(&full.clone().into_dyn(), nsteps, moving_horizon)?
            .into_dimensionality::<Ix3>()?;
        if batched.len_of(Axis(0)) < 2 {
            warn!(
                dataset = %name,
                nsim = full.nrows(),
                nsteps,
                "too few time steps for a single past/future sample"
            );
        }

        Ok(Self {
            name,
            nsteps,
            variables,
            columns,
            full,
            batched,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nsteps(&self) -> usize {
        self.nsteps
    }

    /// Number of time steps in the underlying sequence.
    pub fn nsim(&self) -> usize {
        self.full.nrows()
    }

    /// Variable keys in column order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Number of past/future samples (one less than the window count).
    pub fn len(&self) -> usize {
        self.batched.len_of(Axis(0)).saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shapes of every variable and of its `p`/`f` sequences.
    pub fn dims(&self) -> BTreeMap<String, Vec<usize>> {
        let mut dims = BTreeMap::new();
        for (key, range) in &self.columns {
            let shape = vec![self.nsim(), range.len()];
            dims.insert(format!("{key}p"), shape.clone());
            dims.insert(format!("{key}f"), shape.clone());
            dims.insert(key.clone(), shape);
        }
        dims
    }

    /// Sample `i`: `(nsteps, Dk)` past and future windows per variable.
    pub fn get(&self, index: usize) -> Result<DataDict, DatasetError> {
        if index >= self.len() {
            return Err(DatasetError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        let mut out = DataDict::new();
        for (key, range) in &self.columns {
            let past = self.batched.slice(s![index, .., range.clone()]);
            let future = self.batched.slice(s![index + 1, .., range.clone()]);
            out.insert(format!("{key}p"), past.to_owned().into_dyn());
            out.insert(format!("{key}f"), future.to_owned().into_dyn());
        }
        Ok(out)
    }

    /// Every sample stacked along a batch axis: `(nsteps, batch, Dk)` per
    /// entry, named `nstep_<name>`.
    pub fn full_batch(&self) -> DataDict {
        let count = self.len();
        let (past, future) = if count == 0 {
            (0..0, 0..0)
        } else {
            (0..count, 1..count + 1)
        };
        let mut out = DataDict::named(format!("nstep_{}", self.name));
        for (key, range) in &self.columns {
            let p = self.batched.slice(s![past.clone(), .., range.clone()]);
            let f = self.batched.slice(s![future.clone(), .., range.clone()]);
            out.insert(format!("{key}p"), p.permuted_axes([1, 0, 2]).to_owned().into_dyn());
            out.insert(format!("{key}f"), f.permuted_axes([1, 0, 2]).to_owned().into_dyn());
        }
        out
    }

    /// The whole sequence shifted by `nsteps` for open-loop evaluation:
    /// `(T - nsteps, 1, Dk)` per entry, named `loop_<name>`.
    pub fn full_sequence(&self) -> DataDict {
        let rows = self.nsim();
        let kept = rows.saturating_sub(self.nsteps);
        let mut out = DataDict::named(format!("loop_{}", self.name));
        for (key, range) in &self.columns {
            let p = self.full.slice(s![0..kept, range.clone()]);
            let f = self.full.slice(s![rows - kept..rows, range.clone()]);
            out.insert(format!("{key}p"), p.insert_axis(Axis(1)).to_owned().into_dyn());
            out.insert(format!("{key}f"), f.insert_axis(Axis(1)).to_owned().into_dyn());
        }
        out
    }
}
