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

//! Sequence data utilities: splitting, normalization and N-step windowing.
//!
//! Variables are time-major: axis 0 is time, axis 1 (when present) holds the
//! variable's columns. Windowed batches feed problems with `<key>p` (past)
//! and `<key>f` (future) entries.

mod normalize;
mod sequence;

pub use self::normalize::{ColumnStats, NormKind, NormStats, normalize_data};
pub use self::sequence::SequenceDataset;

use crate::data::DataDict;
use crate::errors::EvalError;
use crate::tensor::{self, Tensor};
use ndarray::{Array3, Axis, Ix2, Slice, s};
use thiserror::Error;
use tracing::warn;

/// Errors raised by dataset utilities.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Variable '{key}' must have rank {expected}, found rank {found}")]
    Rank {
        key: String,
        expected: &'static str,
        found: usize,
    },
    #[error("Variable '{key}' has {found} time steps, expected {expected}")]
    Length {
        key: String,
        expected: usize,
        found: usize,
    },
    #[error("Variable '{key}' has no time steps")]
    Empty { key: String },
    #[error("Dataset '{name}' has no variables")]
    NoVariables { name: String },
    #[error(
        "Invalid split ratio {ratio:?}: expected two non-negative percentages summing to at most 100"
    )]
    InvalidSplit { ratio: [f64; 2] },
    #[error("Prediction horizon must be at least 1, found {nsteps}")]
    InvalidHorizon { nsteps: usize },
    #[error("No normalization statistics for '{key}'")]
    MissingStats { key: String },
    #[error("Sample index {index} is out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("Tensor layout error: {0}")]
    Layout(#[from] ndarray::ShapeError),
}

/// Splits every variable along time into train, dev and test parts.
///
/// The split points come from the shortest variable. Without a ratio the
/// data is cut into thirds (the test part absorbs the remainder); otherwise
/// `split_ratio` gives the train and dev percentages out of 100.
pub fn split_data(
    data: &DataDict,
    split_ratio: Option<[f64; 2]>,
) -> Result<(DataDict, DataDict, DataDict), DatasetError> {
    let mut nsim = usize::MAX;
    for (key, value) in data {
        if value.ndim() == 0 {
            return Err(DatasetError::Rank {
                key: key.clone(),
                expected: ">= 1",
                found: 0,
            });
        }
        nsim = nsim.min(value.len_of(Axis(0)));
    }
    if data.is_empty() {
        nsim = 0;
    }

    let (dev_start, test_start) = match split_ratio {
        None => {
            let third = nsim / 3;
            (third, third * 2)
        }
        Some(ratio) => {
            let [train, dev] = ratio;
            let valid = train.is_finite()
                && dev.is_finite()
                && train >= 0.0
                && dev >= 0.0
                && train + dev <= 100.0;
            if !valid {
                return Err(DatasetError::InvalidSplit { ratio });
            }
            let dev_start = (train / 100.0 * nsim as f64).floor() as usize;
            let test_start = dev_start + (dev / 100.0 * nsim as f64).floor() as usize;
            (dev_start.min(nsim), test_start.min(nsim))
        }
    };

    let part = |lo: usize, hi: usize| -> DataDict {
        data.iter()
            .map(|(key, value)| {
                let rows = value.slice_axis(Axis(0), Slice::from(lo..hi)).to_owned();
                (key.clone(), rows)
            })
            .collect()
    };
    let train = part(0, dev_start);
    let dev = part(dev_start, test_start);
    let test = part(test_start, nsim);

    for (name, len) in [
        ("train", dev_start),
        ("dev", test_start - dev_start),
        ("test", nsim - test_start),
    ] {
        if len == 0 {
            warn!(split = name, nsim, "empty data split");
        }
    }
    Ok((train, dev, test))
}

/// Windows a `(T, D)` tensor into `(N, nsteps, D)`.
///
/// Windows start every `nsteps` rows, or every row when `moving_horizon`
/// is set. Trailing rows that do not fill a window are dropped.
pub fn batch_tensor(
    x: &Tensor,
    nsteps: usize,
    moving_horizon: bool,
) -> Result<Tensor, DatasetError> {
    if nsteps == 0 {
        return Err(DatasetError::InvalidHorizon { nsteps });
    }
    let x = x
        .view()
        .into_dimensionality::<Ix2>()
        .map_err(|_| DatasetError::Rank {
            key: "<tensor>".to_string(),
            expected: "2",
            found: x.ndim(),
        })?;
    let (rows, cols) = x.dim();
    let stride = if moving_horizon { 1 } else { nsteps };
    let count = if rows >= nsteps {
        (rows - nsteps) / stride + 1
    } else {
        0
    };

    let mut out = Array3::<f64>::zeros((count, nsteps, cols));
    for i in 0..count {
        let start = i * stride;
        out.slice_mut(s![i, .., ..])
            .assign(&x.slice(s![start..start + nsteps, ..]));
    }
    Ok(out.into_dyn())
}

/// Reassembles a `(T, D)` sequence from `(N, nsteps, D)` windows.
///
/// Inverse of [`batch_tensor`] for the rows that windowing kept.
pub fn unbatch_tensor(x: &Tensor, moving_horizon: bool) -> Result<Tensor, DatasetError> {
    if x.ndim() != 3 {
        return Err(DatasetError::Rank {
            key: "<tensor>".to_string(),
            expected: "3",
            found: x.ndim(),
        });
    }
    let (count, nsteps, cols) = (x.shape()[0], x.shape()[1], x.shape()[2]);
    if count == 0 || nsteps == 0 {
        return Ok(Tensor::zeros(vec![0, cols]));
    }

    if !moving_horizon {
        let values: Vec<f64> = x.iter().copied().collect();
        return Ok(tensor::from_shape_vec(&[count * nsteps, cols], values)?);
    }

    // Overlapping windows: first row of every window, then the tail of the
    // last one.
    let mut values = Vec::with_capacity((count + nsteps - 1) * cols);
    for i in 0..count {
        values.extend(x.slice(s![i, 0, ..]).iter().copied());
    }
    values.extend(x.slice(s![count - 1, 1.., ..]).iter().copied());
    Ok(tensor::from_shape_vec(&[count + nsteps - 1, cols], values)?)
}

/// Normalized train/dev/test sequence datasets built from one dictionary.
#[derive(Debug, Clone)]
pub struct SequenceSplits {
    pub train: SequenceDataset,
    pub dev: SequenceDataset,
    pub test: SequenceDataset,
    /// Statistics used for normalization (computed on the full data).
    pub stats: NormStats,
}

impl SequenceSplits {
    /// Normalizes `data`, splits it and windows each part.
    pub fn new(
        data: &DataDict,
        nsteps: usize,
        norm: NormKind,
        split_ratio: Option<[f64; 2]>,
        moving_horizon: bool,
    ) -> Result<Self, DatasetError> {
        let (normalized, stats) = normalize_data(data, norm, None)?;
        let (train, dev, test) = split_data(&normalized, split_ratio)?;
        Ok(Self {
            train: SequenceDataset::new(&train, nsteps, moving_horizon, "train")?,
            dev: SequenceDataset::new(&dev, nsteps, moving_horizon, "dev")?,
            test: SequenceDataset::new(&test, nsteps, moving_horizon, "test")?,
            stats,
        })
    }

    /// Full-batch N-step dictionaries (`nstep_train`, `nstep_dev`,
    /// `nstep_test`).
    pub fn nstep_batches(&self) -> [DataDict; 3] {
        [
            self.train.full_batch(),
            self.dev.full_batch(),
            self.test.full_batch(),
        ]
    }

    /// Open-loop dictionaries (`loop_train`, `loop_dev`, `loop_test`).
    pub fn loops(&self) -> [DataDict; 3] {
        [
            self.train.full_sequence(),
            self.dev.full_sequence(),
            self.test.full_sequence(),
        ]
    }
}

/// Normalizes, splits and windows `data` with stride `nsteps`.
pub fn sequence_splits(
    data: &DataDict,
    nsteps: usize,
    norm: NormKind,
    split_ratio: Option<[f64; 2]>,
) -> Result<SequenceSplits, DatasetError> {
    SequenceSplits::new(data, nsteps, norm, split_ratio, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, arr2};

    fn ramp(rows: usize, cols: usize) -> Tensor {
        Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f64).into_dyn()
    }

    #[test]
    fn splits_into_thirds_by_default() {
        let data = DataDict::new().with("Y", ramp(10, 2)).with("U", ramp(12, 1));
        let (train, dev, test) = split_data(&data, None).unwrap();
        assert_eq!(train.get("Y").unwrap().shape(), &[3, 2]);
        assert_eq!(dev.get("U").unwrap().shape(), &[3, 1]);
        assert_eq!(test.get("Y").unwrap().shape(), &[4, 2]);
        assert_eq!(dev.get("Y").unwrap()[[0, 0]], 6.0);
    }

    #[test]
    fn splits_by_percentage() {
        let data = DataDict::new().with("Y", ramp(10, 1));
        let (train, dev, test) = split_data(&data, Some([60.0, 20.0])).unwrap();
        assert_eq!(train.get("Y").unwrap().len(), 6);
        assert_eq!(dev.get("Y").unwrap().len(), 2);
        assert_eq!(test.get("Y").unwrap().len(), 2);
        assert!(matches!(
            split_data(&data, Some([90.0, 20.0])),
            Err(DatasetError::InvalidSplit { .. })
        ));
    }

    #[test]
    fn batches_with_and_without_overlap() {
        let x = ramp(5, 1);
        let strided = batch_tensor(&x, 2, false).unwrap();
        assert_eq!(strided.shape(), &[2, 2, 1]);
        assert_eq!(strided[[1, 0, 0]], 2.0);
        let sliding = batch_tensor(&x, 2, true).unwrap();
        assert_eq!(sliding.shape(), &[4, 2, 1]);
        assert_eq!(sliding[[3, 1, 0]], 4.0);
        assert!(matches!(
            batch_tensor(&x, 0, false),
            Err(DatasetError::InvalidHorizon { nsteps: 0 })
        ));
    }

    #[test]
    fn unbatch_restores_windowed_rows() {
        let x = ramp(6, 2);
        let strided = batch_tensor(&x, 3, false).unwrap();
        assert_eq!(unbatch_tensor(&strided, false).unwrap(), x);
        let sliding = batch_tensor(&x, 3, true).unwrap();
        assert_eq!(unbatch_tensor(&sliding, true).unwrap(), x);
    }

    #[test]
    fn sequence_splits_name_batches_per_split() {
        let data = DataDict::new()
            .with("Y", ramp(30, 2))
            .with("U", arr2(&[[1.0]; 30]).into_dyn());
        let splits = sequence_splits(&data, 3, NormKind::ZeroOne, None).unwrap();
        let [train, dev, test] = splits.nstep_batches();
        assert_eq!(train.name(), Some("nstep_train"));
        assert_eq!(dev.name(), Some("nstep_dev"));
        assert_eq!(test.name(), Some("nstep_test"));
        assert_eq!(train.get("Yp").unwrap().shape(), &[3, 2, 2]);
        let [train_loop, _, _] = splits.loops();
        assert_eq!(train_loop.name(), Some("loop_train"));
        assert_eq!(train_loop.get("Uf").unwrap().shape(), &[7, 1, 1]);
        // The constant input column normalizes to zero instead of NaN.
        assert!(train_loop.get("Uf").unwrap().iter().all(|v| *v == 0.0));
    }
}
