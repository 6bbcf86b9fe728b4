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

//! Per-column normalization.

use super::DatasetError;
use crate::data::DataDict;
use crate::tensor::{self, Tensor};
use ndarray::Axis;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Normalization scheme, applied independently to every column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormKind {
    /// Maps `[min, max]` onto `[0, 1]`.
    #[default]
    ZeroOne,
    /// Maps `[min, max]` onto `[-1, 1]`.
    OneOne,
    /// Subtracts the mean and divides by the (population) standard deviation.
    #[serde(rename = "zscore")]
    ZScore,
}

/// Column statistics for one variable.
///
/// `lo`/`hi` hold the column minima and maxima, or mean and standard
/// deviation for [`NormKind::ZScore`]. Both have the variable's shape minus
/// the time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub lo: Tensor,
    pub hi: Tensor,
}

/// Statistics for every normalized variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormStats {
    columns: BTreeMap<String, ColumnStats>,
}

impl NormStats {
    pub fn get(&self, key: &str) -> Option<&ColumnStats> {
        self.columns.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, stats: ColumnStats) {
        self.columns.insert(key.into(), stats);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnStats)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flattens into a dictionary with `<key>_min` and `<key>_max` entries.
    pub fn to_data(&self) -> DataDict {
        let mut out = DataDict::new();
        for (key, stats) in &self.columns {
            out.insert(format!("{key}_min"), stats.lo.clone());
            out.insert(format!("{key}_max"), stats.hi.clone());
        }
        out
    }
}

/// Normalizes every variable column-wise.
///
/// With `stats` the given statistics are reused (for example those of the
/// train split); otherwise they are computed from `data`. Non-finite results,
/// such as those from constant columns, are replaced by zero.
pub fn normalize_data(
    data: &DataDict,
    kind: NormKind,
    stats: Option<&NormStats>,
) -> Result<(DataDict, NormStats), DatasetError> {
    let mut out = DataDict::new();
    if let Some(name) = data.name() {
        out.set_name(name);
    }
    let mut used = NormStats::default();

    for (key, value) in data {
        let column = match stats {
            Some(stats) => stats
                .get(key)
                .cloned()
                .ok_or_else(|| DatasetError::MissingStats { key: key.clone() })?,
            None => column_stats(key, value, kind)?,
        };
        out.insert(key.clone(), apply(key, value, kind, &column)?);
        used.insert(key.clone(), column);
    }
    Ok((out, used))
}

fn column_stats(key: &str, value: &Tensor, kind: NormKind) -> Result<ColumnStats, DatasetError> {
    if value.ndim() == 0 {
        return Err(DatasetError::Rank {
            key: key.to_string(),
            expected: ">= 1",
            found: 0,
        });
    }
    if value.len_of(Axis(0)) == 0 {
        return Err(DatasetError::Empty {
            key: key.to_string(),
        });
    }

    let stats = match kind {
        NormKind::ZeroOne | NormKind::OneOne => ColumnStats {
            lo: value.fold_axis(Axis(0), f64::INFINITY, |acc, v| acc.min(*v)),
            hi: value.fold_axis(Axis(0), f64::NEG_INFINITY, |acc, v| acc.max(*v)),
        },
        NormKind::ZScore => ColumnStats {
            lo: value.mean_axis(Axis(0)).ok_or_else(|| DatasetError::Empty {
                key: key.to_string(),
            })?,
            hi: value.std_axis(Axis(0), 0.0),
        },
    };
    Ok(stats)
}

fn apply(
    key: &str,
    value: &Tensor,
    kind: NormKind,
    stats: &ColumnStats,
) -> Result<Tensor, DatasetError> {
    let centered = tensor::zip_with("-", value, &stats.lo, |x, lo| x - lo)?;
    let scale = match kind {
        NormKind::ZeroOne | NormKind::OneOne => {
            tensor::zip_with("-", &stats.hi, &stats.lo, |hi, lo| hi - lo)?
        }
        NormKind::ZScore => stats.hi.clone(),
    };
    if scale.iter().any(|s| *s == 0.0) {
        warn!(key, ?kind, "constant column during normalization");
    }

    let mut out = tensor::zip_with("/", &centered, &scale, |c, s| c / s)?;
    if kind == NormKind::OneOne {
        out.mapv_inplace(|v| 2.0 * v - 1.0);
    }
    out.mapv_inplace(|v| if v.is_finite() { v } else { 0.0 });
    Ok(out)
}
