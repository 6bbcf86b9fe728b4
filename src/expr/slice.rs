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

//! Slice specifications (`x[1:]`, `x[:, 0]`, `x[::2]`).
//!
//! Items apply to leading axes in order; trailing axes are kept whole.
//! Integer indices drop their axis and may be negative. Range bounds clamp
//! to the axis extent the way Python slices do, so `x[5:]` on a length-3
//! axis is empty rather than an error.

use crate::errors::EvalError;
use crate::tensor::Tensor;
use ndarray::{Axis, Slice};
use std::fmt;
use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo};

/// One component of a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceItem {
    /// Selects a single position and removes the axis.
    Index(isize),
    /// Selects `start..end` with a positive `step`; open bounds are `None`.
    Range {
        start: Option<isize>,
        end: Option<isize>,
        step: isize,
    },
}

impl SliceItem {
    /// `start:end:step` with explicit bounds.
    pub fn range(start: Option<isize>, end: Option<isize>, step: isize) -> Self {
        SliceItem::Range { start, end, step }
    }

    /// `:`
    pub fn full() -> Self {
        SliceItem::Range {
            start: None,
            end: None,
            step: 1,
        }
    }
}

/// Ordered slice items applied to the leading axes of a tensor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SliceSpec {
    items: Vec<SliceItem>,
}

impl SliceSpec {
    pub fn new(items: Vec<SliceItem>) -> Self {
        Self { items }
    }

    /// Single integer index.
    pub fn index(index: isize) -> Self {
        Self::new(vec![SliceItem::Index(index)])
    }

    /// Single range with explicit bounds.
    pub fn range(start: Option<isize>, end: Option<isize>, step: isize) -> Self {
        Self::new(vec![SliceItem::range(start, end, step)])
    }

    /// Keeps every axis whole.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[SliceItem] {
        &self.items
    }

    /// Appends an item for the next axis (builder style).
    pub fn push(mut self, item: impl Into<SliceItem>) -> Self {
        self.items.push(item.into());
        self
    }

    pub(crate) fn apply(&self, value: &Tensor) -> Result<Tensor, EvalError> {
        if self.items.len() > value.ndim() {
            return Err(EvalError::index(format!(
                "too many indices for tensor of rank {}: got {}",
                value.ndim(),
                self.items.len()
            )));
        }

        let mut view = value.view();
        // Indexed axes disappear, so later items address a shifted axis.
        let mut axis = 0;
        for item in &self.items {
            let extent = view.len_of(Axis(axis));
            match *item {
                SliceItem::Index(index) => {
                    let position = normalize_index(index, extent)?;
                    view = view.index_axis_move(Axis(axis), position);
                }
                SliceItem::Range { start, end, step } => {
                    if step <= 0 {
                        return Err(EvalError::index(format!(
                            "slice step must be positive, got {step}"
                        )));
                    }
                    let lo = clamp_bound(start, extent, 0);
                    let hi = clamp_bound(end, extent, extent).max(lo);
                    view.slice_axis_inplace(
                        Axis(axis),
                        Slice::new(lo as isize, Some(hi as isize), step),
                    );
                    axis += 1;
                }
            }
        }
        Ok(view.to_owned())
    }
}

fn normalize_index(index: isize, extent: usize) -> Result<usize, EvalError> {
    let len = extent as isize;
    let position = if index < 0 { index + len } else { index };
    if position < 0 || position >= len {
        return Err(EvalError::index(format!(
            "index {index} is out of bounds for axis with size {extent}"
        )));
    }
    Ok(position as usize)
}

fn clamp_bound(bound: Option<isize>, extent: usize, open: usize) -> usize {
    let Some(bound) = bound else {
        return open;
    };
    let len = extent as isize;
    let resolved = if bound < 0 { bound + len } else { bound };
    resolved.clamp(0, len) as usize
}

impl From<isize> for SliceItem {
    fn from(index: isize) -> Self {
        SliceItem::Index(index)
    }
}

impl From<Range<isize>> for SliceItem {
    fn from(range: Range<isize>) -> Self {
        SliceItem::range(Some(range.start), Some(range.end), 1)
    }
}

impl From<RangeFrom<isize>> for SliceItem {
    fn from(range: RangeFrom<isize>) -> Self {
        SliceItem::range(Some(range.start), None, 1)
    }
}

impl From<RangeTo<isize>> for SliceItem {
    fn from(range: RangeTo<isize>) -> Self {
        SliceItem::range(None, Some(range.end), 1)
    }
}

impl From<RangeInclusive<isize>> for SliceItem {
    fn from(range: RangeInclusive<isize>) -> Self {
        let (start, end) = range.into_inner();
        // `..=-1` reaches the last element, i.e. an open upper bound; so does
        // an end that cannot be stepped past.
        let end = if end == -1 { None } else { end.checked_add(1) };
        SliceItem::range(Some(start), end, 1)
    }
}

impl From<RangeFull> for SliceItem {
    fn from(_: RangeFull) -> Self {
        SliceItem::full()
    }
}

macro_rules! single_item_spec {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for SliceSpec {
                fn from(item: $ty) -> Self {
                    SliceSpec::new(vec![item.into()])
                }
            }
        )+
    };
}

single_item_spec!(
    SliceItem,
    isize,
    Range<isize>,
    RangeFrom<isize>,
    RangeTo<isize>,
    RangeInclusive<isize>,
    RangeFull
);

impl From<Vec<SliceItem>> for SliceSpec {
    fn from(items: Vec<SliceItem>) -> Self {
        SliceSpec::new(items)
    }
}

impl fmt::Display for SliceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SliceItem::Index(index) => write!(f, "{index}"),
            SliceItem::Range { start, end, step } => {
                if let Some(start) = start {
                    write!(f, "{start}")?;
                }
                f.write_str(":")?;
                if let Some(end) = end {
                    write!(f, "{end}")?;
                }
                if step != 1 {
                    write!(f, ":{step}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for SliceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    fn grid() -> Tensor {
        arr2(&[[0.0, 1.0, 2.0], [3.0, 4.0, 5.0], [6.0, 7.0, 8.0]]).into_dyn()
    }

    #[test]
    fn leading_range_drops_first_row() {
        let out = SliceSpec::from(1..).apply(&grid()).unwrap();
        assert_eq!(out, arr2(&[[3.0, 4.0, 5.0], [6.0, 7.0, 8.0]]).into_dyn());
    }

    #[test]
    fn index_after_full_axis_selects_column() {
        let spec = SliceSpec::from(..).push(0);
        let out = spec.apply(&grid()).unwrap();
        assert_eq!(out, arr1(&[0.0, 3.0, 6.0]).into_dyn());
        assert_eq!(spec.to_string(), ":, 0");
    }

    #[test]
    fn negative_index_counts_from_end() {
        let out = SliceSpec::index(-1).apply(&grid()).unwrap();
        assert_eq!(out, arr1(&[6.0, 7.0, 8.0]).into_dyn());
    }

    #[test]
    fn stepped_range_and_clamping() {
        let v = arr1(&[0.0, 1.0, 2.0, 3.0, 4.0]).into_dyn();
        let stepped = SliceSpec::range(Some(1), Some(5), 2);
        assert_eq!(stepped.apply(&v).unwrap(), arr1(&[1.0, 3.0]).into_dyn());
        assert_eq!(stepped.to_string(), "1:5:2");
        let past_end = SliceSpec::from(7..);
        assert_eq!(past_end.apply(&v).unwrap().len(), 0);
        let tail = SliceSpec::from(-2..);
        assert_eq!(tail.apply(&v).unwrap(), arr1(&[3.0, 4.0]).into_dyn());
    }

    #[test]
    fn inclusive_range_to_minus_one_is_open() {
        let v = arr1(&[0.0, 1.0, 2.0]).into_dyn();
        let spec = SliceSpec::from(1..=-1);
        assert_eq!(spec.to_string(), "1:");
        assert_eq!(spec.apply(&v).unwrap(), arr1(&[1.0, 2.0]).into_dyn());
    }

    #[test]
    fn inclusive_range_to_isize_max_is_open() {
        let v = arr1(&[0.0, 1.0, 2.0]).into_dyn();
        let spec = SliceSpec::from(1..=isize::MAX);
        assert_eq!(spec, SliceSpec::range(Some(1), None, 1));
        assert_eq!(spec.apply(&v).unwrap(), arr1(&[1.0, 2.0]).into_dyn());
    }

    #[test]
    fn invalid_slices_are_errors() {
        let v = arr1(&[0.0, 1.0]).into_dyn();
        assert!(matches!(
            SliceSpec::index(2).apply(&v),
            Err(EvalError::Index { .. })
        ));
        assert!(matches!(
            SliceSpec::from(0).push(0).apply(&v),
            Err(EvalError::Index { .. })
        ));
        assert!(matches!(
            SliceSpec::range(None, None, 0).apply(&v),
            Err(EvalError::Index { .. })
        ));
    }
}
