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

//! Dynamic-rank `f64` tensors and the numeric kernels used during evaluation.
//!
//! Binary kernels follow numpy broadcasting: shapes are right-aligned and a
//! dimension of extent `1` stretches to match the other operand. Shape
//! mismatches surface as [`EvalError::Shape`] instead of panicking inside
//! `ndarray`.

use crate::errors::EvalError;
use ndarray::{ArrayD, Ix1, Ix2, IxDyn, Zip};

/// Tensor type flowing through expression trees.
pub type Tensor = ArrayD<f64>;

/// Creates a rank-0 tensor holding `value`.
pub fn scalar(value: f64) -> Tensor {
    ArrayD::from_elem(IxDyn(&[]), value)
}

/// Creates a tensor from a row-major value buffer.
pub fn from_shape_vec(shape: &[usize], values: Vec<f64>) -> Result<Tensor, EvalError> {
    Ok(ArrayD::from_shape_vec(IxDyn(shape), values)?)
}

/// Returns the broadcast shape of two operands, or `None` when incompatible.
pub fn broadcast_shape(left: &[usize], right: &[usize]) -> Option<Vec<usize>> {
    let ndim = left.len().max(right.len());
    let left_pad = ndim - left.len();
    let right_pad = ndim - right.len();

    let mut shape = Vec::with_capacity(ndim);
    for axis in 0..ndim {
        let l = if axis < left_pad { 1 } else { left[axis - left_pad] };
        let r = if axis < right_pad { 1 } else { right[axis - right_pad] };
        let extent = match (l, r) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            _ => return None,
        };
        shape.push(extent);
    }
    Some(shape)
}

/// Applies `f` elementwise over the broadcast of `left` and `right`.
pub fn zip_with<F>(
    op: &'static str,
    left: &Tensor,
    right: &Tensor,
    f: F,
) -> Result<Tensor, EvalError>
where
    F: Fn(f64, f64) -> f64,
{
    let shape = broadcast_shape(left.shape(), right.shape())
        .ok_or_else(|| shape_error(op, left, right))?;
    let l = left
        .broadcast(shape.as_slice())
        .ok_or_else(|| shape_error(op, left, right))?;
    let r = right
        .broadcast(shape.as_slice())
        .ok_or_else(|| shape_error(op, left, right))?;
    Ok(Zip::from(&l).and(&r).map_collect(|&a, &b| f(a, b)))
}

/// Matrix product for rank-1 and rank-2 operands.
///
/// Mirrors the usual rules: vector·vector is a dot product (rank 0),
/// matrix·vector and vector·matrix drop the vector axis.
pub fn matmul(left: &Tensor, right: &Tensor) -> Result<Tensor, EvalError> {
    match (left.ndim(), right.ndim()) {
        (1, 1) => {
            let l = left.view().into_dimensionality::<Ix1>()?;
            let r = right.view().into_dimensionality::<Ix1>()?;
            if l.len() != r.len() {
                return Err(shape_error("@", left, right));
            }
            Ok(scalar(l.dot(&r)))
        }
        (2, 2) => {
            let l = left.view().into_dimensionality::<Ix2>()?;
            let r = right.view().into_dimensionality::<Ix2>()?;
            if l.ncols() != r.nrows() {
                return Err(shape_error("@", left, right));
            }
            Ok(l.dot(&r).into_dyn())
        }
        (2, 1) => {
            let l = left.view().into_dimensionality::<Ix2>()?;
            let r = right.view().into_dimensionality::<Ix1>()?;
            if l.ncols() != r.len() {
                return Err(shape_error("@", left, right));
            }
            Ok(l.dot(&r).into_dyn())
        }
        (1, 2) => {
            let l = left.view().into_dimensionality::<Ix1>()?;
            let r = right.view().into_dimensionality::<Ix2>()?;
            if l.len() != r.nrows() {
                return Err(shape_error("@", left, right));
            }
            Ok(l.dot(&r).into_dyn())
        }
        _ => Err(shape_error("@", left, right)),
    }
}

/// Reverses all axes (the matrix transpose for rank 2).
pub fn transpose(tensor: &Tensor) -> Tensor {
    tensor.t().to_owned()
}

/// Mean over every element; empty tensors reduce to `0.0`.
pub fn mean(tensor: &Tensor) -> f64 {
    tensor.mean().unwrap_or(0.0)
}

fn shape_error(op: &'static str, left: &Tensor, right: &Tensor) -> EvalError {
    EvalError::Shape {
        op,
        left: left.shape().to_vec(),
        right: right.shape().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn broadcasts_trailing_dimensions() {
        assert_eq!(broadcast_shape(&[3, 1], &[4]), Some(vec![3, 4]));
        assert_eq!(broadcast_shape(&[], &[2, 2]), Some(vec![2, 2]));
        assert_eq!(broadcast_shape(&[2, 3], &[3, 2]), None);
    }

    #[test]
    fn zip_reports_shape_mismatch() {
        let a = arr1(&[1.0, 2.0, 3.0]).into_dyn();
        let b = arr1(&[1.0, 2.0]).into_dyn();
        let err = zip_with("+", &a, &b, |x, y| x + y).expect_err("shapes differ");
        match err {
            EvalError::Shape { op, left, right } => {
                assert_eq!(op, "+");
                assert_eq!(left, vec![3]);
                assert_eq!(right, vec![2]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn scalar_broadcasts_against_matrix() {
        let m = arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn();
        let out = zip_with("-", &scalar(10.0), &m, |x, y| x - y).expect("broadcast");
        assert_eq!(out, arr2(&[[9.0, 8.0], [7.0, 6.0]]).into_dyn());
    }

    #[test]
    fn matmul_covers_vector_and_matrix_ranks() {
        let m = arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn();
        let v = arr1(&[1.0, 1.0]).into_dyn();
        assert_eq!(matmul(&v, &v).unwrap(), scalar(2.0));
        assert_eq!(matmul(&m, &v).unwrap(), arr1(&[3.0, 7.0]).into_dyn());
        assert_eq!(matmul(&v, &m).unwrap(), arr1(&[4.0, 6.0]).into_dyn());
        assert_eq!(
            matmul(&m, &m).unwrap(),
            arr2(&[[7.0, 10.0], [15.0, 22.0]]).into_dyn()
        );
    }

    #[test]
    fn matmul_rejects_inner_dimension_mismatch() {
        let a = arr2(&[[1.0, 2.0, 3.0]]).into_dyn();
        let b = arr2(&[[1.0, 2.0]]).into_dyn();
        assert!(matches!(matmul(&a, &b), Err(EvalError::Shape { op: "@", .. })));
        assert!(matches!(
            matmul(&scalar(1.0), &b),
            Err(EvalError::Shape { .. })
        ));
    }

    #[test]
    fn mean_of_empty_tensor_is_zero() {
        let empty = Tensor::zeros(IxDyn(&[0, 3]));
        assert_eq!(mean(&empty), 0.0);
    }
}
