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

//! Post-order evaluation of expression trees.

use super::{BinaryOp, Expr, ExprKind, UnaryOp, Variable};
use crate::data::DataDict;
use crate::errors::EvalError;
use crate::evaluator::Evaluator;
use crate::tensor::{self, Tensor};

impl Evaluator for Variable {
    type Output = Tensor;

    fn evaluate(&self, data: &DataDict) -> Result<Tensor, EvalError> {
        if let Some(value) = data.get(&self.key) {
            return Ok(value.clone());
        }
        self.default.clone().ok_or_else(|| EvalError::MissingKey {
            key: self.key.clone(),
        })
    }

    fn name(&self) -> &str {
        &self.key
    }
}

impl Evaluator for Expr {
    type Output = Tensor;

    fn evaluate(&self, data: &DataDict) -> Result<Tensor, EvalError> {
        // Operands are evaluated first, then the operator is applied. Shared
        // sub-trees are recomputed; there is no memoization.
        match self.kind() {
            ExprKind::Variable(var) => var.evaluate(data),
            ExprKind::Constant(constant) => Ok(constant.value().clone()),
            ExprKind::Unary { op, operand } => {
                let value = operand.evaluate(data)?;
                Ok(apply_unary(*op, value))
            }
            ExprKind::Binary { op, left, right } => {
                let left = left.evaluate(data)?;
                let right = right.evaluate(data)?;
                apply_binary(*op, &left, &right)
            }
            ExprKind::Slice { base, spec } => {
                let value = base.evaluate(data)?;
                spec.apply(&value)
            }
        }
    }

    fn name(&self) -> &str {
        Expr::name(self)
    }
}

fn apply_unary(op: UnaryOp, value: Tensor) -> Tensor {
    match op {
        UnaryOp::Neg => value.mapv_into(|v| -v),
        UnaryOp::Abs => value.mapv_into(f64::abs),
        UnaryOp::Relu => value.mapv_into(|v| v.max(0.0)),
        UnaryOp::Exp => value.mapv_into(f64::exp),
        UnaryOp::Ln => value.mapv_into(f64::ln),
        UnaryOp::Sin => value.mapv_into(f64::sin),
        UnaryOp::Cos => value.mapv_into(f64::cos),
        UnaryOp::Tanh => value.mapv_into(f64::tanh),
        UnaryOp::Sqrt => value.mapv_into(f64::sqrt),
        UnaryOp::Transpose => tensor::transpose(&value),
    }
}

fn apply_binary(op: BinaryOp, left: &Tensor, right: &Tensor) -> Result<Tensor, EvalError> {
    match op {
        BinaryOp::Add => tensor::zip_with("+", left, right, |a, b| a + b),
        BinaryOp::Sub => tensor::zip_with("-", left, right, |a, b| a - b),
        BinaryOp::Mul => tensor::zip_with("*", left, right, |a, b| a * b),
        BinaryOp::Div => tensor::zip_with("/", left, right, |a, b| a / b),
        BinaryOp::Pow => tensor::zip_with("**", left, right, f64::powf),
        BinaryOp::MatMul => tensor::matmul(left, right),
        BinaryOp::RMatMul => {
            // `left` already holds the transposed literal.
            let product = tensor::matmul(&tensor::transpose(right), left)?;
            Ok(tensor::transpose(&product))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{add, matmul, neg, pow, rmatmul};
    use ndarray::{arr1, arr2};

    #[test]
    fn variable_prefers_dictionary_over_default() {
        let k = Variable::with_value("k", 2.0);
        let data = DataDict::new().with("k", tensor::scalar(5.0));
        assert_eq!(k.evaluate(&data).unwrap(), tensor::scalar(5.0));
        assert_eq!(k.evaluate(&DataDict::new()).unwrap(), tensor::scalar(2.0));
    }

    #[test]
    fn missing_key_without_default_fails() {
        let expr = add(Variable::new("x"), 1.0);
        match expr.evaluate(&DataDict::new()) {
            Err(EvalError::MissingKey { key }) => assert_eq!(key, "x"),
            other => panic!("expected missing key, got {other:?}"),
        }
    }

    #[test]
    fn reflected_matmul_matches_written_order() {
        let a = arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn();
        let x = arr2(&[[0.5, -1.0], [2.0, 0.0]]).into_dyn();
        let data = DataDict::new().with("x", x.clone());

        let reflected = rmatmul(a.clone(), Variable::new("x"));
        let direct = matmul(a.clone(), Variable::new("x"));
        let expected = tensor::matmul(&a, &x).unwrap();
        assert_eq!(direct.evaluate(&data).unwrap(), expected);
        let got = reflected.evaluate(&data).unwrap();
        for (g, e) in got.iter().zip(expected.iter()) {
            assert!((g - e).abs() < 1e-12);
        }
    }

    #[test]
    fn unary_functions_apply_elementwise() {
        let x = Variable::new("x").expr();
        let data = DataDict::new().with("x", arr1(&[-1.0, 0.0, 4.0]).into_dyn());
        assert_eq!(
            x.relu().evaluate(&data).unwrap(),
            arr1(&[0.0, 0.0, 4.0]).into_dyn()
        );
        assert_eq!(
            x.abs().sqrt().evaluate(&data).unwrap(),
            arr1(&[1.0, 0.0, 2.0]).into_dyn()
        );
        assert_eq!(
            neg(&x).evaluate(&data).unwrap(),
            arr1(&[1.0, -0.0, -4.0]).into_dyn()
        );
    }

    #[test]
    fn power_accepts_variable_exponent() {
        let x = Variable::new("x");
        let k = Variable::with_value("k", 3);
        let data = DataDict::new().with("x", arr1(&[2.0, -1.0]).into_dyn());
        assert_eq!(
            pow(&x, &k).evaluate(&data).unwrap(),
            arr1(&[8.0, -1.0]).into_dyn()
        );
    }

    #[test]
    fn repeated_evaluation_is_pure() {
        let x = Variable::new("x");
        let expr = add(&x, &x).pow(2);
        let data = DataDict::new().with("x", arr1(&[1.5, 2.5]).into_dyn());
        let first = expr.evaluate(&data).unwrap();
        let second = expr.evaluate(&data).unwrap();
        assert_eq!(first, second);
    }
}
