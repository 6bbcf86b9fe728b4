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

//! `std::ops` overloads delegating to the builder functions.
//!
//! Left operands may be `Expr`, `&Expr`, `Variable` or `&Variable` with any
//! [`IntoExpr`] on the right. Reflected forms (`2.0 - x`, `tensor * x`) keep
//! the written operand order. Only `f64` and `i32` literals are reflected, so
//! unsuffixed literals such as `2.0 - x` infer without annotations.

use super::{Expr, IntoExpr, Variable, add, div, mul, neg, sub};
use crate::tensor::Tensor;
use std::ops::{Add, Div, Mul, Neg, Sub};

macro_rules! forward_binary {
    ($trait:ident, $method:ident, $builder:ident, $($lhs:ty),+) => {
        $(
            impl<R: IntoExpr> $trait<R> for $lhs {
                type Output = Expr;

                fn $method(self, rhs: R) -> Expr {
                    $builder(self, rhs)
                }
            }
        )+
    };
}

macro_rules! reflected_binary {
    ($trait:ident, $method:ident, $builder:ident, $lit:ty => $($rhs:ty),+) => {
        $(
            impl $trait<$rhs> for $lit {
                type Output = Expr;

                fn $method(self, rhs: $rhs) -> Expr {
                    $builder(self, rhs)
                }
            }
        )+
    };
}

macro_rules! all_binary {
    ($($trait:ident, $method:ident, $builder:ident);+ $(;)?) => {
        $(
            forward_binary!($trait, $method, $builder, Expr, &Expr, Variable, &Variable);
            reflected_binary!($trait, $method, $builder, f64 => Expr, &Expr, Variable, &Variable);
            reflected_binary!($trait, $method, $builder, i32 => Expr, &Expr, Variable, &Variable);
            reflected_binary!($trait, $method, $builder, Tensor => Expr, &Expr, Variable, &Variable);
        )+
    };
}

all_binary! {
    Add, add, add;
    Sub, sub, sub;
    Mul, mul, mul;
    Div, div, div;
}

macro_rules! forward_neg {
    ($($ty:ty),+) => {
        $(
            impl Neg for $ty {
                type Output = Expr;

                fn neg(self) -> Expr {
                    neg(self)
                }
            }
        )+
    };
}

forward_neg!(Expr, &Expr, Variable, &Variable);

#[cfg(test)]
mod tests {
    use crate::data::DataDict;
    use crate::evaluator::Evaluator;
    use crate::expr::Variable;
    use crate::tensor;
    use ndarray::arr1;

    #[test]
    fn reflected_subtraction_keeps_operand_order() {
        let x = Variable::new("x");
        let data = DataDict::new().with("x", arr1(&[1.0, 4.0]).into_dyn());
        let expr = 10.0 - &x;
        assert_eq!(expr.evaluate(&data).unwrap(), arr1(&[9.0, 6.0]).into_dyn());
        let expr = 3 - &x;
        assert_eq!(expr.evaluate(&data).unwrap(), arr1(&[2.0, -1.0]).into_dyn());
    }

    #[test]
    fn unsuffixed_float_literals_on_the_left() {
        let x = Variable::new("x");
        let v = Variable::with_value("v", 4.0);
        let data = DataDict::new().with("x", arr1(&[0.5, 1.0]).into_dyn());
        assert_eq!(
            (2.0 - &x).evaluate(&data).unwrap(),
            arr1(&[1.5, 1.0]).into_dyn()
        );
        assert_eq!((1.0 / v).evaluate(&data).unwrap(), tensor::scalar(0.25));
        assert_eq!(
            (0.5 * x.expr() + 1.0).evaluate(&data).unwrap(),
            arr1(&[1.25, 1.5]).into_dyn()
        );
    }

    #[test]
    fn mixed_operands_compose() {
        let x = Variable::new("x");
        let y = Variable::new("y");
        let shift = arr1(&[1.0, 1.0]).into_dyn();
        let expr = -(&x * 2.0) + shift / &y;
        let data = DataDict::new()
            .with("x", arr1(&[1.0, 2.0]).into_dyn())
            .with("y", arr1(&[0.5, 4.0]).into_dyn());
        assert_eq!(expr.evaluate(&data).unwrap(), arr1(&[0.0, -3.75]).into_dyn());
    }

    #[test]
    fn scalar_division_by_variable_default() {
        let x = Variable::new("x");
        let two = Variable::with_value("two", 2);
        let data = DataDict::new().with("x", arr1(&[3.0]).into_dyn());
        let expr = x / two;
        assert_eq!(expr.evaluate(&data).unwrap(), arr1(&[1.5]).into_dyn());
        assert_eq!(
            (1.0 / Variable::with_value("c", 4.0)).evaluate(&data).unwrap(),
            tensor::scalar(0.25)
        );
    }
}
