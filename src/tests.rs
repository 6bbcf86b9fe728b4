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

//! Crate unit tests.

use super::*;
use ndarray::{arr1, arr2};
use proptest::prelude::*;

fn first_caret_column(pointer: &str) -> Option<usize> {
    pointer.chars().position(|ch| ch == '^').map(|idx| idx + 1)
}

fn assert_parse_error_case(case_name: &str, source: &str, expected_line: usize) {
    let err = parse_constraint(source).expect_err("parse should fail");
    assert_eq!(
        err.line, expected_line,
        "{case_name}: unexpected error line"
    );
    assert!(err.column > 0, "{case_name}: expected non-zero column");
    assert!(
        err.message.contains("Syntax error"),
        "{case_name}: unexpected message '{}'",
        err.message
    );

    let expected_snippet = source
        .lines()
        .nth(err.line.saturating_sub(1))
        .unwrap_or_default();
    assert_eq!(
        err.snippet, expected_snippet,
        "{case_name}: snippet should match source line"
    );
    assert!(
        err.pointer.contains('^'),
        "{case_name}: missing caret pointer"
    );
    assert_eq!(
        first_caret_column(&err.pointer),
        Some(err.column),
        "{case_name}: caret column mismatch"
    );
}

fn assert_close(got: &Tensor, expected: &Tensor) {
    assert_eq!(got.shape(), expected.shape());
    for (g, e) in got.iter().zip(expected.iter()) {
        assert!((g - e).abs() <= 1e-9 * (1.0 + e.abs()), "{g} != {e}");
    }
}

/// Shapes of rank 1 to 4 with small extents.
fn shape_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..=4, 1..=4)
}

fn tensor_of(shape: Vec<usize>) -> impl Strategy<Value = Tensor> {
    let len = shape.iter().product::<usize>();
    prop::collection::vec(-10.0f64..10.0, len)
        .prop_map(move |values| tensor::from_shape_vec(&shape, values).unwrap())
}

fn tensor_strategy() -> impl Strategy<Value = Tensor> {
    shape_strategy().prop_flat_map(tensor_of)
}

/// Three tensors sharing one shape.
fn tensor_triple() -> impl Strategy<Value = (Tensor, Tensor, Tensor)> {
    shape_strategy().prop_flat_map(|shape| {
        (
            tensor_of(shape.clone()),
            tensor_of(shape.clone()),
            tensor_of(shape),
        )
    })
}

fn xyz(x: &Tensor, y: &Tensor, z: &Tensor) -> DataDict {
    DataDict::new()
        .with("x", x.clone())
        .with("y", y.clone())
        .with("z", z.clone())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn addition_and_multiplication_commute((x, y, _) in tensor_triple()) {
        let data = xyz(&x, &y, &y);
        let vx = Variable::new("x");
        let vy = Variable::new("y");
        prop_assert_eq!((&vx + &vy).evaluate(&data)?, (&vy + &vx).evaluate(&data)?);
        prop_assert_eq!((&vx * &vy).evaluate(&data)?, (&vy * &vx).evaluate(&data)?);
    }

    #[test]
    fn subtraction_is_anti_commutative((x, y, _) in tensor_triple()) {
        let data = xyz(&x, &y, &y);
        let vx = Variable::new("x");
        let vy = Variable::new("y");
        let forward = (&vx - &vy).evaluate(&data)?;
        let backward = -(&vy - &vx);
        prop_assert_eq!(forward, backward.evaluate(&data)?);
    }

    #[test]
    fn reflected_operands_match_forward_forms(x in tensor_strategy(), c in -5.0f64..5.0) {
        let data = DataDict::new().with("x", x.clone());
        let vx = Variable::new("x");
        prop_assert_eq!((c + &vx).evaluate(&data)?, (&vx + c).evaluate(&data)?);
        prop_assert_eq!((c * &vx).evaluate(&data)?, (&vx * c).evaluate(&data)?);
        prop_assert_eq!((c - &vx).evaluate(&data)?, x.mapv(|v| c - v));
        prop_assert_eq!((x.clone() + &vx).evaluate(&data)?, &x + &x);
        prop_assert_eq!((x.clone() * &vx).evaluate(&data)?, &x * &x);
    }

    #[test]
    fn double_negation_is_identity(x in tensor_strategy()) {
        let data = DataDict::new().with("x", x.clone());
        let vx = Variable::new("x");
        prop_assert_eq!((-(-&vx)).evaluate(&data)?, x);
    }

    #[test]
    fn power_and_division_use_variable_defaults(x in tensor_strategy(), k in 1i32..4, d in 1.0f64..5.0) {
        let data = DataDict::new().with("x", x.clone());
        let vx = Variable::new("x");
        let power = Variable::with_value("k", k);
        let divisor = Variable::with_value("d", d);
        prop_assert_eq!(vx.expr().pow(&power).evaluate(&data)?, x.mapv(|v| v.powf(f64::from(k))));
        prop_assert_eq!((&vx / &divisor).evaluate(&data)?, x.mapv(|v| v / d));
    }

    #[test]
    fn sum_of_product_matches_direct_computation((x, y, z) in tensor_triple()) {
        let data = xyz(&x, &y, &z);
        let expr = Variable::new("x") + Variable::new("y") * Variable::new("z");
        prop_assert_eq!(expr.evaluate(&data)?, &x + &(&y * &z));
        let compiled = compile_expression("x + y * z", &Bindings::new()).unwrap();
        prop_assert_eq!(compiled.evaluate(&data)?, expr.evaluate(&data)?);
    }

    #[test]
    fn slicing_commutes_with_addition((x, y, _) in tensor_triple()) {
        let data = xyz(&x, &y, &y);
        let vx = Variable::new("x");
        let vy = Variable::new("y");
        let sliced_sum = (&vx + &vy).slice(1..);
        let sum_of_slices = vx.expr().slice(1..) + vy.expr().slice(1..);
        let got = sliced_sum.evaluate(&data)?;
        prop_assert_eq!(got.shape()[0], x.shape()[0] - 1);
        prop_assert_eq!(got, sum_of_slices.evaluate(&data)?);
    }

    #[test]
    fn satisfied_constraints_have_zero_violation(x in tensor_strategy()) {
        let data = DataDict::new()
            .with("x", x.clone())
            .with("above", x.mapv(|v| v + 2.0))
            .with("below", x.mapv(|v| v - 2.0));
        let vx = Variable::new("x");
        let above = Variable::new("above");
        let below = Variable::new("below");
        prop_assert_eq!(eq(&vx, &vx).violation(&data)?, 0.0);
        prop_assert_eq!(lt(&vx, &above).violation(&data)?, 0.0);
        prop_assert_eq!(le(&vx, &above).violation(&data)?, 0.0);
        prop_assert_eq!(gt(&vx, &below).violation(&data)?, 0.0);
        prop_assert_eq!(ge(&vx, &below).violation(&data)?, 0.0);
        prop_assert_eq!(le(&vx, &vx).violation(&data)?, 0.0);
    }

    #[test]
    fn violated_constraints_are_positive(x in tensor_strategy()) {
        let data = DataDict::new()
            .with("x", x.clone())
            .with("above", x.mapv(|v| v + 2.0))
            .with("below", x.mapv(|v| v - 2.0));
        let vx = Variable::new("x");
        let above = Variable::new("above");
        let below = Variable::new("below");
        prop_assert!(eq(&vx, &above).violation(&data)? > 1.0);
        prop_assert!(lt(&vx, &below).violation(&data)? > 1.0);
        prop_assert!(le(&vx, &below).violation(&data)? > 1.0);
        prop_assert!(gt(&vx, &above).violation(&data)? > 1.0);
        prop_assert!(ge(&vx, &above).violation(&data)? > 1.0);
    }

    #[test]
    fn squared_penalty_squares_the_violation((x, y, _) in tensor_triple()) {
        let data = xyz(&x, &y, &y);
        let base = lt(Variable::new("x"), Variable::new("y"));
        let squared = &base ^ 2;
        let v = base.violation(&data)?;
        prop_assert_eq!(squared.violation(&data)?, v.powi(2));
        prop_assert!(squared.violation(&data)? >= 0.0);
    }

    #[test]
    fn reflected_matmul_satisfies_transpose_law(
        rows in 1usize..4,
        inner in 1usize..4,
        cols in 1usize..4,
        seed in prop::collection::vec(-3.0f64..3.0, 18),
    ) {
        let x = tensor::from_shape_vec(&[rows, inner], seed[..rows * inner].to_vec()).unwrap();
        let t = tensor::from_shape_vec(&[inner, cols], seed[9..9 + inner * cols].to_vec()).unwrap();
        let data = DataDict::new()
            .with("x", x.clone())
            .with("xt", tensor::transpose(&x));
        // (x @ t)^T == t^T @ x^T, built from the reflected form.
        let direct = Variable::new("x").expr().matmul(t.clone());
        let reflected = Variable::new("xt").expr().rmatmul(tensor::transpose(&t));
        let expected = tensor::matmul(&x, &t).unwrap();
        assert_close(&direct.evaluate(&data)?, &expected);
        assert_close(&tensor::transpose(&reflected.evaluate(&data)?), &expected);
    }
}

#[test]
fn expressions_and_constraints_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Expr>();
    assert_send_sync::<Constraint>();
    assert_send_sync::<DataDict>();
    assert_send_sync::<Problem>();
}

#[test]
fn compiled_expression_respects_precedence() {
    let data = DataDict::new().with("x", arr1(&[3.0]).into_dyn());
    let bindings = Bindings::new();
    let cases = [
        ("-x ** 2", -9.0),
        ("2 ** -1 * x", 1.5),
        ("1 - x - 1", -3.0),
        ("2 * x + 1", 7.0),
        ("(1 + x) * 2", 8.0),
        ("x / 2 * 4", 6.0),
        ("relu(1 - x) + abs(-x)", 3.0),
    ];
    for (src, expected) in cases {
        let expr = compile_expression(src, &bindings).unwrap();
        assert_eq!(
            expr.evaluate(&data).unwrap(),
            arr1(&[expected]).into_dyn(),
            "{src}"
        );
    }
}

#[test]
fn compiled_expression_is_named_after_its_structure() {
    let expr = compile_expression("x + 2 * y", &Bindings::new()).unwrap();
    assert_eq!(expr.name(), "(x + (2 * y))");
}

#[test]
fn compiled_slices_and_matmul() {
    let a = arr2(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]).into_dyn();
    let b = arr2(&[[1.0, 0.0], [0.0, 2.0]]).into_dyn();
    let data = DataDict::new().with("a", a).with("b", b);
    let bindings = Bindings::new();

    let column = compile_expression("a[1:, 0]", &bindings).unwrap();
    assert_eq!(column.evaluate(&data).unwrap(), arr1(&[3.0, 5.0]).into_dyn());

    let stepped = compile_expression("a[::2, -1]", &bindings).unwrap();
    assert_eq!(stepped.evaluate(&data).unwrap(), arr1(&[2.0, 6.0]).into_dyn());

    let product = compile_expression("a @ b", &bindings).unwrap();
    assert_eq!(
        product.evaluate(&data).unwrap(),
        arr2(&[[1.0, 4.0], [3.0, 8.0], [5.0, 12.0]]).into_dyn()
    );
}

#[test]
fn bindings_become_variable_defaults() {
    let bindings = Bindings::new().with("limit", tensor::scalar(2.0));
    let c = compile_constraint("x <= limit", &bindings).unwrap();
    let data = DataDict::new().with("x", arr1(&[1.0, 4.0]).into_dyn());
    assert_eq!(c.violation(&data).unwrap(), 1.0);
    let overridden = data.with("limit", tensor::scalar(5.0));
    assert_eq!(c.violation(&overridden).unwrap(), 0.0);
}

#[test]
fn compiled_constraint_power_and_name() {
    let bindings = Bindings::new();
    let c = compile_constraint("(x <= 1)^2", &bindings).unwrap();
    assert_eq!(c.comparator(), Comparator::Le);
    assert_eq!(c.penalty_power(), 2);
    assert_eq!(c.name(), "(x <= 1)^2");
    let data = DataDict::new().with("x", arr1(&[4.0, 0.0]).into_dyn());
    assert_eq!(c.violation(&data).unwrap(), 2.25);

    let outer = compile_constraint("((x <= 1)^2)^3", &bindings).unwrap();
    assert_eq!(outer.penalty_power(), 3);

    let grouped = compile_constraint("(x + 1) > 0", &bindings).unwrap();
    assert_eq!(grouped.comparator(), Comparator::Gt);
    assert_eq!(grouped.penalty_power(), 1);
}

#[test]
fn supports_comments_and_newlines() {
    let src = "# keep the state bounded\nx + 1 // shifted\n  <= 3 # upper";
    let c = compile_constraint(src, &Bindings::new()).unwrap();
    let data = DataDict::new().with("x", arr1(&[4.0]).into_dyn());
    assert_eq!(c.violation(&data).unwrap(), 2.0);
}

#[test]
fn parse_tree_is_left_associative() {
    let expr = parse_expression("a - b - c").unwrap();
    let ast::ExprKind::Binary { op, left, right } = &expr.kind else {
        panic!("expected binary expression, got {:?}", expr.kind);
    };
    assert_eq!(*op, ast::BinOp::Sub);
    assert!(matches!(&right.kind, ast::ExprKind::Ident(name) if name == "c"));
    assert!(matches!(
        &left.kind,
        ast::ExprKind::Binary {
            op: ast::BinOp::Sub,
            ..
        }
    ));
    assert_eq!(expr.span.start, 0);
    assert_eq!(expr.span.column, 1);
}

#[test]
fn reports_parse_error_on_continuation_line() {
    let src = "x +\n  <= 2";
    let err = parse_constraint(src).expect_err("parse should fail");
    assert_eq!(err.line, 2);
    assert_eq!(err.column, 3);
    assert_eq!(err.snippet, "  <= 2");
    assert!(err.message.contains("expected expression"), "{}", err.message);
    assert_eq!(first_caret_column(&err.pointer), Some(err.column));
}

#[test]
fn reports_parse_errors_for_exhaustive_invalid_forms() {
    let cases = [
        ("missing right-hand side", "x <", 1),
        ("missing comparator", "x + 1", 1),
        ("dangling operator", "x + * y <= 1", 1),
        ("unclosed call", "relu(x <= 1", 1),
        ("unclosed subscript", "x[1:2 <= 1", 1),
        ("missing penalty power", "(x <= 1)^", 1),
        ("trailing garbage", "x <= 1 y", 1),
        ("empty input", "", 1),
        ("error on third line", "x\n+ y\n<= )", 3),
    ];
    for (case_name, source, line) in cases {
        assert_parse_error_case(case_name, source, line);
    }
}

#[test]
fn reports_unknown_function_with_location() {
    let err = compile_expression("1 + foo(x)", &Bindings::new()).expect_err("compile should fail");
    assert_eq!(err.line, 1);
    assert_eq!(err.column, 5);
    assert!(err.message.contains("Unknown function 'foo'"));
    assert_eq!(first_caret_column(&err.pointer), Some(err.column));
}

#[test]
fn reports_builtin_arity_with_location() {
    let src = "x <= relu(y, z)";
    let err = compile_constraint(src, &Bindings::new()).expect_err("compile should fail");
    assert_eq!(err.column, 6);
    assert_eq!(err.snippet, src);
    assert!(err.to_string().contains("relu expects 1 argument, found 2"));
    assert_eq!(first_caret_column(&err.pointer), Some(err.column));
}

#[test]
fn rejects_invalid_slices_and_powers() {
    let bindings = Bindings::new();
    let err = compile_expression("x[::0]", &bindings).expect_err("zero step");
    assert!(err.message.contains("Slice step must be positive"));

    let err = compile_expression("x[0.5]", &bindings).expect_err("fractional index");
    assert!(err.message.contains("Slice bounds must be integers"));
    assert_eq!(err.column, 3);

    let err = compile_constraint("(x <= 1)^1.5", &bindings).expect_err("fractional power");
    assert!(err.message.contains("Penalty power must be an integer"));
    assert_eq!(err.column, 10);
    assert_eq!(first_caret_column(&err.pointer), Some(err.column));
}

#[test]
fn problem_loss_prefixes_terms_with_split_name() {
    let x = Variable::new("x");
    let objective = Objective::new("x_mean", &x).weighted(0.5);
    let upper = le(&x, 1.0).named("upper").weighted(10.0);
    let problem = Problem::new(vec![objective], vec![upper]).unwrap();

    let data = DataDict::named("train").with("x", arr1(&[1.0, 3.0]).into_dyn());
    let out = problem.evaluate(&data).unwrap();
    assert_eq!(out.loss_key(), "train_loss");
    assert_eq!(out.get("train_x_mean"), Some(1.0));
    assert_eq!(out.get("train_upper"), Some(10.0));
    assert_eq!(out.loss(), 11.0);
}

#[test]
fn problem_built_from_text_ranks_violations() {
    let bindings = Bindings::new();
    let lower = compile_constraint("x >= 0", &bindings).unwrap().named("lower");
    let upper = compile_constraint("x <= 1", &bindings)
        .unwrap()
        .named("upper")
        .weighted(3.0);
    let problem = Problem::new(Vec::new(), vec![lower, upper]).unwrap();
    let data = DataDict::new().with("x", arr1(&[-1.0, 2.0]).into_dyn());

    let issues = problem.violations(&data, 5).unwrap();
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].name, "upper");
    assert_eq!(issues[1].name, "lower");
    assert!(issues[0].weighted > issues[1].weighted);
}

fn rust_sources(dir: &std::path::Path, out: &mut Vec<std::path::PathBuf>) {
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            rust_sources(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}

#[test]
fn license_header_is_closed_in_every_source_file() {
    let mut files = Vec::new();
    rust_sources(
        &std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("src"),
        &mut files,
    );
    assert!(!files.is_empty());
    for path in files {
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.first(), Some(&"/*"), "{}", path.display());
        let end = lines
            .iter()
            .position(|line| line.trim() == "SOFTWARE.")
            .unwrap_or_else(|| panic!("{}: missing license text", path.display()));
        assert_eq!(
            lines.get(end + 1).map(|line| line.trim()),
            Some("*/"),
            "{}: license header is not closed",
            path.display()
        );
    }
}
