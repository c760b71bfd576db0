//! Tests for &optional and &rest parameters

use mispli::{Error, Evaluator, Value};

fn eval_lisp(source: &str) -> mispli::Result<Value> {
    let mut evaluator = Evaluator::new();
    evaluator.eval_str(source)
}

fn render_of(source: &str) -> String {
    eval_lisp(source).unwrap().to_string()
}

const MIXED: &str = "(defun f (a &optional (b 5) &rest r) (list a b r))";

#[test]
fn test_optional_default_and_empty_rest() {
    assert_eq!(render_of(&format!("{} (f 1)", MIXED)), "(1 5 nil)");
}

#[test]
fn test_optional_supplied_and_rest_collected() {
    assert_eq!(render_of(&format!("{} (f 1 2 3 4)", MIXED)), "(1 2 (3 4))");
}

#[test]
fn test_optional_without_default_is_nil() {
    let source = r#"
        (defun g (a &optional b) (list a b))
        (g 1)
    "#;
    assert_eq!(render_of(source), "(1 nil)");
}

#[test]
fn test_optional_default_sees_earlier_parameters() {
    let source = r#"
        (defun h (a &optional (b (* a 2))) (list a b))
        (list (h 3) (h 3 4))
    "#;
    assert_eq!(render_of(source), "((3 6) (3 4))");
}

#[test]
fn test_rest_only() {
    let source = r#"
        (defun count-args (&rest args) (length args))
        (list (count-args) (count-args 1 2 3))
    "#;
    assert_eq!(render_of(source), "(0 3)");
}

#[test]
fn test_rest_with_apply() {
    let source = r#"
        (defun sum (&rest nums) (apply #'+ nums))
        (sum 1 2 3 4)
    "#;
    assert_eq!(eval_lisp(source).unwrap(), Value::Number(10.0));
}

#[test]
fn test_too_few_arguments() {
    let result = eval_lisp(&format!("{} (f)", MIXED));
    assert_eq!(
        result,
        Err(Error::ArityError {
            name: "f".to_string(),
            expected: "at least 1".to_string(),
            got: 0,
        })
    );
}

#[test]
fn test_too_many_arguments() {
    let source = r#"
        (defun pair (a &optional b) (list a b))
        (pair 1 2 3)
    "#;
    assert_eq!(
        eval_lisp(source),
        Err(Error::ArityError {
            name: "pair".to_string(),
            expected: "between 1 and 2".to_string(),
            got: 3,
        })
    );
}

#[test]
fn test_exact_arity_message() {
    let source = r#"
        (defun two (a b) (+ a b))
        (two 1)
    "#;
    let err = eval_lisp(source).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Wrong number of arguments for two: expected exactly 2, got 1"
    );
}

#[test]
fn test_lambda_arity_uses_lambda_name() {
    let result = eval_lisp("(funcall (lambda (x) x))");
    assert!(matches!(
        result,
        Err(Error::ArityError { ref name, .. }) if name == "lambda"
    ));
}

#[test]
fn test_malformed_parameter_list() {
    let result = eval_lisp("(defun bad (&rest) nil)");
    assert!(result.is_err());
    let result = eval_lisp("(defun bad (a &optional) nil) (bad 1)");
    // An empty &optional section is accepted
    assert!(result.unwrap().is_nil());
}
