//! Tests for error kinds and recovery between top-level inputs

use mispli::{Error, Evaluator, EvaluatorConfig, Value};

fn eval_lisp(source: &str) -> mispli::Result<Value> {
    let mut evaluator = Evaluator::new();
    evaluator.eval_str(source)
}

#[test]
fn test_setq_nil_and_t_are_rejected() {
    let mut evaluator = Evaluator::new();
    assert_eq!(
        evaluator.eval_str("(setq nil 1)"),
        Err(Error::ConstantAssignment {
            name: "nil".to_string()
        })
    );
    assert_eq!(
        evaluator.eval_str("(setq t 1)"),
        Err(Error::ConstantAssignment {
            name: "t".to_string()
        })
    );
    assert!(evaluator.eval_str("nil").unwrap().is_nil());
    assert_eq!(evaluator.eval_str("t").unwrap(), Value::t());
}

#[test]
fn test_defconst_cannot_be_reassigned() {
    let mut evaluator = Evaluator::new();
    evaluator.eval_str("(defconst limit 10)").unwrap();
    assert!(matches!(
        evaluator.eval_str("(setq limit 11)"),
        Err(Error::ConstantAssignment { .. })
    ));
    assert!(matches!(
        evaluator.eval_str("(let ((limit 1)) limit)"),
        Err(Error::ConstantAssignment { .. })
    ));
    assert_eq!(evaluator.eval_str("limit").unwrap(), Value::Number(10.0));
}

#[test]
fn test_keywords_cannot_be_assigned() {
    assert!(matches!(
        eval_lisp("(setq :key 1)"),
        Err(Error::ConstantAssignment { .. })
    ));
}

#[test]
fn test_unbound_and_undefined() {
    assert_eq!(
        eval_lisp("undefined-thing"),
        Err(Error::UnboundVariable {
            name: "undefined-thing".to_string()
        })
    );
    assert_eq!(
        eval_lisp("(undefined-fn 1 2)"),
        Err(Error::UndefinedFunction {
            name: "undefined-fn".to_string()
        })
    );
}

#[test]
fn test_type_errors() {
    assert!(matches!(eval_lisp("(car 5)"), Err(Error::TypeError { .. })));
    assert!(matches!(
        eval_lisp("(+ 1 \"two\")"),
        Err(Error::TypeError { .. })
    ));
    assert!(matches!(eval_lisp("(5 1)"), Err(Error::TypeError { .. })));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(eval_lisp("(/ 1 0)"), Err(Error::DivisionByZero));
}

#[test]
fn test_syntax_errors_are_positioned() {
    match eval_lisp("(+ 1\n  2") {
        Err(Error::SyntaxError { line, col, .. }) => {
            assert_eq!((line, col), (1, 1));
        }
        other => panic!("expected syntax error, got {:?}", other),
    }
    assert!(matches!(eval_lisp(")"), Err(Error::SyntaxError { .. })));
}

#[test]
fn test_malformed_special_form_names_the_form() {
    let err = eval_lisp("(if)").unwrap_err();
    assert!(matches!(err, Error::InvalidForm { ref form, .. } if form == "if"));
    assert!(err.to_string().starts_with("if:"));
}

#[test]
fn test_user_error() {
    assert_eq!(
        eval_lisp("(error \"bad value: \" 42)"),
        Err(Error::UserError("bad value: 42".to_string()))
    );
}

#[test]
fn test_infinite_recursion_is_stack_exhausted() {
    let mut evaluator = Evaluator::with_config(EvaluatorConfig { max_depth: 150 });
    evaluator.eval_str("(defun forever (n) (forever (+ n 1)))").unwrap();
    assert_eq!(
        evaluator.eval_str("(forever 0)"),
        Err(Error::StackExhausted { limit: 150 })
    );
    assert_eq!(evaluator.stack_height(), 0);
    assert_eq!(evaluator.eval_str("(+ 2 2)").unwrap(), Value::Number(4.0));
}

#[test]
fn test_default_depth_limit_fits_a_small_thread_stack() {
    let handle = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            let mut evaluator = Evaluator::new();
            evaluator
                .eval_str("(defun f (n) (let ((m (+ n 1))) (f m))) (f 0)")
                .map(|value| value.to_string())
        })
        .unwrap();
    let result = handle.join().unwrap();
    assert!(matches!(result, Err(Error::StackExhausted { .. })));
}

#[test]
fn test_default_config_recursion_in_test_thread() {
    let mut evaluator = Evaluator::with_config(EvaluatorConfig::default());
    let result =
        evaluator.eval_str("(defun down (n) (if (= n 0) 'bottom (down (- n 1)))) (down 300)");
    assert_eq!(result.unwrap().to_string(), "bottom");
    assert_eq!(
        evaluator.eval_str("(down 100000)"),
        Err(Error::StackExhausted { limit: 1000 })
    );
}

#[test]
fn test_releasing_a_large_list() {
    let mut evaluator = Evaluator::new();
    let source = r#"
        (setq l nil)
        (setq i 0)
        (while (< i 100000)
          (setq l (cons i l))
          (setq i (1+ i)))
        (length l)
    "#;
    assert_eq!(evaluator.eval_str(source).unwrap(), Value::Number(100000.0));
    assert!(evaluator.eval_str("(setq l nil)").unwrap().is_nil());
}

#[test]
fn test_bounded_recursion_within_limit() {
    let mut evaluator = Evaluator::with_config(EvaluatorConfig { max_depth: 200 });
    let source = r#"
        (defun count-down (n) (if (= n 0) 'done (count-down (- n 1))))
        (count-down 20)
    "#;
    assert_eq!(evaluator.eval_str(source).unwrap().to_string(), "done");
}

#[test]
fn test_side_effects_before_error_are_kept() {
    let mut evaluator = Evaluator::new();
    assert!(evaluator.eval_str("(setq kept 1) (car 'x)").is_err());
    assert_eq!(evaluator.eval_str("kept").unwrap(), Value::Number(1.0));
}
