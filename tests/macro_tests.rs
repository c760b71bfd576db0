//! Tests for the macro system

use mispli::{Error, Evaluator, Value};

fn eval_lisp(source: &str) -> mispli::Result<Value> {
    let mut evaluator = Evaluator::new();
    evaluator.eval_str(source)
}

fn render_of(source: &str) -> String {
    eval_lisp(source).unwrap().to_string()
}

#[test]
fn test_defmacro_returns_name() {
    assert_eq!(render_of("(defmacro ident (x) x)"), "ident");
}

#[test]
fn test_macro_receives_unevaluated_arguments() {
    let source = r#"
        (defmacro quote-it (x) (list 'quote x))
        (quote-it (this is not evaluated))
    "#;
    assert_eq!(render_of(source), "(this is not evaluated)");
}

#[test]
fn test_backquote_template_macro() {
    let source = r#"
        (defmacro swap (a b)
          `(let ((tmp ,a))
             (setq ,a ,b)
             (setq ,b tmp)))
        (setq x 1)
        (setq y 2)
        (swap x y)
        (list x y)
    "#;
    assert_eq!(render_of(source), "(2 1)");
}

#[test]
fn test_recursive_macro() {
    let source = r#"
        (defmacro my-and (&rest args)
          (if (null args)
              t
            (if (null (cdr args))
                (car args)
              `(if ,(car args) (my-and ,@(cdr args)) nil))))
        (list (my-and) (my-and 1 2 3) (my-and 1 nil 3))
    "#;
    assert_eq!(render_of(source), "(t 3 nil)");
}

#[test]
fn test_macroexpand_expands_one_step() {
    let source = r#"
        (defmacro my-and (&rest args)
          (if (null (cdr args))
              (car args)
            `(if ,(car args) (my-and ,@(cdr args)) nil)))
        (macroexpand '(my-and a b c))
    "#;
    assert_eq!(render_of(source), "(if a (my-and b c) nil)");
}

#[test]
fn test_macroexpand_leaves_other_forms() {
    assert_eq!(render_of("(macroexpand '(car x))"), "(car x)");
    assert_eq!(render_of("(macroexpand 'x)"), "x");
}

#[test]
fn test_when_matches_if_progn() {
    let mut evaluator = Evaluator::new();
    for test in ["t", "nil", "(> 2 1)", "(< 2 1)"] {
        let with_when = evaluator
            .eval_str(&format!("(setq n 0) (list (when {} (setq n 1) 2) n)", test))
            .unwrap();
        let with_if = evaluator
            .eval_str(&format!(
                "(setq n 0) (list (if {} (progn (setq n 1) 2)) n)",
                test
            ))
            .unwrap();
        assert_eq!(with_when, with_if, "when/if mismatch for {}", test);
    }
}

#[test]
fn test_unless() {
    assert_eq!(render_of("(unless nil 'ran)"), "ran");
    assert!(eval_lisp("(unless t 'ran)").unwrap().is_nil());
}

#[test]
fn test_incf_decf_push_pop() {
    let source = r#"
        (setq n 5)
        (incf n)
        (incf n 4)
        (decf n 2)
        (setq stack nil)
        (push 'a stack)
        (push 'b stack)
        (list n (pop stack) stack)
    "#;
    assert_eq!(render_of(source), "(8 b (a))");
}

#[test]
fn test_macro_expansion_runs_on_every_call() {
    let mut evaluator = Evaluator::new();
    evaluator
        .eval_str("(defmacro noisy () (setq expansions (1+ expansions)) nil)")
        .unwrap();
    evaluator.eval_str("(setq expansions 0)").unwrap();
    evaluator
        .eval_str("(defun use-it () (noisy)) (use-it) (use-it) (use-it)")
        .unwrap();
    assert_eq!(evaluator.eval_str("expansions").unwrap(), Value::Number(3.0));
    assert_eq!(
        evaluator.macros().get("noisy").unwrap().expansion_count(),
        3
    );
}

#[test]
fn test_macro_shadows_function_of_same_name() {
    let source = r#"
        (defun twice (x) (* 2 x))
        (defmacro twice (x) `(list ,x ,x))
        (twice 3)
    "#;
    assert_eq!(render_of(source), "(3 3)");
}

#[test]
fn test_macro_with_optional_parameter() {
    let source = r#"
        (defmacro with-default (x &optional (fallback ''none))
          `(or ,x ,fallback))
        (list (with-default nil) (with-default 1 2))
    "#;
    assert_eq!(render_of(source), "(none 1)");
}

#[test]
fn test_macro_arity_error() {
    let result = eval_lisp("(defmacro one (x) x) (one)");
    assert!(matches!(
        result,
        Err(Error::ArityError { ref name, got: 0, .. }) if name == "one"
    ));
}

#[test]
fn test_splice_of_non_list_is_an_error() {
    let result = eval_lisp("(setq v 5) `(a ,@v)");
    assert!(matches!(result, Err(Error::TypeError { .. })));
}
