//! Tests for lexical closures and frame barriers

use mispli::{Error, Evaluator, Value};

fn eval_lisp(source: &str) -> mispli::Result<Value> {
    let mut evaluator = Evaluator::new();
    evaluator.eval_str(source)
}

fn render_of(source: &str) -> String {
    eval_lisp(source).unwrap().to_string()
}

#[test]
fn test_closure_ignores_later_unrelated_rebinding() {
    let source = r#"
        (let ((x 1))
          (defun f () x)
          (let ((x 2))
            (f)))
    "#;
    assert_eq!(eval_lisp(source).unwrap(), Value::Number(1.0));
}

#[test]
fn test_counter_mutates_captured_binding() {
    let source = r#"
        (defun make-counter ()
          (let ((n 0))
            (lambda () (setq n (+ n 1)))))
        (setq c (make-counter))
        (funcall c)
        (funcall c)
        (funcall c)
    "#;
    assert_eq!(eval_lisp(source).unwrap(), Value::Number(3.0));
}

#[test]
fn test_counters_are_independent() {
    let source = r#"
        (defun make-counter ()
          (let ((n 0))
            (lambda () (setq n (+ n 1)))))
        (setq a (make-counter))
        (setq b (make-counter))
        (funcall a)
        (funcall a)
        (list (funcall a) (funcall b))
    "#;
    assert_eq!(render_of(source), "(3 1)");
}

#[test]
fn test_closures_share_captured_frame() {
    let source = r#"
        (defun make-box (v)
          (list (lambda () v)
                (lambda (new) (setq v new))))
        (setq box (make-box 1))
        (funcall (cadr box) 99)
        (funcall (car box))
    "#;
    assert_eq!(eval_lisp(source).unwrap(), Value::Number(99.0));
}

#[test]
fn test_caller_frames_are_invisible() {
    let source = r#"
        (defun peek () secret)
        (defun caller () (let ((secret 42)) (peek)))
        (caller)
    "#;
    assert_eq!(
        eval_lisp(source),
        Err(Error::UnboundVariable {
            name: "secret".to_string()
        })
    );
}

#[test]
fn test_callee_parameters_shadow_globals() {
    let source = r#"
        (setq x 'global)
        (defun show (x) x)
        (list (show 'param) x)
    "#;
    assert_eq!(render_of(source), "(param global)");
}

#[test]
fn test_lambda_sees_enclosing_parameters() {
    let source = r#"
        (defun scale (k l)
          (mapcar (lambda (x) (* k x)) l))
        (scale 3 '(1 2 3))
    "#;
    assert_eq!(render_of(source), "(3 6 9)");
}

#[test]
fn test_literal_lambda_head_sees_enclosing_scope() {
    let source = r#"
        (let ((y 10))
          ((lambda (x) (+ x y)) 5))
    "#;
    assert_eq!(eval_lisp(source).unwrap(), Value::Number(15.0));
}

#[test]
fn test_let_star_sees_previous_bindings() {
    let source = r#"
        (let* ((a 1)
               (b (+ a 1))
               (c (* b 10)))
          (list a b c))
    "#;
    assert_eq!(render_of(source), "(1 2 20)");
}

#[test]
fn test_let_initializers_use_outer_bindings() {
    let source = r#"
        (let ((a 1))
          (let ((a 2)
                (b a))
            (list a b)))
    "#;
    assert_eq!(render_of(source), "(2 1)");
}

#[test]
fn test_setq_on_let_binding_leaves_global() {
    let source = r#"
        (setq v 'global)
        (let ((v 'local))
          (setq v 'changed))
        v
    "#;
    assert_eq!(render_of(source), "global");
}

#[test]
fn test_setq_of_unbound_name_creates_global() {
    let source = r#"
        (defun init () (setq fresh 5))
        (init)
        fresh
    "#;
    assert_eq!(eval_lisp(source).unwrap(), Value::Number(5.0));
}

#[test]
fn test_nested_closure_chain() {
    let source = r#"
        (defun adder (a)
          (lambda (b)
            (lambda (c) (+ a b c))))
        (funcall (funcall (adder 1) 10) 100)
    "#;
    assert_eq!(eval_lisp(source).unwrap(), Value::Number(111.0));
}

#[test]
fn test_stack_is_empty_after_calls() {
    let mut evaluator = Evaluator::new();
    evaluator
        .eval_str("(defun f (x) (let ((y x)) (lambda () y)))")
        .unwrap();
    evaluator.eval_str("(funcall (f 1))").unwrap();
    assert_eq!(evaluator.stack_height(), 0);
}
