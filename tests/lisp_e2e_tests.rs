/// End-to-end integration tests
/// Demonstrates: Scanner → Parser → Evaluator working together
use mispli::lexer::SExprScanner;
use mispli::parser::SExprParser;
use mispli::runtime::{LispEvaluator, Value};

fn eval_lisp(source: &str) -> mispli::Result<Value> {
    let mut evaluator = LispEvaluator::new();

    // Lex
    let mut scanner = SExprScanner::new(source);
    let tokens = scanner.scan_tokens()?;

    // Parse into the evaluator's own symbol table
    let program = evaluator.read_tokens(tokens)?;

    // Evaluate
    evaluator.execute(&program)
}

fn render_of(source: &str) -> String {
    eval_lisp(source).unwrap().to_string()
}

#[test]
fn test_e2e_simple_arithmetic() {
    assert_eq!(eval_lisp("(+ 1 2 3)").unwrap(), Value::Number(6.0));
}

#[test]
fn test_e2e_identity_elements() {
    assert_eq!(eval_lisp("(+)").unwrap(), Value::Number(0.0));
    assert_eq!(eval_lisp("(*)").unwrap(), Value::Number(1.0));
    assert_eq!(eval_lisp("(- 7)").unwrap(), Value::Number(-7.0));
}

#[test]
fn test_e2e_atoms_evaluate_to_themselves() {
    assert_eq!(eval_lisp("42").unwrap(), Value::Number(42.0));
    assert_eq!(eval_lisp("-1.5").unwrap(), Value::Number(-1.5));
    assert_eq!(eval_lisp("\"text\"").unwrap(), Value::string("text"));
}

#[test]
fn test_e2e_quote_returns_structure() {
    assert_eq!(render_of("'(a (b . c) \"s\" 1)"), "(a (b . c) \"s\" 1)");
    assert_eq!(render_of("(quote (quote x))"), "(quote x)");
}

#[test]
fn test_e2e_if() {
    assert_eq!(eval_lisp("(if nil 1 2)").unwrap(), Value::Number(2.0));
    assert_eq!(eval_lisp("(if t 1 2)").unwrap(), Value::Number(1.0));
    assert_eq!(eval_lisp("(if t 1)").unwrap(), Value::Number(1.0));
    assert!(eval_lisp("(if nil 1)").unwrap().is_nil());
}

#[test]
fn test_e2e_variables() {
    let source = r#"
        (setq x 10)
        (setq y 20)
        (+ x y)
    "#;
    assert_eq!(eval_lisp(source).unwrap(), Value::Number(30.0));
}

#[test]
fn test_e2e_mutation() {
    let source = r#"
        (defvar counter 0)
        (setq counter (+ counter 1))
        (setq counter (+ counter 1))
        counter
    "#;
    assert_eq!(eval_lisp(source).unwrap(), Value::Number(2.0));
}

#[test]
fn test_e2e_recursive_function() {
    let source = r#"
        (defun factorial (n)
          "Product of 1..n"
          (if (<= n 1)
              1
              (* n (factorial (- n 1)))))
        (factorial 10)
    "#;
    assert_eq!(eval_lisp(source).unwrap(), Value::Number(3628800.0));
}

#[test]
fn test_e2e_while_loop() {
    let source = r#"
        (setq i 0)
        (setq acc nil)
        (while (< i 3)
          (setq acc (cons i acc))
          (setq i (1+ i)))
        (reverse acc)
    "#;
    assert_eq!(render_of(source), "(0 1 2)");
}

#[test]
fn test_e2e_list_processing() {
    let source = r#"
        (defun sum-list (l)
          (if (null l) 0 (+ (car l) (sum-list (cdr l)))))
        (sum-list (mapcar (lambda (x) (* x x)) '(1 2 3 4)))
    "#;
    assert_eq!(eval_lisp(source).unwrap(), Value::Number(30.0));
}

#[test]
fn test_e2e_cond_dispatch() {
    let source = r#"
        (defun classify (n)
          (cond ((< n 0) 'negative)
                ((= n 0) 'zero)
                (t 'positive)))
        (list (classify -3) (classify 0) (classify 9))
    "#;
    assert_eq!(render_of(source), "(negative zero positive)");
}

#[test]
fn test_e2e_destructive_list_operations() {
    let source = r#"
        (setq cell (list 1 2 3))
        (setcar cell 'one)
        (setcdr (cdr cell) '(three))
        cell
    "#;
    assert_eq!(render_of(source), "(one 2 three)");
}

#[test]
fn test_e2e_circular_list_is_rendered() {
    let source = r#"
        (setq ring (list 1 2))
        (setcdr (cdr ring) ring)
        (equal ring ring)
    "#;
    assert_eq!(render_of(source), "t");

    let printed = render_of("(setq ring (list 1 2)) (setcdr (cdr ring) ring) ring");
    assert!(printed.contains("..."));
}

#[test]
fn test_e2e_constants() {
    let source = r#"
        (defconst pi-ish 3)
        (* pi-ish 2)
    "#;
    assert_eq!(eval_lisp(source).unwrap(), Value::Number(6.0));
}

#[test]
fn test_e2e_symbol_namespaces_are_independent() {
    let source = r#"
        (setq list-of 'variable)
        (defun list-of () 'function)
        (list list-of (list-of))
    "#;
    assert_eq!(render_of(source), "(variable function)");
}
