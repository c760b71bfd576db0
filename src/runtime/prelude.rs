//! Macros written in Lisp and loaded into every new session

use crate::error::Result;
use crate::runtime::LispEvaluator;

/// Source of the prelude
pub const PRELUDE: &str = r#"
(defmacro when (test &rest body)
  `(if ,test (progn ,@body)))

(defmacro unless (test &rest body)
  `(if ,test nil ,@body))

(defmacro incf (place &optional (delta 1))
  `(setq ,place (+ ,place ,delta)))

(defmacro decf (place &optional (delta 1))
  `(setq ,place (- ,place ,delta)))

(defmacro push (item place)
  `(setq ,place (cons ,item ,place)))

(defmacro pop (place)
  `(prog1 (car ,place) (setq ,place (cdr ,place))))
"#;

/// Evaluates the prelude in `eval`
pub fn load(eval: &mut LispEvaluator) -> Result<()> {
    eval.eval_str(PRELUDE).map(|_| ())
}
