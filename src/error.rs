//! Error types for the mispli interpreter

use thiserror::Error;

/// Interpreter errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Reader errors
    /// Syntax error encountered while reading source text
    ///
    /// **Triggered by:** unterminated lists or strings, stray `)`, malformed numbers
    /// **Example:** `(if (> x 10)` (missing closing parenthesis)
    #[error("Syntax error at line {line}, column {col}: {message}")]
    SyntaxError {
        /// Line number where error occurred
        line: usize,
        /// Column number where error occurred
        col: usize,
        /// Error description
        message: String,
    },

    // Runtime errors
    /// Wrong number of arguments for a function, macro or primitive
    ///
    /// **Example:** `(defun f (a b) a) (f 1)`
    #[error("Wrong number of arguments for {name}: expected {expected}, got {got}")]
    ArityError {
        /// Callee name (`lambda` for anonymous closures)
        name: String,
        /// Expected count, e.g. `exactly 2` or `at least 1`
        expected: String,
        /// Number of arguments actually supplied
        got: usize,
    },

    /// Type mismatch error
    ///
    /// **Triggered by:** an operation expecting one kind of value receiving another
    /// **Example:** `(+ "hello" 5)`, `(car 3)`
    #[error("Type error: expected {expected}, got {got}")]
    TypeError {
        /// Expected type
        expected: String,
        /// Rendering or type of the value actually received
        got: String,
    },

    /// Reference to a symbol with neither a constant nor a variable binding
    #[error("Void variable: {name}")]
    UnboundVariable {
        /// Variable name
        name: String,
    },

    /// Call of a symbol with no function binding
    #[error("Void function: {name}")]
    UndefinedFunction {
        /// Function name
        name: String,
    },

    /// Attempt to rebind a constant (`nil`, `t`, keywords, `defconst` names)
    #[error("Attempt to set a constant symbol: {name}")]
    ConstantAssignment {
        /// Constant name
        name: String,
    },

    /// Evaluation nested deeper than the configured maximum
    #[error("Stack exhausted (max depth: {limit})")]
    StackExhausted {
        /// Configured maximum depth
        limit: usize,
    },

    /// Malformed arguments to a special form, annotated with the form name
    #[error("{form}: {message}")]
    InvalidForm {
        /// Special form name
        form: String,
        /// What was wrong with the arguments
        message: String,
    },

    /// Malformed form detected before the dispatcher knows the form name
    #[error("Malformed form: {0}")]
    Malformed(String),

    /// Division by zero error
    ///
    /// **Example:** `(/ 10 0)`, `(% 5 0)`
    #[error("Division by zero")]
    DivisionByZero,

    /// Failure writing to the host output sink
    #[error("I/O error: {0}")]
    Io(String),

    // User-defined
    /// Error raised explicitly by a program through `error`
    #[error("User error: {0}")]
    UserError(String),
}

impl Error {
    /// Create a malformed-form error with a message
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::Malformed(msg.into())
    }

    /// Create a type error from an expected description and the offending rendering
    pub fn type_error(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::TypeError {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Attach a special form's name to a malformed-form error.
    ///
    /// Any other error kind passes through unchanged.
    pub fn in_form(self, form: &str) -> Self {
        match self {
            Error::Malformed(message) => Error::InvalidForm {
                form: form.to_string(),
                message,
            },
            other => other,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Result type for interpreter operations
pub type Result<T> = std::result::Result<T, Error>;
