use rill_binder::bound_tree::BoundNodeKind;
use rill_binder::TypeSymbol;
use thiserror::Error;

/// A fault raised while executing a lowered program.
///
/// A program that bound without diagnostics can still fail at runtime with
/// `DivideByZero` or `StackOverflow`. The other variants mean the bound
/// program itself is inconsistent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("Division by zero")]
    DivideByZero,
    #[error("Expected a value of type '{expected}' but found '{found}'")]
    TypeMismatch { expected: TypeSymbol, found: TypeSymbol },
    #[error("Label '{0}' is not defined in the current body")]
    UndefinedLabel(String),
    #[error("Unexpected node {0:?} in lowered program")]
    UnexpectedNode(BoundNodeKind),
    #[error("Function '{0}' has no body")]
    UndefinedFunctionBody(String),
    #[error("Variable '{0}' has no value")]
    UndefinedVariable(String),
    #[error("Cannot convert a value of type '{from}' to '{to}'")]
    InvalidConversion { from: TypeSymbol, to: TypeSymbol },
    #[error("Stack overflow: call depth exceeded {0}")]
    StackOverflow(usize),
}
