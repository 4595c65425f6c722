//! rill_evaluator: Tree-walking evaluation of lowered programs.
//!
//! The evaluator walks the flat label/goto form produced by the lowerer. It
//! never sees structured control flow; encountering any is an
//! [`EvaluationError::UnexpectedNode`].

mod error;
mod evaluator;
mod host;
mod value;

pub use error::EvaluationError;
pub use evaluator::{evaluate, Evaluator, EvaluatorOptions};
pub use host::{ConsoleHost, Host};
pub use value::{Value, Variables};
