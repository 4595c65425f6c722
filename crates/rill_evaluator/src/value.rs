//! Runtime values.

use crate::error::EvaluationError;
use rill_ast::LiteralValue;
use rill_binder::{TypeSymbol, VariableSymbol};
use rill_core::collections::FxHashMap;
use std::fmt;

/// Storage for variable values, keyed by symbol identity.
pub type Variables = FxHashMap<VariableSymbol, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i32),
    Bool(bool),
    String(String),
    /// The result of a void call, or of a body that produced nothing.
    Unit,
}

impl Value {
    pub fn ty(&self) -> TypeSymbol {
        match self {
            Value::Int(_) => TypeSymbol::Int,
            Value::Bool(_) => TypeSymbol::Bool,
            Value::String(_) => TypeSymbol::String,
            Value::Unit => TypeSymbol::Void,
        }
    }

    pub fn as_int(&self) -> Result<i32, EvaluationError> {
        match self {
            Value::Int(value) => Ok(*value),
            other => Err(EvaluationError::TypeMismatch {
                expected: TypeSymbol::Int,
                found: other.ty(),
            }),
        }
    }

    pub fn as_bool(&self) -> Result<bool, EvaluationError> {
        match self {
            Value::Bool(value) => Ok(*value),
            other => Err(EvaluationError::TypeMismatch {
                expected: TypeSymbol::Bool,
                found: other.ty(),
            }),
        }
    }

    pub fn as_str(&self) -> Result<&str, EvaluationError> {
        match self {
            Value::String(value) => Ok(value),
            other => Err(EvaluationError::TypeMismatch {
                expected: TypeSymbol::String,
                found: other.ty(),
            }),
        }
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }
}

impl From<&LiteralValue> for Value {
    fn from(literal: &LiteralValue) -> Self {
        match literal {
            LiteralValue::Int(value) => Value::Int(*value),
            LiteralValue::Bool(value) => Value::Bool(*value),
            LiteralValue::String(value) => Value::String(value.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Bool(value) => f.write_str(if *value { "true" } else { "false" }),
            Value::String(value) => f.write_str(value),
            Value::Unit => Ok(()),
        }
    }
}
