//! Executes lowered bound programs.

use crate::error::EvaluationError;
use crate::host::Host;
use crate::value::{Value, Variables};
use rill_binder::bound_tree::*;
use rill_binder::operators::{BoundBinaryOperatorKind, BoundUnaryOperatorKind};
use rill_binder::{BoundLabel, BoundProgram, BuiltinFunction, TypeSymbol, VariableSymbol};
use rill_core::collections::FxHashMap;
use tracing::{debug, trace};

/// Remaining native stack below which a call moves onto a fresh segment.
const STACK_RED_ZONE: usize = 128 * 1024;

/// Size of each stack segment allocated for nested calls.
const STACK_SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Tuning knobs for embedders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorOptions {
    /// Maximum nesting of user function calls before `StackOverflow`.
    pub max_call_depth: usize,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self { max_call_depth: 256 }
    }
}

/// A tree-walking evaluator over one [`BoundProgram`].
///
/// Globals live in the caller's [`Variables`] so they survive across REPL
/// submissions. Locals and parameters live in a stack of frames; the bottom
/// frame holds hidden locals of the top-level block such as a `for` loop's
/// upper bound.
pub struct Evaluator<'a> {
    program: &'a BoundProgram,
    globals: &'a mut Variables,
    host: &'a mut dyn Host,
    options: EvaluatorOptions,
    frames: Vec<Variables>,
}

impl<'a> Evaluator<'a> {
    pub fn new(program: &'a BoundProgram, globals: &'a mut Variables, host: &'a mut dyn Host) -> Self {
        Self::with_options(program, globals, host, EvaluatorOptions::default())
    }

    pub fn with_options(
        program: &'a BoundProgram,
        globals: &'a mut Variables,
        host: &'a mut dyn Host,
        options: EvaluatorOptions,
    ) -> Self {
        Self {
            program,
            globals,
            host,
            options,
            frames: vec![Variables::default()],
        }
    }

    /// Run the program's top-level block and return its last value.
    pub fn evaluate(&mut self) -> Result<Value, EvaluationError> {
        let program = self.program;
        debug!(
            statements = program.statement.statements.len(),
            functions = program.functions.len(),
            "evaluating program"
        );
        let value = self.evaluate_body(&program.statement)?;
        debug!(value = %value, "evaluation finished");
        Ok(value)
    }

    fn evaluate_body(&mut self, body: &BoundBlockStatement) -> Result<Value, EvaluationError> {
        let statements = &body.statements;
        let mut labels: FxHashMap<&BoundLabel, usize> = FxHashMap::default();
        for (index, statement) in statements.iter().enumerate() {
            if let BoundStatement::Label(label) = statement {
                labels.insert(label, index + 1);
            }
        }

        let jump = |label: &BoundLabel| -> Result<usize, EvaluationError> {
            labels
                .get(label)
                .copied()
                .ok_or_else(|| EvaluationError::UndefinedLabel(label.name().to_string()))
        };

        let mut last_value = Value::Unit;
        let mut index = 0;
        while index < statements.len() {
            match &statements[index] {
                BoundStatement::VariableDeclaration(n) => {
                    let value = self.evaluate_expression(&n.initializer)?;
                    self.assign(&n.variable, value.clone());
                    last_value = value;
                    index += 1;
                }
                BoundStatement::Expression(expression) => {
                    last_value = self.evaluate_expression(expression)?;
                    index += 1;
                }
                BoundStatement::Label(_) => index += 1,
                BoundStatement::Goto(label) => {
                    trace!(label = label.name(), "goto");
                    index = jump(label)?;
                }
                BoundStatement::ConditionalGoto(n) => {
                    let condition = self.evaluate_expression(&n.condition)?.as_bool()?;
                    index = if condition == n.jump_if_true { jump(&n.label)? } else { index + 1 };
                }
                BoundStatement::Return(expression) => {
                    last_value = match expression {
                        Some(expression) => self.evaluate_expression(expression)?,
                        None => Value::Unit,
                    };
                    return Ok(last_value);
                }
                other => return Err(EvaluationError::UnexpectedNode(other.kind())),
            }
        }
        Ok(last_value)
    }

    // ========================================================================
    // Variables
    // ========================================================================

    fn assign(&mut self, variable: &VariableSymbol, value: Value) {
        if variable.is_global() {
            self.globals.insert(variable.clone(), value);
        } else if let Some(frame) = self.frames.last_mut() {
            frame.insert(variable.clone(), value);
        }
    }

    fn lookup(&self, variable: &VariableSymbol) -> Result<Value, EvaluationError> {
        let storage = if variable.is_global() {
            Some(&*self.globals)
        } else {
            self.frames.last()
        };
        storage
            .and_then(|variables| variables.get(variable))
            .cloned()
            .ok_or_else(|| EvaluationError::UndefinedVariable(variable.name().to_string()))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn evaluate_expression(&mut self, expression: &BoundExpression) -> Result<Value, EvaluationError> {
        match expression {
            BoundExpression::Literal(value) => Ok(Value::from(value)),
            BoundExpression::Variable(variable) => self.lookup(variable),
            BoundExpression::Assignment(n) => {
                let value = self.evaluate_expression(&n.expression)?;
                self.assign(&n.variable, value.clone());
                Ok(value)
            }
            BoundExpression::Unary(n) => self.evaluate_unary_expression(n),
            BoundExpression::Binary(n) => self.evaluate_binary_expression(n),
            BoundExpression::Call(n) => self.evaluate_call_expression(n),
            BoundExpression::Conversion(n) => self.evaluate_conversion_expression(n),
            BoundExpression::Error => Err(EvaluationError::UnexpectedNode(expression.kind())),
        }
    }

    fn evaluate_unary_expression(&mut self, node: &BoundUnaryExpression) -> Result<Value, EvaluationError> {
        let operand = self.evaluate_expression(&node.operand)?;
        Ok(match node.op.kind {
            BoundUnaryOperatorKind::Identity => Value::Int(operand.as_int()?),
            BoundUnaryOperatorKind::Negation => Value::Int(operand.as_int()?.wrapping_neg()),
            BoundUnaryOperatorKind::LogicalNegation => Value::Bool(!operand.as_bool()?),
            BoundUnaryOperatorKind::OnesComplement => Value::Int(!operand.as_int()?),
        })
    }

    /// Both operands are always evaluated, `&&` and `||` included.
    fn evaluate_binary_expression(&mut self, node: &BoundBinaryExpression) -> Result<Value, EvaluationError> {
        use BoundBinaryOperatorKind as Op;

        let left = self.evaluate_expression(&node.left)?;
        let right = self.evaluate_expression(&node.right)?;

        let value = match (node.op.kind, &left, &right) {
            (Op::Equals, _, _) => Value::Bool(left == right),
            (Op::NotEquals, _, _) => Value::Bool(left != right),

            (Op::Addition, Value::Int(l), Value::Int(r)) => Value::Int(l.wrapping_add(*r)),
            (Op::Addition, Value::String(l), Value::String(r)) => Value::String(format!("{}{}", l, r)),
            (Op::Subtraction, Value::Int(l), Value::Int(r)) => Value::Int(l.wrapping_sub(*r)),
            (Op::Multiplication, Value::Int(l), Value::Int(r)) => Value::Int(l.wrapping_mul(*r)),
            (Op::Division, Value::Int(_), Value::Int(0)) => return Err(EvaluationError::DivideByZero),
            (Op::Division, Value::Int(l), Value::Int(r)) => Value::Int(l.wrapping_div(*r)),

            (Op::BitwiseAnd, Value::Int(l), Value::Int(r)) => Value::Int(l & r),
            (Op::BitwiseOr, Value::Int(l), Value::Int(r)) => Value::Int(l | r),
            (Op::BitwiseXor, Value::Int(l), Value::Int(r)) => Value::Int(l ^ r),
            (Op::BitwiseAnd | Op::LogicalAnd, Value::Bool(l), Value::Bool(r)) => Value::Bool(*l & *r),
            (Op::BitwiseOr | Op::LogicalOr, Value::Bool(l), Value::Bool(r)) => Value::Bool(*l | *r),
            (Op::BitwiseXor, Value::Bool(l), Value::Bool(r)) => Value::Bool(*l ^ *r),

            (Op::Less, Value::Int(l), Value::Int(r)) => Value::Bool(l < r),
            (Op::LessOrEquals, Value::Int(l), Value::Int(r)) => Value::Bool(l <= r),
            (Op::Greater, Value::Int(l), Value::Int(r)) => Value::Bool(l > r),
            (Op::GreaterOrEquals, Value::Int(l), Value::Int(r)) => Value::Bool(l >= r),

            _ => {
                let found = if left.ty() != node.op.left_type { left.ty() } else { right.ty() };
                return Err(EvaluationError::TypeMismatch {
                    expected: node.op.left_type,
                    found,
                });
            }
        };
        Ok(value)
    }

    fn evaluate_conversion_expression(&mut self, node: &BoundConversionExpression) -> Result<Value, EvaluationError> {
        let value = self.evaluate_expression(&node.expression)?;
        match (node.ty, value) {
            (TypeSymbol::String, value @ (Value::Int(_) | Value::Bool(_))) => Ok(Value::String(value.to_string())),
            (TypeSymbol::String, value @ Value::String(_))
            | (TypeSymbol::Int, value @ Value::Int(_))
            | (TypeSymbol::Bool, value @ Value::Bool(_)) => Ok(value),
            (to, value) => Err(EvaluationError::InvalidConversion { from: value.ty(), to }),
        }
    }

    fn evaluate_call_expression(&mut self, node: &BoundCallExpression) -> Result<Value, EvaluationError> {
        if let Some(builtin) = node.function.builtin_kind() {
            return self.evaluate_builtin(builtin, &node.arguments);
        }

        let mut frame = Variables::default();
        for (parameter, argument) in node.function.parameters().iter().zip(&node.arguments) {
            let value = self.evaluate_expression(argument)?;
            frame.insert(parameter.clone(), value);
        }

        let depth = self.frames.len();
        if depth > self.options.max_call_depth {
            return Err(EvaluationError::StackOverflow(self.options.max_call_depth));
        }

        let program = self.program;
        let body = program
            .functions
            .get(&node.function)
            .ok_or_else(|| EvaluationError::UndefinedFunctionBody(node.function.name().to_string()))?;

        trace!(function = node.function.name(), depth, "call");
        self.frames.push(frame);
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || {
            self.evaluate_body(body)
        });
        self.frames.pop();
        result
    }

    fn evaluate_builtin(
        &mut self,
        builtin: BuiltinFunction,
        arguments: &[BoundExpression],
    ) -> Result<Value, EvaluationError> {
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            values.push(self.evaluate_expression(argument)?);
        }

        match builtin {
            BuiltinFunction::Print => {
                let text = values.first().map(Value::as_str).transpose()?.unwrap_or_default();
                self.host.print(text);
                Ok(Value::Unit)
            }
            BuiltinFunction::Input => Ok(Value::String(self.host.input())),
            BuiltinFunction::Rand => {
                let max = values.first().map(Value::as_int).transpose()?.unwrap_or_default();
                Ok(Value::Int(self.host.random(max)))
            }
        }
    }
}

/// Evaluate `program` against `globals` with default options.
pub fn evaluate(program: &BoundProgram, globals: &mut Variables, host: &mut dyn Host) -> Result<Value, EvaluationError> {
    Evaluator::new(program, globals, host).evaluate()
}
