//! rill_compiler: Compilation orchestration.
//!
//! A [`Compilation`] is one submission: a set of syntax trees bound on top of
//! an optional previous compilation. REPL sessions chain compilations with
//! [`Compilation::continue_with`] so that each submission sees the variables
//! and functions declared by earlier ones.

use rill_ast::SyntaxTree;
use rill_binder::{Binder, BoundGlobalScope, BoundProgram, ControlFlowGraph, TypeSymbol};
use rill_diagnostics::Diagnostic;
use rill_evaluator::{ConsoleHost, EvaluationError, Evaluator, EvaluatorOptions, Host, Value, Variables};
use std::cell::OnceCell;
use std::io::{self, Write};
use std::rc::Rc;
use tracing::debug;

/// The outcome of evaluating a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    /// Syntax and semantic diagnostics. Evaluation only runs when empty.
    pub diagnostics: Vec<Diagnostic>,
    pub value: Option<Value>,
}

impl EvaluationResult {
    fn failed(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            diagnostics,
            value: None,
        }
    }
}

pub struct Compilation {
    previous: Option<Rc<Compilation>>,
    syntax_trees: Vec<SyntaxTree>,
    global_scope: OnceCell<Rc<BoundGlobalScope>>,
}

impl Compilation {
    pub fn new(syntax_trees: Vec<SyntaxTree>) -> Self {
        Self {
            previous: None,
            syntax_trees,
            global_scope: OnceCell::new(),
        }
    }

    /// A new submission that sees everything declared by `previous`.
    pub fn continue_with(previous: Rc<Compilation>, syntax_tree: SyntaxTree) -> Self {
        Self {
            previous: Some(previous),
            syntax_trees: vec![syntax_tree],
            global_scope: OnceCell::new(),
        }
    }

    /// Parse `text` as a single-tree compilation.
    pub fn from_text(text: &str) -> Self {
        Self::new(vec![rill_parser::parse(text)])
    }

    pub fn previous(&self) -> Option<&Rc<Compilation>> {
        self.previous.as_ref()
    }

    pub fn syntax_trees(&self) -> &[SyntaxTree] {
        &self.syntax_trees
    }

    /// The bound declarations and global statements, bound on first use.
    pub fn global_scope(&self) -> Rc<BoundGlobalScope> {
        let scope = self.global_scope.get_or_init(|| {
            let previous = self.previous.as_ref().map(|previous| previous.global_scope());
            Rc::new(Binder::bind_global_scope(previous, &self.syntax_trees))
        });
        Rc::clone(scope)
    }

    pub fn bind_program(&self) -> BoundProgram {
        Binder::bind_program(&self.global_scope())
    }

    pub fn evaluate(&self, variables: &mut Variables) -> Result<EvaluationResult, EvaluationError> {
        self.evaluate_with_host(variables, &mut ConsoleHost)
    }

    pub fn evaluate_with_host(
        &self,
        variables: &mut Variables,
        host: &mut dyn Host,
    ) -> Result<EvaluationResult, EvaluationError> {
        self.evaluate_with_options(variables, host, EvaluatorOptions::default())
    }

    /// Bind, lower and evaluate this submission.
    ///
    /// Diagnostics are returned in `Ok` and suppress evaluation; only runtime
    /// faults are `Err`.
    pub fn evaluate_with_options(
        &self,
        variables: &mut Variables,
        host: &mut dyn Host,
        options: EvaluatorOptions,
    ) -> Result<EvaluationResult, EvaluationError> {
        let global_scope = self.global_scope();
        if !global_scope.diagnostics.is_empty() {
            debug!(count = global_scope.diagnostics.len(), "global scope has diagnostics");
            return Ok(EvaluationResult::failed(global_scope.diagnostics.clone()));
        }

        let program = Binder::bind_program(&global_scope);
        if !program.diagnostics.is_empty() {
            debug!(count = program.diagnostics.len(), "program has diagnostics");
            return Ok(EvaluationResult::failed(program.diagnostics));
        }

        let value = Evaluator::with_options(&program, variables, host, options).evaluate()?;
        Ok(EvaluationResult {
            diagnostics: Vec::new(),
            value: Some(value),
        })
    }

    /// Write the lowered program: the top-level block, or the functions
    /// declared by this submission when it has no top-level statements.
    pub fn emit_tree(&self, writer: &mut impl Write) -> io::Result<()> {
        let global_scope = self.global_scope();
        let program = Binder::bind_program(&global_scope);

        if !program.statement.statements.is_empty() {
            return writeln!(writer, "{}", program.statement);
        }

        for (function, body) in &program.functions {
            if !global_scope.functions.contains(function) {
                continue;
            }
            write!(writer, "function {}(", function.name())?;
            for (i, parameter) in function.parameters().iter().enumerate() {
                if i > 0 {
                    write!(writer, ", ")?;
                }
                write!(writer, "{}: {}", parameter.name(), parameter.ty())?;
            }
            write!(writer, ")")?;
            if function.return_type() != TypeSymbol::Void {
                write!(writer, ": {}", function.return_type())?;
            }
            writeln!(writer)?;
            writeln!(writer, "{}", body)?;
        }
        Ok(())
    }

    /// Write the dot graph of the top-level block, or of the last function
    /// declared by this submission when there are no top-level statements.
    pub fn write_control_flow_graph(&self, writer: &mut impl Write) -> io::Result<()> {
        let global_scope = self.global_scope();
        let program = Binder::bind_program(&global_scope);
        let last_function = global_scope
            .functions
            .last()
            .and_then(|function| program.functions.get(function));
        let body = match last_function {
            Some(body) if program.statement.statements.is_empty() => body,
            _ => &program.statement,
        };
        ControlFlowGraph::create(body).write_dot(writer)
    }
}
