//! Binder: resolves names, checks types and produces the bound tree.
//!
//! Binding never stops at the first problem. Every failure is reported into
//! the binder's diagnostic bag and replaced by an error expression typed
//! [`TypeSymbol::Error`], which later checks silently accept.

use crate::bound_tree::*;
use crate::control_flow::ControlFlowGraph;
use crate::conversion::Conversion;
use crate::lowerer::Lowerer;
use crate::operators::{BoundBinaryOperator, BoundUnaryOperator};
use crate::scope::{create_parent_scopes, BoundScope, Lookup};
use crate::symbol::{BoundLabel, FunctionSymbol, TypeSymbol, VariableSymbol};
use rill_ast::*;
use rill_core::collections::{FxHashSet, FxIndexMap};
use rill_core::text::TextSpan;
use rill_diagnostics::{messages, Diagnostic, DiagnosticBag};
use std::rc::Rc;
use tracing::{debug, trace};

/// Binds one body: the global statements of a submission, or one function.
pub struct Binder {
    diagnostics: DiagnosticBag,
    /// The function whose body is being bound; `None` for global statements.
    function: Option<FunctionSymbol>,
    scope: Box<BoundScope>,
    /// (break, continue) targets of the enclosing loops, innermost last.
    loop_stack: Vec<(BoundLabel, BoundLabel)>,
    label_counter: u32,
}

impl Binder {
    fn new(parent: Box<BoundScope>, function: Option<FunctionSymbol>) -> Self {
        let mut scope = Box::new(BoundScope::new(Some(parent)));
        if let Some(function) = &function {
            for parameter in function.parameters() {
                scope.try_declare_variable(parameter.clone());
            }
        }
        Self {
            diagnostics: DiagnosticBag::new(),
            function,
            scope,
            loop_stack: Vec::new(),
            label_counter: 0,
        }
    }

    /// Bind the declarations and global statements of one submission on top
    /// of the scopes of `previous`.
    pub fn bind_global_scope(
        previous: Option<Rc<BoundGlobalScope>>,
        syntax_trees: &[SyntaxTree],
    ) -> BoundGlobalScope {
        let parent = create_parent_scopes(previous.as_deref());
        let mut binder = Binder::new(parent, None);

        // Signatures first, so bodies and global statements may call any of them.
        for tree in syntax_trees {
            let start = binder.diagnostics.len();
            for member in &tree.root().members {
                if let MemberSyntax::FunctionDeclaration(declaration) = member {
                    binder.bind_function_declaration(declaration, tree.file());
                }
            }
            binder.diagnostics.attribute_to(start, tree.file());
        }

        let mut statements = Vec::new();
        for tree in syntax_trees {
            let start = binder.diagnostics.len();
            for member in &tree.root().members {
                if let MemberSyntax::GlobalStatement(statement) = member {
                    statements.push(binder.bind_statement(statement));
                }
            }
            binder.diagnostics.attribute_to(start, tree.file());
        }

        let functions = binder.scope.declared_functions();
        let variables = binder.scope.declared_variables();

        // Earlier submissions' diagnostics come first so a chain built on a
        // failed submission never evaluates.
        let mut diagnostics: Vec<Diagnostic> = previous
            .as_ref()
            .map(|previous| previous.diagnostics.clone())
            .unwrap_or_default();
        for tree in syntax_trees {
            diagnostics.extend_from_slice(tree.diagnostics());
        }
        diagnostics.extend(binder.diagnostics.into_diagnostics());

        debug!(
            functions = functions.len(),
            variables = variables.len(),
            statements = statements.len(),
            diagnostics = diagnostics.len(),
            "bound global scope"
        );

        BoundGlobalScope {
            previous,
            diagnostics,
            functions,
            variables,
            statements,
        }
    }

    /// Bind and lower every function body visible from `global_scope`, then
    /// lower its global statements.
    pub fn bind_program(global_scope: &BoundGlobalScope) -> BoundProgram {
        let mut parent = create_parent_scopes(Some(global_scope));
        let mut diagnostics = global_scope.diagnostics.clone();
        let mut functions = FxIndexMap::default();

        let mut current = Some(global_scope);
        while let Some(scope) = current {
            for function in &scope.functions {
                let Some(declaration) = function.declaration().cloned() else {
                    continue;
                };

                let mut binder = Binder::new(parent, Some(function.clone()));
                let body = binder.bind_block_statement(&declaration.body);
                let lowered = Lowerer::lower(BoundStatement::Block(body));

                let return_type = function.return_type();
                if return_type != TypeSymbol::Void
                    && return_type != TypeSymbol::Error
                    && !ControlFlowGraph::all_paths_return(&lowered)
                {
                    binder.diagnostics.report(
                        declaration.identifier.span,
                        &messages::ALL_PATHS_MUST_RETURN,
                        &[],
                    );
                }

                trace!(
                    function = function.name(),
                    statements = lowered.statements.len(),
                    "lowered function body"
                );
                binder.diagnostics.attribute_to(0, function.file());
                functions.insert(function.clone(), lowered);
                diagnostics.extend(binder.diagnostics.into_diagnostics());
                parent = match binder.scope.into_parent() {
                    Some(parent) => parent,
                    None => create_parent_scopes(Some(global_scope)),
                };
            }
            current = scope.previous.as_deref();
        }

        let statement = Lowerer::lower(BoundStatement::block(global_scope.statements.clone()));
        debug!(
            functions = functions.len(),
            diagnostics = diagnostics.len(),
            "bound program"
        );

        BoundProgram {
            diagnostics,
            functions,
            statement,
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn bind_function_declaration(
        &mut self,
        declaration: &Rc<FunctionDeclarationSyntax>,
        file: Option<&str>,
    ) {
        let mut parameters = Vec::new();
        let mut seen = FxHashSet::default();

        for parameter in &declaration.parameters {
            let name = parameter.identifier.text.as_str();
            let ty = self
                .bind_type_clause(Some(&parameter.type_clause))
                .unwrap_or(TypeSymbol::Error);
            if !seen.insert(name.to_string()) {
                self.diagnostics.report(
                    parameter.span(),
                    &messages::PARAMETER_ALREADY_DECLARED,
                    &[name],
                );
            } else {
                parameters.push(VariableSymbol::parameter(name, ty));
            }
        }

        let return_type = self
            .bind_type_clause(declaration.type_clause.as_ref())
            .unwrap_or(TypeSymbol::Void);
        let identifier = &declaration.identifier;
        let function = FunctionSymbol::new(
            identifier.text.as_str(),
            parameters,
            return_type,
            Some(Rc::clone(declaration)),
            file.map(str::to_string),
        );

        if !identifier.is_missing() && !self.scope.try_declare_function(function) {
            self.diagnostics.report(
                identifier.span,
                &messages::SYMBOL_ALREADY_DECLARED,
                &[&identifier.text],
            );
        }
    }

    /// `None` when there is no clause. An unknown type name binds to `Error`.
    fn bind_type_clause(&mut self, syntax: Option<&TypeClauseSyntax>) -> Option<TypeSymbol> {
        let syntax = syntax?;
        let identifier = &syntax.identifier;
        if identifier.is_missing() {
            return Some(TypeSymbol::Error);
        }
        match TypeSymbol::lookup(&identifier.text) {
            Some(ty) => Some(ty),
            None => {
                self.diagnostics
                    .report(identifier.span, &messages::UNDEFINED_TYPE, &[&identifier.text]);
                Some(TypeSymbol::Error)
            }
        }
    }

    fn declare_variable(&mut self, identifier: &SyntaxToken, is_read_only: bool, ty: TypeSymbol) -> VariableSymbol {
        let name = if identifier.is_missing() { "?" } else { identifier.text.as_str() };
        let variable = if self.function.is_none() {
            VariableSymbol::global(name, is_read_only, ty)
        } else {
            VariableSymbol::local(name, is_read_only, ty)
        };

        if !identifier.is_missing() && !self.scope.try_declare_variable(variable.clone()) {
            self.diagnostics
                .report(identifier.span, &messages::SYMBOL_ALREADY_DECLARED, &[name]);
        }
        variable
    }

    // ========================================================================
    // Scopes and loops
    // ========================================================================

    fn push_scope(&mut self) {
        let parent = std::mem::take(&mut self.scope);
        self.scope = Box::new(BoundScope::new(Some(parent)));
    }

    fn pop_scope(&mut self) {
        let scope = std::mem::take(&mut self.scope);
        if let Some(parent) = scope.into_parent() {
            self.scope = parent;
        }
    }

    fn bind_loop_body(&mut self, body: &StatementSyntax) -> (BoundStatement, BoundLabel, BoundLabel) {
        self.label_counter += 1;
        let break_label = BoundLabel::new(format!("break{}", self.label_counter));
        let continue_label = BoundLabel::new(format!("continue{}", self.label_counter));

        self.loop_stack.push((break_label.clone(), continue_label.clone()));
        let body = self.bind_statement(body);
        self.loop_stack.pop();

        (body, break_label, continue_label)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn bind_statement(&mut self, syntax: &StatementSyntax) -> BoundStatement {
        match syntax {
            StatementSyntax::Block(n) => BoundStatement::Block(self.bind_block_statement(n)),
            StatementSyntax::VariableDeclaration(n) => self.bind_variable_declaration(n),
            StatementSyntax::If(n) => self.bind_if_statement(n),
            StatementSyntax::While(n) => self.bind_while_statement(n),
            StatementSyntax::DoWhile(n) => self.bind_do_while_statement(n),
            StatementSyntax::For(n) => self.bind_for_statement(n),
            StatementSyntax::Break(token) => self.bind_jump(token, |(break_label, _)| break_label),
            StatementSyntax::Continue(token) => self.bind_jump(token, |(_, continue_label)| continue_label),
            StatementSyntax::Return(n) => self.bind_return_statement(n),
            StatementSyntax::Expression(n) => {
                BoundStatement::Expression(self.bind_expression(n, true))
            }
        }
    }

    fn bind_block_statement(&mut self, syntax: &BlockStatementSyntax) -> BoundBlockStatement {
        self.push_scope();
        let statements = syntax
            .statements
            .iter()
            .map(|statement| self.bind_statement(statement))
            .collect();
        self.pop_scope();
        BoundBlockStatement { statements }
    }

    fn bind_variable_declaration(&mut self, syntax: &VariableDeclarationSyntax) -> BoundStatement {
        let is_read_only = syntax.keyword.kind == SyntaxKind::LetKeyword;
        let declared_type = self.bind_type_clause(syntax.type_clause.as_ref());
        let initializer = self.bind_expression(&syntax.initializer, false);
        let ty = declared_type.unwrap_or_else(|| initializer.ty());
        let variable = self.declare_variable(&syntax.identifier, is_read_only, ty);
        let initializer = self.bind_conversion(syntax.initializer.span(), initializer, ty, false);

        BoundStatement::VariableDeclaration(BoundVariableDeclaration {
            variable,
            initializer,
        })
    }

    fn bind_if_statement(&mut self, syntax: &IfStatementSyntax) -> BoundStatement {
        let condition = self.bind_expression_with_type(&syntax.condition, TypeSymbol::Bool);
        let then_statement = Box::new(self.bind_statement(&syntax.then_statement));
        let else_statement = syntax
            .else_clause
            .as_ref()
            .map(|clause| Box::new(self.bind_statement(&clause.else_statement)));

        BoundStatement::If(BoundIfStatement {
            condition,
            then_statement,
            else_statement,
        })
    }

    fn bind_while_statement(&mut self, syntax: &WhileStatementSyntax) -> BoundStatement {
        let condition = self.bind_expression_with_type(&syntax.condition, TypeSymbol::Bool);
        let (body, break_label, continue_label) = self.bind_loop_body(&syntax.body);
        BoundStatement::While(BoundWhileStatement {
            condition,
            body: Box::new(body),
            break_label,
            continue_label,
        })
    }

    fn bind_do_while_statement(&mut self, syntax: &DoWhileStatementSyntax) -> BoundStatement {
        let (body, break_label, continue_label) = self.bind_loop_body(&syntax.body);
        let condition = self.bind_expression_with_type(&syntax.condition, TypeSymbol::Bool);
        BoundStatement::DoWhile(BoundDoWhileStatement {
            body: Box::new(body),
            condition,
            break_label,
            continue_label,
        })
    }

    fn bind_for_statement(&mut self, syntax: &ForStatementSyntax) -> BoundStatement {
        let lower_bound = self.bind_expression_with_type(&syntax.lower_bound, TypeSymbol::Int);
        let upper_bound = self.bind_expression_with_type(&syntax.upper_bound, TypeSymbol::Int);

        self.push_scope();
        let variable = self.declare_variable(&syntax.identifier, true, TypeSymbol::Int);
        let (body, break_label, continue_label) = self.bind_loop_body(&syntax.body);
        self.pop_scope();

        BoundStatement::For(BoundForStatement {
            variable,
            lower_bound,
            upper_bound,
            is_inclusive: syntax.is_inclusive(),
            body: Box::new(body),
            break_label,
            continue_label,
        })
    }

    /// `break` or `continue`: a goto to the innermost loop's matching label.
    fn bind_jump(
        &mut self,
        keyword: &SyntaxToken,
        select: impl FnOnce(&(BoundLabel, BoundLabel)) -> &BoundLabel,
    ) -> BoundStatement {
        match self.loop_stack.last() {
            Some(labels) => BoundStatement::Goto(select(labels).clone()),
            None => {
                self.diagnostics.report(
                    keyword.span,
                    &messages::INVALID_BREAK_OR_CONTINUE,
                    &[&keyword.text],
                );
                BoundStatement::Expression(BoundExpression::Error)
            }
        }
    }

    fn bind_return_statement(&mut self, syntax: &ReturnStatementSyntax) -> BoundStatement {
        let mut expression = syntax
            .expression
            .as_ref()
            .map(|expression| self.bind_expression(expression, false));

        match self.function.clone() {
            None => {
                self.diagnostics
                    .report(syntax.return_keyword.span, &messages::INVALID_RETURN, &[]);
            }
            Some(function) if function.return_type() == TypeSymbol::Void => {
                if let Some(value) = &syntax.expression {
                    self.diagnostics.report(
                        value.span(),
                        &messages::INVALID_RETURN_EXPRESSION,
                        &[function.name()],
                    );
                }
            }
            Some(function) => match (expression.take(), &syntax.expression) {
                (Some(bound), Some(value)) => {
                    expression = Some(self.bind_conversion(value.span(), bound, function.return_type(), false));
                }
                _ => {
                    if function.return_type() != TypeSymbol::Error {
                        self.diagnostics.report(
                            syntax.return_keyword.span,
                            &messages::MISSING_RETURN_EXPRESSION,
                            &[function.return_type().name()],
                        );
                    }
                }
            },
        }

        BoundStatement::Return(expression)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Bind `syntax`. Unless `can_be_void`, a void result is reported and
    /// replaced by an error expression.
    fn bind_expression(&mut self, syntax: &ExpressionSyntax, can_be_void: bool) -> BoundExpression {
        let result = self.bind_expression_internal(syntax);
        if !can_be_void && result.ty() == TypeSymbol::Void {
            self.diagnostics
                .report(syntax.span(), &messages::EXPRESSION_MUST_HAVE_VALUE, &[]);
            return BoundExpression::Error;
        }
        result
    }

    fn bind_expression_internal(&mut self, syntax: &ExpressionSyntax) -> BoundExpression {
        match syntax {
            ExpressionSyntax::Literal(n) => BoundExpression::Literal(n.value.clone()),
            ExpressionSyntax::Name(n) => self.bind_name_expression(n),
            ExpressionSyntax::Assignment(n) => self.bind_assignment_expression(n),
            ExpressionSyntax::Unary(n) => self.bind_unary_expression(n),
            ExpressionSyntax::Binary(n) => self.bind_binary_expression(n),
            ExpressionSyntax::Parenthesized(n) => self.bind_expression(&n.expression, false),
            ExpressionSyntax::Call(n) => self.bind_call_expression(n),
        }
    }

    /// Bind `syntax` and convert it implicitly to `ty`.
    fn bind_expression_with_type(&mut self, syntax: &ExpressionSyntax, ty: TypeSymbol) -> BoundExpression {
        let expression = self.bind_expression(syntax, false);
        self.bind_conversion(syntax.span(), expression, ty, false)
    }

    fn bind_conversion(
        &mut self,
        span: TextSpan,
        expression: BoundExpression,
        ty: TypeSymbol,
        allow_explicit: bool,
    ) -> BoundExpression {
        let from = expression.ty();
        let conversion = Conversion::classify(from, ty);

        if !conversion.exists() {
            if from != TypeSymbol::Error && ty != TypeSymbol::Error {
                self.diagnostics
                    .report(span, &messages::CANNOT_CONVERT, &[from.name(), ty.name()]);
            }
            return BoundExpression::Error;
        }

        if !allow_explicit && conversion.is_explicit() {
            self.diagnostics.report(
                span,
                &messages::CANNOT_CONVERT_IMPLICITLY,
                &[from.name(), ty.name()],
            );
        }

        if conversion.is_identity() {
            return expression;
        }

        BoundExpression::Conversion(BoundConversionExpression {
            ty,
            expression: Box::new(expression),
        })
    }

    /// Resolve a variable reference, reporting at `identifier` on failure.
    fn bind_variable_reference(&mut self, identifier: &SyntaxToken) -> Option<VariableSymbol> {
        match self.scope.lookup_variable(&identifier.text) {
            Lookup::Found(variable) => Some(variable),
            Lookup::NotFound => {
                self.diagnostics
                    .report(identifier.span, &messages::UNDEFINED_VARIABLE, &[&identifier.text]);
                None
            }
            Lookup::WrongKind(_) => {
                self.diagnostics
                    .report(identifier.span, &messages::NOT_A_VARIABLE, &[&identifier.text]);
                None
            }
        }
    }

    fn bind_name_expression(&mut self, syntax: &NameExpressionSyntax) -> BoundExpression {
        // Already reported by the parser.
        if syntax.identifier.is_missing() {
            return BoundExpression::Error;
        }
        match self.bind_variable_reference(&syntax.identifier) {
            Some(variable) => BoundExpression::Variable(variable),
            None => BoundExpression::Error,
        }
    }

    fn bind_assignment_expression(&mut self, syntax: &AssignmentExpressionSyntax) -> BoundExpression {
        let expression = self.bind_expression(&syntax.expression, false);

        let Some(variable) = self.bind_variable_reference(&syntax.identifier) else {
            return expression;
        };

        if variable.is_read_only() {
            self.diagnostics.report(
                syntax.equals_token.span,
                &messages::CANNOT_ASSIGN,
                &[variable.name()],
            );
        }

        let expression = self.bind_conversion(syntax.expression.span(), expression, variable.ty(), false);
        BoundExpression::assignment(variable, expression)
    }

    fn bind_unary_expression(&mut self, syntax: &UnaryExpressionSyntax) -> BoundExpression {
        let operand = self.bind_expression(&syntax.operand, false);
        if operand.ty() == TypeSymbol::Error {
            return BoundExpression::Error;
        }

        let token = &syntax.operator_token;
        match BoundUnaryOperator::bind(token.kind, operand.ty()) {
            Some(op) => BoundExpression::Unary(BoundUnaryExpression {
                op,
                operand: Box::new(operand),
            }),
            None => {
                self.diagnostics.report(
                    token.span,
                    &messages::UNDEFINED_UNARY_OPERATOR,
                    &[&token.text, operand.ty().name()],
                );
                BoundExpression::Error
            }
        }
    }

    fn bind_binary_expression(&mut self, syntax: &BinaryExpressionSyntax) -> BoundExpression {
        let left = self.bind_expression(&syntax.left, false);
        let right = self.bind_expression(&syntax.right, false);
        if left.ty() == TypeSymbol::Error || right.ty() == TypeSymbol::Error {
            return BoundExpression::Error;
        }

        let token = &syntax.operator_token;
        match BoundBinaryOperator::bind(token.kind, left.ty(), right.ty()) {
            Some(op) => BoundExpression::binary(left, op, right),
            None => {
                self.diagnostics.report(
                    token.span,
                    &messages::UNDEFINED_BINARY_OPERATOR,
                    &[&token.text, left.ty().name(), right.ty().name()],
                );
                BoundExpression::Error
            }
        }
    }

    fn bind_call_expression(&mut self, syntax: &CallExpressionSyntax) -> BoundExpression {
        // `int(x)`, `string(x)`, ... are explicit conversions.
        if syntax.arguments.len() == 1 {
            if let (Some(ty), Some(argument)) =
                (TypeSymbol::lookup(&syntax.identifier.text), syntax.arguments.get(0))
            {
                let expression = self.bind_expression(argument, false);
                return self.bind_conversion(argument.span(), expression, ty, true);
            }
        }

        let arguments: Vec<BoundExpression> = syntax
            .arguments
            .iter()
            .map(|argument| self.bind_expression(argument, false))
            .collect();

        let identifier = &syntax.identifier;
        let function = match self.scope.lookup_function(&identifier.text) {
            Lookup::Found(function) => function,
            Lookup::NotFound => {
                self.diagnostics
                    .report(identifier.span, &messages::UNDEFINED_FUNCTION, &[&identifier.text]);
                return BoundExpression::Error;
            }
            Lookup::WrongKind(_) => {
                self.diagnostics
                    .report(identifier.span, &messages::NOT_A_FUNCTION, &[&identifier.text]);
                return BoundExpression::Error;
            }
        };

        let parameters = function.parameters();
        if arguments.len() != parameters.len() {
            let span = if arguments.len() > parameters.len() {
                let first = if parameters.is_empty() {
                    syntax.arguments.get(0).map(ExpressionSyntax::span)
                } else {
                    syntax.arguments.separator(parameters.len() - 1).map(|token| token.span)
                };
                let last = syntax.arguments.get(syntax.arguments.len() - 1).map(ExpressionSyntax::span);
                match (first, last) {
                    (Some(first), Some(last)) => first.union(&last),
                    _ => syntax.close_paren_token.span,
                }
            } else {
                syntax.close_paren_token.span
            };
            self.diagnostics.report(
                span,
                &messages::WRONG_ARGUMENT_COUNT,
                &[
                    function.name(),
                    &parameters.len().to_string(),
                    &arguments.len().to_string(),
                ],
            );
            return BoundExpression::Error;
        }

        let mut has_errors = false;
        for (i, (argument, parameter)) in arguments.iter().zip(parameters).enumerate() {
            if argument.ty() == parameter.ty() {
                continue;
            }
            has_errors = true;
            if argument.ty() == TypeSymbol::Error {
                continue;
            }
            let span = syntax
                .arguments
                .get(i)
                .map(ExpressionSyntax::span)
                .unwrap_or(syntax.close_paren_token.span);
            self.diagnostics.report(
                span,
                &messages::WRONG_ARGUMENT_TYPE,
                &[
                    parameter.name(),
                    function.name(),
                    parameter.ty().name(),
                    argument.ty().name(),
                ],
            );
        }
        if has_errors {
            return BoundExpression::Error;
        }

        BoundExpression::Call(BoundCallExpression {
            function,
            arguments,
        })
    }
}
