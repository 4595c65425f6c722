//! Binder integration tests.
//!
//! Diagnostics are checked against annotated source: every `[...]` marks the
//! span of one expected diagnostic, in source order.

use rill_ast::SyntaxTree;
use rill_binder::bound_tree::{BoundNode, BoundStatement};
use rill_binder::{Binder, BoundGlobalScope, BoundProgram, SymbolKind, TypeSymbol};
use rill_core::text::TextSpan;
use rill_parser::parse;
use std::rc::Rc;

/// Helper: strip `[` and `]` from `source`, returning the text and the marked spans.
fn annotate(source: &str) -> (String, Vec<TextSpan>) {
    let mut text = String::new();
    let mut starts = Vec::new();
    let mut spans = Vec::new();
    for ch in source.chars() {
        match ch {
            '[' => starts.push(text.len() as u32),
            ']' => {
                let start = starts.pop().expect("unbalanced ']' in annotated text");
                spans.push(TextSpan::from_bounds(start, text.len() as u32));
            }
            _ => text.push(ch),
        }
    }
    assert!(starts.is_empty(), "unbalanced '[' in annotated text");
    spans.sort_by_key(|span| (span.start, span.length));
    (text, spans)
}

fn bind(text: &str) -> (BoundGlobalScope, BoundProgram) {
    let tree = parse(text);
    let global_scope = Binder::bind_global_scope(None, &[tree]);
    let program = Binder::bind_program(&global_scope);
    (global_scope, program)
}

fn assert_diagnostics(source: &str, expected: &[&str]) {
    let (text, spans) = annotate(source);
    assert_eq!(spans.len(), expected.len(), "annotation count must match message count");

    let (_, program) = bind(&text);
    let mut diagnostics = program.diagnostics.clone();
    diagnostics.sort_by_key(|d| (d.span.start, d.span.length));

    let actual: Vec<_> = diagnostics.iter().map(|d| d.message_text.as_str()).collect();
    assert_eq!(actual, expected, "source: {}", text);
    for (diagnostic, span) in diagnostics.iter().zip(&spans) {
        assert_eq!(diagnostic.span, *span, "span of '{}'", diagnostic.message_text);
    }
}

// ============================================================================
// Names and declarations
// ============================================================================

#[test]
fn test_variable_redeclaration_in_same_scope() {
    assert_diagnostics(
        "{ var x = 10 var y = 100 { var x = 10 } var [x] = 5 }",
        &["'x' is already declared."],
    );
}

#[test]
fn test_shadowing_in_nested_scope_is_allowed() {
    assert_diagnostics("{ var x = 1 { var x = true } }", &[]);
}

#[test]
fn test_undefined_variable() {
    assert_diagnostics("[x] * 10", &["Variable 'x' doesn't exist."]);
}

#[test]
fn test_function_is_not_a_variable() {
    assert_diagnostics("[print] + 1", &["'print' is not a variable."]);
}

#[test]
fn test_undefined_type() {
    assert_diagnostics("var x: [foo] = 1", &["Type 'foo' doesn't exist."]);
}

#[test]
fn test_function_redeclaration() {
    assert_diagnostics(
        "function f() {} function [f]() {}",
        &["'f' is already declared."],
    );
}

#[test]
fn test_parameter_redeclaration() {
    assert_diagnostics(
        "function f(a: int, [a: int]) {}",
        &["A parameter with the name 'a' already exists."],
    );
}

// ============================================================================
// Assignments and conversions
// ============================================================================

#[test]
fn test_assignment_to_read_only() {
    assert_diagnostics(
        "{ let x = 10 x [=] 0 }",
        &["Variable 'x' is read-only and cannot be assigned to."],
    );
}

#[test]
fn test_assignment_type_mismatch() {
    assert_diagnostics(
        "{ var x = 10 x = [true] }",
        &["Cannot convert type 'bool' to 'int'."],
    );
}

#[test]
fn test_explicit_conversion_required() {
    assert_diagnostics(
        "var s: string = [1]",
        &["Cannot convert type 'int' to 'string'. An explicit conversion exists (are you missing a cast?)"],
    );
}

#[test]
fn test_explicit_conversion_call() {
    assert_diagnostics("var s = string(1) + string(true)", &[]);
}

#[test]
fn test_error_type_suppresses_cascades() {
    assert_diagnostics("[x] + 1 == true", &["Variable 'x' doesn't exist."]);
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_undefined_unary_operator() {
    assert_diagnostics("[+]true", &["Unary operator '+' is not defined for type 'bool'."]);
}

#[test]
fn test_undefined_binary_operator() {
    assert_diagnostics(
        "10 [*] false",
        &["Binary operator '*' is not defined for types 'int' and 'bool'."],
    );
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_if_condition_must_be_bool() {
    assert_diagnostics(
        "{ var x = 0 if [10] x = 10 }",
        &["Cannot convert type 'int' to 'bool'."],
    );
}

#[test]
fn test_for_bounds_must_be_int() {
    assert_diagnostics(
        "{ var result = 0 for i in [false]..10 result = result + i }",
        &["Cannot convert type 'bool' to 'int'."],
    );
}

#[test]
fn test_for_variable_is_read_only() {
    assert_diagnostics(
        "for i in 0..3 i [=] 5",
        &["Variable 'i' is read-only and cannot be assigned to."],
    );
}

#[test]
fn test_void_expression_must_have_value() {
    assert_diagnostics("var x = [print(\"hi\")]", &["Expression must have a value."]);
}

#[test]
fn test_break_outside_loop() {
    assert_diagnostics("[break]", &["The keyword 'break' can only be used inside of loops."]);
}

#[test]
fn test_continue_inside_loop_is_allowed() {
    assert_diagnostics("{ var i = 0 while i < 3 { i = i + 1 continue } }", &[]);
}

// ============================================================================
// Calls
// ============================================================================

#[test]
fn test_undefined_function() {
    assert_diagnostics("[foo](1)", &["Function 'foo' doesn't exist."]);
}

#[test]
fn test_variable_is_not_a_function() {
    assert_diagnostics("{ let foo = 42 [foo](42) }", &["'foo' is not a function."]);
}

#[test]
fn test_too_many_arguments() {
    assert_diagnostics(
        "print(\"a\"[, \"b\"])",
        &["Function 'print' requires 1 arguments but was given 2."],
    );
}

#[test]
fn test_too_many_arguments_for_parameterless_function() {
    assert_diagnostics(
        "input([1, 2])",
        &["Function 'input' requires 0 arguments but was given 2."],
    );
}

#[test]
fn test_too_few_arguments() {
    assert_diagnostics(
        "rand([)]",
        &["Function 'rand' requires 1 arguments but was given 0."],
    );
}

#[test]
fn test_wrong_argument_type() {
    assert_diagnostics(
        "print([1])",
        &["Parameter 'text' of function 'print' requires a value of type 'string' but was given a value of type 'int'."],
    );
}

#[test]
fn test_every_bad_argument_is_reported() {
    assert_diagnostics(
        "function f(a: int, b: bool) {} f([true], [1])",
        &[
            "Parameter 'a' of function 'f' requires a value of type 'int' but was given a value of type 'bool'.",
            "Parameter 'b' of function 'f' requires a value of type 'bool' but was given a value of type 'int'.",
        ],
    );
}

#[test]
fn test_function_may_be_called_before_declaration() {
    assert_diagnostics("print(string(f())) function f(): int { return 1 }", &[]);
}

// ============================================================================
// Returns
// ============================================================================

#[test]
fn test_return_outside_function() {
    assert_diagnostics(
        "[return]",
        &["The 'return' keyword can only be used inside of functions."],
    );
}

#[test]
fn test_return_value_from_void_function() {
    assert_diagnostics(
        "function f() { return [1] }",
        &["Since the function 'f' does not return a value the 'return' keyword cannot be followed by an expression."],
    );
}

#[test]
fn test_missing_return_value() {
    assert_diagnostics(
        "function f(): int { [return] }",
        &["An expression of type 'int' is expected."],
    );
}

#[test]
fn test_not_all_paths_return() {
    assert_diagnostics(
        "function [f](n: int): int { if n > 0 return 1 }",
        &["Not all code paths return a value."],
    );
}

#[test]
fn test_all_paths_return_through_else() {
    assert_diagnostics(
        "function f(n: int): int { if n > 0 return 1 else return 0 }",
        &[],
    );
}

#[test]
fn test_infinite_loop_with_return_counts_as_returning() {
    assert_diagnostics("function f(): int { while true { return 1 } }", &[]);
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn test_function_locals_and_globals() {
    let (global_scope, program) = bind("var g = 1 function f(p: int): int { var l = p return l }");
    assert!(program.diagnostics.is_empty(), "{:?}", program.diagnostics);

    assert_eq!(global_scope.variables.len(), 1);
    assert_eq!(global_scope.variables[0].kind(), SymbolKind::GlobalVariable);

    let function = &global_scope.functions[0];
    assert_eq!(function.parameters()[0].kind(), SymbolKind::Parameter);
    assert_eq!(function.return_type(), TypeSymbol::Int);

    let body = &program.functions[function];
    let local = body.statements.iter().find_map(|statement| match statement {
        BoundStatement::VariableDeclaration(declaration) => Some(declaration.variable.clone()),
        _ => None,
    });
    assert_eq!(local.map(|variable| variable.kind()), Some(SymbolKind::LocalVariable));
}

#[test]
fn test_lowered_program_has_no_structured_statements() {
    let (_, program) = bind(
        "{ var sum = 0 for i in 1..=10 { if i == 5 continue sum = sum + i } do { sum = sum - 1 } while sum > 40 }",
    );
    assert!(program.diagnostics.is_empty(), "{:?}", program.diagnostics);
    for statement in &program.statement.statements {
        for node in BoundNode::Statement(statement).descendants() {
            let BoundNode::Statement(statement) = node else {
                continue;
            };
            assert!(
                !matches!(
                    statement,
                    BoundStatement::Block(_)
                        | BoundStatement::If(_)
                        | BoundStatement::While(_)
                        | BoundStatement::DoWhile(_)
                        | BoundStatement::For(_)
                ),
                "unexpected {:?} after lowering",
                statement.kind()
            );
        }
    }
}

#[test]
fn test_continuation_sees_previous_submission() {
    let first = Rc::new(Binder::bind_global_scope(None, &[parse("var x = 10 function f(): int { return x }")]));
    assert!(first.diagnostics.is_empty());

    let trees: Vec<SyntaxTree> = vec![parse("x = f() + 1 var x = true")];
    let second = Binder::bind_global_scope(Some(Rc::clone(&first)), &trees);
    assert!(second.diagnostics.is_empty(), "{:?}", second.diagnostics);

    // The new `x` shadows the previous submission's.
    assert_eq!(second.variables.len(), 1);
    assert_eq!(second.variables[0].ty(), TypeSymbol::Bool);
    assert_ne!(second.variables[0], first.variables[0]);

    let program = Binder::bind_program(&second);
    assert!(program.diagnostics.is_empty());
    assert!(program.functions.contains_key(&first.functions[0]));
}
