//! Evaluator integration tests.
//!
//! Programs go through the real parse -> bind -> lower pipeline before being
//! evaluated against a scripted host.

use rill_binder::bound_tree::{BoundBlockStatement, BoundExpression, BoundIfStatement, BoundStatement};
use rill_binder::{Binder, BoundLabel, BoundProgram};
use rill_evaluator::{EvaluationError, Evaluator, EvaluatorOptions, Host, Value, Variables};
use rill_ast::LiteralValue;
use rill_parser::parse;
use std::collections::VecDeque;

/// Helper: a host that records output and replays scripted input.
#[derive(Default)]
struct ScriptedHost {
    output: Vec<String>,
    input: VecDeque<String>,
}

impl Host for ScriptedHost {
    fn print(&mut self, text: &str) {
        self.output.push(text.to_string());
    }

    fn input(&mut self) -> String {
        self.input.pop_front().unwrap_or_default()
    }

    fn random(&mut self, max: i32) -> i32 {
        if max <= 0 { 0 } else { max - 1 }
    }
}

fn bind(text: &str) -> BoundProgram {
    let global_scope = Binder::bind_global_scope(None, &[parse(text)]);
    let program = Binder::bind_program(&global_scope);
    assert!(program.diagnostics.is_empty(), "unexpected diagnostics: {:?}", program.diagnostics);
    program
}

fn run_with(
    text: &str,
    host: &mut ScriptedHost,
    variables: &mut Variables,
    options: EvaluatorOptions,
) -> Result<Value, EvaluationError> {
    let program = bind(text);
    Evaluator::with_options(&program, variables, host, options).evaluate()
}

fn run(text: &str) -> Value {
    let mut host = ScriptedHost::default();
    let mut variables = Variables::default();
    run_with(text, &mut host, &mut variables, EvaluatorOptions::default())
        .unwrap_or_else(|error| panic!("evaluation of {:?} failed: {}", text, error))
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_arithmetic() {
    assert_eq!(run("1 + 2 * 3"), Value::Int(7));
    assert_eq!(run("(1 + 2) * 3"), Value::Int(9));
    assert_eq!(run("7 / 2"), Value::Int(3));
    assert_eq!(run("-5 + +2"), Value::Int(-3));
}

#[test]
fn test_integer_arithmetic_wraps() {
    assert_eq!(run("2147483647 + 1"), Value::Int(i32::MIN));
    assert_eq!(run("{ var x = 0 - 2147483647 - 1 x * -1 }"), Value::Int(i32::MIN));
}

#[test]
fn test_bitwise_and_logical_operators() {
    assert_eq!(run("5 & 3"), Value::Int(1));
    assert_eq!(run("5 | 3"), Value::Int(7));
    assert_eq!(run("5 ^ 3"), Value::Int(6));
    assert_eq!(run("~0"), Value::Int(-1));
    assert_eq!(run("true && !false"), Value::Bool(true));
    assert_eq!(run("false || false"), Value::Bool(false));
    assert_eq!(run("true ^ true"), Value::Bool(false));
    assert_eq!(run("false | true"), Value::Bool(true));
}

#[test]
fn test_comparisons() {
    assert_eq!(run("1 < 2"), Value::Bool(true));
    assert_eq!(run("2 <= 2"), Value::Bool(true));
    assert_eq!(run("1 > 2"), Value::Bool(false));
    assert_eq!(run("3 >= 4"), Value::Bool(false));
    assert_eq!(run("\"x\" == \"x\""), Value::Bool(true));
    assert_eq!(run("true != false"), Value::Bool(true));
}

#[test]
fn test_strings_and_conversions() {
    assert_eq!(run("\"a\" + \"b\""), Value::String("ab".to_string()));
    assert_eq!(run("string(12) + string(true)"), Value::String("12true".to_string()));
    assert_eq!(run("string(-3)"), Value::String("-3".to_string()));
}

#[test]
fn test_divide_by_zero() {
    let mut host = ScriptedHost::default();
    let mut variables = Variables::default();
    let result = run_with("{ var z = 0 10 / z }", &mut host, &mut variables, EvaluatorOptions::default());
    assert_eq!(result, Err(EvaluationError::DivideByZero));
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_if_else() {
    assert_eq!(run("{ var a = 0 if a == 0 a = 10 else a = 5 a }"), Value::Int(10));
    assert_eq!(run("{ var a = 0 if a == 2 a = 10 else a = 5 a }"), Value::Int(5));
    assert_eq!(run("{ var a = 0 if a == 4 a = 10 a }"), Value::Int(0));
}

#[test]
fn test_while() {
    assert_eq!(
        run("{ var i = 10 var result = 0 while i > 0 { result = result + i i = i - 1 } result }"),
        Value::Int(55)
    );
}

#[test]
fn test_do_while_runs_body_first() {
    assert_eq!(run("{ var i = 0 do i = i + 1 while i < 5 i }"), Value::Int(5));
    assert_eq!(run("{ var i = 10 do i = i + 1 while i < 5 i }"), Value::Int(11));
}

#[test]
fn test_for_ranges() {
    assert_eq!(run("{ var result = 0 for i in 1..10 { result = result + i } result }"), Value::Int(45));
    assert_eq!(run("{ var result = 0 for i in 1..=10 { result = result + i } result }"), Value::Int(55));
    assert_eq!(run("{ var result = 0 for i in 5..5 { result = result + 1 } result }"), Value::Int(0));
}

#[test]
fn test_break_and_continue() {
    assert_eq!(
        run("{ var sum = 0 for i in 0..10 { if i == 3 continue if i == 6 break sum = sum + i } sum }"),
        Value::Int(12)
    );
    assert_eq!(
        run("{ var n = 0 while true { n = n + 1 if n == 7 break } n }"),
        Value::Int(7)
    );
}

#[test]
fn test_structured_and_hand_lowered_loops_agree() {
    let structured = run("{ var s = 0 for i in 0..=20 { if i / 2 * 2 == i s = s + i } s }");
    let manual = run("{ var s = 0 var i = 0 while i <= 20 { if i / 2 * 2 == i s = s + i i = i + 1 } s }");
    assert_eq!(structured, manual);
    assert_eq!(structured, Value::Int(110));
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_recursive_function() {
    let text = "function fact(n: int): int { if n <= 1 return 1 return n * fact(n - 1) } fact(10)";
    assert_eq!(run(text), Value::Int(3_628_800));
}

#[test]
fn test_parameters_are_per_call() {
    let text = "
        function fib(n: int): int {
            if n < 2 return n
            return fib(n - 1) + fib(n - 2)
        }
        fib(15)
    ";
    assert_eq!(run(text), Value::Int(610));
}

#[test]
fn test_void_call_yields_callee_last_value() {
    assert_eq!(run("function g() { var x = 5 } g()"), Value::Int(5));
}

#[test]
fn test_unbounded_recursion_is_stack_overflow() {
    let mut host = ScriptedHost::default();
    let mut variables = Variables::default();
    let options = EvaluatorOptions { max_call_depth: 32 };
    let result = run_with(
        "function f(n: int): int { return f(n + 1) } f(0)",
        &mut host,
        &mut variables,
        options,
    );
    assert_eq!(result, Err(EvaluationError::StackOverflow(32)));
}

#[test]
fn test_recursion_up_to_default_call_depth() {
    let text = "
        function depth(n: int): int {
            if n == 0 return 0
            return 1 + (1 + (1 + depth(n - 1) - 1) - 1)
        }
        depth(255)
    ";
    assert_eq!(run(text), Value::Int(255));
}

#[test]
fn test_recursion_past_default_call_depth_is_stack_overflow() {
    let mut host = ScriptedHost::default();
    let mut variables = Variables::default();
    let result = run_with(
        "function depth(n: int): int { if n == 0 return 0 return 1 + depth(n - 1) } depth(1000)",
        &mut host,
        &mut variables,
        EvaluatorOptions::default(),
    );
    assert_eq!(result, Err(EvaluationError::StackOverflow(256)));
}

#[test]
fn test_deep_recursion_with_raised_call_depth() {
    let mut host = ScriptedHost::default();
    let mut variables = Variables::default();
    let options = EvaluatorOptions { max_call_depth: 20_000 };
    let result = run_with(
        "function depth(n: int): int { if n == 0 return 0 return 1 + depth(n - 1) } depth(10000)",
        &mut host,
        &mut variables,
        options,
    );
    assert_eq!(result, Ok(Value::Int(10_000)));
}

#[test]
fn test_locals_do_not_leak_into_globals() {
    let mut host = ScriptedHost::default();
    let mut variables = Variables::default();
    let value = run_with(
        "var g = 1 function f(): int { var local = 41 return local + g } g = f()",
        &mut host,
        &mut variables,
        EvaluatorOptions::default(),
    )
    .unwrap();
    assert_eq!(value, Value::Int(42));
    assert_eq!(variables.len(), 1);
    let (symbol, value) = variables.iter().next().unwrap();
    assert_eq!(symbol.name(), "g");
    assert_eq!(value, &Value::Int(42));
}

// ============================================================================
// Built-ins
// ============================================================================

#[test]
fn test_print_and_input() {
    let mut host = ScriptedHost::default();
    host.input.push_back("world".to_string());
    let mut variables = Variables::default();
    let value = run_with(
        "{ let name = input() print(\"hello \" + name) }",
        &mut host,
        &mut variables,
        EvaluatorOptions::default(),
    )
    .unwrap();
    assert_eq!(value, Value::Unit);
    assert_eq!(host.output, vec!["hello world"]);
}

#[test]
fn test_rand_goes_through_host() {
    assert_eq!(run("rand(10)"), Value::Int(9));
    assert_eq!(run("rand(0)"), Value::Int(0));
}

// ============================================================================
// Faults in malformed programs
// ============================================================================

fn evaluate_statements(statements: Vec<BoundStatement>) -> Result<Value, EvaluationError> {
    let program = BoundProgram {
        statement: BoundBlockStatement { statements },
        ..BoundProgram::default()
    };
    let mut host = ScriptedHost::default();
    let mut variables = Variables::default();
    Evaluator::new(&program, &mut variables, &mut host).evaluate()
}

#[test]
fn test_structured_statement_is_rejected() {
    let result = evaluate_statements(vec![BoundStatement::If(BoundIfStatement {
        condition: BoundExpression::Literal(LiteralValue::Bool(true)),
        then_statement: Box::new(BoundStatement::block(Vec::new())),
        else_statement: None,
    })]);
    assert!(matches!(result, Err(EvaluationError::UnexpectedNode(_))));
}

#[test]
fn test_undefined_label() {
    let result = evaluate_statements(vec![BoundStatement::Goto(BoundLabel::new("nowhere"))]);
    assert_eq!(result, Err(EvaluationError::UndefinedLabel("nowhere".to_string())));
}
