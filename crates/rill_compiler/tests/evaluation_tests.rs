//! Compilation-level tests: submissions, diagnostics gating and the
//! textual views of a compiled program.

use rill_compiler::{Compilation, EvaluationResult};
use rill_evaluator::{EvaluationError, Host, Value, Variables};
use rill_parser::{parse, parse_file};
use std::collections::VecDeque;
use std::rc::Rc;

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

    fn random(&mut self, _max: i32) -> i32 {
        0
    }
}

/// Helper: a REPL-like session over a chain of compilations.
#[derive(Default)]
struct Session {
    previous: Option<Rc<Compilation>>,
    variables: Variables,
    host: ScriptedHost,
}

impl Session {
    fn submit(&mut self, text: &str) -> EvaluationResult {
        let tree = parse(text);
        let compilation = match &self.previous {
            Some(previous) => Compilation::continue_with(Rc::clone(previous), tree),
            None => Compilation::new(vec![tree]),
        };
        let result = compilation
            .evaluate_with_host(&mut self.variables, &mut self.host)
            .unwrap_or_else(|error| panic!("evaluation of {:?} failed: {}", text, error));
        if result.diagnostics.is_empty() {
            self.previous = Some(Rc::new(compilation));
        }
        result
    }

    fn value(&mut self, text: &str) -> Value {
        let result = self.submit(text);
        assert!(result.diagnostics.is_empty(), "unexpected diagnostics: {:?}", result.diagnostics);
        result.value.unwrap_or_else(|| panic!("no value for {:?}", text))
    }
}

fn evaluate(text: &str) -> Result<EvaluationResult, EvaluationError> {
    let mut variables = Variables::default();
    let mut host = ScriptedHost::default();
    Compilation::from_text(text).evaluate_with_host(&mut variables, &mut host)
}

fn emit(text: &str) -> String {
    let mut output = Vec::new();
    Compilation::from_text(text).emit_tree(&mut output).unwrap();
    String::from_utf8(output).unwrap()
}

// ============================================================================
// Evaluation
// ============================================================================

#[test]
fn test_successful_evaluation_has_no_diagnostics() {
    let result = evaluate("{ var a = 6 var b = 7 a * b }").unwrap();
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.value, Some(Value::Int(42)));
}

#[test]
fn test_empty_submission_yields_unit() {
    let result = evaluate("").unwrap();
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.value, Some(Value::Unit));
}

#[test]
fn test_runtime_error_is_err() {
    let result = evaluate("{ var zero = 0 1 / zero }");
    assert_eq!(result, Err(EvaluationError::DivideByZero));
}

#[test]
fn test_global_scope_is_bound_once() {
    let compilation = Compilation::from_text("var x = 1");
    let first = compilation.global_scope();
    let second = compilation.global_scope();
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(first.variables.len(), 1);
    assert_eq!(first.variables[0].name(), "x");
}

// ============================================================================
// Diagnostics Gating
// ============================================================================

#[test]
fn test_syntax_errors_skip_evaluation() {
    let mut session = Session::default();
    let result = session.submit("print(\"side effect\") 1 +");
    assert!(!result.diagnostics.is_empty());
    assert_eq!(result.value, None);
    assert!(session.host.output.is_empty());
}

#[test]
fn test_binding_errors_skip_evaluation() {
    let mut session = Session::default();
    let result = session.submit("print(\"side effect\") undefinedName");
    assert_eq!(result.diagnostics.len(), 1);
    assert!(result.diagnostics[0].message_text.contains("undefinedName"));
    assert_eq!(result.value, None);
    assert!(session.host.output.is_empty());
    assert!(session.variables.is_empty());
}

#[test]
fn test_function_body_errors_skip_evaluation() {
    let result = evaluate("function f(n: int): int { if n > 0 return 1 } print(\"x\")").unwrap();
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.value, None);
}

// ============================================================================
// Submissions
// ============================================================================

#[test]
fn test_variables_persist_across_submissions() {
    let mut session = Session::default();
    assert_eq!(session.value("var x = 10"), Value::Int(10));
    assert_eq!(session.value("x = x * 2"), Value::Int(20));
    assert_eq!(session.value("x + 1"), Value::Int(21));
}

#[test]
fn test_functions_persist_across_submissions() {
    let mut session = Session::default();
    session.value("function square(n: int): int { return n * n }");
    assert_eq!(session.value("square(9)"), Value::Int(81));
    session.value("function twice(n: int): int { return square(n) * 2 }");
    assert_eq!(session.value("twice(3)"), Value::Int(18));
}

#[test]
fn test_later_submission_may_redeclare_a_variable() {
    let mut session = Session::default();
    session.value("let x = 1");
    assert_eq!(session.value("var x = \"text\""), Value::String("text".to_string()));
    assert_eq!(session.value("x + \"!\""), Value::String("text!".to_string()));
}

#[test]
fn test_failed_submission_does_not_extend_the_chain() {
    let mut session = Session::default();
    session.value("var count = 1");
    let result = session.submit("var broken = missing");
    assert!(!result.diagnostics.is_empty());

    let result = session.submit("broken");
    assert!(!result.diagnostics.is_empty());
    assert_eq!(session.value("count"), Value::Int(1));
}

#[test]
fn test_input_and_print_through_host() {
    let mut session = Session::default();
    session.host.input.push_back("7".to_string());
    session.value("let answer = input()");
    session.value("print(\"got \" + answer)");
    assert_eq!(session.host.output, vec!["got 7"]);
}

#[test]
fn test_previous_links_submissions() {
    let first = Rc::new(Compilation::from_text("var a = 1"));
    let second = Compilation::continue_with(Rc::clone(&first), parse("a"));
    assert!(second.previous().is_some_and(|previous| Rc::ptr_eq(previous, &first)));
    assert_eq!(second.syntax_trees().len(), 1);
    assert!(first.previous().is_none());
}

#[test]
fn test_continuing_a_failed_submission_keeps_its_diagnostics() {
    let first = Rc::new(Compilation::from_text("var x = nope"));
    let second = Compilation::continue_with(first, parse("x"));

    let mut variables = Variables::default();
    let mut host = ScriptedHost::default();
    let result = second.evaluate_with_host(&mut variables, &mut host).unwrap();
    assert_eq!(result.value, None);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].message_text, "Variable 'nope' doesn't exist.");
    assert!(variables.is_empty());
}

#[test]
fn test_inherited_diagnostics_come_first() {
    let first = Rc::new(Compilation::from_text("var x = nope"));
    let second = Compilation::continue_with(first, parse("y"));
    let diagnostics = &second.global_scope().diagnostics;
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics[0].message_text.contains("'nope'"));
    assert!(diagnostics[1].message_text.contains("'y'"));
}

// ============================================================================
// Multiple Files
// ============================================================================

fn evaluate_files(files: &[(&str, &str)]) -> (EvaluationResult, ScriptedHost) {
    let trees = files.iter().map(|(name, text)| parse_file(name, text)).collect();
    let mut variables = Variables::default();
    let mut host = ScriptedHost::default();
    let result = Compilation::new(trees)
        .evaluate_with_host(&mut variables, &mut host)
        .unwrap();
    (result, host)
}

#[test]
fn test_files_may_call_functions_declared_in_later_files() {
    let (result, host) = evaluate_files(&[
        ("main.rill", "print(string(twice(21)))"),
        ("lib.rill", "function twice(n: int): int { return n * 2 }"),
    ]);
    assert!(result.diagnostics.is_empty(), "unexpected diagnostics: {:?}", result.diagnostics);
    assert_eq!(host.output, vec!["42"]);
}

#[test]
fn test_global_diagnostics_are_attributed_to_their_file() {
    let (result, _) = evaluate_files(&[("main.rill", "var x = 1"), ("lib.rill", "var y = nope")]);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].file.as_deref(), Some("lib.rill"));
}

#[test]
fn test_syntax_diagnostics_are_attributed_to_their_file() {
    let (result, _) = evaluate_files(&[("main.rill", "var x = )"), ("lib.rill", "var y = 2")]);
    assert!(!result.diagnostics.is_empty());
    assert!(result
        .diagnostics
        .iter()
        .all(|diagnostic| diagnostic.file.as_deref() == Some("main.rill")));
}

#[test]
fn test_function_body_diagnostics_are_attributed_to_their_file() {
    let (result, _) = evaluate_files(&[
        ("main.rill", "twice(1)"),
        ("lib.rill", "function twice(n: int): int { return n * missing }"),
    ]);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].file.as_deref(), Some("lib.rill"));
    assert_eq!(result.diagnostics[0].message_text, "Variable 'missing' doesn't exist.");
}

// ============================================================================
// Emitted Tree and Control Flow Graph
// ============================================================================

#[test]
fn test_emit_tree_for_statements() {
    let output = emit("var x = 1 if x == 1 print(\"one\")");
    let expected = "\
{
    var x = 1
    goto Label1 unless x == 1
    print(\"one\")
    Label1:
}
";
    assert_eq!(output, expected);
}

#[test]
fn test_emit_tree_for_function_only_submission() {
    let output = emit("function add(a: int, b: int): int { return a + b }");
    let expected = "\
function add(a: int, b: int): int
{
    return a + b
}
";
    assert_eq!(output, expected);
}

#[test]
fn test_write_control_flow_graph() {
    let compilation = Compilation::from_text("var i = 0 while i < 3 i = i + 1");
    let mut output = Vec::new();
    compilation.write_control_flow_graph(&mut output).unwrap();
    let dot = String::from_utf8(output).unwrap();

    assert!(dot.starts_with("digraph G {\n"), "{}", dot);
    assert!(dot.contains("<Start>"), "{}", dot);
    assert!(dot.contains("<End>"), "{}", dot);
    assert!(dot.contains("[label = \"i < 3\"]"), "{}", dot);
}

#[test]
fn test_write_control_flow_graph_of_last_function() {
    let compilation = Compilation::from_text("function f(): int { return 1 } function g(): int { return 2 }");
    let mut output = Vec::new();
    compilation.write_control_flow_graph(&mut output).unwrap();
    let dot = String::from_utf8(output).unwrap();

    assert!(dot.contains("return 2"), "{}", dot);
    assert!(!dot.contains("return 1"), "{}", dot);
}
