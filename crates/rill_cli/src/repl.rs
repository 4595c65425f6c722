//! A line-oriented read-eval-print loop.
//!
//! Each submission is chained onto the last one that bound cleanly so declarations
//! and global values carry over. Lines starting with `#` are meta-commands.

use crate::report::{print_diagnostics, print_error};
use rill_compiler::Compilation;
use rill_evaluator::Variables;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use tracing::debug;

const PROMPT: &str = "» ";
const CONTINUATION_PROMPT: &str = "· ";

#[derive(Default)]
pub struct Repl {
    previous: Option<Rc<Compilation>>,
    variables: Variables,
    show_tree: bool,
    show_program: bool,
}

enum Command {
    Continue,
    Exit,
}

impl Repl {
    pub fn new(show_program: bool) -> Self {
        Self {
            show_program,
            ..Self::default()
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        let mut buffer = String::new();

        loop {
            let prompt = if buffer.is_empty() { PROMPT } else { CONTINUATION_PROMPT };
            print!("{}", prompt);
            io::stdout().flush()?;

            let Some(line) = lines.next().transpose()? else {
                break;
            };

            if buffer.is_empty() {
                if line.trim().is_empty() {
                    continue;
                }
                if line.starts_with('#') {
                    match self.evaluate_meta_command(line.trim()) {
                        Command::Continue => continue,
                        Command::Exit => break,
                    }
                }
            }

            buffer.push_str(&line);
            buffer.push('\n');
            if is_complete_submission(&buffer, &line) {
                let text = std::mem::take(&mut buffer);
                self.evaluate_submission(&text);
            }
        }
        Ok(())
    }

    fn evaluate_meta_command(&mut self, command: &str) -> Command {
        match command {
            "#showTree" => {
                self.show_tree = !self.show_tree;
                let state = if self.show_tree { "Showing" } else { "Not showing" };
                println!("{} parse trees.", state);
            }
            "#showProgram" => {
                self.show_program = !self.show_program;
                let state = if self.show_program { "Showing" } else { "Not showing" };
                println!("{} bound tree.", state);
            }
            "#reset" => {
                self.previous = None;
                self.variables.clear();
                println!("Session reset.");
            }
            "#exit" => return Command::Exit,
            other => print_error(&format!("Invalid command {}.", other)),
        }
        Command::Continue
    }

    fn evaluate_submission(&mut self, text: &str) {
        let tree = rill_parser::parse(text);
        if self.show_tree {
            if let Err(error) = tree.root_node().write_to(&mut io::stdout().lock()) {
                print_error(&error.to_string());
            }
        }

        let compilation = match &self.previous {
            Some(previous) => Compilation::continue_with(Rc::clone(previous), tree),
            None => Compilation::new(vec![tree]),
        };

        if self.show_program {
            let mut stdout = io::stdout().lock();
            if let Err(error) = compilation.emit_tree(&mut stdout) {
                print_error(&error.to_string());
            }
        }

        match compilation.evaluate(&mut self.variables) {
            Ok(result) if result.diagnostics.is_empty() => {
                if let Some(value) = result.value.filter(|value| !value.is_unit()) {
                    println!("{}", value);
                }
                self.previous = Some(Rc::new(compilation));
            }
            Ok(result) => {
                debug!(count = result.diagnostics.len(), "submission rejected");
                print_diagnostics("<stdin>", text, &result.diagnostics);
            }
            Err(error) => {
                print_error(&error.to_string());
                self.previous = Some(Rc::new(compilation));
            }
        }
    }
}

/// A blank line forces submission; otherwise the text is complete once it
/// parses without diagnostics.
fn is_complete_submission(text: &str, last_line: &str) -> bool {
    if last_line.trim().is_empty() {
        return true;
    }
    rill_parser::parse(text).diagnostics().is_empty()
}
