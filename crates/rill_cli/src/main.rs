//! rill: run rill scripts or start an interactive session.
//!
//! Usage:
//!   rill [options] [file...]
//!
//! All files form a single compilation, so a function may be called from a
//! file that precedes its declaration. Directories expand to the `.rill`
//! files beneath them. Without files a REPL starts.

mod repl;
mod report;

use clap::Parser as ClapParser;
use report::{print_error, print_file_diagnostics};
use rill_compiler::Compilation;
use rill_evaluator::Variables;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const SOURCE_EXTENSION: &str = "rill";

#[derive(ClapParser, Debug)]
#[command(name = "rill", about = "rill - a small statically typed scripting language", version)]
struct Cli {
    /// Script files or directories to run, compiled together.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Print the lowered program before evaluating it.
    #[arg(long = "show-program")]
    show_program: bool,

    /// Write the control flow graph of the last declared function as a dot graph.
    #[arg(long = "cfg", value_name = "PATH")]
    cfg: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.files.is_empty() {
        let mut repl = repl::Repl::new(cli.show_program);
        if let Err(error) = repl.run() {
            print_error(&error.to_string());
            process::exit(1);
        }
        return;
    }

    let exit_code = run_files(&cli);
    process::exit(exit_code);
}

fn run_files(cli: &Cli) -> i32 {
    let paths = match collect_source_files(&cli.files) {
        Ok(paths) => paths,
        Err(error) => {
            print_error(&error.to_string());
            return 1;
        }
    };

    let mut sources = Vec::with_capacity(paths.len());
    let mut trees = Vec::with_capacity(paths.len());
    for path in &paths {
        let name = path.display().to_string();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) => {
                print_error(&format!("Failed to read '{}': {}", name, error));
                return 1;
            }
        };
        debug!(file = %name, bytes = text.len(), "parsing file");
        trees.push(rill_parser::parse_file(&name, &text));
        sources.push((name, text));
    }

    if sources.is_empty() {
        print_error("No source files found.");
        return 1;
    }

    let compilation = Compilation::new(trees);
    if cli.show_program {
        if let Err(error) = compilation.emit_tree(&mut io::stdout().lock()) {
            print_error(&error.to_string());
            return 1;
        }
    }

    let mut variables = Variables::default();
    match compilation.evaluate(&mut variables) {
        Ok(result) if result.diagnostics.is_empty() => {
            if let Some(value) = result.value.filter(|value| !value.is_unit()) {
                println!("{}", value);
            }
        }
        Ok(result) => {
            print_file_diagnostics(&sources, &result.diagnostics);
            let count = result.diagnostics.len();
            eprintln!("\nFound {} error{}.", count, if count == 1 { "" } else { "s" });
            return 2;
        }
        Err(error) => {
            print_error(&error.to_string());
            return 3;
        }
    }

    if let Some(path) = &cli.cfg {
        if let Err(error) = write_cfg(path, &compilation) {
            print_error(&format!("Failed to write '{}': {}", path.display(), error));
            return 1;
        }
    }

    0
}

/// Expand directories to the `.rill` files beneath them, sorted by path.
/// Plain file arguments are kept as given.
fn collect_source_files(arguments: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for argument in arguments {
        if argument.is_dir() {
            let mut found = Vec::new();
            collect_directory(argument, &mut found)?;
            found.sort();
            files.extend(found);
        } else {
            files.push(argument.clone());
        }
    }
    Ok(files)
}

fn collect_directory(directory: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_directory(&path, files)?;
        } else if path.extension().is_some_and(|extension| extension == SOURCE_EXTENSION) {
            files.push(path);
        }
    }
    Ok(())
}

fn write_cfg(path: &Path, compilation: &Compilation) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    compilation.write_control_flow_graph(&mut writer)?;
    writer.flush()
}
