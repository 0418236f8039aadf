use clap::Parser as ClapParser;
use lithium::control::Control;
use lithium::diagnostics;
use lithium::eval::Interpreter;
use lithium::parser::Parser;
use lithium::semantic::SemanticChecker;
use lithium::{config, repl};
use std::path::PathBuf;

/// The Lithium scripting language: runs a `.li` script, or starts an
/// interactive session when no file is given.
#[derive(ClapParser, Debug)]
#[command(name = "li")]
#[command(version = config::VERSION)]
#[command(about = "A tree-walking interpreter for the Lithium scripting language")]
struct CliArgs {
    /// Script file to run. Starts an interactive session if omitted.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Arguments passed through to the script (exposed via `import <args>`).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    script_args: Vec<String>,
}

fn main() {
    let args = CliArgs::parse();

    let code = match args.file {
        Some(path) => run_file(&path, args.script_args),
        None => {
            let mut interp = Interpreter::new(args.script_args);
            repl::run(&mut interp)
        }
    };

    std::process::exit(code);
}

fn run_file(path: &PathBuf, script_args: Vec<String>) -> i32 {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: could not read '{}': {}", path.display(), e);
            return 1;
        }
    };

    let filename = path.to_string_lossy().into_owned();
    let (ok, program) = Parser::parse_source(filename, source);
    if !ok {
        return 1;
    }

    let errors = SemanticChecker::check(&program);
    if !errors.is_empty() {
        for err in &errors {
            diagnostics::report(err);
        }
        return 1;
    }

    let mut interp = Interpreter::new(script_args);
    match interp.run_program(&program) {
        Ok(()) => 0,
        Err(Control::Exit(code)) => code,
        Err(Control::Error(e)) => {
            diagnostics::report(&e);
            1
        }
        // The semantic pass already rejects top-level return/break/continue.
        Err(Control::Return(_)) | Err(Control::Break) | Err(Control::Continue) => 0,
    }
}
