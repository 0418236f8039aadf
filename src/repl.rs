// ABOUTME: rustyline-backed interactive read loop with continuation-line accumulation

use crate::config::{WELCOME_FOOTER, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use crate::control::Control;
use crate::eval::Interpreter;
use crate::parser::Parser;
use crate::semantic::SemanticChecker;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};

const HISTORY_FILE: &str = ".lithium_history";

/// Runs the interactive read loop until `exit` (the sentinel or the
/// `exit()` built-in) or end-of-input. Returns the process exit code.
pub fn run(interp: &mut Interpreter) -> i32 {
    interp.interactive = true;

    let config = Config::builder().auto_add_history(true).build();
    let mut editor = match DefaultEditor::with_config(config) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("error: failed to initialize the line editor: {}", e);
            return 1;
        }
    };
    let _ = editor.load_history(HISTORY_FILE);

    println!("{}", WELCOME_MESSAGE);
    println!("{}", WELCOME_SUBTITLE);
    println!("{}", WELCOME_FOOTER);

    let mut buffer = String::new();
    let mut exit_code = 0;

    'outer: loop {
        let prompt = if buffer.is_empty() { "li> " } else { "...> " };
        match editor.readline(prompt) {
            Ok(line) => {
                if buffer.is_empty() && line.trim() == "exit" {
                    break 'outer;
                }
                buffer.push_str(&line);
                buffer.push('\n');

                if needs_continuation(&buffer, &line) {
                    continue;
                }

                let source = std::mem::take(&mut buffer);
                if source.trim().is_empty() {
                    continue;
                }
                match run_one(interp, source) {
                    Ok(()) => {}
                    Err(code) => {
                        exit_code = code;
                        break 'outer;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C abandons whatever is in the continuation buffer.
                buffer.clear();
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                break 'outer;
            }
            Err(err) => {
                eprintln!("error: {}", err);
                exit_code = 1;
                break 'outer;
            }
        }
    }

    let _ = editor.save_history(HISTORY_FILE);
    exit_code
}

/// A logical read continues across physical lines while the buffer's
/// open-brace depth is still positive, or the most recent line ends in
/// `{`, `(`, `[`, or `,` (matching §6 of the language's external
/// interface contract).
fn needs_continuation(buffer: &str, last_line: &str) -> bool {
    let depth = brace_depth(buffer);
    if depth > 0 {
        return true;
    }
    matches!(last_line.trim_end().chars().last(), Some('{') | Some('(') | Some('[') | Some(','))
}

fn brace_depth(buffer: &str) -> i64 {
    let mut depth: i64 = 0;
    for c in buffer.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
    }
    depth
}

/// Parses, semantic-checks, and evaluates one logical input. Returns
/// `Err(code)` when the buffer triggered a process exit (the `exit()`
/// built-in), `Ok(())` otherwise — diagnostics for lex/parse/semantic/
/// runtime errors are reported to stderr but do not end the session.
fn run_one(interp: &mut Interpreter, source: String) -> Result<(), i32> {
    let (ok, program) = Parser::parse_source("cin", source);
    if !ok {
        return Ok(());
    }
    let errors = SemanticChecker::check(&program);
    if !errors.is_empty() {
        for err in &errors {
            crate::diagnostics::report(err);
        }
        return Ok(());
    }
    match interp.run_program(&program) {
        Ok(()) => Ok(()),
        Err(Control::Exit(code)) => Err(code),
        Err(Control::Error(e)) => {
            crate::diagnostics::report(&e);
            Ok(())
        }
        Err(Control::Return(_)) | Err(Control::Break) | Err(Control::Continue) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continues_while_brace_depth_positive() {
        assert!(needs_continuation("fn f() {\n", "fn f() {"));
    }

    #[test]
    fn continues_after_trailing_comma() {
        assert!(needs_continuation("foo(1,\n", "foo(1,"));
    }

    #[test]
    fn does_not_continue_a_complete_statement() {
        assert!(!needs_continuation("let x = 1;\n", "let x = 1;"));
    }

    #[test]
    fn closed_braces_cancel_out() {
        assert!(!needs_continuation("fn f() { return 1; }\n", "fn f() { return 1; }"));
    }
}
