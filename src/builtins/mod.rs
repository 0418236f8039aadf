// ABOUTME: Host-callable registry: a fixed core plus import-gated module sets

mod args;
mod core;
mod io;
mod math;
mod os;
mod random;
mod socket;

use crate::control::EvalResult;
use crate::env::Environment;
use crate::eval::Interpreter;
use crate::source_map::Range;
use crate::value::{BuiltinData, Value};
use std::rc::Rc;

/// Wraps a closure as a host function and writes it into `scope`,
/// overwriting any existing binding of the same name. `redeclare` is
/// used rather than `declare` because `os` and `socket` both define a
/// `close`, and a script may import both.
fn declare_builtin(
    scope: &Rc<Environment>,
    name: &str,
    f: impl Fn(&mut Interpreter, &[Value], &Range) -> EvalResult<Value> + 'static,
) {
    let value = Value::Builtin(Rc::new(BuiltinData {
        name: name.to_string(),
        func: Rc::new(f),
    }));
    scope.redeclare(name, value, false);
}

fn arity_error(name: &str, expected: &str, got: usize, range: &Range) -> crate::error::LithiumError {
    crate::error::LithiumError::runtime(
        format!("{} expects {} argument(s), got {}", name, expected, got),
        range.clone(),
    )
}

fn expect_string<'a>(v: &'a Value, range: &Range) -> EvalResult<&'a str> {
    match v {
        Value::Str(s) => Ok(s.as_str()),
        other => Err(crate::error::LithiumError::runtime(
            format!("expected string, got {}", other.type_name()),
            range.clone(),
        )
        .into()),
    }
}

fn expect_number(v: &Value, range: &Range) -> EvalResult<f64> {
    match v {
        Value::Number(n) => Ok(*n),
        other => Err(crate::error::LithiumError::runtime(
            format!("expected number, got {}", other.type_name()),
            range.clone(),
        )
        .into()),
    }
}

/// Registers the handful of built-ins available without an `import`:
/// introspection, printing, timing, and process exit.
pub fn register_core(scope: &Rc<Environment>) {
    core::register(scope);
}

/// Registers the named built-in module's functions into `scope`. Only
/// called for names already confirmed to be in [`crate::config::BUILTIN_MODULES`].
pub fn register_module(name: &str, scope: &Rc<Environment>, program_args: &[String]) {
    match name {
        "args" => args::register(scope, program_args),
        "io" => io::register(scope),
        "math" => math::register(scope),
        "random" => random::register(scope),
        "os" => os::register(scope),
        "socket" => socket::register(scope),
        _ => unreachable!("caller already checked BUILTIN_MODULES"),
    }
}
