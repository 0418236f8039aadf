// ABOUTME: Built-ins available without an import: introspection, printing, timing, exit

use super::{arity_error, declare_builtin, expect_string};
use crate::control::Control;
use crate::env::Environment;
use crate::error::LithiumError;
use crate::value::Value;
use std::io::Write;
use std::rc::Rc;

pub fn register(scope: &Rc<Environment>) {
    declare_builtin(scope, "type", |_, args, rng| {
        let v = args.first().ok_or_else(|| arity_error("type", "1", args.len(), rng))?;
        Ok(Value::Str(v.type_name().to_string()))
    });

    declare_builtin(scope, "len", |_, args, rng| {
        let v = args.first().ok_or_else(|| arity_error("len", "1", args.len(), rng))?;
        match v {
            Value::Array(a) => Ok(Value::Number(a.borrow().elements.len() as f64)),
            Value::Str(s) => Ok(Value::Number(s.chars().count() as f64)),
            other => Err(LithiumError::runtime(format!("'{}' has no length", other.type_name()), rng.clone()).into()),
        }
    });

    declare_builtin(scope, "number", |_, args, rng| {
        let v = args.first().ok_or_else(|| arity_error("number", "1", args.len(), rng))?;
        Ok(Value::Number(to_number(v, rng)?))
    });

    declare_builtin(scope, "string", |_, args, rng| {
        let v = args.first().ok_or_else(|| arity_error("string", "1", args.len(), rng))?;
        Ok(Value::Str(v.to_display_string()))
    });

    declare_builtin(scope, "boolean", |_, args, rng| {
        let v = args.first().ok_or_else(|| arity_error("boolean", "1", args.len(), rng))?;
        Ok(Value::Bool(v.to_boolean()))
    });

    declare_builtin(scope, "print", |_, args, _rng| {
        print_joined(args);
        let _ = std::io::stdout().flush();
        Ok(Value::Null)
    });

    declare_builtin(scope, "println", |_, args, _rng| {
        print_joined(args);
        println!();
        Ok(Value::Null)
    });

    declare_builtin(scope, "printf", |_, args, rng| {
        let fmt = args.first().ok_or_else(|| arity_error("printf", "at least 1", args.len(), rng))?;
        let fmt = expect_string(fmt, rng)?;
        print!("{}", format_printf(fmt, &args[1..]));
        let _ = std::io::stdout().flush();
        Ok(Value::Null)
    });

    declare_builtin(scope, "input", |_, args, rng| {
        if let Some(prompt) = args.first() {
            print!("{}", prompt.to_display_string());
            let _ = std::io::stdout().flush();
        }
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) => Ok(Value::Null), // EOF
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Ok(Value::Str(line))
            }
            Err(e) => Err(LithiumError::runtime(format!("input: {}", e), rng.clone()).into()),
        }
    });

    declare_builtin(scope, "exit", |_, args, _rng| {
        let code = match args.first() {
            Some(Value::Number(n)) => *n as i32,
            Some(_) | None => 0,
        };
        Err(Control::Exit(code))
    });

    declare_builtin(scope, "sleep", |_, args, rng| {
        let v = args.first().ok_or_else(|| arity_error("sleep", "1", args.len(), rng))?;
        let secs = super::expect_number(v, rng)?;
        if secs > 0.0 {
            std::thread::sleep(std::time::Duration::from_secs_f64(secs));
        }
        Ok(Value::Null)
    });

    declare_builtin(scope, "time", |_, _args, rng| {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| LithiumError::runtime(format!("time: {}", e), rng.clone()))?;
        Ok(Value::Number(now.as_secs_f64()))
    });
}

fn print_joined(args: &[Value]) {
    let mut out = std::io::stdout();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            let _ = write!(out, " ");
        }
        let _ = write!(out, "{}", arg.to_display_string());
    }
}

fn to_number(v: &Value, range: &crate::source_map::Range) -> crate::control::EvalResult<f64> {
    match v {
        Value::Number(n) => Ok(*n),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Null => Ok(0.0),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| LithiumError::runtime(format!("cannot convert '{}' to a number", s), range.clone()).into()),
        other => Err(LithiumError::runtime(format!("cannot convert {} to a number", other.type_name()), range.clone()).into()),
    }
}

/// A minimal `%s`/`%d`/`%f`/`%%` substitution, in argument order.
fn format_printf(fmt: &str, args: &[Value]) -> String {
    let mut out = String::new();
    let mut chars = fmt.chars().peekable();
    let mut arg_iter = args.iter();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some('s') | Some('d') | Some('f') => {
                if let Some(v) = arg_iter.next() {
                    out.push_str(&v.to_display_string());
                }
            }
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printf_substitutes_in_order() {
        assert_eq!(
            format_printf("%s is %d", &[Value::Str("x".into()), Value::Number(3.0)]),
            "x is 3"
        );
    }

    #[test]
    fn printf_percent_escape() {
        assert_eq!(format_printf("100%%", &[]), "100%");
    }
}
