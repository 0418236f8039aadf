// ABOUTME: The `math` built-in module: constants and floating-point functions

use super::{arity_error, declare_builtin, expect_number};
use crate::env::Environment;
use crate::value::Value;
use std::rc::Rc;

pub fn register(scope: &Rc<Environment>) {
    scope.redeclare("PI", Value::Number(std::f64::consts::PI), true);
    scope.redeclare("E", Value::Number(std::f64::consts::E), true);

    declare_builtin(scope, "sqrt", |_, args, rng| {
        let n = expect_number(args.first().ok_or_else(|| arity_error("sqrt", "1", args.len(), rng))?, rng)?;
        Ok(Value::Number(n.sqrt()))
    });
    declare_builtin(scope, "pow", |_, args, rng| {
        if args.len() != 2 {
            return Err(arity_error("pow", "2", args.len(), rng).into());
        }
        let base = expect_number(&args[0], rng)?;
        let exp = expect_number(&args[1], rng)?;
        Ok(Value::Number(base.powf(exp)))
    });
    declare_builtin(scope, "abs", |_, args, rng| {
        let n = expect_number(args.first().ok_or_else(|| arity_error("abs", "1", args.len(), rng))?, rng)?;
        Ok(Value::Number(n.abs()))
    });
    declare_builtin(scope, "floor", |_, args, rng| {
        let n = expect_number(args.first().ok_or_else(|| arity_error("floor", "1", args.len(), rng))?, rng)?;
        Ok(Value::Number(n.floor()))
    });
    declare_builtin(scope, "ceil", |_, args, rng| {
        let n = expect_number(args.first().ok_or_else(|| arity_error("ceil", "1", args.len(), rng))?, rng)?;
        Ok(Value::Number(n.ceil()))
    });
    declare_builtin(scope, "round", |_, args, rng| {
        let n = expect_number(args.first().ok_or_else(|| arity_error("round", "1", args.len(), rng))?, rng)?;
        Ok(Value::Number(n.round()))
    });
    declare_builtin(scope, "sin", |_, args, rng| {
        let n = expect_number(args.first().ok_or_else(|| arity_error("sin", "1", args.len(), rng))?, rng)?;
        Ok(Value::Number(n.sin()))
    });
    declare_builtin(scope, "cos", |_, args, rng| {
        let n = expect_number(args.first().ok_or_else(|| arity_error("cos", "1", args.len(), rng))?, rng)?;
        Ok(Value::Number(n.cos()))
    });
    declare_builtin(scope, "tan", |_, args, rng| {
        let n = expect_number(args.first().ok_or_else(|| arity_error("tan", "1", args.len(), rng))?, rng)?;
        Ok(Value::Number(n.tan()))
    });
    declare_builtin(scope, "log", |_, args, rng| {
        let n = expect_number(args.first().ok_or_else(|| arity_error("log", "1", args.len(), rng))?, rng)?;
        Ok(Value::Number(n.ln()))
    });
    declare_builtin(scope, "min", |_, args, rng| {
        if args.len() != 2 {
            return Err(arity_error("min", "2", args.len(), rng).into());
        }
        let a = expect_number(&args[0], rng)?;
        let b = expect_number(&args[1], rng)?;
        Ok(Value::Number(a.min(b)))
    });
    declare_builtin(scope, "max", |_, args, rng| {
        if args.len() != 2 {
            return Err(arity_error("max", "2", args.len(), rng).into());
        }
        let a = expect_number(&args[0], rng)?;
        let b = expect_number(&args[1], rng)?;
        Ok(Value::Number(a.max(b)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Interpreter;
    use crate::parser::Parser;
    use crate::semantic::SemanticChecker;

    fn run(src: &str) -> Interpreter {
        let (ok, program) = Parser::parse_source("t.li", src);
        assert!(ok);
        assert!(SemanticChecker::check(&program).is_empty());
        let mut interp = Interpreter::new(vec![]);
        interp.run_program(&program).expect("program should run");
        interp
    }

    #[test]
    fn sqrt_and_constants() {
        let interp = run("import <math>; let r = sqrt(16); let p = PI;");
        assert!(matches!(interp.global.lookup("r"), Some(Value::Number(n)) if n == 4.0));
        assert!(matches!(interp.global.lookup("p"), Some(Value::Number(n)) if (n - std::f64::consts::PI).abs() < 1e-12));
    }
}
