// ABOUTME: The `random` built-in module: pseudo-random numbers over the value model

use super::{arity_error, declare_builtin, expect_number};
use crate::env::Environment;
use crate::error::LithiumError;
use crate::value::Value;
use rand::Rng;
use std::rc::Rc;

pub fn register(scope: &Rc<Environment>) {
    declare_builtin(scope, "random", |_, _args, _rng| {
        Ok(Value::Number(rand::rng().random::<f64>()))
    });

    declare_builtin(scope, "randint", |_, args, rng| {
        if args.len() != 2 {
            return Err(arity_error("randint", "2", args.len(), rng).into());
        }
        let lo = expect_number(&args[0], rng)? as i64;
        let hi = expect_number(&args[1], rng)? as i64;
        if lo > hi {
            return Err(LithiumError::runtime("randint: lower bound exceeds upper bound", rng.clone()).into());
        }
        Ok(Value::Number(rand::rng().random_range(lo..=hi) as f64))
    });

    declare_builtin(scope, "choice", |_, args, rng| {
        let v = args.first().ok_or_else(|| arity_error("choice", "1", args.len(), rng))?;
        match v {
            Value::Array(a) => {
                let data = a.borrow();
                if data.elements.is_empty() {
                    return Err(LithiumError::runtime("choice: array is empty", rng.clone()).into());
                }
                let i = rand::rng().random_range(0..data.elements.len());
                Ok(data.elements[i].clone())
            }
            other => Err(LithiumError::runtime(format!("choice expects an array, got {}", other.type_name()), rng.clone()).into()),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_is_within_unit_interval() {
        let scope = Environment::new();
        register(&scope);
        if let Some(Value::Builtin(b)) = scope.lookup("random") {
            let mut interp = crate::eval::Interpreter::new(vec![]);
            let r = dummy_range();
            let v = (b.func)(&mut interp, &[], &r).unwrap();
            assert!(matches!(v, Value::Number(n) if (0.0..1.0).contains(&n)));
        } else {
            panic!("expected random builtin");
        }
    }

    fn dummy_range() -> crate::source_map::Range {
        let filename: Rc<str> = Rc::from("t.li");
        let text: Rc<str> = Rc::from("x");
        let loc = crate::source_map::Location::new(filename, text, 0);
        crate::source_map::Range::new(loc.clone(), loc)
    }
}
