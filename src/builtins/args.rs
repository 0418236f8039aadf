// ABOUTME: The `args` built-in module: exposes the program's trailing CLI arguments

use crate::env::Environment;
use crate::value::Value;
use std::rc::Rc;

pub fn register(scope: &Rc<Environment>, program_args: &[String]) {
    let argv = Value::array(program_args.iter().map(|a| Value::Str(a.clone())).collect());
    scope.redeclare("argv", argv, false);
    scope.redeclare("argc", Value::Number(program_args.len() as f64), false);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_argv_and_argc() {
        let scope = Environment::new();
        register(&scope, &["a".to_string(), "b".to_string()]);
        assert!(matches!(scope.lookup("argc"), Some(Value::Number(n)) if n == 2.0));
        if let Some(Value::Array(a)) = scope.lookup("argv") {
            assert_eq!(a.borrow().elements.len(), 2);
        } else {
            panic!("expected argv array");
        }
    }
}
