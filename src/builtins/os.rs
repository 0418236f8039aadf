// ABOUTME: The `os` built-in module: environment variables, shell execution, platform info

use super::{arity_error, declare_builtin, expect_string};
use crate::env::Environment;
use crate::error::LithiumError;
use crate::value::Value;
use std::process::Command;
use std::rc::Rc;

pub fn register(scope: &Rc<Environment>) {
    declare_builtin(scope, "env", |_, args, rng| {
        let name = expect_string(args.first().ok_or_else(|| arity_error("env", "1", args.len(), rng))?, rng)?;
        match std::env::var(name) {
            Ok(v) => Ok(Value::Str(v)),
            Err(_) => Ok(Value::Null),
        }
    });

    declare_builtin(scope, "cwd", |_, _args, rng| {
        let dir = std::env::current_dir().map_err(|e| LithiumError::runtime(format!("cwd: {}", e), rng.clone()))?;
        Ok(Value::Str(dir.to_string_lossy().into_owned()))
    });

    declare_builtin(scope, "platform", |_, _args, _rng| {
        Ok(Value::Str(std::env::consts::OS.to_string()))
    });

    // `shell` is an opaque host function per spec's out-of-scope boundary:
    // its internals just need to run a command and hand back its output.
    declare_builtin(scope, "shell", |_, args, rng| {
        let cmd = expect_string(args.first().ok_or_else(|| arity_error("shell", "1", args.len(), rng))?, rng)?;
        let output = Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .output()
            .map_err(|e| LithiumError::runtime(format!("shell: {}", e), rng.clone()))?;
        Ok(Value::Str(String::from_utf8_lossy(&output.stdout).into_owned()))
    });

    // Handles from `io::open`/`socket::connect` are objects exposing
    // their own bound `close` member; this generic `close` just forwards
    // to it so callers don't need to remember which module opened the
    // handle.
    declare_builtin(scope, "close", |interp, args, rng| {
        let handle = args.first().ok_or_else(|| arity_error("close", "1", args.len(), rng))?;
        if let Some(close_fn) = crate::value::get_member(handle, "close", rng) {
            interp.call_value(&close_fn, &[], rng)
        } else {
            Ok(Value::Null)
        }
    });
}
