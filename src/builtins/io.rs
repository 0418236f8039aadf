// ABOUTME: The `io` built-in module: whole-file helpers plus a handle object from `open`

use super::{arity_error, declare_builtin, expect_string};
use crate::control::EvalResult;
use crate::env::Environment;
use crate::error::LithiumError;
use crate::eval::Interpreter;
use crate::source_map::Range;
use crate::value::{BuiltinData, ObjectData, Value};
use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::rc::Rc;

pub fn register(scope: &Rc<Environment>) {
    declare_builtin(scope, "read", |_, args, rng| {
        let path = expect_string(args.first().ok_or_else(|| arity_error("read", "1", args.len(), rng))?, rng)?;
        std::fs::read_to_string(path)
            .map(Value::Str)
            .map_err(|e| LithiumError::runtime(format!("read: {}", e), rng.clone()).into())
    });

    declare_builtin(scope, "write", |_, args, rng| {
        if args.len() != 2 {
            return Err(arity_error("write", "2", args.len(), rng).into());
        }
        let path = expect_string(&args[0], rng)?;
        let contents = args[1].to_display_string();
        std::fs::write(path, contents)
            .map(|_| Value::Bool(true))
            .map_err(|e| LithiumError::runtime(format!("write: {}", e), rng.clone()).into())
    });

    declare_builtin(scope, "exists", |_, args, rng| {
        let path = expect_string(args.first().ok_or_else(|| arity_error("exists", "1", args.len(), rng))?, rng)?;
        Ok(Value::Bool(std::path::Path::new(path).exists()))
    });

    declare_builtin(scope, "remove", |_, args, rng| {
        let path = expect_string(args.first().ok_or_else(|| arity_error("remove", "1", args.len(), rng))?, rng)?;
        std::fs::remove_file(path)
            .map(|_| Value::Bool(true))
            .map_err(|e| LithiumError::runtime(format!("remove: {}", e), rng.clone()).into())
    });

    declare_builtin(scope, "open", |_, args, rng| {
        let path = expect_string(args.first().ok_or_else(|| arity_error("open", "1-2", args.len(), rng))?, rng)?;
        let mode = match args.get(1) {
            Some(v) => expect_string(v, rng)?,
            None => "r",
        };
        open_handle(path, mode, rng)
    });
}

fn open_handle(path: &str, mode: &str, range: &Range) -> EvalResult<Value> {
    let mut opts = OpenOptions::new();
    match mode {
        "r" => {
            opts.read(true);
        }
        "w" => {
            opts.write(true).create(true).truncate(true);
        }
        "a" => {
            opts.append(true).create(true);
        }
        other => {
            return Err(LithiumError::runtime(format!("open: unknown mode '{}'", other), range.clone()).into());
        }
    }
    let file = opts
        .open(path)
        .map_err(|e| LithiumError::runtime(format!("open: {}", e), range.clone()))?;
    let handle = Rc::new(RefCell::new(Some(file)));

    let env = Environment::new();

    let h = handle.clone();
    bind(&env, "read", move |_, _args, rng| {
        let mut guard = h.borrow_mut();
        let file = guard.as_mut().ok_or_else(|| LithiumError::runtime("file is closed", rng.clone()))?;
        let mut buf = String::new();
        file.read_to_string(&mut buf)
            .map_err(|e| LithiumError::runtime(format!("read: {}", e), rng.clone()))?;
        Ok(Value::Str(buf))
    });

    let h = handle.clone();
    bind(&env, "write", move |_, args, rng| {
        let text = args.first().ok_or_else(|| arity_error("write", "1", args.len(), rng))?.to_display_string();
        let mut guard = h.borrow_mut();
        let file = guard.as_mut().ok_or_else(|| LithiumError::runtime("file is closed", rng.clone()))?;
        file.write_all(text.as_bytes())
            .map_err(|e| LithiumError::runtime(format!("write: {}", e), rng.clone()))?;
        Ok(Value::Null)
    });

    let h = handle.clone();
    bind(&env, "seek", move |_, args, rng| {
        let pos = super::expect_number(args.first().ok_or_else(|| arity_error("seek", "1", args.len(), rng))?, rng)?;
        let mut guard = h.borrow_mut();
        let file = guard.as_mut().ok_or_else(|| LithiumError::runtime("file is closed", rng.clone()))?;
        file.seek(SeekFrom::Start(pos as u64))
            .map_err(|e| LithiumError::runtime(format!("seek: {}", e), rng.clone()))?;
        Ok(Value::Null)
    });

    let h = handle.clone();
    bind(&env, "close", move |_, _args, _rng| {
        h.borrow_mut().take();
        Ok(Value::Null)
    });

    Ok(Value::Object(Rc::new(ObjectData {
        class_name: "File".to_string(),
        env: RefCell::new(Some(env)),
    })))
}

fn bind(
    env: &Rc<Environment>,
    name: &str,
    f: impl Fn(&mut Interpreter, &[Value], &Range) -> EvalResult<Value> + 'static,
) {
    env.declare(
        name,
        Value::Builtin(Rc::new(BuiltinData {
            name: name.to_string(),
            func: Rc::new(f),
        })),
        false,
    );
}
