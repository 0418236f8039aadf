// ABOUTME: Per-kind built-in method tables for arrays, strings, and numbers

use crate::control::EvalResult;
use crate::error::LithiumError;
use crate::eval::Interpreter;
use crate::source_map::Range;
use crate::value::{ArrayData, Value};
use std::cell::RefCell;
use std::rc::Rc;

fn wrap(name: &str, f: impl Fn(&mut Interpreter, &[Value], &Range) -> EvalResult<Value> + 'static) -> Value {
    Value::Builtin(Rc::new(crate::value::BuiltinData {
        name: name.to_string(),
        func: Rc::new(f),
    }))
}

fn arity_error(name: &str, expected: &str, got: usize, range: &Range) -> LithiumError {
    LithiumError::runtime(
        format!("{} expects {} argument(s), got {}", name, expected, got),
        range.clone(),
    )
}

fn expect_number(v: &Value, range: &Range) -> EvalResult<f64> {
    match v {
        Value::Number(n) => Ok(*n),
        other => Err(LithiumError::runtime(
            format!("expected number, got {}", other.type_name()),
            range.clone(),
        )
        .into()),
    }
}

fn expect_string<'a>(v: &'a Value, range: &Range) -> EvalResult<&'a str> {
    match v {
        Value::Str(s) => Ok(s.as_str()),
        other => Err(LithiumError::runtime(
            format!("expected string, got {}", other.type_name()),
            range.clone(),
        )
        .into()),
    }
}

/// Per-kind member dispatch. Arrays and strings check a hoisted
/// built-in table; arrays additionally check their own per-instance
/// overrides first, so replacing one array's `push` does not affect
/// any other array. Objects simply look up the name in their member
/// environment; other kinds have no members.
pub fn get_member(value: &Value, name: &str, range: &Range) -> Option<Value> {
    match value {
        Value::Array(data) => array_member(data, name, range),
        Value::Str(s) => string_member(s.clone(), name),
        Value::Number(n) => number_member(*n, name),
        Value::Object(obj) => obj.env.borrow().as_ref().and_then(|e| e.lookup(name)),
        _ => None,
    }
}

fn array_member(data: &Rc<RefCell<ArrayData>>, name: &str, range: &Range) -> Option<Value> {
    if let Some(v) = data.borrow().overrides.get(name) {
        return Some(v.clone());
    }
    let receiver = data.clone();
    let r = range.clone();
    let built = match name {
        "push" => wrap("push", move |_, args, rng| {
            if args.is_empty() {
                return Err(arity_error("push", "at least 1", args.len(), rng).into());
            }
            let mut d = receiver.borrow_mut();
            for a in args {
                d.elements.push(a.clone());
            }
            Ok(Value::Number(d.elements.len() as f64))
        }),
        "pop" => wrap("pop", move |_, _args, rng| {
            let mut d = receiver.borrow_mut();
            d.elements
                .pop()
                .ok_or_else(|| LithiumError::runtime("pop on empty array", rng.clone()).into())
        }),
        "length" => wrap("length", move |_, _args, _rng| {
            Ok(Value::Number(receiver.borrow().elements.len() as f64))
        }),
        "clear" => wrap("clear", move |_, _args, _rng| {
            receiver.borrow_mut().elements.clear();
            Ok(Value::Null)
        }),
        "empty" => wrap("empty", move |_, _args, _rng| {
            Ok(Value::Bool(receiver.borrow().elements.is_empty()))
        }),
        "get" => wrap("get", move |_, args, rng| {
            let idx = args
                .first()
                .ok_or_else(|| arity_error("get", "1", args.len(), rng))?;
            let i = expect_number(idx, rng)? as i64;
            let d = receiver.borrow();
            if i < 0 || i as usize >= d.elements.len() {
                return Err(LithiumError::runtime("array index out of bounds", rng.clone()).into());
            }
            Ok(d.elements[i as usize].clone())
        }),
        "set" => wrap("set", move |_, args, rng| {
            if args.len() < 2 {
                return Err(arity_error("set", "2", args.len(), rng).into());
            }
            let i = expect_number(&args[0], rng)? as i64;
            let mut d = receiver.borrow_mut();
            if i < 0 || i as usize >= d.elements.len() {
                return Err(LithiumError::runtime("array index out of bounds", rng.clone()).into());
            }
            d.elements[i as usize] = args[1].clone();
            Ok(Value::Null)
        }),
        "remove" => wrap("remove", move |_, args, rng| {
            let idx = args
                .first()
                .ok_or_else(|| arity_error("remove", "1", args.len(), rng))?;
            let i = expect_number(idx, rng)? as i64;
            let mut d = receiver.borrow_mut();
            if i < 0 || i as usize >= d.elements.len() {
                return Err(LithiumError::runtime("array index out of bounds", rng.clone()).into());
            }
            Ok(d.elements.remove(i as usize))
        }),
        "find" => wrap("find", move |_, args, rng| {
            let target = args
                .first()
                .ok_or_else(|| arity_error("find", "1", args.len(), rng))?;
            let d = receiver.borrow();
            let pos = d
                .elements
                .iter()
                .position(|e| crate::value::values_equal(e, target));
            Ok(Value::Number(pos.map(|p| p as f64).unwrap_or(-1.0)))
        }),
        "contains" => wrap("contains", move |_, args, rng| {
            let target = args
                .first()
                .ok_or_else(|| arity_error("contains", "1", args.len(), rng))?;
            let d = receiver.borrow();
            Ok(Value::Bool(
                d.elements.iter().any(|e| crate::value::values_equal(e, target)),
            ))
        }),
        "join" => wrap("join", move |_, args, rng| {
            let sep = match args.first() {
                Some(v) => expect_string(v, rng)?.to_string(),
                None => "".to_string(),
            };
            let d = receiver.borrow();
            let parts: Vec<String> = d.elements.iter().map(|v| v.to_display_string()).collect();
            Ok(Value::Str(parts.join(&sep)))
        }),
        "sort" => wrap("sort", move |_, _args, rng| {
            let mut d = receiver.borrow_mut();
            let mut err = None;
            d.elements.sort_by(|a, b| {
                match crate::value::binary_lt(a, b) {
                    Some(true) => std::cmp::Ordering::Less,
                    Some(false) => {
                        if crate::value::values_equal(a, b) {
                            std::cmp::Ordering::Equal
                        } else {
                            std::cmp::Ordering::Greater
                        }
                    }
                    None => {
                        err = Some(());
                        std::cmp::Ordering::Equal
                    }
                }
            });
            if err.is_some() {
                return Err(LithiumError::runtime("array elements are not comparable", rng.clone()).into());
            }
            Ok(Value::Null)
        }),
        _ => return None,
    };
    Some(built)
}

fn string_member(s: String, name: &str) -> Option<Value> {
    let built = match name {
        "length" => wrap("length", move |_, _args, _rng| Ok(Value::Number(s.chars().count() as f64))),
        "empty" => wrap("empty", move |_, _args, _rng| Ok(Value::Bool(s.is_empty()))),
        "split" => wrap("split", move |_, args, rng| {
            let sep = match args.first() {
                Some(v) => expect_string(v, rng)?.to_string(),
                None => " ".to_string(),
            };
            let parts: Vec<Value> = if sep.is_empty() {
                s.chars().map(|c| Value::Str(c.to_string())).collect()
            } else {
                s.split(sep.as_str()).map(|p| Value::Str(p.to_string())).collect()
            };
            Ok(Value::array(parts))
        }),
        "lower" => wrap("lower", move |_, _args, _rng| Ok(Value::Str(s.to_lowercase()))),
        "upper" => wrap("upper", move |_, _args, _rng| Ok(Value::Str(s.to_uppercase()))),
        "code" => wrap("code", move |_, _args, rng| {
            s.chars()
                .next()
                .map(|c| Value::Number(c as u32 as f64))
                .ok_or_else(|| LithiumError::runtime("code on empty string", rng.clone()).into())
        }),
        "find" => wrap("find", move |_, args, rng| {
            let needle = args
                .first()
                .ok_or_else(|| arity_error("find", "1", args.len(), rng))?;
            let needle = expect_string(needle, rng)?;
            Ok(Value::Number(
                s.find(needle).map(|b| s[..b].chars().count() as f64).unwrap_or(-1.0),
            ))
        }),
        "isNumeric" => wrap("isNumeric", move |_, _args, _rng| {
            Ok(Value::Bool(!s.is_empty() && s.parse::<f64>().is_ok()))
        }),
        "strip" => wrap("strip", move |_, _args, _rng| Ok(Value::Str(s.trim().to_string()))),
        "rstrip" => wrap("rstrip", move |_, _args, _rng| Ok(Value::Str(s.trim_end().to_string()))),
        "lstrip" => wrap("lstrip", move |_, _args, _rng| Ok(Value::Str(s.trim_start().to_string()))),
        "startsWith" => wrap("startsWith", move |_, args, rng| {
            let prefix = args
                .first()
                .ok_or_else(|| arity_error("startsWith", "1", args.len(), rng))?;
            Ok(Value::Bool(s.starts_with(expect_string(prefix, rng)?)))
        }),
        "endsWith" => wrap("endsWith", move |_, args, rng| {
            let suffix = args
                .first()
                .ok_or_else(|| arity_error("endsWith", "1", args.len(), rng))?;
            Ok(Value::Bool(s.ends_with(expect_string(suffix, rng)?)))
        }),
        "contains" => wrap("contains", move |_, args, rng| {
            let needle = args
                .first()
                .ok_or_else(|| arity_error("contains", "1", args.len(), rng))?;
            Ok(Value::Bool(s.contains(expect_string(needle, rng)?)))
        }),
        "match" => wrap("match", move |_, args, rng| {
            let pattern = args
                .first()
                .ok_or_else(|| arity_error("match", "1", args.len(), rng))?;
            Ok(Value::Bool(s == expect_string(pattern, rng)?))
        }),
        _ => return None,
    };
    Some(built)
}

fn number_member(n: f64, name: &str) -> Option<Value> {
    let built = match name {
        "round" => wrap("round", move |_, _args, _rng| Ok(Value::Number(n.round()))),
        "abs" => wrap("abs", move |_, _args, _rng| Ok(Value::Number(n.abs()))),
        "floor" => wrap("floor", move |_, _args, _rng| Ok(Value::Number(n.floor()))),
        "ceil" => wrap("ceil", move |_, _args, _rng| Ok(Value::Number(n.ceil()))),
        _ => return None,
    };
    Some(built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn dummy_range() -> Range {
        let filename: Rc<str> = Rc::from("t.li");
        let text: Rc<str> = Rc::from("x");
        let loc = crate::source_map::Location::new(filename, text, 0);
        Range::new(loc.clone(), loc)
    }

    #[test]
    fn array_length_and_push_are_independent_per_instance() {
        let a = Value::array(vec![Value::Number(1.0)]);
        let b = Value::array(vec![Value::Number(1.0)]);
        if let (Value::Array(da), Value::Array(_)) = (&a, &b) {
            da.borrow_mut().overrides.insert(
                "push".to_string(),
                Value::Number(99.0),
            );
        }
        let overridden = get_member(&a, "push", &dummy_range());
        assert!(matches!(overridden, Some(Value::Number(n)) if n == 99.0));
        let normal = get_member(&b, "push", &dummy_range());
        assert!(matches!(normal, Some(Value::Builtin(_))));
    }

    #[test]
    fn string_find_returns_char_offset() {
        let v = string_member("hello".to_string(), "find").unwrap();
        if let Value::Builtin(b) = v {
            // exercised indirectly through the interpreter in integration tests;
            // here we just confirm the member resolves.
            assert_eq!(b.name, "find");
        } else {
            panic!("expected builtin");
        }
    }

    #[test]
    fn number_members_resolve() {
        assert!(number_member(3.7, "floor").is_some());
        assert!(number_member(3.7, "missing").is_none());
    }
}
