// ABOUTME: Linked scope chain with const tracking, resolution, and cycle-breaking on clear

use crate::value::Value;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Outcome of `Environment::assign`: the source's `assign` is declared
/// as returning a value but its real implementation returns a
/// status-and-value pair; that pair is treated as authoritative here.
pub enum AssignOutcome {
    NotFound,
    IsConstant,
    Ok(Value),
}

#[derive(Debug)]
pub struct Environment {
    // a BTreeMap keeps member iteration order deterministic (object
    // `toString` and `foreach` over an object both depend on this).
    bindings: RefCell<std::collections::BTreeMap<String, Value>>,
    consts: RefCell<BTreeSet<String>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(Default::default()),
            consts: RefCell::new(Default::default()),
            parent: None,
        })
    }

    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(Default::default()),
            consts: RefCell::new(Default::default()),
            parent: Some(parent),
        })
    }

    pub fn parent(&self) -> Option<&Rc<Environment>> {
        self.parent.as_ref()
    }

    pub fn has_variable_local(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    pub fn has_constant_local(&self, name: &str) -> bool {
        self.consts.borrow().contains(name)
    }

    /// Declares a new local binding. Fails (returns `false`) if the
    /// name already exists in this scope.
    pub fn declare(&self, name: &str, value: Value, is_const: bool) -> bool {
        if self.has_variable_local(name) {
            return false;
        }
        self.bindings.borrow_mut().insert(name.to_string(), value);
        if is_const {
            self.consts.borrow_mut().insert(name.to_string());
        }
        true
    }

    /// Unconditional local write, used to rebind a loop variable on
    /// each iteration of `foreach`.
    pub fn redeclare(&self, name: &str, value: Value, is_const: bool) {
        self.bindings.borrow_mut().insert(name.to_string(), value);
        if is_const {
            self.consts.borrow_mut().insert(name.to_string());
        } else {
            self.consts.borrow_mut().remove(name);
        }
    }

    /// Walks the chain to find and overwrite an existing binding.
    pub fn assign(&self, name: &str, value: Value) -> AssignOutcome {
        if self.has_variable_local(name) {
            if self.has_constant_local(name) {
                return AssignOutcome::IsConstant;
            }
            self.bindings
                .borrow_mut()
                .insert(name.to_string(), value.clone());
            return AssignOutcome::Ok(value);
        }
        if let Some(parent) = &self.parent {
            return parent.assign(name, value);
        }
        AssignOutcome::NotFound
    }

    /// The value bound to `name` in the nearest enclosing scope.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.bindings.borrow().get(name) {
            return Some(v.clone());
        }
        self.parent.as_ref().and_then(|p| p.lookup(name))
    }

    pub fn lookup_local(&self, name: &str) -> Option<Value> {
        self.bindings.borrow().get(name).cloned()
    }

    /// Removes a binding from whichever scope in the chain owns it.
    /// Returns `false` if the name is not found anywhere in the chain.
    pub fn remove(&self, name: &str) -> bool {
        if self.has_variable_local(name) {
            self.bindings.borrow_mut().remove(name);
            self.consts.borrow_mut().remove(name);
            return true;
        }
        if let Some(parent) = &self.parent {
            return parent.remove(name);
        }
        false
    }

    /// A sorted snapshot of this scope's own bindings (objects expose
    /// their member scope this way for `toString` and `foreach`).
    pub fn members(&self) -> Vec<(String, Value)> {
        self.bindings
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Breaks function-closure/object-member cycles held by this
    /// scope's own bindings, then empties it. Does not touch the
    /// parent link. This is the sole mechanism preventing reference
    /// cycles among reference-counted values from leaking; it must be
    /// called explicitly (object disposal, interpreter shutdown) since
    /// an ordinary scope exit relies on plain reference counting.
    pub fn clear(&self) {
        for value in self.bindings.borrow().values() {
            clear_value_closures(value);
        }
        self.bindings.borrow_mut().clear();
        self.consts.borrow_mut().clear();
    }
}

fn clear_value_closures(value: &Value) {
    match value {
        Value::Function(f) => {
            f.closure.borrow_mut().take();
        }
        Value::Array(a) => {
            for element in &a.borrow().elements {
                if let Value::Function(f) = element {
                    f.closure.borrow_mut().take();
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_and_lookup() {
        let env = Environment::new();
        assert!(env.declare("x", Value::Number(42.0), false));
        assert!(matches!(env.lookup("x"), Some(Value::Number(n)) if n == 42.0));
    }

    #[test]
    fn declare_fails_on_local_duplicate() {
        let env = Environment::new();
        assert!(env.declare("x", Value::Number(1.0), false));
        assert!(!env.declare("x", Value::Number(2.0), false));
    }

    #[test]
    fn shadowing_in_child_scope() {
        let parent = Environment::new();
        parent.declare("x", Value::Number(1.0), false);
        let child = Environment::with_parent(parent);
        child.declare("x", Value::Number(2.0), false);
        assert!(matches!(child.lookup("x"), Some(Value::Number(n)) if n == 2.0));
    }

    #[test]
    fn parent_lookup_through_chain() {
        let parent = Environment::new();
        parent.declare("x", Value::Number(1.0), false);
        let child = Environment::with_parent(parent);
        assert!(matches!(child.lookup("x"), Some(Value::Number(n)) if n == 1.0));
    }

    #[test]
    fn assign_not_found_vs_const_vs_ok() {
        let env = Environment::new();
        assert!(matches!(env.assign("missing", Value::Null), AssignOutcome::NotFound));

        env.declare("c", Value::Number(1.0), true);
        assert!(matches!(
            env.assign("c", Value::Number(2.0)),
            AssignOutcome::IsConstant
        ));

        env.declare("m", Value::Number(1.0), false);
        assert!(matches!(
            env.assign("m", Value::Number(2.0)),
            AssignOutcome::Ok(Value::Number(n)) if n == 2.0
        ));
    }

    #[test]
    fn assign_walks_up_to_defining_scope() {
        let parent = Environment::new();
        parent.declare("x", Value::Number(1.0), false);
        let child = Environment::with_parent(parent.clone());
        assert!(matches!(
            child.assign("x", Value::Number(9.0)),
            AssignOutcome::Ok(_)
        ));
        assert!(matches!(parent.lookup("x"), Some(Value::Number(n)) if n == 9.0));
    }

    #[test]
    fn remove_deletes_from_owning_scope() {
        let parent = Environment::new();
        parent.declare("x", Value::Number(1.0), false);
        let child = Environment::with_parent(parent.clone());
        assert!(child.remove("x"));
        assert!(parent.lookup("x").is_none());
        assert!(!child.remove("x"));
    }
}
