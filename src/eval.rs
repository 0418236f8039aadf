// ABOUTME: Tree-walking evaluator: expression/statement visitors over the scope chain

use crate::ast::{AssignOp, BinOp, Expr, ExprKind, Program, Stmt, StmtKind, UnOp};
use crate::control::{Control, EvalResult};
use crate::env::{AssignOutcome, Environment};
use crate::error::LithiumError;
use crate::parser::Parser;
use crate::semantic::SemanticChecker;
use crate::source_map::Range;
use crate::value::{
    binary_add, binary_div, binary_ge, binary_gt, binary_le, binary_lt, binary_mod, binary_mul, binary_sub,
    unary_minus, unary_not, values_equal, ArithError, ClassData, FunctionData, ObjectData, Value,
};
use std::cell::RefCell;
use std::rc::Rc;

/// A resolved assignment/increment target: the array/object it points
/// into is evaluated once, up front, so that `a[f()] += 1` evaluates
/// `f()` a single time and both the read and the write act on the same
/// resolved slot.
enum Target {
    Var(String),
    Elem { array: Value, index: usize },
    Member { object: Rc<ObjectData>, name: String },
}

/// One walker per running program: the current scope, the set of
/// modules already imported, and the program's command-line arguments
/// (exposed through the `args` built-in module). `interactive` toggles
/// whether top-level expression statements with a non-null result are
/// echoed to stdout, matching REPL behavior.
pub struct Interpreter {
    pub global: Rc<Environment>,
    scope: Rc<Environment>,
    imported_modules: std::collections::HashSet<String>,
    pub program_args: Vec<String>,
    pub interactive: bool,
}

impl Interpreter {
    pub fn new(program_args: Vec<String>) -> Self {
        let global = Environment::new();
        crate::builtins::register_core(&global);
        Interpreter {
            global: global.clone(),
            scope: global,
            imported_modules: std::collections::HashSet::new(),
            program_args,
            interactive: false,
        }
    }

    /// Runs a whole parsed source unit against this interpreter's
    /// current scope (the top-level "statements block": hoist function
    /// declarations, then execute in order, echoing non-null top-level
    /// expression results when interactive).
    pub fn run_program(&mut self, program: &Program) -> EvalResult<()> {
        self.exec_statements(&program.statements, true)
    }

    fn exec_statements(&mut self, statements: &[Stmt], echo_top_level: bool) -> EvalResult<()> {
        for stmt in statements {
            if let StmtKind::FuncDecl { name, params, body } = &stmt.kind {
                let func = Value::Function(Rc::new(FunctionData {
                    name: name.clone(),
                    params: params.clone(),
                    body: body.clone(),
                    closure: RefCell::new(Some(self.scope.clone())),
                }));
                self.scope.redeclare(name, func, false);
            }
        }
        for stmt in statements {
            if matches!(stmt.kind, StmtKind::FuncDecl { .. }) {
                continue;
            }
            if echo_top_level && self.interactive {
                if let StmtKind::ExprStmt(expr) = &stmt.kind {
                    let v = self.eval_expr(expr)?;
                    if !matches!(v, Value::Null) {
                        println!("{}", v.to_display_string());
                    }
                    continue;
                }
            }
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> EvalResult<()> {
        match &stmt.kind {
            StmtKind::VarDecl { name, is_const, init } => {
                let value = match init {
                    Some(e) => self.eval_expr(e)?,
                    None => Value::Null,
                };
                if !self.scope.declare(name, value, *is_const) {
                    return Err(
                        LithiumError::runtime(format!("'{}' is already declared in this scope", name), stmt.range.clone()).into(),
                    );
                }
                Ok(())
            }
            StmtKind::FuncDecl { .. } => Ok(()), // hoisted already
            StmtKind::ClassDecl { name, body } => {
                let class = Value::Class(Rc::new(ClassData {
                    name: name.clone(),
                    body: body.clone(),
                }));
                if !self.scope.declare(name, class, false) {
                    return Err(
                        LithiumError::runtime(format!("'{}' is already declared in this scope", name), stmt.range.clone()).into(),
                    );
                }
                Ok(())
            }
            StmtKind::Return(expr) => {
                let value = match expr {
                    Some(e) => self.eval_expr(e)?,
                    None => Value::Null,
                };
                Err(Control::Return(value))
            }
            StmtKind::Break => Err(Control::Break),
            StmtKind::Continue => Err(Control::Continue),
            StmtKind::If { cond, then_branch, else_branch } => {
                if self.eval_expr(cond)?.to_boolean() {
                    self.exec_stmt(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmt(else_branch)
                } else {
                    Ok(())
                }
            }
            StmtKind::While { cond, body } => {
                loop {
                    if !self.eval_expr(cond)?.to_boolean() {
                        break;
                    }
                    match self.exec_stmt(body) {
                        Ok(()) => {}
                        Err(Control::Break) => break,
                        Err(Control::Continue) => {}
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            StmtKind::For { init, cond, increment, body } => self.exec_for(init, cond, increment, body),
            StmtKind::Foreach { key, key_const, value, iterable, body } => {
                self.exec_foreach(key, *key_const, value, iterable, body)
            }
            StmtKind::Import { name } => self.exec_import(name, &stmt.range),
            StmtKind::Assert { cond, message } => {
                if self.eval_expr(cond)?.to_boolean() {
                    Ok(())
                } else {
                    let text = match message {
                        Some(m) => self.eval_expr(m)?.to_display_string(),
                        None => "assertion failed".to_string(),
                    };
                    Err(LithiumError::Assertion { message: text, range: stmt.range.clone() }.into())
                }
            }
            StmtKind::Delete { name } => {
                if self.scope.remove(name) {
                    Ok(())
                } else {
                    Err(undefined_name_error(name, &stmt.range))
                }
            }
            StmtKind::Block(statements) => {
                let child = Environment::with_parent(self.scope.clone());
                let previous = std::mem::replace(&mut self.scope, child);
                let result = self.exec_statements(statements, false);
                self.scope = previous;
                result
            }
            StmtKind::ExprStmt(expr) => {
                self.eval_expr(expr)?;
                Ok(())
            }
            StmtKind::Empty => Ok(()),
        }
    }

    fn exec_for(
        &mut self,
        init: &Option<Box<Stmt>>,
        cond: &Option<Expr>,
        increment: &Option<Expr>,
        body: &Stmt,
    ) -> EvalResult<()> {
        let child = Environment::with_parent(self.scope.clone());
        let previous = std::mem::replace(&mut self.scope, child);
        let result = (|| {
            if let Some(init) = init {
                self.exec_stmt(init)?;
            }
            loop {
                let keep_going = match cond {
                    Some(c) => self.eval_expr(c)?.to_boolean(),
                    None => true,
                };
                if !keep_going {
                    break;
                }
                match self.exec_stmt(body) {
                    Ok(()) => {}
                    Err(Control::Break) => break,
                    Err(Control::Continue) => {}
                    Err(other) => return Err(other),
                }
                if let Some(inc) = increment {
                    self.eval_expr(inc)?;
                }
            }
            Ok(())
        })();
        self.scope = previous;
        result
    }

    fn exec_foreach(
        &mut self,
        key: &str,
        key_const: bool,
        value: &Option<(String, bool)>,
        iterable: &Expr,
        body: &Stmt,
    ) -> EvalResult<()> {
        let iter_val = self.eval_expr(iterable)?;
        let child = Environment::with_parent(self.scope.clone());
        let previous = std::mem::replace(&mut self.scope, child);
        let result = (|| match &iter_val {
            Value::Array(a) => {
                let snapshot = a.borrow().elements.clone();
                for item in snapshot {
                    self.scope.redeclare(key, item, key_const);
                    match self.exec_stmt(body) {
                        Ok(()) => {}
                        Err(Control::Break) => break,
                        Err(Control::Continue) => continue,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            Value::Object(obj) => {
                let members = obj.env.borrow().as_ref().map(|e| e.members()).unwrap_or_default();
                for (name, member_value) in members {
                    if matches!(member_value, Value::Function(_)) {
                        continue;
                    }
                    if name == "LINE" || name == "FILE" {
                        continue;
                    }
                    self.scope.redeclare(key, Value::Str(name), key_const);
                    if let Some((value_name, value_const)) = value {
                        self.scope.redeclare(value_name, member_value, *value_const);
                    }
                    match self.exec_stmt(body) {
                        Ok(()) => {}
                        Err(Control::Break) => break,
                        Err(Control::Continue) => continue,
                        Err(other) => return Err(other),
                    }
                }
                Ok(())
            }
            other => Err(LithiumError::runtime(
                format!("cannot iterate over {}", other.type_name()),
                iterable.range.clone(),
            )
            .into()),
        })();
        self.scope = previous;
        result
    }

    fn exec_import(&mut self, name: &str, range: &Range) -> EvalResult<()> {
        if !self.imported_modules.insert(name.to_string()) {
            return Ok(());
        }
        if crate::config::BUILTIN_MODULES.contains(&name) {
            crate::builtins::register_module(name, &self.scope, &self.program_args);
            return Ok(());
        }
        for root in crate::config::module_search_roots() {
            let path = root.join(format!("{}.{}", name, crate::config::MODULE_EXTENSION));
            if let Ok(text) = std::fs::read_to_string(&path) {
                let filename: Rc<str> = Rc::from(path.to_string_lossy().into_owned());
                let (ok, program) = Parser::parse_source(filename, text);
                if !ok {
                    return Err(LithiumError::runtime(format!("module '{}' failed to parse", name), range.clone()).into());
                }
                let errors = SemanticChecker::check(&program);
                if !errors.is_empty() {
                    for err in &errors {
                        crate::diagnostics::report(err);
                    }
                    return Err(
                        LithiumError::runtime(format!("module '{}' failed semantic checks", name), range.clone()).into(),
                    );
                }
                return self.exec_statements(&program.statements, false);
            }
        }
        Err(LithiumError::runtime(format!("module '{}' not found", name), range.clone()).into())
    }

    pub fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::Str(s) => Ok(Value::Str(s.clone())),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Ident(name) => self.eval_ident(name, &expr.range),
            ExprKind::Unary { op, operand, prefix } => self.eval_unary(*op, operand, *prefix, &expr.range),
            ExprKind::Binary { left, op, right } => self.eval_binary(left, *op, right, &expr.range),
            ExprKind::Assign { target, op, value } => self.eval_assign(target, *op, value, &expr.range),
            ExprKind::Call { callee, args } => self.eval_call(callee, args, &expr.range),
            ExprKind::ArrayLit(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expr(element)?);
                }
                Ok(Value::array(values))
            }
            ExprKind::Index { array, index } => self.eval_index(array, index, &expr.range),
            ExprKind::Member { object, name, name_range } => self.eval_member(object, name, name_range),
        }
    }

    fn eval_ident(&self, name: &str, range: &Range) -> EvalResult<Value> {
        match name {
            "FILE" => Ok(Value::Str(range.start.filename.to_string())),
            "LINE" => Ok(Value::Number(range.start.line_and_column().0 as f64)),
            _ => self.scope.lookup(name).ok_or_else(|| undefined_name_error(name, range)),
        }
    }

    fn eval_unary(&mut self, op: UnOp, operand: &Expr, prefix: bool, range: &Range) -> EvalResult<Value> {
        match op {
            UnOp::Plus => self.eval_expr(operand),
            UnOp::Neg => {
                let v = self.eval_expr(operand)?;
                unary_minus(&v)
                    .ok_or_else(|| LithiumError::runtime(format!("unary '-' is not defined for {}", v.type_name()), range.clone()).into())
            }
            UnOp::Not => {
                let v = self.eval_expr(operand)?;
                Ok(unary_not(&v))
            }
            UnOp::Inc | UnOp::Dec => {
                if !operand.is_lvalue() {
                    return Err(LithiumError::runtime(
                        "increment/decrement target must be an identifier, index, or member",
                        range.clone(),
                    )
                    .into());
                }
                let target = self.resolve_target(operand)?;
                let old = self.read_target(&target, &operand.range)?;
                let n = match old {
                    Value::Number(n) => n,
                    other => {
                        let verb = if op == UnOp::Inc { "increment" } else { "decrement" };
                        return Err(LithiumError::runtime(format!("cannot {} a {}", verb, other.type_name()), range.clone()).into());
                    }
                };
                let new_n = if op == UnOp::Inc { n + 1.0 } else { n - 1.0 };
                let new_value = Value::Number(new_n);
                self.write_target(&target, new_value.clone(), &operand.range)?;
                Ok(if prefix { new_value } else { Value::Number(n) })
            }
        }
    }

    fn eval_binary(&mut self, left: &Expr, op: BinOp, right: &Expr, range: &Range) -> EvalResult<Value> {
        match op {
            BinOp::And => {
                let l = self.eval_expr(left)?;
                if !l.to_boolean() {
                    return Ok(Value::Bool(false));
                }
                let r = self.eval_expr(right)?;
                Ok(Value::Bool(r.to_boolean()))
            }
            BinOp::Or => {
                let l = self.eval_expr(left)?;
                if l.to_boolean() {
                    return Ok(Value::Bool(true));
                }
                let r = self.eval_expr(right)?;
                Ok(Value::Bool(r.to_boolean()))
            }
            BinOp::Comma => {
                self.eval_expr(left)?;
                self.eval_expr(right)
            }
            _ => {
                let l = self.eval_expr(left)?;
                let r = self.eval_expr(right)?;
                apply_binary(op, &l, &r, range)
            }
        }
    }

    fn eval_assign(&mut self, target_expr: &Expr, op: AssignOp, value_expr: &Expr, range: &Range) -> EvalResult<Value> {
        let rhs = self.eval_expr(value_expr)?;
        let target = self.resolve_target(target_expr)?;
        let new_value = if op == AssignOp::Assign {
            rhs
        } else {
            let old = self.read_target(&target, &target_expr.range)?;
            apply_compound(op, &old, &rhs, range)?
        };
        self.write_target(&target, new_value, &target_expr.range)
    }

    fn eval_call(&mut self, callee: &Expr, args: &[Expr], range: &Range) -> EvalResult<Value> {
        let callee_value = self.eval_expr(callee)?;
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.eval_expr(arg)?);
        }
        self.call_value(&callee_value, &arg_values, range)
    }

    pub fn call_value(&mut self, callee: &Value, args: &[Value], range: &Range) -> EvalResult<Value> {
        match callee {
            Value::Function(f) => self.call_function(f, args, range),
            Value::Builtin(b) => (b.func)(self, args, range),
            Value::Class(c) => self.construct(c, args, range),
            other => Err(LithiumError::runtime(format!("'{}' is not callable", other.type_name()), range.clone()).into()),
        }
    }

    fn call_function(&mut self, f: &Rc<FunctionData>, args: &[Value], range: &Range) -> EvalResult<Value> {
        if args.len() != f.params.len() {
            return Err(LithiumError::runtime(
                format!("function '{}' expects {} argument(s), got {}", f.name, f.params.len(), args.len()),
                range.clone(),
            )
            .into());
        }
        let closure = f.closure.borrow().clone().ok_or_else(|| {
            LithiumError::runtime(format!("function '{}' can no longer be called", f.name), range.clone())
        })?;
        let call_scope = Environment::with_parent(closure);
        for (param, arg) in f.params.iter().zip(args) {
            call_scope.declare(param, arg.clone(), false);
        }
        let previous = std::mem::replace(&mut self.scope, call_scope);
        let result = self.exec_stmt(&f.body);
        self.scope = previous;
        match result {
            Ok(()) => Ok(Value::Null),
            Err(Control::Return(v)) => Ok(v),
            Err(other) => Err(other),
        }
    }

    fn construct(&mut self, class: &Rc<ClassData>, args: &[Value], range: &Range) -> EvalResult<Value> {
        let object_scope = Environment::new();
        let statements = match &class.body.kind {
            StmtKind::Block(statements) => statements,
            _ => return Err(LithiumError::runtime("class body must be a block", range.clone()).into()),
        };
        let previous = std::mem::replace(&mut self.scope, object_scope.clone());
        let body_result = self.exec_statements(statements, false);
        self.scope = previous;
        body_result?;

        if let Some(Value::Function(ctor)) = object_scope.lookup_local(&class.name) {
            let result = self.call_function(&ctor, args, range)?;
            if !matches!(result, Value::Null) {
                return Err(LithiumError::runtime(
                    format!("constructor '{}' must not return a value", class.name),
                    range.clone(),
                )
                .into());
            }
        } else if !args.is_empty() {
            return Err(LithiumError::runtime(
                format!("class '{}' has no constructor but was called with arguments", class.name),
                range.clone(),
            )
            .into());
        }

        Ok(Value::Object(Rc::new(ObjectData {
            class_name: class.name.clone(),
            env: RefCell::new(Some(object_scope)),
        })))
    }

    fn eval_index(&mut self, array: &Expr, index: &Expr, range: &Range) -> EvalResult<Value> {
        let arr = self.eval_expr(array)?;
        let idx = self.eval_expr(index)?;
        let i = require_index(&idx, range)?;
        index_read(&arr, i, range)
    }

    fn eval_member(&mut self, object: &Expr, name: &str, name_range: &Range) -> EvalResult<Value> {
        let obj = self.eval_expr(object)?;
        crate::value::members::get_member(&obj, name, name_range)
            .ok_or_else(|| LithiumError::runtime(format!("no member named '{}'", name), name_range.clone()).into())
    }

    fn resolve_target(&mut self, expr: &Expr) -> EvalResult<Target> {
        match &expr.kind {
            ExprKind::Ident(name) => Ok(Target::Var(name.clone())),
            ExprKind::Index { array, index } => {
                let arr = self.eval_expr(array)?;
                let idx = self.eval_expr(index)?;
                let i = require_index(&idx, &expr.range)?;
                Ok(Target::Elem { array: arr, index: i })
            }
            ExprKind::Member { object, name, name_range } => {
                let obj = self.eval_expr(object)?;
                match obj {
                    Value::Object(o) => Ok(Target::Member { object: o, name: name.clone() }),
                    other => Err(LithiumError::runtime(
                        format!("cannot assign a member of a {}", other.type_name()),
                        name_range.clone(),
                    )
                    .into()),
                }
            }
            _ => Err(LithiumError::runtime("invalid assignment target", expr.range.clone()).into()),
        }
    }

    fn read_target(&self, target: &Target, range: &Range) -> EvalResult<Value> {
        match target {
            Target::Var(name) => self.scope.lookup(name).ok_or_else(|| undefined_name_error(name, range)),
            Target::Elem { array, index } => index_read(array, *index, range),
            Target::Member { object, name } => object
                .env
                .borrow()
                .as_ref()
                .and_then(|e| e.lookup(name))
                .ok_or_else(|| LithiumError::runtime(format!("no member named '{}'", name), range.clone()).into()),
        }
    }

    fn write_target(&self, target: &Target, value: Value, range: &Range) -> EvalResult<Value> {
        match target {
            Target::Var(name) => match self.scope.assign(name, value) {
                AssignOutcome::Ok(v) => Ok(v),
                AssignOutcome::NotFound => Err(undefined_name_error(name, range)),
                AssignOutcome::IsConstant => {
                    Err(LithiumError::runtime(format!("cannot assign to constant '{}'", name), range.clone()).into())
                }
            },
            Target::Elem { array, index } => index_write(array, *index, value, range),
            Target::Member { object, name } => {
                let env = object.env.borrow();
                let env = env
                    .as_ref()
                    .ok_or_else(|| LithiumError::runtime("object has been disposed", range.clone()))?;
                match env.assign(name, value) {
                    AssignOutcome::Ok(v) => Ok(v),
                    AssignOutcome::NotFound => {
                        Err(LithiumError::runtime(format!("no member named '{}'", name), range.clone()).into())
                    }
                    AssignOutcome::IsConstant => Err(LithiumError::runtime(
                        format!("cannot assign to constant member '{}'", name),
                        range.clone(),
                    )
                    .into()),
                }
            }
        }
    }
}

fn apply_binary(op: BinOp, l: &Value, r: &Value, range: &Range) -> EvalResult<Value> {
    match op {
        BinOp::Add => binary_add(l, r).ok_or_else(|| type_err("+", l, r, range)),
        BinOp::Sub => binary_sub(l, r).ok_or_else(|| type_err("-", l, r, range)),
        BinOp::Mul => binary_mul(l, r).ok_or_else(|| type_err("*", l, r, range)),
        BinOp::Div => match binary_div(l, r) {
            Ok(Some(v)) => Ok(v),
            Ok(None) => Err(type_err("/", l, r, range)),
            Err(ArithError::DivideByZero) => Err(LithiumError::runtime("division by zero", range.clone()).into()),
            Err(ArithError::ModuloByZero) => unreachable!(),
        },
        BinOp::Mod => match binary_mod(l, r) {
            Ok(Some(v)) => Ok(v),
            Ok(None) => Err(type_err("%", l, r, range)),
            Err(ArithError::ModuloByZero) => Err(LithiumError::runtime("modulo by zero", range.clone()).into()),
            Err(ArithError::DivideByZero) => unreachable!(),
        },
        BinOp::Eq => Ok(Value::Bool(values_equal(l, r))),
        BinOp::Ne => Ok(Value::Bool(!values_equal(l, r))),
        BinOp::Lt => binary_lt(l, r).map(Value::Bool).ok_or_else(|| type_err("<", l, r, range)),
        BinOp::Le => binary_le(l, r).map(Value::Bool).ok_or_else(|| type_err("<=", l, r, range)),
        BinOp::Gt => binary_gt(l, r).map(Value::Bool).ok_or_else(|| type_err(">", l, r, range)),
        BinOp::Ge => binary_ge(l, r).map(Value::Bool).ok_or_else(|| type_err(">=", l, r, range)),
        BinOp::And | BinOp::Or | BinOp::Comma => unreachable!("short-circuit ops are handled in eval_binary"),
    }
}

fn apply_compound(op: AssignOp, old: &Value, rhs: &Value, range: &Range) -> EvalResult<Value> {
    match op {
        AssignOp::AddAssign => binary_add(old, rhs).ok_or_else(|| type_err("+=", old, rhs, range)),
        AssignOp::SubAssign => binary_sub(old, rhs).ok_or_else(|| type_err("-=", old, rhs, range)),
        AssignOp::MulAssign => binary_mul(old, rhs).ok_or_else(|| type_err("*=", old, rhs, range)),
        AssignOp::DivAssign => match binary_div(old, rhs) {
            Ok(Some(v)) => Ok(v),
            Ok(None) => Err(type_err("/=", old, rhs, range)),
            Err(_) => Err(LithiumError::runtime("division by zero", range.clone()).into()),
        },
        AssignOp::ModAssign => match binary_mod(old, rhs) {
            Ok(Some(v)) => Ok(v),
            Ok(None) => Err(type_err("%=", old, rhs, range)),
            Err(_) => Err(LithiumError::runtime("modulo by zero", range.clone()).into()),
        },
        AssignOp::Assign => unreachable!("plain assignment does not read the old value"),
    }
}

fn require_index(v: &Value, range: &Range) -> EvalResult<usize> {
    match v {
        Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Ok(*n as usize),
        Value::Number(_) => Err(bounds_error(range)),
        other => Err(LithiumError::runtime(format!("array index must be a number, got {}", other.type_name()), range.clone()).into()),
    }
}

fn index_read(array: &Value, i: usize, range: &Range) -> EvalResult<Value> {
    match array {
        Value::Array(a) => a.borrow().elements.get(i).cloned().ok_or_else(|| bounds_error(range)),
        Value::Str(s) => s
            .chars()
            .nth(i)
            .map(|c| Value::Str(c.to_string()))
            .ok_or_else(|| bounds_error(range)),
        other => Err(LithiumError::runtime(format!("cannot index into {}", other.type_name()), range.clone()).into()),
    }
}

fn index_write(array: &Value, i: usize, value: Value, range: &Range) -> EvalResult<Value> {
    match array {
        Value::Array(a) => {
            let mut data = a.borrow_mut();
            if i >= data.elements.len() {
                return Err(bounds_error(range));
            }
            data.elements[i] = value.clone();
            Ok(value)
        }
        other => Err(LithiumError::runtime(format!("cannot assign into an index of {}", other.type_name()), range.clone()).into()),
    }
}

fn bounds_error(range: &Range) -> Control {
    LithiumError::runtime("array index out of bounds", range.clone()).into()
}

fn undefined_name_error(name: &str, range: &Range) -> Control {
    LithiumError::runtime(format!("undefined name '{}'", name), range.clone()).into()
}

fn type_err(op: &str, l: &Value, r: &Value, range: &Range) -> Control {
    LithiumError::runtime(
        format!("unsupported operand types for '{}': {} and {}", op, l.type_name(), r.type_name()),
        range.clone(),
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str) -> Interpreter {
        let (ok, program) = Parser::parse_source("t.li", src);
        assert!(ok, "expected {:?} to parse", src);
        assert!(SemanticChecker::check(&program).is_empty());
        let mut interp = Interpreter::new(vec![]);
        interp.run_program(&program).expect("expected program to run");
        interp
    }

    #[test]
    fn arithmetic_and_variables() {
        let interp = run("let x = 1 + 2 * 3;");
        assert!(matches!(interp.global.lookup("x"), Some(Value::Number(n)) if n == 7.0));
    }

    #[test]
    fn closures_capture_their_declaring_scope() {
        let interp = run(
            "fn make_counter() { let n = 0; fn bump() { n = n + 1; return n; } return bump; } let c = make_counter(); let a = c(); let b = c();",
        );
        assert!(matches!(interp.global.lookup("a"), Some(Value::Number(n)) if n == 1.0));
        assert!(matches!(interp.global.lookup("b"), Some(Value::Number(n)) if n == 2.0));
    }

    #[test]
    fn class_construction_and_method_call() {
        let interp = run(
            "class Point { let x = 0; let y = 0; fn Point(a, b) { x = a; y = b; } fn sum() { return x + y; } } let p = Point(3, 4); let s = p.sum();",
        );
        assert!(matches!(interp.global.lookup("s"), Some(Value::Number(n)) if n == 7.0));
    }

    #[test]
    fn array_methods_mutate_independently() {
        let interp = run("let a = [3, 1, 2]; a.push(4); a.sort(); let b = []; b.push(9);");
        if let Some(Value::Array(a)) = interp.global.lookup("a") {
            let elems: Vec<f64> = a
                .borrow()
                .elements
                .iter()
                .map(|v| if let Value::Number(n) = v { *n } else { panic!("expected number") })
                .collect();
            assert_eq!(elems, vec![1.0, 2.0, 3.0, 4.0]);
        } else {
            panic!("expected array");
        }
    }

    #[test]
    fn short_circuit_and_does_not_evaluate_right_on_false() {
        let (ok, program) = Parser::parse_source("t.li", "let r = false && (1 / 0);");
        assert!(ok);
        let mut interp = Interpreter::new(vec![]);
        assert!(interp.run_program(&program).is_ok());
    }

    #[test]
    fn divide_by_zero_raises_runtime_error() {
        let (ok, program) = Parser::parse_source("t.li", "let r = 1 / 0;");
        assert!(ok);
        let mut interp = Interpreter::new(vec![]);
        let result = interp.run_program(&program);
        assert!(matches!(result, Err(Control::Error(LithiumError::Runtime { .. }))));
    }

    #[test]
    fn undefined_identifier_raises_runtime_error() {
        let (ok, program) = Parser::parse_source("t.li", "let y = z + 1;");
        assert!(ok);
        let mut interp = Interpreter::new(vec![]);
        let result = interp.run_program(&program);
        assert!(matches!(result, Err(Control::Error(LithiumError::Runtime { .. }))));
    }

    #[test]
    fn const_assignment_raises_runtime_error() {
        let (ok, program) = Parser::parse_source("t.li", "const x = 1; x = 2;");
        assert!(ok);
        let mut interp = Interpreter::new(vec![]);
        let result = interp.run_program(&program);
        assert!(matches!(result, Err(Control::Error(LithiumError::Runtime { .. }))));
    }

    #[test]
    fn floating_point_equality_uses_epsilon() {
        let interp = run("let r = (0.1 + 0.2 == 0.3);");
        assert!(matches!(interp.global.lookup("r"), Some(Value::Bool(true))));
    }
}
