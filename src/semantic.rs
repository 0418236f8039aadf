// ABOUTME: Static pre-pass catching structural errors before evaluation begins

use crate::ast::{Program, Stmt, StmtKind};
use crate::error::LithiumError;

const MAX_FUNCTION_DEPTH: usize = 50;

/// Walks the program tree looking for structural errors that do not
/// require running the program: `return`/`break`/`continue` outside
/// their allowed context, duplicate top-level names, function
/// declarations with no body, and `import` outside the top level.
/// Errors are collected, not stopped at the first one, so a single
/// run can report everything wrong with a script at once.
pub struct SemanticChecker {
    errors: Vec<LithiumError>,
    loop_depth: usize,
    function_depth: usize,
    function_name_stack: Vec<String>,
    imported_modules: std::collections::HashSet<String>,
}

impl SemanticChecker {
    pub fn new() -> Self {
        SemanticChecker {
            errors: Vec::new(),
            loop_depth: 0,
            function_depth: 0,
            function_name_stack: Vec::new(),
            imported_modules: std::collections::HashSet::new(),
        }
    }

    pub fn check(program: &Program) -> Vec<LithiumError> {
        let mut checker = SemanticChecker::new();
        checker.check_top_level(&program.statements);
        checker.errors
    }

    /// Flags a name declared more than once by a sibling `fn`/`class`
    /// within the same immediate block (top level counts as a block).
    fn check_duplicate_names(&mut self, statements: &[Stmt]) {
        let mut seen = std::collections::HashSet::new();
        for stmt in statements {
            if let StmtKind::FuncDecl { name, .. } | StmtKind::ClassDecl { name, .. } = &stmt.kind {
                if !seen.insert(name.clone()) {
                    self.errors.push(LithiumError::semantic(
                        format!("duplicate declaration of '{}' in this scope", name),
                        stmt.range.clone(),
                    ));
                }
            }
        }
    }

    fn check_top_level(&mut self, statements: &[Stmt]) {
        self.check_duplicate_names(statements);
        for stmt in statements {
            self.check_stmt(stmt, true);
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt, top_level: bool) {
        match &stmt.kind {
            StmtKind::Import { name } => {
                if !top_level {
                    self.errors.push(LithiumError::semantic(
                        "import must appear at the top level",
                        stmt.range.clone(),
                    ));
                } else if !self.imported_modules.insert(name.clone()) {
                    self.errors.push(LithiumError::semantic(
                        format!("module '{}' is imported more than once", name),
                        stmt.range.clone(),
                    ));
                }
            }
            StmtKind::Return(_) => {
                if self.function_depth == 0 {
                    self.errors.push(LithiumError::semantic(
                        "return outside of a function",
                        stmt.range.clone(),
                    ));
                }
            }
            StmtKind::Break => {
                if self.loop_depth == 0 {
                    self.errors.push(LithiumError::semantic(
                        "break outside of a loop",
                        stmt.range.clone(),
                    ));
                }
            }
            StmtKind::Continue => {
                if self.loop_depth == 0 {
                    self.errors.push(LithiumError::semantic(
                        "continue outside of a loop",
                        stmt.range.clone(),
                    ));
                }
            }
            StmtKind::FuncDecl { name, body, .. } => {
                self.function_name_stack.push(name.clone());
                if self.function_name_stack.len() > MAX_FUNCTION_DEPTH {
                    self.errors.push(LithiumError::semantic(
                        format!(
                            "function nesting depth exceeds {} ({})",
                            MAX_FUNCTION_DEPTH,
                            self.function_name_stack.join(" -> ")
                        ),
                        stmt.range.clone(),
                    ));
                }
                self.function_depth += 1;
                self.check_stmt(body, false);
                self.function_depth -= 1;
                self.function_name_stack.pop();
            }
            StmtKind::ClassDecl { body, .. } => {
                self.check_stmt(body, false);
            }
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                self.check_stmt(then_branch, false);
                if let Some(e) = else_branch {
                    self.check_stmt(e, false);
                }
            }
            StmtKind::While { body, .. } => {
                self.loop_depth += 1;
                self.check_stmt(body, false);
                self.loop_depth -= 1;
            }
            StmtKind::For { init, body, .. } => {
                if let Some(init) = init {
                    self.check_stmt(init, false);
                }
                self.loop_depth += 1;
                self.check_stmt(body, false);
                self.loop_depth -= 1;
            }
            StmtKind::Foreach { body, .. } => {
                self.loop_depth += 1;
                self.check_stmt(body, false);
                self.loop_depth -= 1;
            }
            StmtKind::Block(statements) => {
                self.check_duplicate_names(statements);
                for s in statements {
                    self.check_stmt(s, false);
                }
            }
            StmtKind::VarDecl { .. }
            | StmtKind::Assert { .. }
            | StmtKind::Delete { .. }
            | StmtKind::ExprStmt(_)
            | StmtKind::Empty => {}
        }
    }
}

impl Default for SemanticChecker {
    fn default() -> Self {
        Self::new()
    }
}
