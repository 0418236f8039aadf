// ABOUTME: Version string, REPL banner, and default module search roots

use std::path::PathBuf;

pub const VERSION: &str = "0.1.0";

pub const WELCOME_MESSAGE: &str = "Lithium Interpreter v0.1.0";
pub const WELCOME_SUBTITLE: &str = "A small dynamically typed scripting language";
pub const WELCOME_FOOTER: &str = "Type `exit` or press Ctrl-D to leave.";

/// File extension for module source files.
pub const MODULE_EXTENSION: &str = "li";

/// Built-in module names recognized by the module loader before it
/// falls back to searching the filesystem.
pub const BUILTIN_MODULES: &[&str] = &["args", "io", "math", "random", "os", "socket"];

/// Ordered list of directories searched for `<name>.li`, relative to
/// the current working directory plus `$HOME/modules`.
pub fn module_search_roots() -> Vec<PathBuf> {
    let mut roots = vec![PathBuf::from("."), PathBuf::from("./modules")];
    if let Ok(home) = std::env::var("HOME") {
        roots.push(PathBuf::from(home).join("modules"));
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_roots_start_with_current_directory() {
        let roots = module_search_roots();
        assert_eq!(roots[0], PathBuf::from("."));
        assert_eq!(roots[1], PathBuf::from("./modules"));
    }

    #[test]
    fn builtin_modules_are_the_fixed_six() {
        assert_eq!(
            BUILTIN_MODULES,
            &["args", "io", "math", "random", "os", "socket"]
        );
    }
}
