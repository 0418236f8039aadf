// ABOUTME: End-to-end tests driving the full lex/parse/semantic/eval pipeline

use lithium::control::Control;
use lithium::eval::Interpreter;
use lithium::parser::Parser;
use lithium::semantic::SemanticChecker;
use lithium::value::Value;

/// Parses, semantic-checks, and runs `src` against a fresh interpreter,
/// panicking with the pipeline stage's error on any failure.
fn run(src: &str) -> Interpreter {
    let (ok, program) = Parser::parse_source("t.li", src);
    assert!(ok, "expected {:?} to parse", src);

    let errors = SemanticChecker::check(&program);
    assert!(errors.is_empty(), "unexpected semantic errors: {:?}", errors);

    let mut interp = Interpreter::new(vec![]);
    interp.run_program(&program).expect("program should run to completion");
    interp
}

fn number(interp: &Interpreter, name: &str) -> f64 {
    match interp.global.lookup(name) {
        Some(Value::Number(n)) => n,
        Some(_) => panic!("expected {} to be a number", name),
        None => panic!("{} is undeclared", name),
    }
}

#[test]
fn recursion_and_closure_counter() {
    let interp = run(
        r#"
        fn make_counter() { let n = 0; fn bump() { n = n + 1; return n; } return bump; }
        let c = make_counter();
        let a = c();
        let b = c();
        let d = c();
        "#,
    );
    assert_eq!(number(&interp, "a"), 1.0);
    assert_eq!(number(&interp, "b"), 2.0);
    assert_eq!(number(&interp, "d"), 3.0);
}

#[test]
fn class_and_instance() {
    let interp = run(
        r#"
        class Point { let x = 0; let y = 0; fn Point(a, b) { x = a; y = b; } fn sum() { return x + y; } }
        let p = Point(3, 4);
        let total = p.sum();
        "#,
    );
    assert_eq!(number(&interp, "total"), 7.0);
}

#[test]
fn array_methods_and_foreach() {
    let interp = run(
        r#"
        let a = [3, 1, 2];
        a.push(4);
        a.sort();
        let s = 0;
        foreach (v : a) { s = s + v; }
        let joined = a.join(",");
        "#,
    );
    assert_eq!(number(&interp, "s"), 10.0);
    match interp.global.lookup("joined") {
        Some(Value::Str(s)) => assert_eq!(s, "1,2,3,4"),
        Some(_) => panic!("expected joined to be a string"),
        None => panic!("joined is undeclared"),
    }
}

#[test]
fn string_operations_and_short_circuit() {
    let interp = run(
        r#"
        let s = "  Hello  ";
        let lowered = s.strip().lower();
        let short_and = false && (1 / 0);
        let short_or = true || (1 / 0);
        "#,
    );
    match interp.global.lookup("lowered") {
        Some(Value::Str(s)) => assert_eq!(s, "hello"),
        Some(_) => panic!("expected lowered to be a string"),
        None => panic!("lowered is undeclared"),
    }
    assert!(matches!(interp.global.lookup("short_and"), Some(Value::Bool(false))));
    assert!(matches!(interp.global.lookup("short_or"), Some(Value::Bool(true))));
}

#[test]
fn floating_point_equality_masks_artifacts() {
    let interp = run("let eq = 0.1 + 0.2 == 0.3; let sum = 0.1 + 0.2;");
    assert!(matches!(interp.global.lookup("eq"), Some(Value::Bool(true))));
    match interp.global.lookup("sum") {
        Some(Value::Number(n)) => assert_eq!(lithium::value::format_number(n), "0.3"),
        Some(_) => panic!("expected sum to be a number"),
        None => panic!("sum is undeclared"),
    }
}

#[test]
fn undefined_identifier_reports_at_the_right_line() {
    let (ok, program) = Parser::parse_source("t.li", "let x = 1;\nlet y = z + 1;\n");
    assert!(ok);
    assert!(SemanticChecker::check(&program).is_empty());

    let mut interp = Interpreter::new(vec![]);
    match interp.run_program(&program) {
        Err(Control::Error(e)) => {
            assert!(e.message().contains('z'), "message should name the undefined identifier: {}", e.message());
            assert_eq!(e.range().start.line_and_column().0, 2);
        }
        other => panic!("expected an undefined-identifier runtime error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn array_index_out_of_bounds_raises() {
    let (ok, program) = Parser::parse_source("t.li", "let a = [1, 2]; let x = a[-1];");
    assert!(ok);
    assert!(SemanticChecker::check(&program).is_empty());
    let mut interp = Interpreter::new(vec![]);
    assert!(matches!(interp.run_program(&program), Err(Control::Error(_))));

    let (ok, program) = Parser::parse_source("t.li", "let a = [1, 2]; let x = a[2];");
    assert!(ok);
    let mut interp = Interpreter::new(vec![]);
    assert!(matches!(interp.run_program(&program), Err(Control::Error(_))));
}

#[test]
fn divide_and_modulo_by_zero_raise() {
    let (ok, program) = Parser::parse_source("t.li", "let x = 1 / 0;");
    assert!(ok);
    let mut interp = Interpreter::new(vec![]);
    assert!(matches!(interp.run_program(&program), Err(Control::Error(_))));

    let (ok, program) = Parser::parse_source("t.li", "let x = 1 % 0;");
    assert!(ok);
    let mut interp = Interpreter::new(vec![]);
    assert!(matches!(interp.run_program(&program), Err(Control::Error(_))));
}

#[test]
fn assigning_to_a_const_raises() {
    let (ok, program) = Parser::parse_source("t.li", "const x = 1; x = 2;");
    assert!(ok);
    assert!(SemanticChecker::check(&program).is_empty());
    let mut interp = Interpreter::new(vec![]);
    assert!(matches!(interp.run_program(&program), Err(Control::Error(_))));
}

#[test]
fn wrong_arity_raises_naming_the_function() {
    let (ok, program) = Parser::parse_source("t.li", "fn add(a, b) { return a + b; } let x = add(1);");
    assert!(ok);
    assert!(SemanticChecker::check(&program).is_empty());
    let mut interp = Interpreter::new(vec![]);
    match interp.run_program(&program) {
        Err(Control::Error(e)) => assert!(e.message().contains("add")),
        other => panic!("expected an arity runtime error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn return_outside_function_is_a_semantic_error() {
    let (ok, program) = Parser::parse_source("t.li", "return 1;");
    assert!(ok);
    let errors = SemanticChecker::check(&program);
    assert!(!errors.is_empty());
}

#[test]
fn break_and_continue_outside_loop_are_semantic_errors() {
    let (ok, program) = Parser::parse_source("t.li", "break;");
    assert!(ok);
    assert!(!SemanticChecker::check(&program).is_empty());

    let (ok, program) = Parser::parse_source("t.li", "continue;");
    assert!(ok);
    assert!(!SemanticChecker::check(&program).is_empty());
}

#[test]
fn idempotent_import_declares_no_new_bindings_the_second_time() {
    // Mirrors a REPL session: each input is its own program, so the
    // semantic pass's per-program duplicate-import check never sees the
    // repeat — only the interpreter's own `imported_modules` set does.
    let mut interp = Interpreter::new(vec![]);
    for src in ["import <math>;", "import <math>;", "let p = PI;"] {
        let (ok, program) = Parser::parse_source("t.li", src);
        assert!(ok);
        assert!(SemanticChecker::check(&program).is_empty());
        interp.run_program(&program).expect("program should run to completion");
    }
    assert!(number(&interp, "p") > 3.0);
}

#[test]
fn exit_builtin_unwinds_as_a_control_exit() {
    let (ok, program) = Parser::parse_source("t.li", "println(1); exit(7); println(2);");
    assert!(ok);
    assert!(SemanticChecker::check(&program).is_empty());
    let mut interp = Interpreter::new(vec![]);
    match interp.run_program(&program) {
        Err(Control::Exit(code)) => assert_eq!(code, 7),
        other => panic!("expected Control::Exit(7), got {:?}", other.map(|_| ())),
    }
}
