use ontc::OntcError;
use ontc::exec;
use ontc::settings::Settings;

fn output_of(body: &str) -> (exec::Report, String) {
    let source = format!("fn main() {{ {} }}", body);
    let mut out = Vec::new();
    let report = exec::exec_program(&source, &Settings::default(), &mut out).expect("program runs");
    (report, String::from_utf8(out).expect("output is utf-8"))
}

#[test]
fn println_appends_exactly_one_newline() {
    let (report, output) = output_of(r#"println("hi");"#);
    assert_eq!(output, "hi\n");
    assert_eq!(report.dispatched, 1);
}

#[test]
fn print_writes_no_newline() {
    let (_, output) = output_of(r#"print("hi");"#);
    assert_eq!(output, "hi");
}

#[test]
fn calls_run_in_order_across_nested_blocks() {
    let (report, output) = output_of(r#"print("a"); { print("b"); } println("c");"#);
    assert_eq!(output, "abc\n");
    assert_eq!(report.dispatched, 3);
}

#[test]
fn user_functions_are_not_callable() {
    let source = r#"
        fn helper() { println("helper"); }
        fn main() { helper(); println("main"); }
    "#;
    let mut out = Vec::new();
    let report = exec::exec_program(source, &Settings::default(), &mut out).expect("program runs");
    assert_eq!(out, b"main\n");
    assert!(matches!(
        &report.diagnostics[0],
        OntcError::UnknownFunction(name) if name == "helper"
    ));
}

#[test]
fn misuse_is_reported_and_skipped() {
    let (report, output) = output_of(
        r#"
        println();
        println(42);
        print("a", "b");
        io::println("scoped");
        println("ok");
        "#,
    );
    assert_eq!(output, "ok\n");
    assert_eq!(report.dispatched, 1);
    let messages: Vec<String> = report.diagnostics.iter().map(|d| d.to_string()).collect();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0], "println: argument missing");
    assert_eq!(messages[1], "println: wrong type of argument");
    assert_eq!(messages[2], "print: too many arguments");
    assert!(matches!(report.diagnostics[3], OntcError::UnsupportedCallee));
}

#[test]
fn other_statements_are_ignored() {
    let (report, output) =
        output_of(r#"let x: int = 1 + 2; if x > 2 { println("hidden"); } println("shown");"#);
    assert_eq!(output, "shown\n");
    assert!(report.diagnostics.is_empty());
}
