use std::io::Cursor;

use ontc::exec;
use ontc::shell::{Flow, Shell};

fn session(mut shell: Shell<Cursor<String>, Vec<u8>>) -> String {
    shell.run().expect("session runs");
    let (output, _) = shell.into_parts();
    String::from_utf8(output).expect("output is utf-8")
}

fn shell(script: &str) -> Shell<Cursor<String>, Vec<u8>> {
    Shell::new(Cursor::new(script.to_string()), Vec::new())
}

#[test]
fn dbgon_lists_collected_facts() {
    let database = exec::debug_ontology(
        r#"
        fn setup() { }
        fn main() { }
        main isPreceededBy setup.
        main printsATestMessageWhenCalled.
        "#,
    )
    .expect("program loads");
    let output = session(shell("listres\nlistfacts\nquit\n").with_database(database));
    assert!(output.starts_with("ontc interactive shell\n"));
    assert!(output.contains("isPreceededBy\nprintsATestMessageWhenCalled\nsetup\nmain\n"));
    assert!(output.contains("isPreceededBy(main, setup).\nprintsATestMessageWhenCalled(main).\n"));
}

#[test]
fn facts_entered_in_the_shell_are_queryable() {
    let script = "createdb\nnewres\nrel\nnewres\nx\nnewres\ny\nnewfact\n1\n2\n3\n\nexit\n";
    let mut shell = shell(script).with_prompt("ontc> ");
    shell.run().expect("session runs");
    let database = shell.database().expect("database was created");
    let rel = database.find_resource("rel").unwrap();
    let x = database.find_resource("x").unwrap();
    let y = database.find_resource("y").unwrap();
    assert_eq!(database.query_triple(rel, Some(x), None).unwrap(), vec![y]);
    let (output, _) = shell.into_parts();
    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("ontc> "));
    assert!(output.contains("Resource created!\n"));
}

#[test]
fn evaluate_reports_exit() {
    let mut shell = shell("");
    assert_eq!(shell.evaluate("help").unwrap(), Flow::Continue);
    assert_eq!(shell.evaluate("exit").unwrap(), Flow::Exit);
    assert_eq!(shell.evaluate("q").unwrap(), Flow::Exit);
    let (output, _) = shell.into_parts();
    assert!(String::from_utf8(output).unwrap().starts_with("Available commands:\n"));
}

#[test]
fn end_of_input_ends_the_session() {
    let output = session(shell("createdb\n"));
    assert!(output.ends_with("Database created\n> "));
}
