use ontc::ast::{self, Node, NodeKind};
use ontc::parse;

#[test]
fn free_visits_every_node_once() {
    let root = parse::parse(
        r#"
        fn main(x: io::int) {
            println("one");
            if x == 2 { print("two"); } else { return -x; }
        }
        main printsATestMessageWhenCalled.
        likes(alice, bob.name).
        "#,
    )
    .expect("program parses");
    let expected = root.tally();
    let released = ast::free(root);
    assert_eq!(released, expected);
    assert!(released.payloads > 0);
    assert!(released.nodes > released.payloads);
}

#[test]
fn free_counts_nodes_and_strings() {
    // TransUnit > TripleFact > [Scope > Str, Address > Scope > Str, Address > Scope > Str]
    let root = parse::parse("main isPreceededBy setup.").expect("triple parses");
    let released = ast::free(root);
    assert_eq!(released.nodes, 10);
    assert_eq!(released.payloads, 3);
}

#[test]
fn long_chains_drop_without_recursion() {
    let mut head = Node::int(0);
    let mut tail = Node::int(1);
    for i in 2..200_000 {
        let mut node = Node::int(i);
        node.add_sibling(tail);
        tail = node;
    }
    head.add_sibling(tail);
    let unit = Node::trans_unit(Some(head));
    assert_eq!(unit.child().map(|first| first.siblings().count()), Some(200_000));
    drop(unit);
}

fn nested_blocks(depth: usize) -> Box<Node> {
    let mut block = Node::compound(None);
    for _ in 1..depth {
        block = Node::compound(Some(block));
    }
    block
}

#[test]
fn deep_nesting_is_released_without_recursion() {
    let released = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            let root = Node::trans_unit(Some(nested_blocks(200_001)));
            let expected = root.tally();
            (ast::free(root), expected)
        })
        .expect("thread spawns")
        .join()
        .expect("free completes on a small stack");
    assert_eq!(released.0.nodes, 200_002);
    assert_eq!(released.0.payloads, 0);
    assert_eq!(released.0, released.1);

    std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| drop(nested_blocks(200_000)))
        .expect("thread spawns")
        .join()
        .expect("drop completes on a small stack");
}

#[test]
fn nested_scopes_release_their_namespaces() {
    let mut scope = Node::scope(Node::str("a")).expect("scope");
    scope.add_child(Node::str("b")).add_child(Node::str("c"));
    assert!(!scope.is_single_level_scope());
    let call = Node::call(scope, Some(Node::str("x")));
    assert_eq!(call.kind(), &NodeKind::Call);
    let released = ast::free(call);
    assert_eq!(released.nodes, 6);
    assert_eq!(released.payloads, 4);
}
