use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicIsize, Ordering};

use ontc::ast::{self, Node};
use ontc::parse;

// Live heap blocks of this test binary. Kept to a single test so that no
// other test thread allocates while a measurement is taken.
static LIVE: AtomicIsize = AtomicIsize::new(0);

struct Counting;

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let block = unsafe { System.alloc(layout) };
        if !block.is_null() {
            LIVE.fetch_add(1, Ordering::SeqCst);
        }
        block
    }
    unsafe fn dealloc(&self, block: *mut u8, layout: Layout) {
        unsafe { System.dealloc(block, layout) };
        LIVE.fetch_sub(1, Ordering::SeqCst);
    }
}

#[global_allocator]
static ALLOCATOR: Counting = Counting;

fn live() -> isize {
    LIVE.load(Ordering::SeqCst)
}

#[test]
fn free_returns_every_node_and_string() {
    // every node is one box, and every non-empty string one more block
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
    let before = live();
    let released = ast::free(root);
    let returned = before - live();
    assert_eq!(returned, (released.nodes + released.payloads) as isize);

    let before = live();
    let mut block = Node::compound(None);
    block
        .add_child(Node::call(
            Node::scope(Node::str("println")).expect("scope"),
            Some(Node::str("hi")),
        ))
        .add_child(Node::int(3));
    assert_eq!(live() - before, 8);
    let released = ast::free(block);
    assert_eq!((released.nodes, released.payloads), (6, 2));
    assert_eq!(live(), before);
}
