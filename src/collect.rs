//! Turns a parsed program into facts.
//!
//! Every top-level function becomes a resource, and every top-level triple
//! statement becomes a fact over those resources. Two predicates are seeded
//! up front because the execution engine asks for them by name.

use tracing::{debug, warn};

use crate::ast::{Node, NodeKind};
use crate::error::{OntcError, Result};
use crate::ontology::Database;

/// `F isPreceededBy P`: run `P` before `F`.
pub const PRECEDED_BY: &str = "isPreceededBy";
/// `F printsATestMessageWhenCalled`: print the test message when `F` runs.
pub const PRINTS_TEST_MESSAGE: &str = "printsATestMessageWhenCalled";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Collected {
    pub functions: usize,
    pub facts: usize,
    pub skipped: Vec<String>,
}

pub fn seed(database: &mut Database) {
    for predicate in [PRECEDED_BY, PRINTS_TEST_MESSAGE] {
        database.keep_resource(predicate);
    }
}

/// Seeds `database` and fills it from the top-level items of `root`.
pub fn collect_facts(root: &Node, database: &mut Database) -> Result<Collected> {
    seed(database);
    let mut collected = Collected::default();

    for item in root.children() {
        if let Some(name) = item.func_name() {
            database.keep_resource(name);
            collected.functions += 1;
        }
    }

    for item in root.children().filter(|item| item.kind() == &NodeKind::TripleFact) {
        match collect_triple(item, database) {
            Ok(None) => collected.facts += 1,
            Ok(Some(object)) => {
                warn!(object = %object, "unknown object dropped, fact kept as unary");
                collected.facts += 1;
                collected.skipped.push(format!(
                    "{} (object dropped)",
                    OntcError::UnknownSentencePart(object)
                ));
            }
            Err(e @ OntcError::UnknownSentencePart(_)) | Err(e @ OntcError::Integrity(_)) => {
                warn!(error = %e, "triple statement skipped");
                collected.skipped.push(e.to_string());
            }
            Err(e) => return Err(e),
        }
    }
    debug!(
        functions = collected.functions,
        facts = collected.facts,
        skipped = collected.skipped.len(),
        "facts collected"
    );
    Ok(collected)
}

/// Stores one triple as a fact. Returns the name of an object that did not
/// resolve, in which case the fact was stored without it.
fn collect_triple(node: &Node, database: &mut Database) -> Result<Option<String>> {
    let (relation, subject, object) = node
        .triple_parts()
        .ok_or_else(|| OntcError::UnknownSentencePart(String::from("malformed triple")))?;
    let resolve = |part: &Node| {
        part.identifier()
            .and_then(|name| database.find_resource(name))
            .ok_or_else(|| {
                OntcError::UnknownSentencePart(part.identifier().unwrap_or("?").to_string())
            })
    };
    let relation = resolve(relation)?;
    let subject = resolve(subject)?;
    let (object, dropped) = match object.map(resolve) {
        Some(Ok(object)) => (Some(object), None),
        Some(Err(OntcError::UnknownSentencePart(name))) => (None, Some(name)),
        Some(Err(e)) => return Err(e),
        None => (None, None),
    };

    let mut fact = database.create_fact(relation)?;
    database.add_argument(&mut fact, subject)?;
    if let Some(object) = object {
        database.add_argument(&mut fact, object)?;
    }
    database.add_fact(fact)?;
    Ok(dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Box<Node> {
        Node::address(Node::scope(Node::str(name)).unwrap(), None).unwrap()
    }
    fn function(name: &str) -> Box<Node> {
        Node::func(Node::signature(Node::str(name), None).unwrap(), None).unwrap()
    }
    fn triple(subject: &str, relation: &str, object: Option<&str>) -> Box<Node> {
        Node::triple_fact(
            ident(subject),
            Some(Node::scope(Node::str(relation)).unwrap()),
            object.map(ident),
        )
        .unwrap()
    }

    #[test]
    fn seeds_predicates_before_functions() {
        let mut items = function("main");
        items.add_sibling(function("setup"));
        let unit = Node::trans_unit(Some(items));
        let mut db = Database::new();
        let collected = collect_facts(&unit, &mut db).unwrap();
        assert_eq!(collected.functions, 2);
        let names: Vec<&str> = db.resources().map(|(_, r)| r.name()).collect();
        assert_eq!(names, vec![PRECEDED_BY, PRINTS_TEST_MESSAGE, "main", "setup"]);
    }

    #[test]
    fn triples_become_facts_with_subject_first() {
        let mut items = function("main");
        items
            .add_sibling(function("setup"))
            .add_sibling(triple("main", PRECEDED_BY, Some("setup")))
            .add_sibling(triple("main", PRINTS_TEST_MESSAGE, None));
        let unit = Node::trans_unit(Some(items));
        let mut db = Database::new();
        let collected = collect_facts(&unit, &mut db).unwrap();
        assert_eq!(collected.facts, 2);
        let rendered: Vec<String> = db.facts().map(|f| db.display_fact(f).to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "isPreceededBy(main, setup).",
                "printsATestMessageWhenCalled(main)."
            ]
        );
    }

    #[test]
    fn unknown_parts_are_skipped() {
        let mut items = function("main");
        items
            .add_sibling(triple("main", "isFollowedBy", Some("main")))
            .add_sibling(triple("ghost", PRECEDED_BY, Some("main")))
            .add_sibling(triple("main", PRINTS_TEST_MESSAGE, None));
        let unit = Node::trans_unit(Some(items));
        let mut db = Database::new();
        let collected = collect_facts(&unit, &mut db).unwrap();
        assert_eq!(collected.facts, 1);
        assert_eq!(collected.skipped.len(), 2);
        assert!(collected.skipped[0].contains("isFollowedBy"));
        assert!(collected.skipped[1].contains("ghost"));
    }

    #[test]
    fn unknown_object_is_dropped_with_a_note() {
        let mut items = function("main");
        items.add_sibling(triple("main", PRECEDED_BY, Some("stup")));
        let unit = Node::trans_unit(Some(items));
        let mut db = Database::new();
        let collected = collect_facts(&unit, &mut db).unwrap();
        assert_eq!(collected.facts, 1);
        assert_eq!(
            collected.skipped,
            vec![String::from("Unknown sentence part: stup (object dropped)")]
        );
        let rendered: Vec<String> = db.facts().map(|f| db.display_fact(f).to_string()).collect();
        assert_eq!(rendered, vec!["isPreceededBy(main)."]);
    }
}
