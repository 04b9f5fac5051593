//! ontc – an ontology toolchain for OXPL, a small language whose control flow
//! is steered by facts.
//!
//! A program is parsed into a tree, the facts it states are collected into a
//! fact store, and the execution engine then consults that store while it
//! runs: the triple `main isPreceededBy setup.` makes `setup` run before
//! `main` without any explicit call.
//! * A [`ast::Node`] is one element of the left-child/right-sibling program tree.
//! * A [`ontology::Resource`] is an individual with a name, referenced through
//!   a database-scoped [`ontology::ResourceId`].
//! * A [`ontology::Fact`] is an ordered predicate over resources.
//!
//! ## Modules
//! * [`ast`] – Node kinds, constructors, validation and release of trees.
//! * [`ontology`] – The fact store: resources, facts, existence checks and triple queries.
//! * [`collect`] – Registers functions as resources and turns triples into facts.
//! * [`exec`] – The [`exec::Engine`] running `main` with precedence resolution.
//! * [`builtin`] – The closed set of callable built-ins (`print`, `println`).
//! * [`parse`] – Pest parser producing trees from OXPL source (`oxpl.pest`).
//! * [`shell`] – Interactive shell over a fact store.
//! * [`settings`] – Layered runtime settings.
//!
//! ## Quick Start
//! ```
//! use ontc::{exec, settings::Settings};
//! let source = r#"
//!     fn setup() { println("setting up"); }
//!     fn main() { println("hello"); }
//!     main isPreceededBy setup.
//! "#;
//! let mut out = Vec::new();
//! exec::exec_program(source, &Settings::default(), &mut out).unwrap();
//! assert_eq!(out, b"setting up\nhello\n");
//! ```
//!
//! ## Status
//! Only calls to built-ins are executed. Expressions, declarations and control
//! statements are parsed and kept in the tree but not evaluated.

pub mod ast;
pub mod builtin;
pub mod collect;
pub mod error;
pub mod exec;
pub mod ontology;
pub mod parse;
pub mod settings;
pub mod shell;

pub use error::{OntcError, Result};
