//! Execution engine for OXPL programs.
//!
//! Running a function has two phases. First every function the fact store
//! says must precede it is run (recursively, in the order the precedence facts
//! were stated), then the calls in its own body are dispatched to built-ins.
//! The precedence phase is what couples the tree with the store: no explicit
//! call is needed for `setup` to run before `main` once the program states
//! `main isPreceededBy setup.`

use std::io::Write;

use tracing::{debug, error, info, warn};

use crate::ast::{self, Node, NodeKind};
use crate::builtin::Builtin;
use crate::collect::{self, PRECEDED_BY, PRINTS_TEST_MESSAGE};
use crate::error::{OntcError, Result};
use crate::ontology::{Database, ResourceId};
use crate::parse;
use crate::settings::Settings;

pub const ENTRY_FUNCTION: &str = "main";
pub const TEST_MESSAGE: &str = "OXPL rocks!";
pub const DEFAULT_MAX_PRECEDENCE_DEPTH: usize = 256;

/// What a run did besides its output.
#[derive(Debug, Default)]
pub struct Report {
    /// Built-in calls that ran.
    pub dispatched: usize,
    /// Statements that were reported and skipped.
    pub diagnostics: Vec<OntcError>,
}

// per-run state
struct Run<'o> {
    out: &'o mut dyn Write,
    in_progress: Vec<ResourceId>,
    report: Report,
}

pub struct Engine<'a> {
    root: &'a Node,
    database: &'a Database,
    max_depth: usize,
}

impl<'a> Engine<'a> {
    pub fn new(root: &'a Node, database: &'a Database) -> Self {
        Self {
            root,
            database,
            max_depth: DEFAULT_MAX_PRECEDENCE_DEPTH,
        }
    }
    /// Limits how deep predecessors may nest below `main`.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
    /// Runs the program starting at its `main` function.
    pub fn execute(&self, out: &mut dyn Write) -> Result<Report> {
        let main = self.function(ENTRY_FUNCTION).ok_or_else(|| {
            error!("main function not present");
            OntcError::Validation(String::from("main function not present"))
        })?;
        let mut run = Run {
            out,
            in_progress: Vec::new(),
            report: Report::default(),
        };
        self.execute_function(main, &mut run)?;
        run.out.flush()?;
        info!(
            dispatched = run.report.dispatched,
            diagnostics = run.report.diagnostics.len(),
            "execution finished"
        );
        Ok(run.report)
    }
    /// First top-level function called `name`, in declaration order.
    pub fn function(&self, name: &str) -> Option<&'a Node> {
        self.root
            .children()
            .find(|item| item.func_name() == Some(name))
    }

    fn execute_function(&self, function: &'a Node, run: &mut Run) -> Result<()> {
        let name = function
            .func_name()
            .ok_or_else(|| OntcError::Validation(String::from("invalid function signature")))?;
        debug!(function = %name, "entering function");
        match self.database.find_resource(name) {
            Some(resource) => {
                if run.in_progress.contains(&resource) {
                    error!(function = %name, "precedence cycle");
                    return Err(OntcError::PrecedenceCycle(name.to_string()));
                }
                if run.in_progress.len() > self.max_depth {
                    error!(function = %name, limit = self.max_depth, "precedence too deep");
                    return Err(OntcError::PrecedenceDepth(self.max_depth));
                }
                self.print_test_message(resource, run)?;
                run.in_progress.push(resource);
                let preceded = self.execute_predecessors(resource, run);
                run.in_progress.pop();
                preceded?;
            }
            None => debug!(function = %name, "no resource, precedence skipped"),
        }
        self.execute_body(function, run)
    }

    fn print_test_message(&self, resource: ResourceId, run: &mut Run) -> Result<()> {
        let Some(predicate) = self.database.find_resource(PRINTS_TEST_MESSAGE) else {
            return Ok(());
        };
        let mut fact = self.database.create_fact(predicate)?;
        self.database.add_argument(&mut fact, resource)?;
        if self.database.check(&fact) {
            writeln!(run.out, "{}", TEST_MESSAGE)?;
        }
        Ok(())
    }

    fn execute_predecessors(&self, resource: ResourceId, run: &mut Run) -> Result<()> {
        let Some(preceded_by) = self.database.find_resource(PRECEDED_BY) else {
            return Ok(());
        };
        for predecessor in self.database.query_triple(preceded_by, Some(resource), None)? {
            let name = self.database.name(predecessor).unwrap_or("?");
            match self.function(name) {
                Some(function) => self.execute_function(function, run)?,
                None => {
                    warn!(function = %name, "preceding resource is not a function");
                    run.report
                        .diagnostics
                        .push(OntcError::UnknownFunction(name.to_string()));
                }
            }
        }
        Ok(())
    }

    fn execute_body(&self, function: &Node, run: &mut Run) -> Result<()> {
        for statement in function.func_body() {
            match statement.kind() {
                NodeKind::Sequence | NodeKind::Compound => {
                    for inner in statement.children() {
                        self.execute_statement(inner, run)?;
                    }
                }
                _ => self.execute_statement(statement, run)?,
            }
        }
        Ok(())
    }

    fn execute_statement(&self, statement: &Node, run: &mut Run) -> Result<()> {
        if statement.kind() != &NodeKind::Call {
            return Ok(());
        }
        match self.execute_call(statement, run) {
            Ok(()) => {
                run.report.dispatched += 1;
                Ok(())
            }
            Err(e) if !e.is_fatal() => {
                warn!(error = %e, "call skipped");
                run.report.diagnostics.push(e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn execute_call(&self, call: &Node, run: &mut Run) -> Result<()> {
        let callee = call.child().ok_or(OntcError::UnsupportedCallee)?;
        if !callee.is_single_level_scope() {
            return Err(OntcError::UnsupportedCallee);
        }
        let name = callee.identifier().ok_or(OntcError::UnsupportedCallee)?;
        let builtin =
            Builtin::lookup(name).ok_or_else(|| OntcError::UnknownFunction(name.to_string()))?;
        builtin.invoke(callee.sibling(), &mut *run.out)
    }
}

/// Parses `source`, validates it and collects its facts into a fresh database.
pub fn load_program(source: &str) -> Result<(Box<Node>, Database)> {
    let root = parse::parse(source)?;
    ast::validate(&root)?;
    let mut database = Database::new();
    collect::collect_facts(&root, &mut database)?;
    Ok((root, database))
}

/// Runs an OXPL program end to end, writing built-in output to `out`.
pub fn exec_program(source: &str, settings: &Settings, out: &mut dyn Write) -> Result<Report> {
    let (root, database) = load_program(source)?;
    let report = Engine::new(&root, &database)
        .with_max_depth(settings.max_precedence_depth)
        .execute(out);
    let released = ast::free(root);
    debug!(nodes = released.nodes, payloads = released.payloads, "tree released");
    report
}

/// Loads a program and hands back the database its facts were collected into.
pub fn debug_ontology(source: &str) -> Result<Database> {
    let (root, database) = load_program(source)?;
    ast::free(root);
    Ok(database)
}
