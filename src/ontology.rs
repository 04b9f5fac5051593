// used for the name index of resources
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;

use std::collections::HashMap;
use std::collections::hash_map::Entry;

// every database draws a distinct identity so handles never cross stores
use std::sync::atomic::{AtomicU64, Ordering};

// used to print out readable forms of a fact
use std::fmt;

use tracing::{debug, warn};

use crate::error::{OntcError, Result};

pub type NameHasher = BuildHasherDefault<SeaHasher>;

static DATABASE_GENERATOR: AtomicU64 = AtomicU64::new(0);

// ------------- Resource -------------
/// Handle to a resource registered in one particular [`Database`].
///
/// Two handles are equal only if they denote the same registration, so two
/// resources that happen to share a name are still different individuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId {
    database: u64,
    index: usize,
}

impl ResourceId {
    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Resource {
    name: String,
}

impl Resource {
    pub fn new(name: String) -> Self {
        Self { name }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Creates an unregistered resource, taking ownership of `name`.
pub fn create_resource(name: impl Into<String>) -> Resource {
    Resource::new(name.into())
}

// ------------- Fact -------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fact {
    predicate: ResourceId,
    arguments: Vec<ResourceId>,
}

impl Fact {
    pub fn predicate(&self) -> ResourceId {
        self.predicate
    }
    pub fn arguments(&self) -> &[ResourceId] {
        &self.arguments
    }
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }
}

pub struct FactDisplay<'a> {
    database: &'a Database,
    fact: &'a Fact,
}

impl fmt::Display for FactDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = |id: ResourceId| self.database.name(id).unwrap_or("?");
        write!(f, "{}(", name(self.fact.predicate))?;
        for (position, argument) in self.fact.arguments.iter().enumerate() {
            if position > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", name(*argument))?;
        }
        write!(f, ").")
    }
}

// ------------- Database -------------
// Owns resources and facts. Both collections are append-only and keep
// insertion order, which is the order every scan and query reports in.
#[derive(Debug)]
pub struct Database {
    id: u64,
    // facts are declared before resources so that they are dropped first
    facts: Vec<Fact>,
    resources: Vec<Resource>,
    // first registration of every name, i.e. what a linear scan would find
    names: HashMap<String, ResourceId, NameHasher>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    pub fn new() -> Self {
        let id = DATABASE_GENERATOR.fetch_add(1, Ordering::Relaxed);
        debug!(database = id, "database created");
        Self {
            id,
            facts: Vec::new(),
            resources: Vec::new(),
            names: HashMap::default(),
        }
    }

    // ---- resources ----
    pub fn add_resource(&mut self, resource: Resource) -> ResourceId {
        let id = ResourceId {
            database: self.id,
            index: self.resources.len(),
        };
        if let Entry::Vacant(e) = self.names.entry(resource.name.clone()) {
            e.insert(id);
        }
        self.resources.push(resource);
        id
    }
    /// Returns the canonical resource for `name`, registering it when it is
    /// not known yet. The flag tells whether it was previously kept.
    pub fn keep_resource(&mut self, name: &str) -> (ResourceId, bool) {
        match self.find_resource(name) {
            Some(id) => (id, true),
            None => (self.add_resource(create_resource(name)), false),
        }
    }
    /// First resource registered under `name`.
    pub fn find_resource(&self, name: &str) -> Option<ResourceId> {
        self.names.get(name).copied()
    }
    pub fn contains(&self, id: ResourceId) -> bool {
        id.database == self.id && id.index < self.resources.len()
    }
    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        if id.database != self.id {
            return None;
        }
        self.resources.get(id.index)
    }
    pub fn name(&self, id: ResourceId) -> Option<&str> {
        self.resource(id).map(Resource::name)
    }
    pub fn resources(&self) -> impl Iterator<Item = (ResourceId, &Resource)> + '_ {
        let database = self.id;
        self.resources
            .iter()
            .enumerate()
            .map(move |(index, resource)| (ResourceId { database, index }, resource))
    }
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    // ---- facts ----
    fn require(&self, id: ResourceId, role: &str) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            warn!(role, ?id, "resource is not present in the database");
            Err(OntcError::Integrity(format!(
                "{} is not present in resource list",
                role
            )))
        }
    }
    /// Starts a fact over `predicate`, which has to be registered here.
    pub fn create_fact(&self, predicate: ResourceId) -> Result<Fact> {
        self.require(predicate, "predicate")?;
        Ok(Fact {
            predicate,
            arguments: Vec::new(),
        })
    }
    /// Appends `argument` as the next position of `fact`. The fact is left
    /// unchanged if the argument is not registered here.
    pub fn add_argument(&self, fact: &mut Fact, argument: ResourceId) -> Result<()> {
        self.require(argument, "argument")?;
        fact.arguments.push(argument);
        Ok(())
    }
    /// Stores `fact` and returns its position. Duplicates are kept.
    pub fn add_fact(&mut self, fact: Fact) -> Result<usize> {
        self.require(fact.predicate, "predicate")?;
        for argument in &fact.arguments {
            self.require(*argument, "argument")?;
        }
        self.facts.push(fact);
        Ok(self.facts.len() - 1)
    }
    pub fn facts(&self) -> std::slice::Iter<'_, Fact> {
        self.facts.iter()
    }
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }
    pub fn display_fact<'a>(&'a self, fact: &'a Fact) -> FactDisplay<'a> {
        FactDisplay {
            database: self,
            fact,
        }
    }

    // ---- queries ----
    /// Whether a stored fact has the same predicate and exactly the same
    /// argument sequence as `fact`. A prefix is not a match.
    pub fn check(&self, fact: &Fact) -> bool {
        self.facts
            .iter()
            .any(|kept| kept.predicate == fact.predicate && kept.arguments == fact.arguments)
    }
    /// Answers `relation(subject, ?)` or `relation(?, object)` over the binary
    /// facts, in insertion order. Exactly one of `subject` and `object` has to
    /// be supplied. Facts with fewer than two arguments never match.
    pub fn query_triple(
        &self,
        relation: ResourceId,
        subject: Option<ResourceId>,
        object: Option<ResourceId>,
    ) -> Result<Vec<ResourceId>> {
        let (known, wanted_position) = match (subject, object) {
            (Some(subject), None) => (subject, 1),
            (None, Some(object)) => (object, 0),
            _ => {
                warn!(?subject, ?object, "no query goal");
                return Err(OntcError::NoQueryGoal);
            }
        };
        let known_position = 1 - wanted_position;
        let mut hits = Vec::new();
        for fact in self.facts.iter().filter(|fact| fact.predicate == relation) {
            if let [first, second, ..] = fact.arguments.as_slice() {
                let pair = [*first, *second];
                if pair[known_position] == known {
                    hits.push(pair[wanted_position]);
                }
            }
        }
        Ok(hits)
    }
}
