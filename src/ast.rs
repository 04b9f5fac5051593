//! Tree representation of OXPL programs.
//!
//! Nodes form a left-child/right-sibling tree: every [`Node`] owns at most one
//! first child and at most one next sibling, and a node's full child list is the
//! chain reached by following sibling links from its first child. Ownership is
//! strictly single: once attached, a node belongs to its parent (or to its
//! predecessor in a sibling chain), so the structure can never share or cycle.
//!
//! Constructors exist per grammar production and wire their children in the
//! fixed order of the variant, so consumers can rely on positions (a triple
//! fact is always `relation, subject[, object]`) without re-checking arity.

use std::fmt;

use tracing::error;

use crate::error::{OntcError, Result};

// ------------- Kinds -------------
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    TransUnit,
    // literals
    Int(i64),
    Float(f32),
    Str(String),
    // structure
    Scope,
    Sequence,
    Compound,
    Address,
    Call,
    Signature,
    SigVar,
    // operators
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Assign,
    Eq,
    Neq,
    And,
    Or,
    BitAnd,
    BitOr,
    Xor,
    Lt,
    Gt,
    Leq,
    Geq,
    Shl,
    Shr,
    PreInc,
    PostInc,
    PreDec,
    PostDec,
    Negate,
    // control and declarations
    Func,
    Cond,
    Ternary,
    Return,
    Continue,
    Break,
    While,
    For,
    VarDecl,
    Class,
    ClassSpec,
    // logic
    Fact,
    TripleFact,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TransUnit => "TransUnit",
            Self::Int(_) => "Int",
            Self::Float(_) => "Float",
            Self::Str(_) => "Str",
            Self::Scope => "Scope",
            Self::Sequence => "Sequence",
            Self::Compound => "Compound",
            Self::Address => "Address",
            Self::Call => "Call",
            Self::Signature => "Signature",
            Self::SigVar => "SigVar",
            Self::Add => "Add",
            Self::Sub => "Sub",
            Self::Mul => "Mul",
            Self::Div => "Div",
            Self::Mod => "Mod",
            Self::Assign => "Assign",
            Self::Eq => "Eq",
            Self::Neq => "Neq",
            Self::And => "And",
            Self::Or => "Or",
            Self::BitAnd => "BitAnd",
            Self::BitOr => "BitOr",
            Self::Xor => "Xor",
            Self::Lt => "Lt",
            Self::Gt => "Gt",
            Self::Leq => "Leq",
            Self::Geq => "Geq",
            Self::Shl => "Shl",
            Self::Shr => "Shr",
            Self::PreInc => "PreInc",
            Self::PostInc => "PostInc",
            Self::PreDec => "PreDec",
            Self::PostDec => "PostDec",
            Self::Negate => "Negate",
            Self::Func => "Func",
            Self::Cond => "Cond",
            Self::Ternary => "Ternary",
            Self::Return => "Return",
            Self::Continue => "Continue",
            Self::Break => "Break",
            Self::While => "While",
            Self::For => "For",
            Self::VarDecl => "VarDecl",
            Self::Class => "Class",
            Self::ClassSpec => "ClassSpec",
            Self::Fact => "Fact",
            Self::TripleFact => "TripleFact",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "Int({})", value),
            Self::Float(value) => write!(f, "Float({})", value),
            Self::Str(value) => write!(f, "Str({:?})", value),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Binary operators, each mapping onto exactly one operator node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Assign,
    Eq,
    Neq,
    And,
    Or,
    BitAnd,
    BitOr,
    Xor,
    Lt,
    Gt,
    Leq,
    Geq,
    Shl,
    Shr,
}

impl BinOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Mod,
            "=" => Self::Assign,
            "==" => Self::Eq,
            "!=" => Self::Neq,
            "&&" => Self::And,
            "||" => Self::Or,
            "&" => Self::BitAnd,
            "|" => Self::BitOr,
            "^" => Self::Xor,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::Leq,
            ">=" => Self::Geq,
            "<<" => Self::Shl,
            ">>" => Self::Shr,
            _ => return None,
        };
        Some(op)
    }
    fn kind(self) -> NodeKind {
        match self {
            Self::Add => NodeKind::Add,
            Self::Sub => NodeKind::Sub,
            Self::Mul => NodeKind::Mul,
            Self::Div => NodeKind::Div,
            Self::Mod => NodeKind::Mod,
            Self::Assign => NodeKind::Assign,
            Self::Eq => NodeKind::Eq,
            Self::Neq => NodeKind::Neq,
            Self::And => NodeKind::And,
            Self::Or => NodeKind::Or,
            Self::BitAnd => NodeKind::BitAnd,
            Self::BitOr => NodeKind::BitOr,
            Self::Xor => NodeKind::Xor,
            Self::Lt => NodeKind::Lt,
            Self::Gt => NodeKind::Gt,
            Self::Leq => NodeKind::Leq,
            Self::Geq => NodeKind::Geq,
            Self::Shl => NodeKind::Shl,
            Self::Shr => NodeKind::Shr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affix {
    Prefix,
    Postfix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jump {
    Break,
    Continue,
}

// ------------- Node -------------
// Only Debug is derived, and it walks sibling chains recursively, so keep it
// to small trees.
#[derive(Debug)]
pub struct Node {
    kind: NodeKind,
    child: Option<Box<Node>>,
    sibling: Option<Box<Node>>,
}

/// Counts reported by [`free`] and [`Node::tally`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Released {
    pub nodes: usize,
    pub payloads: usize,
}

fn construction(message: impl Into<String>) -> OntcError {
    let message = message.into();
    error!(%message, "tree construction failed");
    OntcError::Construction(message)
}

fn require_str(node: &Node, context: &str) -> Result<()> {
    match node.kind {
        NodeKind::Str(_) => Ok(()),
        ref other => Err(construction(format!(
            "{} has to be a string, got {}",
            context,
            other.name()
        ))),
    }
}

impl Node {
    fn leaf(kind: NodeKind) -> Box<Node> {
        Box::new(Node {
            kind,
            child: None,
            sibling: None,
        })
    }
    // Children are appended in order; a part that already heads a sibling
    // chain (argument lists, statement blocks) keeps its chain.
    fn with_children(kind: NodeKind, parts: Vec<Option<Box<Node>>>) -> Box<Node> {
        let mut node = Node::leaf(kind);
        for part in parts.into_iter().flatten() {
            node.add_child(part);
        }
        node
    }

    // ---- literals ----
    pub fn int(value: i64) -> Box<Node> {
        Node::leaf(NodeKind::Int(value))
    }
    pub fn float(value: f32) -> Box<Node> {
        Node::leaf(NodeKind::Float(value))
    }
    pub fn str(value: impl Into<String>) -> Box<Node> {
        Node::leaf(NodeKind::Str(value.into()))
    }

    // ---- structure ----
    /// Scope with one namespace element; more are added with [`Node::add_child`].
    pub fn scope(identifier: Box<Node>) -> Result<Box<Node>> {
        require_str(&identifier, "scope identifier")?;
        Ok(Node::with_children(NodeKind::Scope, vec![Some(identifier)]))
    }
    pub fn compound(head: Option<Box<Node>>) -> Box<Node> {
        Node::with_children(NodeKind::Compound, vec![head])
    }
    /// Turns a compound block into the sequence acting as the body of a
    /// function, loop or branch. Both share the same shape.
    pub fn into_sequence(mut self: Box<Self>) -> Result<Box<Node>> {
        if self.kind != NodeKind::Compound {
            return Err(construction(format!(
                "only compound nodes convert to sequences, got {}",
                self.kind.name()
            )));
        }
        self.kind = NodeKind::Sequence;
        Ok(self)
    }
    pub fn address(scope: Box<Node>, param: Option<Box<Node>>) -> Result<Box<Node>> {
        if scope.kind != NodeKind::Scope {
            return Err(construction("address has to start with a scope"));
        }
        if let Some(param) = &param {
            require_str(param, "address parameter")?;
        }
        Ok(Node::with_children(NodeKind::Address, vec![Some(scope), param]))
    }
    pub fn call(callee: Box<Node>, args: Option<Box<Node>>) -> Box<Node> {
        Node::with_children(NodeKind::Call, vec![Some(callee), args])
    }
    pub fn signature(name: Box<Node>, params: Option<Box<Node>>) -> Result<Box<Node>> {
        require_str(&name, "function name")?;
        Ok(Node::with_children(NodeKind::Signature, vec![Some(name), params]))
    }
    pub fn sigvar(identifier: Box<Node>, type_: Option<Box<Node>>) -> Result<Box<Node>> {
        require_str(&identifier, "variable identifier")?;
        Ok(Node::with_children(NodeKind::SigVar, vec![Some(identifier), type_]))
    }

    // ---- operators ----
    pub fn binop(op: BinOp, lhs: Box<Node>, rhs: Box<Node>) -> Box<Node> {
        Node::with_children(op.kind(), vec![Some(lhs), Some(rhs)])
    }
    pub fn binop_symbol(symbol: &str, lhs: Box<Node>, rhs: Box<Node>) -> Result<Box<Node>> {
        let op = BinOp::from_symbol(symbol)
            .ok_or_else(|| construction(format!("unknown binary operator '{}'", symbol)))?;
        Ok(Node::binop(op, lhs, rhs))
    }
    /// Unary operation. A prefix `+` is the identity and returns the operand.
    pub fn unop(affix: Affix, symbol: &str, operand: Box<Node>) -> Result<Box<Node>> {
        let kind = match (affix, symbol) {
            (Affix::Prefix, "++") => NodeKind::PreInc,
            (Affix::Prefix, "--") => NodeKind::PreDec,
            (Affix::Postfix, "++") => NodeKind::PostInc,
            (Affix::Postfix, "--") => NodeKind::PostDec,
            (Affix::Prefix, "-") => NodeKind::Negate,
            (Affix::Prefix, "+") => return Ok(operand),
            _ => {
                return Err(construction(format!(
                    "unknown {:?} unary operator '{}'",
                    affix, symbol
                )));
            }
        };
        Ok(Node::with_children(kind, vec![Some(operand)]))
    }

    // ---- control and declarations ----
    pub fn func(signature: Box<Node>, body: Option<Box<Node>>) -> Result<Box<Node>> {
        if signature.kind != NodeKind::Signature {
            return Err(construction("function has to start with a signature"));
        }
        Ok(Node::with_children(NodeKind::Func, vec![Some(signature), body]))
    }
    pub fn cond(condition: Box<Node>, then: Box<Node>, else_: Option<Box<Node>>) -> Box<Node> {
        Node::with_children(NodeKind::Cond, vec![Some(condition), Some(then), else_])
    }
    pub fn ternary(condition: Box<Node>, then: Box<Node>, else_: Box<Node>) -> Box<Node> {
        Node::with_children(NodeKind::Ternary, vec![Some(condition), Some(then), Some(else_)])
    }
    pub fn ret(expr: Option<Box<Node>>) -> Box<Node> {
        Node::with_children(NodeKind::Return, vec![expr])
    }
    pub fn jump(jump: Jump) -> Box<Node> {
        match jump {
            Jump::Break => Node::leaf(NodeKind::Break),
            Jump::Continue => Node::leaf(NodeKind::Continue),
        }
    }
    pub fn while_loop(condition: Box<Node>, block: Option<Box<Node>>) -> Box<Node> {
        Node::with_children(NodeKind::While, vec![Some(condition), block])
    }
    pub fn for_loop(
        identifier: Box<Node>,
        iterable: Box<Node>,
        block: Option<Box<Node>>,
    ) -> Result<Box<Node>> {
        require_str(&identifier, "loop variable")?;
        Ok(Node::with_children(
            NodeKind::For,
            vec![Some(identifier), Some(iterable), block],
        ))
    }
    pub fn var_decl(sigvar: Box<Node>, value: Option<Box<Node>>) -> Result<Box<Node>> {
        if sigvar.kind != NodeKind::SigVar {
            return Err(construction("variable declaration needs a variable signature"));
        }
        Ok(Node::with_children(NodeKind::VarDecl, vec![Some(sigvar), value]))
    }
    pub fn class(identifier: Box<Node>, spec: Box<Node>) -> Result<Box<Node>> {
        require_str(&identifier, "class name")?;
        if spec.kind != NodeKind::ClassSpec {
            return Err(construction("class body has to be a class specification"));
        }
        Ok(Node::with_children(NodeKind::Class, vec![Some(identifier), Some(spec)]))
    }
    pub fn class_spec(head: Option<Box<Node>>) -> Box<Node> {
        Node::with_children(NodeKind::ClassSpec, vec![head])
    }
    pub fn trans_unit(first: Option<Box<Node>>) -> Box<Node> {
        Node::with_children(NodeKind::TransUnit, vec![first])
    }

    // ---- logic ----
    /// First-order fact: the relation followed by its argument chain.
    pub fn fact(relation: Box<Node>, args: Option<Box<Node>>) -> Box<Node> {
        Node::with_children(NodeKind::Fact, vec![Some(relation), args])
    }
    /// Triple fact wired as `relation, subject[, object]`.
    pub fn triple_fact(
        subject: Box<Node>,
        relation: Option<Box<Node>>,
        object: Option<Box<Node>>,
    ) -> Result<Box<Node>> {
        let relation = relation.ok_or_else(|| construction("fact relation is missing"))?;
        Ok(Node::with_children(
            NodeKind::TripleFact,
            vec![Some(relation), Some(subject), object],
        ))
    }

    // ---- linkage ----
    /// Appends `successor` to the end of this node's sibling chain.
    pub fn add_sibling(&mut self, successor: Box<Node>) -> &mut Self {
        let mut cursor = &mut self.sibling;
        while let Some(node) = cursor {
            cursor = &mut node.sibling;
        }
        *cursor = Some(successor);
        self
    }
    /// Appends `successor` to the end of this node's child chain.
    pub fn add_child(&mut self, successor: Box<Node>) -> &mut Self {
        match self.child.as_mut() {
            Some(first) => {
                first.add_sibling(successor);
            }
            None => self.child = Some(successor),
        }
        self
    }

    // ---- access ----
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }
    pub fn child(&self) -> Option<&Node> {
        self.child.as_deref()
    }
    pub fn sibling(&self) -> Option<&Node> {
        self.sibling.as_deref()
    }
    pub fn children(&self) -> Siblings<'_> {
        Siblings {
            next: self.child.as_deref(),
        }
    }
    /// This node followed by every node after it in its sibling chain.
    pub fn siblings(&self) -> Siblings<'_> {
        Siblings { next: Some(self) }
    }
    pub fn nth_child(&self, n: usize) -> Option<&Node> {
        self.children().nth(n)
    }
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Str(value) => Some(value),
            _ => None,
        }
    }
    pub fn as_int(&self) -> Option<i64> {
        match self.kind {
            NodeKind::Int(value) => Some(value),
            _ => None,
        }
    }
    pub fn as_float(&self) -> Option<f32> {
        match self.kind {
            NodeKind::Float(value) => Some(value),
            _ => None,
        }
    }
    /// Leading identifier of a string, scope or address node.
    pub fn identifier(&self) -> Option<&str> {
        match self.kind {
            NodeKind::Str(_) => self.as_str(),
            NodeKind::Scope => self.child()?.as_str(),
            NodeKind::Address => self.child()?.identifier(),
            _ => None,
        }
    }
    /// A scope naming exactly one identifier, e.g. `println` but not `io::println`.
    pub fn is_single_level_scope(&self) -> bool {
        self.kind == NodeKind::Scope
            && self.child().is_some_and(|ident| {
                ident.as_str().is_some() && ident.sibling().is_none()
            })
    }
    pub fn func_name(&self) -> Option<&str> {
        if self.kind != NodeKind::Func {
            return None;
        }
        let signature = self.child()?;
        if signature.kind != NodeKind::Signature {
            return None;
        }
        signature.child()?.as_str()
    }
    /// The nodes following a function's signature.
    pub fn func_body(&self) -> Siblings<'_> {
        let next = match self.kind {
            NodeKind::Func => self.child().and_then(Node::sibling),
            _ => None,
        };
        Siblings { next }
    }
    /// `(relation, subject, object)` of a triple fact.
    pub fn triple_parts(&self) -> Option<(&Node, &Node, Option<&Node>)> {
        if self.kind != NodeKind::TripleFact {
            return None;
        }
        let relation = self.child()?;
        let subject = relation.sibling()?;
        Some((relation, subject, subject.sibling()))
    }
    /// Node and payload counts of this node's subtree, siblings excluded.
    pub fn tally(&self) -> Released {
        let mut tally = Released::default();
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            tally.nodes += 1;
            if let NodeKind::Str(_) = node.kind {
                tally.payloads += 1;
            }
            pending.extend(node.children());
        }
        tally
    }
}

// Dropping long statement chains recursively would grow the stack per
// sibling, so links are detached onto a worklist first.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending: Vec<Box<Node>> = Vec::new();
        pending.extend(self.child.take());
        pending.extend(self.sibling.take());
        while let Some(mut node) = pending.pop() {
            pending.extend(node.child.take());
            pending.extend(node.sibling.take());
        }
    }
}

pub struct Siblings<'a> {
    next: Option<&'a Node>,
}

impl<'a> Iterator for Siblings<'a> {
    type Item = &'a Node;
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.sibling();
        Some(current)
    }
}

// ------------- Whole-tree operations -------------

/// Checks that `root` is a translation unit holding exactly one function
/// named `main` among its top-level items.
pub fn validate(root: &Node) -> Result<()> {
    if root.kind != NodeKind::TransUnit {
        error!(kind = %root.kind, "root is not a translation unit");
        return Err(OntcError::Validation(format!(
            "root has to be a translation unit, got {}",
            root.kind.name()
        )));
    }
    let mut mains = 0;
    for item in root.children().filter(|item| item.kind == NodeKind::Func) {
        match item.func_name() {
            Some("main") => mains += 1,
            Some(_) => (),
            None => {
                error!("invalid function signature");
                return Err(OntcError::Validation(String::from(
                    "invalid function signature",
                )));
            }
        }
    }
    match mains {
        1 => Ok(()),
        0 => {
            error!("missing main function");
            Err(OntcError::Validation(String::from("missing main function")))
        }
        n => {
            error!(count = n, "more than one main function");
            Err(OntcError::Validation(format!("{} main functions", n)))
        }
    }
}

/// Releases `root` together with its child chain and sibling chain.
/// Children are released before the node that owns them.
pub fn free(root: Box<Node>) -> Released {
    let mut released = Released::default();
    // owners are detached before anything they link to
    let mut detached: Vec<Box<Node>> = Vec::new();
    let mut pending = vec![root];
    while let Some(mut node) = pending.pop() {
        pending.extend(node.sibling.take());
        pending.extend(node.child.take());
        detached.push(node);
    }
    while let Some(node) = detached.pop() {
        if let NodeKind::Str(_) = node.kind {
            released.payloads += 1;
        }
        released.nodes += 1;
        drop(node);
    }
    released
}
