//! Turns OXPL source text into a tree.
//!
//! The grammar lives in `oxpl.pest`. Each production gets a `build_*`
//! function here that hands the parsed pieces to the matching [`Node`]
//! constructor, so every arity and child-type check happens in one place.

use lazy_static::lazy_static;
use pest::Parser;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;
use tracing::debug;

use crate::ast::{Affix, Jump, Node};
use crate::error::{OntcError, Result};

#[derive(Parser)]
#[grammar = "oxpl.pest"]
pub struct OxplParser;

lazy_static! {
    // later entries bind tighter
    static ref PRATT: PrattParser<Rule> = PrattParser::new()
        .op(Op::infix(Rule::assign, Assoc::Right))
        .op(Op::infix(Rule::or, Assoc::Left))
        .op(Op::infix(Rule::and, Assoc::Left))
        .op(Op::infix(Rule::bitor, Assoc::Left))
        .op(Op::infix(Rule::xor, Assoc::Left))
        .op(Op::infix(Rule::bitand, Assoc::Left))
        .op(Op::infix(Rule::eq, Assoc::Left) | Op::infix(Rule::neq, Assoc::Left))
        .op(Op::infix(Rule::lt, Assoc::Left)
            | Op::infix(Rule::gt, Assoc::Left)
            | Op::infix(Rule::leq, Assoc::Left)
            | Op::infix(Rule::geq, Assoc::Left))
        .op(Op::infix(Rule::shl, Assoc::Left) | Op::infix(Rule::shr, Assoc::Left))
        .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
        .op(Op::infix(Rule::mul, Assoc::Left)
            | Op::infix(Rule::div, Assoc::Left)
            | Op::infix(Rule::modulo, Assoc::Left))
        .op(Op::prefix(Rule::neg)
            | Op::prefix(Rule::pos)
            | Op::prefix(Rule::preinc)
            | Op::prefix(Rule::predec))
        .op(Op::postfix(Rule::postinc) | Op::postfix(Rule::postdec));
}

/// Parses a whole program into its translation unit.
pub fn parse(source: &str) -> Result<Box<Node>> {
    let mut pairs = OxplParser::parse(Rule::program, source)?;
    let program = next(&mut pairs, "program")?;
    let mut items = Vec::new();
    for pair in program.into_inner() {
        if pair.as_rule() != Rule::EOI {
            items.push(build_item(pair)?);
        }
    }
    debug!(items = items.len(), "program parsed");
    Ok(Node::trans_unit(chain(items)))
}

// Links nodes into a sibling chain, keeping their order.
fn chain(nodes: Vec<Box<Node>>) -> Option<Box<Node>> {
    let mut head = None;
    for mut node in nodes.into_iter().rev() {
        if let Some(rest) = head {
            node.add_sibling(rest);
        }
        head = Some(node);
    }
    head
}

fn chain_of<'i>(
    pairs: impl Iterator<Item = Pair<'i, Rule>>,
    build: fn(Pair<'i, Rule>) -> Result<Box<Node>>,
) -> Result<Option<Box<Node>>> {
    Ok(chain(pairs.map(build).collect::<Result<Vec<_>>>()?))
}

fn next<'i>(pairs: &mut Pairs<'i, Rule>, expected: &str) -> Result<Pair<'i, Rule>> {
    pairs.next().ok_or_else(|| OntcError::Parse {
        message: format!("expected {}", expected),
        line: None,
        col: None,
    })
}

fn error_at(pair: &Pair<Rule>, message: impl Into<String>) -> OntcError {
    let (line, col) = pair.as_span().start_pos().line_col();
    OntcError::Parse {
        message: message.into(),
        line: Some(line),
        col: Some(col),
    }
}

fn unexpected(pair: &Pair<Rule>) -> OntcError {
    error_at(pair, format!("unexpected {:?}", pair.as_rule()))
}

// ---- declarations ----
fn build_item(pair: Pair<Rule>) -> Result<Box<Node>> {
    match pair.as_rule() {
        Rule::function => build_function(pair),
        Rule::class => build_class(pair),
        Rule::fact => build_fact(pair),
        Rule::triple => build_triple(pair),
        _ => Err(unexpected(&pair)),
    }
}

fn build_function(pair: Pair<Rule>) -> Result<Box<Node>> {
    let mut inner = pair.into_inner();
    let name = Node::str(next(&mut inner, "function name")?.as_str());
    let mut params = None;
    let mut body = None;
    for part in inner {
        match part.as_rule() {
            Rule::params => params = chain_of(part.into_inner(), build_sigvar)?,
            Rule::block => body = Some(build_body(part)?),
            _ => return Err(unexpected(&part)),
        }
    }
    Node::func(Node::signature(name, params)?, body)
}

fn build_sigvar(pair: Pair<Rule>) -> Result<Box<Node>> {
    let mut inner = pair.into_inner();
    let identifier = Node::str(next(&mut inner, "variable name")?.as_str());
    let type_ = inner.next().map(build_scope).transpose()?;
    Node::sigvar(identifier, type_)
}

fn build_class(pair: Pair<Rule>) -> Result<Box<Node>> {
    let mut inner = pair.into_inner();
    let name = Node::str(next(&mut inner, "class name")?.as_str());
    let members = chain_of(inner, build_item)?;
    Node::class(name, Node::class_spec(members))
}

fn build_fact(pair: Pair<Rule>) -> Result<Box<Node>> {
    let mut inner = pair.into_inner();
    let relation = build_scope(next(&mut inner, "relation")?)?;
    let arguments = chain_of(inner, build_address)?;
    Ok(Node::fact(relation, arguments))
}

fn build_triple(pair: Pair<Rule>) -> Result<Box<Node>> {
    let mut inner = pair.into_inner();
    let subject = build_address(next(&mut inner, "subject")?)?;
    let relation = build_scope(next(&mut inner, "relation")?)?;
    let object = inner.next().map(build_address).transpose()?;
    Node::triple_fact(subject, Some(relation), object)
}

fn build_scope(pair: Pair<Rule>) -> Result<Box<Node>> {
    let mut inner = pair.into_inner();
    let mut scope = Node::scope(Node::str(next(&mut inner, "identifier")?.as_str()))?;
    for namespace in inner {
        scope.add_child(Node::str(namespace.as_str()));
    }
    Ok(scope)
}

fn build_address(pair: Pair<Rule>) -> Result<Box<Node>> {
    let mut inner = pair.into_inner();
    let scope = build_scope(next(&mut inner, "scope")?)?;
    let param = inner.next().map(|param| Node::str(param.as_str()));
    Node::address(scope, param)
}

// ---- statements ----
fn build_block(pair: Pair<Rule>) -> Result<Box<Node>> {
    Ok(Node::compound(chain_of(pair.into_inner(), build_statement)?))
}

// blocks that belong to a function or a control statement
fn build_body(pair: Pair<Rule>) -> Result<Box<Node>> {
    build_block(pair)?.into_sequence()
}

fn build_statement(pair: Pair<Rule>) -> Result<Box<Node>> {
    let rule = pair.as_rule();
    if rule == Rule::block {
        return build_block(pair);
    }
    let mut inner = pair.clone().into_inner();
    match rule {
        Rule::expr_stmt => build_expr(next(&mut inner, "expression")?),
        Rule::let_stmt => {
            let sigvar = build_sigvar(next(&mut inner, "variable")?)?;
            let value = inner.next().map(build_expr).transpose()?;
            Node::var_decl(sigvar, value)
        }
        Rule::if_stmt => build_if(pair),
        Rule::while_stmt => {
            let condition = build_expr(next(&mut inner, "condition")?)?;
            let body = build_body(next(&mut inner, "loop body")?)?;
            Ok(Node::while_loop(condition, Some(body)))
        }
        Rule::for_stmt => {
            let variable = Node::str(next(&mut inner, "loop variable")?.as_str());
            let iterable = build_expr(next(&mut inner, "iterable")?)?;
            let body = build_body(next(&mut inner, "loop body")?)?;
            Node::for_loop(variable, iterable, Some(body))
        }
        Rule::return_stmt => Ok(Node::ret(inner.next().map(build_expr).transpose()?)),
        Rule::break_stmt => Ok(Node::jump(Jump::Break)),
        Rule::continue_stmt => Ok(Node::jump(Jump::Continue)),
        _ => Err(unexpected(&pair)),
    }
}

fn build_if(pair: Pair<Rule>) -> Result<Box<Node>> {
    let mut inner = pair.into_inner();
    let condition = build_expr(next(&mut inner, "condition")?)?;
    let then = build_body(next(&mut inner, "if body")?)?;
    let otherwise = match inner.next() {
        Some(part) if part.as_rule() == Rule::if_stmt => Some(build_if(part)?),
        Some(part) => Some(build_body(part)?),
        None => None,
    };
    Ok(Node::cond(condition, then, otherwise))
}

// ---- expressions ----
fn build_expr(pair: Pair<Rule>) -> Result<Box<Node>> {
    let mut inner = pair.into_inner();
    let condition = build_binary(next(&mut inner, "operand")?)?;
    match (inner.next(), inner.next()) {
        (Some(then), Some(otherwise)) => Ok(Node::ternary(
            condition,
            build_expr(then)?,
            build_expr(otherwise)?,
        )),
        _ => Ok(condition),
    }
}

fn build_binary(pair: Pair<Rule>) -> Result<Box<Node>> {
    PRATT
        .map_primary(build_primary)
        .map_prefix(|op, operand| Node::unop(Affix::Prefix, op.as_str(), operand?))
        .map_postfix(|operand, op| Node::unop(Affix::Postfix, op.as_str(), operand?))
        .map_infix(|lhs, op, rhs| Node::binop_symbol(op.as_str(), lhs?, rhs?))
        .parse(pair.into_inner())
}

fn build_primary(pair: Pair<Rule>) -> Result<Box<Node>> {
    match pair.as_rule() {
        Rule::int => pair
            .as_str()
            .parse::<i64>()
            .map(Node::int)
            .map_err(|e| error_at(&pair, format!("invalid integer: {}", e))),
        Rule::float => pair
            .as_str()
            .parse::<f32>()
            .map(Node::float)
            .map_err(|e| error_at(&pair, format!("invalid float: {}", e))),
        Rule::string => {
            let text = pair.into_inner().next().map(|text| text.as_str()).unwrap_or("");
            Ok(Node::str(unescape(text)))
        }
        Rule::call => {
            let mut inner = pair.into_inner();
            let callee = build_scope(next(&mut inner, "callee")?)?;
            Ok(Node::call(callee, chain_of(inner, build_expr)?))
        }
        Rule::scope => build_scope(pair),
        Rule::expr => build_expr(pair),
        _ => Err(unexpected(&pair)),
    }
}

fn unescape(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => unescaped.push('\n'),
            Some('t') => unescaped.push('\t'),
            Some(other) => unescaped.push(other),
            None => (),
        }
    }
    unescaped
}
