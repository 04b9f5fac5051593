use std::io::Write;

use crate::ast::Node;
use crate::error::{OntcError, Result};

/// The closed set of functions a call site can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
    Println,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "print" => Some(Self::Print),
            "println" => Some(Self::Println),
            _ => None,
        }
    }
    pub fn name(self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::Println => "println",
        }
    }
    /// Runs the built-in on the argument chain starting at `args`.
    /// Both built-ins take exactly one string literal.
    pub fn invoke(self, args: Option<&Node>, out: &mut dyn Write) -> Result<()> {
        let text = self.single_string(args)?;
        match self {
            Self::Print => write!(out, "{}", text)?,
            Self::Println => writeln!(out, "{}", text)?,
        }
        Ok(())
    }
    fn single_string<'a>(self, args: Option<&'a Node>) -> Result<&'a str> {
        let argument = args.ok_or_else(|| self.misuse("argument missing"))?;
        let text = argument
            .as_str()
            .ok_or_else(|| self.misuse("wrong type of argument"))?;
        if argument.sibling().is_some() {
            return Err(self.misuse("too many arguments"));
        }
        Ok(text)
    }
    fn misuse(self, message: &str) -> OntcError {
        OntcError::Builtin {
            name: self.name(),
            message: message.to_string(),
        }
    }
}
