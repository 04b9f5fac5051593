//! Line-oriented shell for experimenting with a fact store.
//!
//! The shell is generic over its input and output so that sessions can be
//! scripted. It starts without a database unless one is handed over, e.g.
//! the facts collected from a program by `ontc dbgon`.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::error::Result;
use crate::ontology::{Database, ResourceId, create_resource};

pub const HELP: &str = "Available commands:\n\
createdb\tCreate new database\n\
newres\t\tAdd new resource\n\
newfact\t\tAdd new fact\n\
listres\t\tList all resources\n\
listfacts\tList all facts\n\
quit\t\tQuit\n\
exit\t\tQuit";

const NO_DATABASE: &str = "Error: no database available";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell<R, W> {
    input: R,
    output: W,
    database: Option<Database>,
    prompt: String,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            database: None,
            prompt: String::from("> "),
        }
    }
    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }
    pub fn database(&self) -> Option<&Database> {
        self.database.as_ref()
    }
    pub fn into_parts(self) -> (W, Option<Database>) {
        (self.output, self.database)
    }

    /// Reads and evaluates commands until a quit command or end of input.
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.output, "ontc interactive shell")?;
        writeln!(self.output, "Enter \"help\" for a list of available commands.")?;
        loop {
            write!(self.output, "{}", self.prompt)?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                break;
            };
            if self.evaluate(line.trim())? == Flow::Exit {
                break;
            }
        }
        self.output.flush()?;
        Ok(())
    }

    /// Evaluates a single command line and prints its result.
    pub fn evaluate(&mut self, command: &str) -> Result<Flow> {
        debug!(command, "shell command");
        let message = match command {
            "exit" | "quit" | "q" => return Ok(Flow::Exit),
            "help" => HELP.to_string(),
            "createdb" => self.create_database(),
            "newres" => self.new_resource()?,
            "newfact" => self.new_fact()?,
            "listres" => self.list_resources(),
            "listfacts" => self.list_facts(),
            _ => String::from("Unknown command"),
        };
        writeln!(self.output, "{}", message)?;
        Ok(Flow::Continue)
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    fn create_database(&mut self) -> String {
        match self.database {
            Some(_) => String::from("Database exists already!"),
            None => {
                self.database = Some(Database::new());
                String::from("Database created")
            }
        }
    }

    fn new_resource(&mut self) -> Result<String> {
        if self.database.is_none() {
            return Ok(NO_DATABASE.to_string());
        }
        write!(self.output, "Name: ")?;
        self.output.flush()?;
        let name = self.read_line()?.unwrap_or_default();
        if let Some(database) = self.database.as_mut() {
            database.add_resource(create_resource(name));
        }
        Ok(String::from("Resource created!"))
    }

    fn new_fact(&mut self) -> Result<String> {
        if self.database.is_none() {
            return Ok(NO_DATABASE.to_string());
        }
        writeln!(self.output, "Select predicate:")?;
        let Some(predicate) = self.select_resource()? else {
            return Ok(String::from("Error while creating fact"));
        };
        let mut arguments = Vec::new();
        writeln!(self.output)?;
        loop {
            writeln!(self.output, "Select argument or press enter to finish:")?;
            match self.select_resource()? {
                Some(argument) => {
                    arguments.push(argument);
                    writeln!(self.output)?;
                }
                None => break,
            }
        }
        let Some(database) = self.database.as_mut() else {
            return Ok(NO_DATABASE.to_string());
        };
        let mut fact = database.create_fact(predicate)?;
        for argument in arguments {
            database.add_argument(&mut fact, argument)?;
        }
        database.add_fact(fact)?;
        Ok(String::from("Fact created!"))
    }

    // Numbered menu of all resources. An empty line or an invalid choice
    // selects nothing.
    fn select_resource(&mut self) -> Result<Option<ResourceId>> {
        let Some(database) = self.database.as_ref() else {
            return Ok(None);
        };
        let mut choices = Vec::with_capacity(database.resource_count());
        for (position, (id, resource)) in database.resources().enumerate() {
            writeln!(self.output, "{} {}", position + 1, resource.name())?;
            choices.push(id);
        }
        write!(self.output, "Enter element to choose: ")?;
        self.output.flush()?;
        let line = match self.read_line()? {
            Some(line) if !line.trim().is_empty() => line,
            _ => return Ok(None),
        };
        match line.trim().parse::<usize>() {
            Ok(selection) if (1..=choices.len()).contains(&selection) => {
                Ok(Some(choices[selection - 1]))
            }
            _ => {
                writeln!(self.output, "Error: invalid selection")?;
                Ok(None)
            }
        }
    }

    fn list_resources(&self) -> String {
        match &self.database {
            Some(database) => database
                .resources()
                .map(|(_, resource)| resource.name())
                .collect::<Vec<_>>()
                .join("\n"),
            None => NO_DATABASE.to_string(),
        }
    }

    fn list_facts(&self) -> String {
        match &self.database {
            Some(database) => database
                .facts()
                .map(|fact| database.display_fact(fact).to_string())
                .collect::<Vec<_>>()
                .join("\n"),
            None => NO_DATABASE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn session(script: &str) -> (String, Option<Database>) {
        let mut shell = Shell::new(Cursor::new(script.to_string()), Vec::new());
        shell.run().unwrap();
        let (output, database) = shell.into_parts();
        (String::from_utf8(output).unwrap(), database)
    }

    #[test]
    fn commands_need_a_database() {
        let (output, database) = session("listres\nnewfact\nbogus\nq\nlistres\n");
        assert_eq!(output.matches(NO_DATABASE).count(), 2);
        assert!(output.contains("Unknown command"));
        assert!(database.is_none());
    }

    #[test]
    fn createdb_only_once() {
        let (output, database) = session("createdb\ncreatedb\n");
        assert!(output.contains("Database created\n"));
        assert!(output.contains("Database exists already!\n"));
        assert_eq!(database.unwrap().resource_count(), 0);
    }

    #[test]
    fn builds_a_fact_from_menus() {
        let script = "createdb\nnewres\nlikes\nnewres\nalice\nnewres\nbob\n\
                      newfact\n1\n2\n3\n\nlistfacts\nexit\n";
        let (output, database) = session(script);
        assert!(output.contains("Fact created!\n"));
        assert!(output.contains("likes(alice, bob).\n"));
        assert_eq!(database.unwrap().fact_count(), 1);
    }

    #[test]
    fn invalid_selection_aborts_the_fact() {
        let (output, database) = session("createdb\nnewres\nx\nnewfact\n7\n");
        assert!(output.contains("Error: invalid selection\n"));
        assert!(output.contains("Error while creating fact\n"));
        assert_eq!(database.unwrap().fact_count(), 0);
    }
}
