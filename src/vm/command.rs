//! [VmCommand]: a single parsed line of VM code

use std::fmt;

use super::error::Error;

/// Classification of a [VmCommand], deterministic from its opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Arithmetic,
    Push,
    Pop,
    Branching,
    Function,
}

impl CommandKind {
    fn from_opcode(opcode: &str) -> Result<CommandKind, Error> {
        match opcode {
            "add" | "sub" | "neg" | "eq" | "gt" | "lt" | "and" | "or" | "not" => {
                Ok(CommandKind::Arithmetic)
            }
            "push" => Ok(CommandKind::Push),
            "pop" => Ok(CommandKind::Pop),
            "label" | "goto" | "if-goto" => Ok(CommandKind::Branching),
            "function" | "return" | "call" => Ok(CommandKind::Function),
            other => Err(Error::UnknownCommand { command: other.to_string() }),
        }
    }
}

/// A single parsed VM instruction, tagged with the file it came from
#[derive(Debug, Clone)]
pub struct VmCommand {
    pub opcode: String,
    pub arg1: Option<String>,
    pub arg2: Option<i32>,
    pub origin: String,
    pub kind: CommandKind,
}

impl VmCommand {
    pub fn new(opcode: &str, arg1: Option<&str>, arg2: Option<i32>, origin: &str) -> Result<VmCommand, Error> {
        let kind = CommandKind::from_opcode(opcode)?;
        Ok(VmCommand {
            opcode: opcode.to_string(),
            arg1: arg1.map(str::to_string),
            arg2,
            origin: origin.to_string(),
            kind,
        })
    }

    /// Parse one whitespace-separated VM line, e.g. `push constant 3`
    pub fn from_line(line: &str, origin: &str) -> Result<VmCommand, Error> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [command] => VmCommand::new(command, None, None, origin),
            [command, arg1] => VmCommand::new(command, Some(arg1), None, origin),
            [command, arg1, arg2] => {
                let arg2 = arg2
                    .parse::<i32>()
                    .map_err(|_| Error::InvalidArgument { value: arg2.to_string() })?;
                VmCommand::new(command, Some(arg1), Some(arg2), origin)
            }
            _ => Err(Error::InvalidLine { line: line.to_string() }),
        }
    }
}

impl fmt::Display for VmCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        if let Some(arg1) = &self.arg1 {
            write!(f, " {arg1}")?;
        }
        if let Some(arg2) = &self.arg2 {
            write!(f, " {arg2}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_opcodes_deterministically() {
        assert_eq!(VmCommand::from_line("add", "Foo").unwrap().kind, CommandKind::Arithmetic);
        assert_eq!(VmCommand::from_line("push constant 3", "Foo").unwrap().kind, CommandKind::Push);
        assert_eq!(VmCommand::from_line("pop local 0", "Foo").unwrap().kind, CommandKind::Pop);
        assert_eq!(VmCommand::from_line("label LOOP", "Foo").unwrap().kind, CommandKind::Branching);
        assert_eq!(VmCommand::from_line("call Foo.bar 2", "Foo").unwrap().kind, CommandKind::Function);
    }

    #[test]
    fn display_roundtrips_the_original_line_shape() {
        let cmd = VmCommand::from_line("push constant 3", "Foo").unwrap();
        assert_eq!(cmd.to_string(), "push constant 3");
        let cmd = VmCommand::from_line("add", "Foo").unwrap();
        assert_eq!(cmd.to_string(), "add");
    }

    #[test]
    fn unknown_opcode_is_rejected() {
        assert!(matches!(
            VmCommand::from_line("frobnicate", "Foo").unwrap_err(),
            Error::UnknownCommand { .. }
        ));
    }

    #[test]
    fn non_numeric_arg2_is_an_invalid_argument() {
        assert!(matches!(
            VmCommand::from_line("push constant x", "Foo").unwrap_err(),
            Error::InvalidArgument { .. }
        ));
    }

    #[test]
    fn too_many_tokens_is_an_invalid_line() {
        assert!(matches!(
            VmCommand::from_line("push constant 3 extra", "Foo").unwrap_err(),
            Error::InvalidLine { .. }
        ));
    }
}
