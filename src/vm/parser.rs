//! Read and parse VM commands from source text

use super::command::VmCommand;
use super::error::Error;

/// Strip `//` comments and blank lines, returning one [VmCommand] per line
pub fn parse(source: &str, origin: &str) -> Result<Vec<VmCommand>, Error> {
    source
        .lines()
        .map(|line| line.split("//").next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(|line| VmCommand::from_line(line, origin))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_blank_lines() {
        let source = "// header comment\npush constant 3 // inline\n\npush constant 4\nadd\n";
        let commands = parse(source, "Foo").unwrap();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0].to_string(), "push constant 3");
        assert_eq!(commands[1].to_string(), "push constant 4");
        assert_eq!(commands[2].to_string(), "add");
    }

    #[test]
    fn tags_every_command_with_its_origin() {
        let commands = parse("push constant 1", "Main").unwrap();
        assert_eq!(commands[0].origin, "Main");
    }
}
