//! Expands [VmCommand]s into Hack assembly fragments
//!
//! Each `write` call returns a block of assembly lines prefixed with a
//! `// <original command>` comment, which doubles as the textual contract
//! the assembler's line-shape extraction consumes.

use super::command::{CommandKind, VmCommand};
use super::error::Error;

fn segment_register(segment: &str) -> Option<&'static str> {
    match segment {
        "local" => Some("LCL"),
        "argument" => Some("ARG"),
        "this" => Some("THIS"),
        "that" => Some("THAT"),
        _ => None,
    }
}

/// Per-run state: the VM translator's two global label counters
pub struct CodeWriter {
    label_count_cmp: u32,
    label_count_ret_addr: u32,
}

impl CodeWriter {
    pub fn new() -> CodeWriter {
        CodeWriter {
            label_count_cmp: 0,
            label_count_ret_addr: 0,
        }
    }

    /// Translate one command into its assembly block, including the leading
    /// `// <command>` debugging comment
    pub fn write(&mut self, command: &VmCommand) -> Result<Vec<String>, Error> {
        let mut code = vec![format!("// {command}")];
        let body = match command.kind {
            CommandKind::Push => self.push(command)?,
            CommandKind::Pop => self.pop(command)?,
            CommandKind::Arithmetic => self.arithmetic(command)?,
            CommandKind::Branching => self.branching(command),
            CommandKind::Function => self.function(command)?,
        };
        code.extend(body);
        Ok(code)
    }

    fn push(&self, command: &VmCommand) -> Result<Vec<String>, Error> {
        let segment = command
            .arg1
            .as_deref()
            .ok_or_else(|| Error::MissingArgument { command: command.opcode.clone(), which: "a segment" })?;
        let value = command
            .arg2
            .ok_or_else(|| Error::MissingArgument { command: command.opcode.clone(), which: "an index" })?;

        let mut prep = match segment {
            "constant" => vec![format!("@{value}"), "D=A".to_string()],
            "argument" | "local" | "this" | "that" => {
                let register = segment_register(segment).expect("matched above");
                vec![
                    format!("@{register}"),
                    "D=M".to_string(),
                    format!("@{value}"),
                    "A=D+A".to_string(),
                    "D=M".to_string(),
                ]
            }
            "pointer" => vec![format!("@{}", if value == 0 { "THIS" } else { "THAT" }), "D=M".to_string()],
            "temp" => vec![format!("@{}", 5 + value), "D=M".to_string()],
            "static" => vec![format!("@{}.{value}", command.origin), "D=M".to_string()],
            other => return Err(Error::InvalidArgument { value: other.to_string() }),
        };

        prep.extend([
            "@SP".to_string(),
            "A=M".to_string(),
            "M=D".to_string(),
            "@SP".to_string(),
            "M=M+1".to_string(),
        ]);
        Ok(prep)
    }

    fn pop(&self, command: &VmCommand) -> Result<Vec<String>, Error> {
        let segment = command
            .arg1
            .as_deref()
            .ok_or_else(|| Error::MissingArgument { command: command.opcode.clone(), which: "a segment" })?;
        let value = command
            .arg2
            .ok_or_else(|| Error::MissingArgument { command: command.opcode.clone(), which: "an index" })?;

        let mut prep = match segment {
            "argument" | "local" | "this" | "that" => {
                let register = segment_register(segment).expect("matched above");
                vec![format!("@{register}"), "D=M".to_string(), format!("@{value}"), "D=D+A".to_string()]
            }
            "pointer" => vec![format!("@{}", if value == 0 { "THIS" } else { "THAT" }), "D=A".to_string()],
            "temp" => vec![format!("@{}", 5 + value), "D=A".to_string()],
            "static" => vec![format!("@{}.{value}", command.origin), "D=A".to_string()],
            other => return Err(Error::InvalidArgument { value: other.to_string() }),
        };

        prep.extend([
            "@R13".to_string(),
            "M=D".to_string(),
            "@SP".to_string(),
            "M=M-1".to_string(),
            "A=M".to_string(),
            "D=M".to_string(),
            "@R13".to_string(),
            "A=M".to_string(),
            "M=D".to_string(),
        ]);
        Ok(prep)
    }

    fn arithmetic(&mut self, command: &VmCommand) -> Result<Vec<String>, Error> {
        let lines = match command.opcode.as_str() {
            "neg" => vec!["@SP", "A=M-1", "M=-M"],
            "not" => vec!["@SP", "A=M-1", "M=!M"],
            "add" => vec!["@SP", "AM=M-1", "D=M", "A=A-1", "M=D+M"],
            "sub" => vec!["@SP", "AM=M-1", "D=M", "A=A-1", "M=M-D"],
            "and" => vec!["@SP", "AM=M-1", "D=M", "A=A-1", "M=D&M"],
            "or" => vec!["@SP", "AM=M-1", "D=M", "A=A-1", "M=D|M"],
            "eq" | "gt" | "lt" => return Ok(self.compare(command)),
            other => return Err(Error::UnknownCommand { command: other.to_string() }),
        };
        Ok(lines.into_iter().map(str::to_string).collect())
    }

    fn compare(&mut self, command: &VmCommand) -> Vec<String> {
        self.label_count_cmp += 1;
        let n = self.label_count_cmp;
        let jump = command.opcode.to_uppercase();
        vec![
            "@SP".to_string(),
            "AM=M-1".to_string(),
            "D=M".to_string(),
            "A=A-1".to_string(),
            "D=M-D".to_string(),
            format!("@CMP{n}_TRUE"),
            format!("D;J{jump}"),
            "@SP".to_string(),
            "A=M-1".to_string(),
            "M=0".to_string(),
            format!("@CMP{n}_END"),
            "0;JMP".to_string(),
            format!("(CMP{n}_TRUE)"),
            "@SP".to_string(),
            "A=M-1".to_string(),
            "M=-1".to_string(),
            format!("(CMP{n}_END)"),
        ]
    }

    fn branching(&self, command: &VmCommand) -> Vec<String> {
        let label = command.arg1.as_deref().unwrap_or_default();
        match command.opcode.as_str() {
            "label" => vec![format!("({label})")],
            "goto" => vec![format!("@{label}"), "0;JMP".to_string()],
            "if-goto" => vec!["@SP".to_string(), "AM=M-1".to_string(), "D=M".to_string(), format!("@{label}"), "D;JNE".to_string()],
            _ => unreachable!("CommandKind::Branching only covers these three opcodes"),
        }
    }

    fn push_d(&self) -> Vec<String> {
        ["@SP", "A=M", "M=D", "@SP", "M=M+1"].into_iter().map(str::to_string).collect()
    }

    fn function(&mut self, command: &VmCommand) -> Result<Vec<String>, Error> {
        match command.opcode.as_str() {
            "function" => {
                let name = command
                    .arg1
                    .as_deref()
                    .ok_or_else(|| Error::MissingArgument { command: command.opcode.clone(), which: "a name" })?;
                let n_locals = command
                    .arg2
                    .ok_or_else(|| Error::MissingArgument { command: command.opcode.clone(), which: "a local count" })?;
                let mut code = vec![format!("({name})")];
                for _ in 0..n_locals {
                    code.extend(["@SP", "A=M", "M=0", "@SP", "M=M+1"].map(str::to_string));
                }
                Ok(code)
            }
            "call" => self.call(command),
            "return" => Ok(self.ret()),
            other => Err(Error::UnknownCommand { command: other.to_string() }),
        }
    }

    fn call(&mut self, command: &VmCommand) -> Result<Vec<String>, Error> {
        let name = command
            .arg1
            .as_deref()
            .ok_or_else(|| Error::MissingArgument { command: command.opcode.clone(), which: "a name" })?;
        let n_args = command
            .arg2
            .ok_or_else(|| Error::MissingArgument { command: command.opcode.clone(), which: "an argument count" })?;
        self.label_count_ret_addr += 1;
        let ret_label = format!("RETADDR_{}", self.label_count_ret_addr);

        let mut code = vec![format!("@{ret_label}"), "D=A".to_string()];
        code.extend(self.push_d());
        for reg in ["LCL", "ARG", "THIS", "THAT"] {
            code.push(format!("@{reg}"));
            code.push("D=M".to_string());
            code.extend(self.push_d());
        }
        code.extend([
            "@SP".to_string(),
            "D=M".to_string(),
            "@5".to_string(),
            "D=D-A".to_string(),
            format!("@{n_args}"),
            "D=D-A".to_string(),
            "@ARG".to_string(),
            "M=D".to_string(),
            "@SP".to_string(),
            "D=M".to_string(),
            "@LCL".to_string(),
            "M=D".to_string(),
            format!("@{name}"),
            "0;JMP".to_string(),
            format!("({ret_label})"),
        ]);
        Ok(code)
    }

    fn ret(&self) -> Vec<String> {
        vec![
            "@LCL".to_string(),
            "D=M".to_string(),
            "@endFrame".to_string(),
            "M=D".to_string(),
            "@5".to_string(),
            "A=D-A".to_string(),
            "D=M".to_string(),
            "@returnAddress".to_string(),
            "M=D".to_string(),
            "@SP".to_string(),
            "A=M-1".to_string(),
            "D=M".to_string(),
            "@ARG".to_string(),
            "A=M".to_string(),
            "M=D".to_string(),
            "@ARG".to_string(),
            "D=M+1".to_string(),
            "@SP".to_string(),
            "M=D".to_string(),
            "@endFrame".to_string(),
            "AM=M-1".to_string(),
            "D=M".to_string(),
            "@THAT".to_string(),
            "M=D".to_string(),
            "@endFrame".to_string(),
            "AM=M-1".to_string(),
            "D=M".to_string(),
            "@THIS".to_string(),
            "M=D".to_string(),
            "@endFrame".to_string(),
            "AM=M-1".to_string(),
            "D=M".to_string(),
            "@ARG".to_string(),
            "M=D".to_string(),
            "@endFrame".to_string(),
            "AM=M-1".to_string(),
            "D=M".to_string(),
            "@LCL".to_string(),
            "M=D".to_string(),
            "@returnAddress".to_string(),
            "A=M".to_string(),
            "0;JMP".to_string(),
        ]
    }

    /// `SP := 256; call Sys.init 0`, prepended once per translation run
    pub fn bootstrap(&mut self) -> Vec<String> {
        let mut code = vec![
            "// bootstrap".to_string(),
            "@256".to_string(),
            "D=A".to_string(),
            "@SP".to_string(),
            "M=D".to_string(),
        ];
        let call = VmCommand::new("call", Some("Sys.init"), Some(0), "").expect("well-formed call");
        code.extend(self.call(&call).expect("well-formed call"));
        code
    }
}

impl Default for CodeWriter {
    fn default() -> CodeWriter {
        CodeWriter::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(line: &str, origin: &str) -> VmCommand {
        VmCommand::from_line(line, origin).unwrap()
    }

    #[test]
    fn push_constant_loads_immediate() {
        let mut cw = CodeWriter::new();
        let code = cw.write(&cmd("push constant 7", "Foo")).unwrap();
        assert_eq!(code, vec!["// push constant 7", "@7", "D=A", "@SP", "A=M", "M=D", "@SP", "M=M+1"]);
    }

    #[test]
    fn static_segment_is_qualified_per_file() {
        let mut cw = CodeWriter::new();
        let code_a = cw.write(&cmd("push static 0", "A")).unwrap();
        let code_b = cw.write(&cmd("push static 0", "B")).unwrap();
        assert!(code_a.iter().any(|l| l == "@A.0"));
        assert!(code_b.iter().any(|l| l == "@B.0"));
    }

    #[test]
    fn comparison_labels_are_unique_across_calls() {
        let mut cw = CodeWriter::new();
        let first = cw.write(&cmd("eq", "Foo")).unwrap();
        let second = cw.write(&cmd("eq", "Foo")).unwrap();
        assert!(first.iter().any(|l| l == "(CMP1_TRUE)"));
        assert!(second.iter().any(|l| l == "(CMP2_TRUE)"));
    }

    #[test]
    fn call_return_labels_are_globally_monotonic() {
        let mut cw = CodeWriter::new();
        let first = cw.write(&cmd("call Foo.bar 0", "Foo")).unwrap();
        let second = cw.write(&cmd("call Foo.baz 1", "Foo")).unwrap();
        assert!(first.iter().any(|l| l == "(RETADDR_1)"));
        assert!(second.iter().any(|l| l == "(RETADDR_2)"));
    }

    #[test]
    fn unknown_segment_is_an_invalid_argument() {
        let mut cw = CodeWriter::new();
        assert!(matches!(
            cw.write(&cmd("push bogus 0", "Foo")).unwrap_err(),
            Error::InvalidArgument { .. }
        ));
    }

    #[test]
    fn bootstrap_sets_sp_then_calls_sys_init() {
        let mut cw = CodeWriter::new();
        let code = cw.bootstrap();
        assert_eq!(&code[1..5], &["@256", "D=A", "@SP", "M=D"]);
        assert!(code.iter().any(|l| l == "@Sys.init"));
    }
}
