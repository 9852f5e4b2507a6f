//! Textual VM instruction formatter used by the compilation engine

pub type VmCode = Vec<String>;

pub fn write_push(segment: &str, index: i32) -> VmCode {
    vec![format!("push {segment} {index}")]
}

pub fn write_pop(segment: &str, index: i32) -> VmCode {
    vec![format!("pop {segment} {index}")]
}

pub fn write_arithmetic(command: &str) -> VmCode {
    vec![command.to_string()]
}

pub fn write_label(label: &str) -> VmCode {
    vec![format!("label {label}")]
}

pub fn write_goto(label: &str) -> VmCode {
    vec![format!("goto {label}")]
}

pub fn write_if(label: &str) -> VmCode {
    vec![format!("if-goto {label}")]
}

pub fn write_call(name: &str, n_args: i32) -> VmCode {
    vec![format!("call {name} {n_args}")]
}

pub fn write_function(name: &str, n_vars: u16) -> VmCode {
    vec![format!("function {name} {n_vars}")]
}

pub fn write_return() -> VmCode {
    vec!["return".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_match_the_vm_text_contract() {
        assert_eq!(write_push("constant", 0), vec!["push constant 0"]);
        assert_eq!(write_pop("local", 2), vec!["pop local 2"]);
        assert_eq!(write_call("Math.multiply", 2), vec!["call Math.multiply 2"]);
        assert_eq!(write_function("Main.main", 0), vec!["function Main.main 0"]);
        assert_eq!(write_return(), vec!["return"]);
    }
}
