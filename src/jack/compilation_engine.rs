//! Single recursive-descent pass that both parses and emits VM code directly.
//!
//! There is no intermediate AST: each grammar rule below both consumes
//! tokens and appends VM instructions to the code it returns, following the
//! standard Jack BNF one rule at a time.

use std::collections::HashMap;

use super::error::{expect, Error};
use super::symbol_table::{SymbolKind, SymbolTable};
use super::token::{Token, TokenStream, TokenType};
use super::vm_writer as vm;
use super::vm_writer::VmCode;

const BUILT_IN_TYPES: [&str; 3] = ["int", "char", "boolean"];

/// Compile a full Jack `class { ... }` unit already split into tokens
pub fn compile_class(mut tokens: TokenStream) -> Result<VmCode, Error> {
    let current = tokens
        .current()
        .cloned()
        .ok_or_else(|| Error::unexpected_end("class"))?;
    if !current.is(TokenType::Keyword, "class") {
        return Err(Error::unexpected_token("class", current));
    }
    let mut engine = CompilationEngine::new(tokens);
    engine.class()
}

struct CompilationEngine {
    tokens: TokenStream,
    class_name: String,
    class_table: SymbolTable,
    subroutine_table: SymbolTable,
    label_counters: HashMap<String, u32>,
}

impl CompilationEngine {
    fn new(tokens: TokenStream) -> CompilationEngine {
        CompilationEngine {
            tokens,
            class_name: String::new(),
            class_table: SymbolTable::new(),
            subroutine_table: SymbolTable::new(),
            label_counters: HashMap::new(),
        }
    }

    /// Consume the current token, requiring it to match `kind`/`values`
    fn expect(&mut self, kind: TokenType, values: &[&str]) -> Result<Token, Error> {
        expect(kind, values.iter().copied(), self.tokens.current())?;
        Ok(self.tokens.pop_current().expect("validated by expect() above"))
    }

    fn expect_one(&mut self, kind: TokenType, value: &str) -> Result<Token, Error> {
        self.expect(kind, &[value])
    }

    fn current_is(&self, kind: TokenType, value: &str) -> bool {
        self.tokens.current().map(|t| t.is(kind, value)).unwrap_or(false)
    }

    fn next_label(&mut self, name: &str) -> String {
        let counter = self.label_counters.entry(name.to_string()).or_insert(0);
        let current = *counter;
        *counter += 1;
        format!("{}_{current}", name.to_uppercase())
    }

    /// Find the table (subroutine first, then class) holding `name`
    fn table_for(&self, name: &str) -> Result<&SymbolTable, Error> {
        if self.subroutine_table.contains(name) {
            Ok(&self.subroutine_table)
        } else if self.class_table.contains(name) {
            Ok(&self.class_table)
        } else {
            Err(Error::UndeclaredSymbol { name: name.to_string() })
        }
    }

    fn class(&mut self) -> Result<VmCode, Error> {
        let mut code = Vec::new();
        self.expect_one(TokenType::Keyword, "class")?;
        self.class_name = self.expect(TokenType::Identifier, &[])?.value().to_string();
        self.expect_one(TokenType::Symbol, "{")?;

        while self.current_is(TokenType::Keyword, "static") || self.current_is(TokenType::Keyword, "field") {
            self.class_var_dec()?;
        }
        while self.current_is(TokenType::Keyword, "constructor")
            || self.current_is(TokenType::Keyword, "function")
            || self.current_is(TokenType::Keyword, "method")
        {
            code.extend(self.subroutine_dec()?);
        }
        self.expect_one(TokenType::Symbol, "}")?;
        Ok(code)
    }

    fn class_var_dec(&mut self) -> Result<(), Error> {
        let keyword = self.expect(TokenType::Keyword, &["static", "field"])?;
        let kind = match keyword.value() {
            "static" => SymbolKind::Static,
            "field" => SymbolKind::Field,
            _ => unreachable!("expect() restricted this to static|field"),
        };
        let declared_type = self.variable_type(false)?.value().to_string();
        let name = self.expect(TokenType::Identifier, &[])?.value().to_string();
        self.class_table.define(&name, &declared_type, kind);

        while self.current_is(TokenType::Symbol, ",") {
            self.expect_one(TokenType::Symbol, ",")?;
            let name = self.expect(TokenType::Identifier, &[])?.value().to_string();
            self.class_table.define(&name, &declared_type, kind);
        }
        self.expect_one(TokenType::Symbol, ";")?;
        Ok(())
    }

    /// A built-in type keyword, or an identifier naming a class type
    fn variable_type(&mut self, include_void: bool) -> Result<Token, Error> {
        let current = self
            .tokens
            .current()
            .ok_or_else(|| Error::unexpected_end("a type"))?;
        if current.kind() == TokenType::Keyword {
            let allowed: Vec<&str> = if include_void {
                BUILT_IN_TYPES.iter().copied().chain(["void"]).collect()
            } else {
                BUILT_IN_TYPES.to_vec()
            };
            if allowed.contains(&current.value()) {
                return self.expect(TokenType::Keyword, &allowed);
            }
        }
        self.expect(TokenType::Identifier, &[])
    }

    fn parameter_list(&mut self) -> Result<(), Error> {
        self.expect_one(TokenType::Symbol, "(")?;
        loop {
            let is_type = match self.tokens.current() {
                Some(t) if t.kind() == TokenType::Keyword => BUILT_IN_TYPES.contains(&t.value()),
                Some(t) => t.kind() == TokenType::Identifier,
                None => false,
            };
            if !is_type {
                break;
            }
            let declared_type = self.variable_type(false)?.value().to_string();
            let name = self.expect(TokenType::Identifier, &[])?.value().to_string();
            self.subroutine_table.define(&name, &declared_type, SymbolKind::Arg);
            if self.current_is(TokenType::Symbol, ",") {
                self.expect_one(TokenType::Symbol, ",")?;
            } else {
                break;
            }
        }
        self.expect_one(TokenType::Symbol, ")")?;
        Ok(())
    }

    fn subroutine_dec(&mut self) -> Result<VmCode, Error> {
        self.subroutine_table = SymbolTable::new();
        let subroutine_kind = self
            .expect(TokenType::Keyword, &["constructor", "function", "method"])?
            .value()
            .to_string();
        let return_type = self.variable_type(true)?.value().to_string();
        let name = self.expect(TokenType::Identifier, &[])?.value().to_string();

        if subroutine_kind == "method" {
            self.subroutine_table.define("this", &self.class_name.clone(), SymbolKind::Arg);
        }
        self.parameter_list()?;
        let body = self.subroutine_body()?;
        let n_locals = self.subroutine_table.count(SymbolKind::Var);

        let mut code = Vec::new();
        let full_name = format!("{}.{name}", self.class_name);
        match subroutine_kind.as_str() {
            "constructor" => {
                code.extend(vm::write_function(&full_name, n_locals));
                code.extend(vm::write_push("constant", self.class_table.count(SymbolKind::Field) as i32));
                code.extend(vm::write_call("Memory.alloc", 1));
                code.extend(vm::write_pop("pointer", 0));
            }
            "method" => {
                code.extend(vm::write_function(&full_name, n_locals));
                code.extend(vm::write_push("argument", 0));
                code.extend(vm::write_pop("pointer", 0));
            }
            _ => code.extend(vm::write_function(&full_name, n_locals)),
        }

        code.extend(body);
        if return_type == "void" {
            code.extend(vm::write_push("constant", 0));
        }
        code.extend(vm::write_return());
        Ok(code)
    }

    fn var_dec(&mut self) -> Result<(), Error> {
        self.expect_one(TokenType::Keyword, "var")?;
        let declared_type = self.variable_type(false)?.value().to_string();
        let name = self.expect(TokenType::Identifier, &[])?.value().to_string();
        self.subroutine_table.define(&name, &declared_type, SymbolKind::Var);
        while self.current_is(TokenType::Symbol, ",") {
            self.expect_one(TokenType::Symbol, ",")?;
            let name = self.expect(TokenType::Identifier, &[])?.value().to_string();
            self.subroutine_table.define(&name, &declared_type, SymbolKind::Var);
        }
        self.expect_one(TokenType::Symbol, ";")?;
        Ok(())
    }

    fn subroutine_body(&mut self) -> Result<VmCode, Error> {
        let mut code = Vec::new();
        self.expect_one(TokenType::Symbol, "{")?;
        while self.current_is(TokenType::Keyword, "var") {
            self.var_dec()?;
        }
        code.extend(self.statements()?);
        self.expect_one(TokenType::Symbol, "}")?;
        Ok(code)
    }

    fn statements(&mut self) -> Result<VmCode, Error> {
        let mut code = Vec::new();
        loop {
            let keyword = match self.tokens.current() {
                Some(t) if t.kind() == TokenType::Keyword => t.value().to_string(),
                _ => break,
            };
            match keyword.as_str() {
                "let" => code.extend(self.let_statement()?),
                "if" => code.extend(self.if_statement()?),
                "while" => code.extend(self.while_statement()?),
                "do" => code.extend(self.do_statement()?),
                "return" => code.extend(self.return_statement()?),
                _ => break,
            }
        }
        Ok(code)
    }

    fn let_statement(&mut self) -> Result<VmCode, Error> {
        let mut code = Vec::new();
        self.expect_one(TokenType::Keyword, "let")?;

        let is_array = self.tokens.next().map(|t| t.is(TokenType::Symbol, "[")).unwrap_or(false);
        if is_array {
            code.extend(self.array_address()?);
            self.expect_one(TokenType::Symbol, "=")?;
            code.extend(self.expression()?);
            code.extend(vm::write_pop("temp", 0));
            code.extend(vm::write_pop("pointer", 1));
            code.extend(vm::write_push("temp", 0));
            code.extend(vm::write_pop("that", 0));
        } else {
            let name = self.expect(TokenType::Identifier, &[])?.value().to_string();
            self.expect_one(TokenType::Symbol, "=")?;
            code.extend(self.expression()?);
            let table = self.table_for(&name)?;
            let segment = table.segment(&name).expect("just resolved by table_for");
            let index = table.index(&name).expect("just resolved by table_for");
            code.extend(vm::write_pop(segment, index as i32));
        }
        self.expect_one(TokenType::Symbol, ";")?;
        Ok(code)
    }

    fn if_statement(&mut self) -> Result<VmCode, Error> {
        let label_else = self.next_label("if");
        let label_end = self.next_label("if");

        let mut code = Vec::new();
        self.expect_one(TokenType::Keyword, "if")?;
        self.expect_one(TokenType::Symbol, "(")?;
        code.extend(self.expression()?);
        code.extend(vm::write_arithmetic("not"));
        code.extend(vm::write_if(&label_else));
        self.expect_one(TokenType::Symbol, ")")?;
        self.expect_one(TokenType::Symbol, "{")?;
        code.extend(self.statements()?);
        code.extend(vm::write_goto(&label_end));
        self.expect_one(TokenType::Symbol, "}")?;
        code.extend(vm::write_label(&label_else));
        if self.current_is(TokenType::Keyword, "else") {
            self.expect_one(TokenType::Keyword, "else")?;
            self.expect_one(TokenType::Symbol, "{")?;
            code.extend(self.statements()?);
            self.expect_one(TokenType::Symbol, "}")?;
        }
        code.extend(vm::write_label(&label_end));
        Ok(code)
    }

    fn while_statement(&mut self) -> Result<VmCode, Error> {
        let label_top = self.next_label("while");
        let label_end = self.next_label("while");

        let mut code = Vec::new();
        self.expect_one(TokenType::Keyword, "while")?;
        code.extend(vm::write_label(&label_top));
        self.expect_one(TokenType::Symbol, "(")?;
        code.extend(self.expression()?);
        code.extend(vm::write_arithmetic("not"));
        self.expect_one(TokenType::Symbol, ")")?;
        self.expect_one(TokenType::Symbol, "{")?;
        code.extend(vm::write_if(&label_end));
        code.extend(self.statements()?);
        code.extend(vm::write_goto(&label_top));
        code.extend(vm::write_label(&label_end));
        self.expect_one(TokenType::Symbol, "}")?;
        Ok(code)
    }

    fn do_statement(&mut self) -> Result<VmCode, Error> {
        let mut code = Vec::new();
        self.expect_one(TokenType::Keyword, "do")?;
        code.extend(self.subroutine_call()?);
        self.expect_one(TokenType::Symbol, ";")?;
        code.extend(vm::write_pop("temp", 0));
        Ok(code)
    }

    fn return_statement(&mut self) -> Result<VmCode, Error> {
        let mut code = Vec::new();
        self.expect_one(TokenType::Keyword, "return")?;
        if !self.current_is(TokenType::Symbol, ";") {
            code.extend(self.expression()?);
        }
        self.expect_one(TokenType::Symbol, ";")?;
        Ok(code)
    }

    fn subroutine_call(&mut self) -> Result<VmCode, Error> {
        let mut code = Vec::new();
        let mut n_args = 0i32;
        let base = self.expect(TokenType::Identifier, &[])?.value().to_string();

        let (target, fn_name) = if !self.current_is(TokenType::Symbol, ".") {
            // unqualified call: own method
            n_args += 1;
            code.extend(vm::write_push("pointer", 0));
            (self.class_name.clone(), base)
        } else if self.subroutine_table.contains(&base) || self.class_table.contains(&base) {
            // `variable.method(...)`: instance method dispatch on declared type
            self.expect_one(TokenType::Symbol, ".")?;
            let fn_name = self.expect(TokenType::Identifier, &[])?.value().to_string();
            let table = self.table_for(&base)?;
            let segment = table.segment(&base).expect("just resolved");
            let index = table.index(&base).expect("just resolved");
            let declared_type = table.declared_type(&base).expect("just resolved").to_string();
            n_args += 1;
            code.extend(vm::write_push(segment, index as i32));
            (declared_type, fn_name)
        } else {
            // `Class.function(...)`: static call or constructor
            self.expect_one(TokenType::Symbol, ".")?;
            let fn_name = self.expect(TokenType::Identifier, &[])?.value().to_string();
            (base, fn_name)
        };

        let expressions = self.expression_list()?;
        n_args += expressions.len() as i32;
        for expression in expressions {
            code.extend(expression);
        }

        code.extend(vm::write_call(&format!("{target}.{fn_name}"), n_args));
        Ok(code)
    }

    fn expression(&mut self) -> Result<VmCode, Error> {
        const OPS: [&str; 9] = ["+", "-", "*", "/", "&", "|", "<", ">", "="];
        let mut code = self.term()?;
        while let Some(current) = self.tokens.current() {
            if current.kind() != TokenType::Symbol || !OPS.contains(&current.value()) {
                break;
            }
            let op = self.tokens.pop_current().expect("peeked above").value().to_string();
            code.extend(self.term()?);
            code.extend(match op.as_str() {
                "+" => vm::write_arithmetic("add"),
                "-" => vm::write_arithmetic("sub"),
                "*" => vm::write_call("Math.multiply", 2),
                "/" => vm::write_call("Math.divide", 2),
                "&" => vm::write_arithmetic("and"),
                "|" => vm::write_arithmetic("or"),
                "<" => vm::write_arithmetic("lt"),
                ">" => vm::write_arithmetic("gt"),
                "=" => vm::write_arithmetic("eq"),
                _ => unreachable!("OPS only contains the operators handled above"),
            });
        }
        Ok(code)
    }

    fn term(&mut self) -> Result<VmCode, Error> {
        let mut code = Vec::new();
        let current = self
            .tokens
            .current()
            .cloned()
            .ok_or_else(|| Error::unexpected_end("a term"))?;

        match current.kind() {
            TokenType::IntegerConstant => {
                self.tokens.pop_current();
                code.extend(vm::write_push("constant", current.value().parse().expect("validated integer token")));
            }
            TokenType::StringConstant => {
                self.tokens.pop_current();
                let string = current.value();
                code.extend(vm::write_push("constant", string.len() as i32));
                code.extend(vm::write_call("String.new", 1));
                for ch in string.chars() {
                    code.extend(vm::write_push("constant", ch as i32));
                    code.extend(vm::write_call("String.appendChar", 2));
                }
            }
            TokenType::Keyword => {
                self.tokens.pop_current();
                match current.value() {
                    "true" => {
                        code.extend(vm::write_push("constant", 1));
                        code.extend(vm::write_arithmetic("neg"));
                    }
                    "false" | "null" => code.extend(vm::write_push("constant", 0)),
                    "this" => code.extend(vm::write_push("pointer", 0)),
                    other => return Err(Error::unexpected_token("a keyword constant", Token::new(TokenType::Keyword, other).unwrap())),
                }
            }
            TokenType::Identifier => match self.tokens.next() {
                Some(t) if t.is(TokenType::Symbol, "[") => {
                    code.extend(self.array_address()?);
                    code.extend(vm::write_pop("pointer", 1));
                    code.extend(vm::write_push("that", 0));
                }
                Some(t) if t.is(TokenType::Symbol, "(") || t.is(TokenType::Symbol, ".") => {
                    code.extend(self.subroutine_call()?);
                }
                _ => {
                    let name = self.tokens.pop_current().expect("peeked above").value().to_string();
                    let table = self.table_for(&name)?;
                    let segment = table.segment(&name).expect("just resolved");
                    let index = table.index(&name).expect("just resolved");
                    code.extend(vm::write_push(segment, index as i32));
                }
            },
            TokenType::Symbol if current.value() == "(" => {
                self.tokens.pop_current();
                code.extend(self.expression()?);
                self.expect_one(TokenType::Symbol, ")")?;
            }
            TokenType::Symbol if current.value() == "-" => {
                self.tokens.pop_current();
                code.extend(self.term()?);
                code.extend(vm::write_arithmetic("neg"));
            }
            TokenType::Symbol if current.value() == "~" => {
                self.tokens.pop_current();
                code.extend(self.term()?);
                code.extend(vm::write_arithmetic("not"));
            }
            _ => return Err(Error::unexpected_token("a term", current)),
        }
        Ok(code)
    }

    /// Push `base + index` for `name[expr]`, leaving the address on the stack
    fn array_address(&mut self) -> Result<VmCode, Error> {
        let mut code = Vec::new();
        let name = self.expect(TokenType::Identifier, &[])?.value().to_string();
        let table = self.table_for(&name)?;
        let segment = table.segment(&name).expect("just resolved");
        let index = table.index(&name).expect("just resolved");
        code.extend(vm::write_push(segment, index as i32));

        self.expect_one(TokenType::Symbol, "[")?;
        code.extend(self.expression()?);
        self.expect_one(TokenType::Symbol, "]")?;
        code.extend(vm::write_arithmetic("add"));
        Ok(code)
    }

    fn expression_list(&mut self) -> Result<Vec<VmCode>, Error> {
        self.expect_one(TokenType::Symbol, "(")?;
        let mut expressions = Vec::new();
        if !self.current_is(TokenType::Symbol, ")") {
            expressions.push(self.expression()?);
            while self.current_is(TokenType::Symbol, ",") {
                self.expect_one(TokenType::Symbol, ",")?;
                expressions.push(self.expression()?);
            }
        }
        self.expect_one(TokenType::Symbol, ")")?;
        Ok(expressions)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tokenizer::tokenize;
    use super::*;

    fn compile(source: &str) -> VmCode {
        let tokens = TokenStream::new(tokenize(source).unwrap());
        compile_class(tokens).unwrap()
    }

    #[test]
    fn s1_minimal_class() {
        let code = compile("class Main { function void main() { return; } }");
        assert_eq!(code, vec!["function Main.main 0", "push constant 0", "return"]);
    }

    #[test]
    fn s2_constructor_and_field() {
        let source = "class Point { \
            field int x, y; \
            constructor Point new(int ax, int ay) { \
                let x = ax; \
                let y = ay; \
                return this; \
            } \
        }";
        let code = compile(source);
        assert_eq!(
            code,
            vec![
                "function Point.new 0",
                "push constant 2",
                "call Memory.alloc 1",
                "pop pointer 0",
                "push argument 0",
                "pop this 0",
                "push argument 1",
                "pop this 1",
                "push pointer 0",
                "return",
            ]
        );
    }

    #[test]
    fn s3_expression_has_no_precedence() {
        let source = "class Main { function void main() { var int x; let x = 1 + 2 * 3; return; } }";
        let code = compile(source);
        assert_eq!(
            code,
            vec![
                "function Main.main 0",
                "push constant 1",
                "push constant 2",
                "add",
                "push constant 3",
                "call Math.multiply 2",
                "pop local 0",
                "push constant 0",
                "return",
            ]
        );
    }

    #[test]
    fn s4_two_ifs_yield_distinct_label_families() {
        let source = "class Main { \
            function void main() { \
                var int x; \
                if (true) { let x = 1; } \
                if (true) { let x = 2; } \
                return; \
            } \
        }";
        let code = compile(source);
        let labels: Vec<&String> = code.iter().filter(|l| l.starts_with("label ") || l.contains("goto")).collect();
        assert!(labels.iter().any(|l| l.contains("IF_0")));
        assert!(labels.iter().any(|l| l.contains("IF_2")));
    }

    #[test]
    fn method_call_injects_this_and_dispatches_on_declared_type() {
        let source = "class Main { \
            function void main() { \
                var Point p; \
                do p.move(1, 2); \
                return; \
            } \
        }";
        let code = compile(source);
        assert!(code.contains(&"push local 0".to_string()));
        assert!(code.contains(&"call Point.move 3".to_string()));
    }

    #[test]
    fn void_return_is_followed_by_push_constant_0() {
        let code = compile("class Main { function void main() { return; } }");
        assert_eq!(code[code.len() - 2], "push constant 0");
    }

    #[test]
    fn string_literal_builds_via_string_new_and_append_char() {
        let code = compile(r#"class Main { function void main() { do Output.printString("Hi"); return; } }"#);
        assert!(code.contains(&"push constant 2".to_string()));
        assert!(code.contains(&"call String.new 1".to_string()));
        assert!(code.contains(&"call String.appendChar 2".to_string()));
    }

    #[test]
    fn undeclared_identifier_is_a_symbol_error() {
        let tokens = TokenStream::new(
            tokenize("class Main { function void main() { let x = 1; return; } }").unwrap(),
        );
        let err = compile_class(tokens).unwrap_err();
        assert!(matches!(err, Error::UndeclaredSymbol { .. }));
    }
}
