//! A- and C-instruction bit encoding

use super::lookup::{comp_table, jump_table};

/// Failure to encode a pseudo-instruction line into a Hack instruction
#[derive(Debug)]
pub enum Error {
    /// `comp` is not one of the 28 known mnemonics
    UnknownComp { comp: String },
    /// `jump` is not one of the 7 known mnemonics
    UnknownJump { jump: String },
    /// The line didn't match either `@...` or `dest=comp;jump`
    MalformedInstruction { line: String },
    /// An `@N` address did not fit in 15 bits
    AddressOverflow { address: u32 },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownComp { comp } => write!(f, "unknown comp mnemonic: {comp:?}"),
            Error::UnknownJump { jump } => write!(f, "unknown jump mnemonic: {jump:?}"),
            Error::MalformedInstruction { line } => write!(f, "malformed instruction: {line:?}"),
            Error::AddressOverflow { address } => write!(f, "address {address} does not fit in 15 bits"),
        }
    }
}

impl std::error::Error for Error {}

/// A fully resolved Hack instruction (no symbolic labels or variables left)
pub enum Instruction {
    A { address: u16 },
    C { dest: u8, comp: u8, jump: u8 },
}

impl Instruction {
    /// Build an A-instruction from a resolved 15-bit address
    pub fn a(address: u32) -> Result<Instruction, Error> {
        if address > 0x7FFF {
            return Err(Error::AddressOverflow { address });
        }
        Ok(Instruction::A { address: address as u16 })
    }

    /// Parse `[dest=]comp[;jump]` into a C-instruction
    pub fn c_from_symbol(symbol: &str) -> Result<Instruction, Error> {
        let (dest_part, rest) = match symbol.split_once('=') {
            Some((d, r)) => (Some(d), r),
            None => (None, symbol),
        };
        let (comp_part, jump_part) = match rest.split_once(';') {
            Some((c, j)) => (c, Some(j)),
            None => (rest, None),
        };

        let comp_bits = *comp_table()
            .get(comp_part)
            .ok_or_else(|| Error::UnknownComp { comp: comp_part.to_string() })?;
        let a = if comp_part.contains('M') { 1 } else { 0 };

        let dest = dest_part
            .map(|d| {
                (0b100 * d.contains('A') as u8) | (0b010 * d.contains('D') as u8) | (0b001 * d.contains('M') as u8)
            })
            .unwrap_or(0);

        let jump = match jump_part {
            Some(j) => *jump_table().get(j).ok_or_else(|| Error::UnknownJump { jump: j.to_string() })?,
            None => 0,
        };

        Ok(Instruction::C {
            dest,
            comp: comp_bits | (a << 6),
            jump,
        })
    }

    /// 16-character `0`/`1` encoding
    pub fn encode(&self) -> String {
        match self {
            Instruction::A { address } => format!("{:016b}", address),
            Instruction::C { dest, comp, jump } => {
                format!("111{:07b}{:03b}{:03b}", comp, dest, jump)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s6_c_instruction_encoding() {
        let instr = Instruction::c_from_symbol("D=M;JGT").unwrap();
        assert_eq!(instr.encode(), "1111110000010001");
    }

    #[test]
    fn a_instruction_encoding_is_zero_then_15_bit_address() {
        let instr = Instruction::a(16).unwrap();
        assert_eq!(instr.encode(), "0000000000010000");
    }

    #[test]
    fn last_instruction_of_s5_encodes_0_jmp() {
        let instr = Instruction::c_from_symbol("0;JMP").unwrap();
        assert_eq!(instr.encode(), "1110101010000111");
    }

    #[test]
    fn unknown_comp_mnemonic_is_rejected() {
        assert!(matches!(
            Instruction::c_from_symbol("D=Q").unwrap_err(),
            Error::UnknownComp { .. }
        ));
    }

    #[test]
    fn address_must_fit_in_15_bits() {
        assert!(Instruction::a(0x8000).is_err());
        assert!(Instruction::a(0x7FFF).is_ok());
    }
}
