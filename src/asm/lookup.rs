//! `comp`/`jump`/predefined-symbol lookup tables for the Hack instruction set

use std::collections::HashMap;
use std::sync::OnceLock;

/// `comp` mnemonic -> its 6-bit `c1..c6` encoding. The `a` bit is not stored
/// here: `Instruction::c_from_symbol` sets it to 1 iff the mnemonic text
/// mentions `M`, which is why `M`-variants share their `A`-variant's 6-bit
/// pattern below.
pub fn comp_table() -> &'static HashMap<&'static str, u8> {
    static TABLE: OnceLock<HashMap<&'static str, u8>> = OnceLock::new();
    TABLE.get_or_init(|| {
        HashMap::from([
            ("0", 0b101010),
            ("1", 0b111111),
            ("-1", 0b111010),
            ("D", 0b001100),
            ("A", 0b110000),
            ("!D", 0b001101),
            ("!A", 0b110001),
            ("-D", 0b001111),
            ("-A", 0b110011),
            ("D+1", 0b011111),
            ("A+1", 0b110111),
            ("D-1", 0b001110),
            ("A-1", 0b110010),
            ("D+A", 0b000010),
            ("D-A", 0b010011),
            ("A-D", 0b000111),
            ("D&A", 0b000000),
            ("D|A", 0b010101),
            ("M", 0b110000),
            ("!M", 0b110001),
            ("-M", 0b110011),
            ("M+1", 0b110111),
            ("M-1", 0b110010),
            ("D+M", 0b000010),
            ("D-M", 0b010011),
            ("M-D", 0b000111),
            ("D&M", 0b000000),
            ("D|M", 0b010101),
        ])
    })
}

/// `jump` mnemonic -> its 3-bit code
pub fn jump_table() -> &'static HashMap<&'static str, u8> {
    static TABLE: OnceLock<HashMap<&'static str, u8>> = OnceLock::new();
    TABLE.get_or_init(|| {
        HashMap::from([
            ("JGT", 0b001),
            ("JEQ", 0b010),
            ("JGE", 0b011),
            ("JLT", 0b100),
            ("JNE", 0b101),
            ("JLE", 0b110),
            ("JMP", 0b111),
        ])
    })
}

/// Predefined symbol -> RAM address
pub fn predefined_symbols() -> &'static HashMap<String, u16> {
    static TABLE: OnceLock<HashMap<String, u16>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table: HashMap<String, u16> = [
            ("SP", 0),
            ("LCL", 1),
            ("ARG", 2),
            ("THIS", 3),
            ("THAT", 4),
            ("SCREEN", 0x4000),
            ("KBD", 0x6000),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        for i in 0..16u16 {
            table.insert(format!("R{i}"), i);
        }
        table
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn m_variants_share_their_a_variants_bit_pattern() {
        let comp = comp_table();
        assert_eq!(comp["A"], comp["M"]);
        assert_eq!(comp["D+A"], comp["D+M"]);
    }

    #[test]
    fn predefined_symbols_match_the_standard_table() {
        let table = predefined_symbols();
        assert_eq!(table["SP"], 0);
        assert_eq!(table["SCREEN"], 0x4000);
        assert_eq!(table["KBD"], 0x6000);
        assert_eq!(table["R15"], 15);
    }
}
