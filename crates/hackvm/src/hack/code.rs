// Field encodings for Hack instructions.
//
// C-instruction layout: 111a cccc ccdd djjj
// A-instruction layout: 0vvv vvvv vvvv vvvv

use crate::error::Field;
use crate::{Error, Result};

/// Destination bits `d1 d2 d3` (A, D, M). Any ordering of the letters is accepted.
pub fn dest_field(mnemonic: &str) -> Result<&'static str> {
    Ok(match mnemonic {
        "" => "000",
        "M" => "001",
        "D" => "010",
        "MD" | "DM" => "011",
        "A" => "100",
        "AM" | "MA" => "101",
        "AD" | "DA" => "110",
        "AMD" | "ADM" | "MAD" | "MDA" | "DAM" | "DMA" => "111",
        _ => return Err(unknown(Field::Dest, mnemonic)),
    })
}

/// Computation bits `a c1 c2 c3 c4 c5 c6`.
///
/// `a` selects M instead of A as the ALU's second operand; `c1..c6` are the
/// ALU control bits zx, nx, zy, ny, f, no.
pub fn comp_field(mnemonic: &str) -> Result<&'static str> {
    Ok(match mnemonic {
        "0" => "0101010",
        "1" => "0111111",
        "-1" => "0111010",
        "D" => "0001100",
        "A" => "0110000",
        "!D" => "0001101",
        "!A" => "0110001",
        "-D" => "0001111",
        "-A" => "0110011",
        "D+1" => "0011111",
        "A+1" => "0110111",
        "D-1" => "0001110",
        "A-1" => "0110010",
        "D+A" | "A+D" => "0000010",
        "D-A" => "0010011",
        "A-D" => "0000111",
        "D&A" | "A&D" => "0000000",
        "D|A" | "A|D" => "0010101",
        "M" => "1110000",
        "!M" => "1110001",
        "-M" => "1110011",
        "M+1" => "1110111",
        "M-1" => "1110010",
        "D+M" | "M+D" => "1000010",
        "D-M" => "1010011",
        "M-D" => "1000111",
        "D&M" | "M&D" => "1000000",
        "D|M" | "M|D" => "1010101",
        _ => return Err(unknown(Field::Comp, mnemonic)),
    })
}

/// Jump bits `j1 j2 j3` (out < 0, out = 0, out > 0).
pub fn jump_field(mnemonic: &str) -> Result<&'static str> {
    Ok(match mnemonic {
        "" => "000",
        "JGT" => "001",
        "JEQ" => "010",
        "JGE" => "011",
        "JLT" => "100",
        "JNE" => "101",
        "JLE" => "110",
        "JMP" => "111",
        _ => return Err(unknown(Field::Jump, mnemonic)),
    })
}

/// Zero-padded 16-bit binary of a decimal literal in `0..=65535`.
pub fn literal_field(literal: &str) -> Result<String> {
    let value = parse_literal(literal)?;
    Ok(format!("{value:016b}"))
}

/// Parse a decimal literal as an unsigned 16-bit value.
pub fn parse_literal(literal: &str) -> Result<u16> {
    if literal.is_empty() || !literal.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::LiteralOutOfRange(literal.to_string()));
    }
    literal
        .parse::<u16>()
        .map_err(|_| Error::LiteralOutOfRange(literal.to_string()))
}

fn unknown(field: Field, mnemonic: &str) -> Error {
    Error::UnknownMnemonic {
        field,
        mnemonic: mnemonic.to_string(),
    }
}
