use std::fmt;

use crate::{Error, Result};

use super::instruction::{Address, AsmLine, encode_address};
use super::symbols::SymbolTable;

/// Assembled machine code: one 16-bit word per ROM address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HackProgram {
    words: Vec<u16>,
}

impl HackProgram {
    #[must_use]
    pub fn new(words: Vec<u16>) -> Self {
        Self { words }
    }

    #[must_use]
    pub fn words(&self) -> &[u16] {
        &self.words
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// One 16-character binary line per word.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HackProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for word in &self.words {
            writeln!(f, "{word:016b}")?;
        }
        Ok(())
    }
}

/// Assemble Hack assembly source.
///
/// Pass one parses every line and binds labels to the ROM address of the
/// next instruction. Pass two resolves symbols (allocating variables from
/// RAM 16 in first-use order) and encodes.
pub fn assemble(source: &str) -> Result<HackProgram> {
    let mut symbols = SymbolTable::new();
    let mut lines = Vec::new();
    let mut rom_address: u16 = 0;

    for (line_num, raw) in source.lines().enumerate() {
        let line = clean_line(raw);
        if line.is_empty() {
            continue;
        }
        let parsed = AsmLine::parse(&line).map_err(|e| e.at_line(line_num + 1))?;
        match &parsed {
            AsmLine::Label(name) => symbols
                .define_label(name, rom_address)
                .map_err(|e| e.at_line(line_num + 1))?,
            _ => {
                rom_address = rom_address.checked_add(1).ok_or_else(|| Error::Parse {
                    line: line_num + 1,
                    message: "program does not fit in ROM".to_string(),
                })?;
                lines.push((line_num + 1, parsed));
            }
        }
    }

    let mut words = Vec::with_capacity(lines.len());
    for (line_num, line) in lines {
        let word = match line {
            AsmLine::A(Address::Literal(value)) => encode_address(value),
            AsmLine::A(Address::Symbol(name)) => {
                encode_address(symbols.resolve_or_allocate(&name))
            }
            AsmLine::C { dest, comp, jump } => AsmLine::encode_c(&dest, &comp, &jump),
            AsmLine::Label(_) => continue,
        }
        .map_err(|e| e.at_line(line_num))?;
        words.push(word);
    }

    tracing::debug!(
        words = words.len(),
        variables = symbols.variables(),
        "assembled program"
    );
    Ok(HackProgram::new(words))
}

/// Drop `//` comments and all whitespace.
fn clean_line(raw: &str) -> String {
    let code = raw.split_once("//").map_or(raw, |(code, _)| code);
    code.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: &str = "\
// Computes R2 = max(R0, R1)
   @R0
   D=M              // D = first number
   @R1
   D=D-M            // D = first number - second number
   @OUTPUT_FIRST
   D;JGT            // if D>0 (first is greater) goto output_first
   @R1
   D=M              // D = second number
   @OUTPUT_D
   0;JMP            // goto output_d
(OUTPUT_FIRST)
   @R0
   D=M              // D = first number
(OUTPUT_D)
   @R2
   M=D              // M[2] = D (greatest number)
(INFINITE_LOOP)
   @INFINITE_LOOP
   0;JMP            // infinite loop
";

    #[test]
    fn test_assemble_max() {
        let program = assemble(MAX).unwrap();
        let expected = "\
0000000000000000
1111110000010000
0000000000000001
1111010011010000
0000000000001010
1110001100000001
0000000000000001
1111110000010000
0000000000001100
1110101010000111
0000000000000000
1111110000010000
0000000000000010
1110001100001000
0000000000001110
1110101010000111
";
        assert_eq!(program.to_text(), expected);
    }

    #[test]
    fn test_variables_start_at_16() {
        let program = assemble("@i\nM=1\n@sum\nM=0\n@i\n").unwrap();
        assert_eq!(program.words()[0], 16);
        assert_eq!(program.words()[2], 17);
        assert_eq!(program.words()[4], 16);
    }

    #[test]
    fn test_labels_do_not_occupy_rom() {
        let program = assemble("(A)\n(B)\n@B\n0;JMP\n").unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program.words()[0], 0);
    }

    #[test]
    fn test_errors_report_source_line() {
        let err = assemble("@1\n\nD=Q\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }), "{err}");

        let err = assemble("(X)\n@1\n(X)\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, ref message } if message.contains("X")));

        let err = assemble("@40000\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }
}
