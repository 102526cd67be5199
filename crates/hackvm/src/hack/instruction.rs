use std::fmt;

use crate::{Error, Result};

use super::code;

/// Operand of an A-instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Literal(u16),
    Symbol(String),
}

/// One line of Hack assembly, already stripped of comments and whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmLine {
    /// `@value`
    A(Address),
    /// `dest=comp;jump`, with `dest` and `jump` possibly empty.
    C {
        dest: String,
        comp: String,
        jump: String,
    },
    /// `(NAME)`
    Label(String),
}

impl AsmLine {
    pub fn parse(line: &str) -> Result<Self> {
        if let Some(value) = line.strip_prefix('@') {
            return parse_address(value).map(AsmLine::A);
        }

        if let Some(inner) = line.strip_prefix('(') {
            let name = inner
                .strip_suffix(')')
                .ok_or_else(|| malformed(format!("unterminated label '{line}'")))?;
            check_symbol(name)?;
            return Ok(AsmLine::Label(name.to_string()));
        }

        let (dest, rest) = line.split_once('=').unwrap_or(("", line));
        let (comp, jump) = rest.split_once(';').unwrap_or((rest, ""));
        if comp.is_empty() {
            return Err(malformed(format!("missing computation in '{line}'")));
        }
        Ok(AsmLine::C {
            dest: dest.to_string(),
            comp: comp.to_string(),
            jump: jump.to_string(),
        })
    }

    /// Encode a C-instruction. A-instructions need symbol resolution first,
    /// see [`encode_address`]; labels encode to nothing.
    pub fn encode_c(dest: &str, comp: &str, jump: &str) -> Result<u16> {
        let bits = format!(
            "111{}{}{}",
            code::comp_field(comp)?,
            code::dest_field(dest)?,
            code::jump_field(jump)?
        );
        u16::from_str_radix(&bits, 2).map_err(|e| Error::Parse {
            line: 0,
            message: format!("bad C-instruction encoding {bits}: {e}"),
        })
    }
}

/// Encode a resolved A-instruction value.
pub fn encode_address(value: u16) -> Result<u16> {
    if value > crate::abi::MAX_ADDRESS {
        return Err(Error::AddressOutOfRange(value));
    }
    Ok(value)
}

fn parse_address(value: &str) -> Result<Address> {
    if value.starts_with(|c: char| c.is_ascii_digit()) {
        code::parse_literal(value).map(Address::Literal)
    } else {
        check_symbol(value)?;
        Ok(Address::Symbol(value.to_string()))
    }
}

/// Symbols are letters, digits, `_`, `.`, `$`, `:` and do not start with a digit.
fn check_symbol(name: &str) -> Result<()> {
    let valid_char = |c: char| c.is_ascii_alphanumeric() || "_.$:".contains(c);
    let starts_ok = name.chars().next().is_some_and(|c| !c.is_ascii_digit());
    if starts_ok && name.chars().all(valid_char) {
        Ok(())
    } else {
        Err(malformed(format!("invalid symbol '{name}'")))
    }
}

fn malformed(message: String) -> Error {
    Error::Parse { line: 0, message }
}

impl fmt::Display for AsmLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmLine::A(Address::Literal(v)) => write!(f, "@{v}"),
            AsmLine::A(Address::Symbol(s)) => write!(f, "@{s}"),
            AsmLine::C { dest, comp, jump } => {
                if !dest.is_empty() {
                    write!(f, "{dest}=")?;
                }
                write!(f, "{comp}")?;
                if !jump.is_empty() {
                    write!(f, ";{jump}")?;
                }
                Ok(())
            }
            AsmLine::Label(name) => write!(f, "({name})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(AsmLine::parse("@21").unwrap(), AsmLine::A(Address::Literal(21)));
        assert_eq!(
            AsmLine::parse("@Main.3").unwrap(),
            AsmLine::A(Address::Symbol("Main.3".into()))
        );
        assert_eq!(
            AsmLine::parse("(Foo$ret.0)").unwrap(),
            AsmLine::Label("Foo$ret.0".into())
        );
        assert_eq!(
            AsmLine::parse("AM=M-1").unwrap(),
            AsmLine::C {
                dest: "AM".into(),
                comp: "M-1".into(),
                jump: String::new()
            }
        );
        assert_eq!(
            AsmLine::parse("D;JNE").unwrap(),
            AsmLine::C {
                dest: String::new(),
                comp: "D".into(),
                jump: "JNE".into()
            }
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(AsmLine::parse("(LOOP").is_err());
        assert!(AsmLine::parse("@1abc").is_err());
        assert!(AsmLine::parse("@bad-name").is_err());
        assert!(AsmLine::parse("D=").is_err());
        assert!(AsmLine::parse("@70000").is_err());
    }

    #[test]
    fn test_encode_c() {
        assert_eq!(AsmLine::encode_c("D", "A", "").unwrap(), 0b1110_1100_0001_0000);
        assert_eq!(AsmLine::encode_c("", "0", "JMP").unwrap(), 0b1110_1010_1000_0111);
        assert_eq!(AsmLine::encode_c("M", "D+M", "").unwrap(), 0b1111_0000_1000_1000);
    }

    #[test]
    fn test_address_range() {
        assert_eq!(encode_address(32767).unwrap(), 32767);
        assert!(matches!(
            encode_address(32768),
            Err(Error::AddressOutOfRange(32768))
        ));
    }

    #[test]
    fn test_display_round_trips_text() {
        for text in ["@SP", "@7", "AM=M-1", "0;JMP", "D=D+A", "(LOOP)"] {
            assert_eq!(AsmLine::parse(text).unwrap().to_string(), text);
        }
    }
}
