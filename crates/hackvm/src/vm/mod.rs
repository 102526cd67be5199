//! VM command model: the stack-machine instruction set consumed by the translator.

mod display;
mod parser;

use std::str::FromStr;

use crate::Error;

pub use parser::parse;

/// The nine arithmetic/logical stack operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithmeticOp {
    pub const ALL: [ArithmeticOp; 9] = [
        ArithmeticOp::Add,
        ArithmeticOp::Sub,
        ArithmeticOp::Neg,
        ArithmeticOp::Eq,
        ArithmeticOp::Gt,
        ArithmeticOp::Lt,
        ArithmeticOp::And,
        ArithmeticOp::Or,
        ArithmeticOp::Not,
    ];

    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Neg => "neg",
            ArithmeticOp::Eq => "eq",
            ArithmeticOp::Gt => "gt",
            ArithmeticOp::Lt => "lt",
            ArithmeticOp::And => "and",
            ArithmeticOp::Or => "or",
            ArithmeticOp::Not => "not",
        }
    }

    /// Number of stack operands consumed.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            ArithmeticOp::Neg | ArithmeticOp::Not => 1,
            _ => 2,
        }
    }
}

impl FromStr for ArithmeticOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArithmeticOp::ALL
            .into_iter()
            .find(|op| op.mnemonic() == s)
            .ok_or_else(|| Error::UnknownOperator(s.to_string()))
    }
}

/// Direction of a segment access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackOp {
    Push,
    Pop,
}

impl FromStr for StackOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "push" => Ok(StackOp::Push),
            "pop" => Ok(StackOp::Pop),
            _ => Err(Error::InvalidStackOperation(s.to_string())),
        }
    }
}

/// Virtual memory segments addressable by push/pop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Argument,
    Local,
    This,
    That,
    Pointer,
    Temp,
    Constant,
    Static,
}

impl Segment {
    pub const ALL: [Segment; 8] = [
        Segment::Argument,
        Segment::Local,
        Segment::This,
        Segment::That,
        Segment::Pointer,
        Segment::Temp,
        Segment::Constant,
        Segment::Static,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Segment::Argument => "argument",
            Segment::Local => "local",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
            Segment::Constant => "constant",
            Segment::Static => "static",
        }
    }

    /// Base-pointer register for the indirectly addressed segments.
    #[must_use]
    pub const fn base_register(self) -> Option<&'static str> {
        match self {
            Segment::Argument => Some("ARG"),
            Segment::Local => Some("LCL"),
            Segment::This => Some("THIS"),
            Segment::That => Some("THAT"),
            _ => None,
        }
    }
}

impl FromStr for Segment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Segment::ALL
            .into_iter()
            .find(|seg| seg.name() == s)
            .ok_or_else(|| Error::UnknownSegment(s.to_string()))
    }
}

/// A single, already tokenized VM command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Arithmetic(ArithmeticOp),
    /// `push`/`pop` against a segment. `file` names the enclosing source
    /// file and scopes the `static` segment.
    Access {
        op: StackOp,
        segment: Segment,
        index: i32,
        file: String,
    },
    Label(String),
    Goto(String),
    IfGoto(String),
    Function { name: String, locals: u16 },
    Call { name: String, args: u16 },
    Return,
}

impl Command {
    pub fn push(segment: Segment, index: i32, file: impl Into<String>) -> Self {
        Command::Access {
            op: StackOp::Push,
            segment,
            index,
            file: file.into(),
        }
    }

    pub fn pop(segment: Segment, index: i32, file: impl Into<String>) -> Self {
        Command::Access {
            op: StackOp::Pop,
            segment,
            index,
            file: file.into(),
        }
    }

    pub fn function(name: impl Into<String>, locals: u16) -> Self {
        Command::Function {
            name: name.into(),
            locals,
        }
    }

    pub fn call(name: impl Into<String>, args: u16) -> Self {
        Command::Call {
            name: name.into(),
            args,
        }
    }
}

impl From<ArithmeticOp> for Command {
    fn from(op: ArithmeticOp) -> Self {
        Command::Arithmetic(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_vocabulary_is_closed() {
        for op in ArithmeticOp::ALL {
            assert_eq!(op.mnemonic().parse::<ArithmeticOp>().unwrap(), op);
        }
        assert!(matches!(
            "mul".parse::<ArithmeticOp>(),
            Err(Error::UnknownOperator(s)) if s == "mul"
        ));
        assert!("ADD".parse::<ArithmeticOp>().is_err());
    }

    #[test]
    fn test_segment_vocabulary_is_closed() {
        for seg in Segment::ALL {
            assert_eq!(seg.name().parse::<Segment>().unwrap(), seg);
        }
        assert!(matches!(
            "heap".parse::<Segment>(),
            Err(Error::UnknownSegment(_))
        ));
    }

    #[test]
    fn test_stack_op_rejects_other_kinds() {
        assert_eq!("push".parse::<StackOp>().unwrap(), StackOp::Push);
        assert_eq!("pop".parse::<StackOp>().unwrap(), StackOp::Pop);
        assert!(matches!(
            "peek".parse::<StackOp>(),
            Err(Error::InvalidStackOperation(_))
        ));
    }

    #[test]
    fn test_base_registers() {
        assert_eq!(Segment::Local.base_register(), Some("LCL"));
        assert_eq!(Segment::Argument.base_register(), Some("ARG"));
        assert_eq!(Segment::Pointer.base_register(), None);
        assert_eq!(Segment::Static.base_register(), None);
    }
}
