use crate::vm::Segment;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown arithmetic/logical operator: {0}")]
    UnknownOperator(String),

    #[error("Unknown memory segment: {0}")]
    UnknownSegment(String),

    #[error("Inappropriate stack operation: {0} (expected push or pop)")]
    InvalidStackOperation(String),

    #[error("Segment index cannot be negative: {segment} {index}")]
    NegativeIndex { segment: Segment, index: i32 },

    #[error("Temp index {0} is outside of the range 0..=7")]
    TempIndexOutOfRange(i32),

    #[error("Pointer index {0} is outside of the range 0..=1")]
    PointerIndexOutOfRange(i32),

    #[error("The constant segment only supports push")]
    PopConstant,

    #[error("Unknown {field} mnemonic: {mnemonic:?}")]
    UnknownMnemonic { field: Field, mnemonic: String },

    #[error("Literal {0:?} does not fit in an unsigned 16-bit word")]
    LiteralOutOfRange(String),

    #[error("Address {0} does not fit in an A-instruction (max 32767)")]
    AddressOutOfRange(u16),

    #[error("Label {label:?} is already defined at ROM address {address}")]
    DuplicateLabel { label: String, address: u16 },

    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Which field of a C-instruction a mnemonic was looked up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Dest,
    Comp,
    Jump,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Dest => write!(f, "destination"),
            Field::Comp => write!(f, "computation"),
            Field::Jump => write!(f, "jump"),
        }
    }
}

impl Error {
    /// Attach a 1-based source line to an error raised while parsing that line.
    #[must_use]
    pub fn at_line(self, line: usize) -> Self {
        match self {
            Error::Parse { message, .. } => Error::Parse { line, message },
            other => Error::Parse {
                line,
                message: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
