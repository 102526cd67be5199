use std::fmt;

use super::{ArithmeticOp, Command, Segment, StackOp};

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for StackOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackOp::Push => write!(f, "push"),
            StackOp::Pop => write!(f, "pop"),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Arithmetic(op) => write!(f, "{op}"),
            Command::Access {
                op, segment, index, ..
            } => write!(f, "{op} {segment} {index}"),
            Command::Label(label) => write!(f, "label {label}"),
            Command::Goto(label) => write!(f, "goto {label}"),
            Command::IfGoto(label) => write!(f, "if-goto {label}"),
            Command::Function { name, locals } => write!(f, "function {name} {locals}"),
            Command::Call { name, args } => write!(f, "call {name} {args}"),
            Command::Return => write!(f, "return"),
        }
    }
}
