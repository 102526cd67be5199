//! Hack assembler: assembly text to 16-bit machine words.

mod assembler;
pub mod code;
mod instruction;
mod symbols;

pub use assembler::{HackProgram, assemble};
pub use instruction::{Address, AsmLine};
pub use symbols::SymbolTable;
