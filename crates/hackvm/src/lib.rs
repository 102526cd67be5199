#![allow(
    clippy::module_name_repetitions, // AsmLine/AsmBlock read better than Line/Block at call sites
    clippy::missing_errors_doc // every fallible API returns the crate Error; variants are documented there
)]

pub mod abi;
pub mod error;
pub mod hack;
pub mod translate;
pub mod vm;

/// Test harness module for writing unit and integration tests.
///
/// This module is only available when running tests or when the
/// `test-harness` feature is enabled.
#[cfg(any(test, feature = "test-harness"))]
pub mod test_harness;

pub use error::{Error, Result};
pub use hack::{HackProgram, assemble};
pub use translate::{AsmBlock, AsmProgram, TranslateOptions, Translator, translate};
pub use vm::{ArithmeticOp, Command, Segment, StackOp};
