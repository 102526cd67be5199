//! VM-to-assembly translation.
//!
//! A [`Translator`] is one translation session. It owns the label counter, so
//! independent sessions never share synthesized labels and never interfere.

mod alu;
mod calls;
mod control_flow;
mod emitter;
mod memory;

use crate::Result;
use crate::abi::ENTRY_FUNCTION;
use crate::vm::{ArithmeticOp, Command, Segment, StackOp};

use emitter::AsmEmitter;
pub use emitter::{AsmBlock, AsmProgram, LabelCounter};

/// Options for a whole-program translation.
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    /// Prepend `SP = 256; call Sys.init 0`.
    pub bootstrap: bool,
    /// Append a termination loop after the last command.
    pub terminate: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            bootstrap: false,
            terminate: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct Translator {
    labels: LabelCounter,
}

impl Translator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            labels: LabelCounter::new(),
        }
    }

    /// Number of counter values handed out so far in this session.
    #[must_use]
    pub const fn labels_issued(&self) -> u32 {
        self.labels.issued()
    }

    /// Translate a whole command stream, aborting on the first invalid command.
    pub fn translate(
        &mut self,
        commands: &[Command],
        options: &TranslateOptions,
    ) -> Result<AsmProgram> {
        let mut program = AsmProgram::new();

        if commands.is_empty() {
            tracing::warn!("translating an empty command stream");
        }

        if options.bootstrap {
            let has_entry = commands.iter().any(
                |c| matches!(c, Command::Function { name, .. } if name == ENTRY_FUNCTION),
            );
            if !has_entry {
                tracing::warn!("bootstrap requested but no '{ENTRY_FUNCTION}' function is defined");
            }
            program.append(self.bootstrap());
        }

        for command in commands {
            let block = self.translate_command(command)?;
            tracing::trace!(%command, lines = block.len(), "translated command");
            program.append(block);
        }

        if options.terminate {
            program.append(self.end_program());
        }

        tracing::debug!(
            commands = commands.len(),
            lines = program.len(),
            labels = self.labels.issued(),
            "translated VM program"
        );
        Ok(program)
    }

    /// Translate a single command into its marked assembly block.
    pub fn translate_command(&mut self, command: &Command) -> Result<AsmBlock> {
        match command {
            Command::Arithmetic(op) => Ok(self.arithmetic(*op)),
            Command::Access {
                op,
                segment,
                index,
                file,
            } => self.push_pop(*op, *segment, *index, file),
            Command::Label(label) => Ok(self.label(label)),
            Command::Goto(label) => Ok(self.goto(label)),
            Command::IfGoto(label) => Ok(self.if_goto(label)),
            Command::Function { name, locals } => Ok(self.function(name, *locals)),
            Command::Call { name, args } => Ok(self.call(name, *args)),
            Command::Return => Ok(self.ret()),
        }
    }

    pub fn arithmetic(&mut self, op: ArithmeticOp) -> AsmBlock {
        let mut e = AsmEmitter::new();
        alu::lower_arithmetic(&mut e, &mut self.labels, op);
        e.finish(op.mnemonic())
    }

    pub fn push_pop(
        &mut self,
        op: StackOp,
        segment: Segment,
        index: i32,
        file: &str,
    ) -> Result<AsmBlock> {
        let mut e = AsmEmitter::new();
        memory::lower_push_pop(&mut e, op, segment, index, file)?;
        Ok(e.finish(&format!("{op} {segment} {index}")))
    }

    #[must_use]
    pub fn label(&self, label: &str) -> AsmBlock {
        let mut e = AsmEmitter::new();
        control_flow::lower_label(&mut e, label);
        e.finish(&format!("label {label}"))
    }

    #[must_use]
    pub fn goto(&self, label: &str) -> AsmBlock {
        let mut e = AsmEmitter::new();
        control_flow::lower_goto(&mut e, label);
        e.finish(&format!("goto {label}"))
    }

    #[must_use]
    pub fn if_goto(&self, label: &str) -> AsmBlock {
        let mut e = AsmEmitter::new();
        control_flow::lower_if_goto(&mut e, label);
        e.finish(&format!("if-goto {label}"))
    }

    #[must_use]
    pub fn function(&self, name: &str, locals: u16) -> AsmBlock {
        let mut e = AsmEmitter::new();
        calls::lower_function(&mut e, name, locals);
        e.finish(&format!("function {name} {locals}"))
    }

    pub fn call(&mut self, name: &str, args: u16) -> AsmBlock {
        let mut e = AsmEmitter::new();
        calls::lower_call(&mut e, &mut self.labels, name, args);
        e.finish(&format!("call {name} {args}"))
    }

    #[must_use]
    pub fn ret(&self) -> AsmBlock {
        let mut e = AsmEmitter::new();
        calls::lower_return(&mut e);
        e.finish("return")
    }

    pub fn bootstrap(&mut self) -> AsmBlock {
        let mut e = AsmEmitter::new();
        calls::lower_bootstrap(&mut e, &mut self.labels);
        e.finish("bootstrap")
    }

    pub fn end_program(&mut self) -> AsmBlock {
        let mut e = AsmEmitter::new();
        calls::lower_end_program(&mut e, &mut self.labels);
        e.finish("end program")
    }
}

/// Translate `commands` in a fresh session.
pub fn translate(commands: &[Command], options: &TranslateOptions) -> Result<AsmProgram> {
    Translator::new().translate(commands, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_blocks_are_marked_with_command_text() {
        let mut translator = Translator::new();
        let block = translator
            .translate_command(&Command::push(Segment::Constant, 7, "Main"))
            .unwrap();
        assert_eq!(block.lines()[0], "// begin push constant 7");
        assert_eq!(block.lines()[block.len() - 1], "// end push constant 7");
    }

    #[test]
    fn test_failed_command_contributes_nothing() {
        let commands = [
            Command::push(Segment::Constant, 1, "Main"),
            Command::push(Segment::Temp, 8, "Main"),
        ];
        let err = translate(&commands, &TranslateOptions::default()).unwrap_err();
        assert!(matches!(err, Error::TempIndexOutOfRange(8)));
    }

    #[test]
    fn test_bootstrap_prepended_once() {
        let commands = [Command::function("Sys.init", 0)];
        let options = TranslateOptions {
            bootstrap: true,
            terminate: false,
        };
        let program = translate(&commands, &options).unwrap();
        assert_eq!(program.lines()[0], "// begin bootstrap");
        let bootstraps = program
            .lines()
            .iter()
            .filter(|l| *l == "// begin bootstrap")
            .count();
        assert_eq!(bootstraps, 1);
        assert_eq!(program.lines().last().unwrap(), "// end function Sys.init 0");
    }

    #[test]
    fn test_terminate_appends_end_loop() {
        let program = translate(&[], &TranslateOptions::default()).unwrap();
        assert_eq!(
            program.lines(),
            [
                "// begin end program",
                "(END_PROGRAM_0)",
                "@END_PROGRAM_0",
                "0;JMP",
                "// end end program"
            ]
        );
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = Translator::new();
        let mut b = Translator::new();
        a.call("Foo", 0);
        a.call("Foo", 0);
        let from_b = b.call("Foo", 0);
        assert!(from_b.lines().contains(&"(Foo$ret.0)".to_string()));
        assert_eq!(a.labels_issued(), 2);
        assert_eq!(b.labels_issued(), 1);
    }
}
