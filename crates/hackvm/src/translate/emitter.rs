// Core assembly emitter and label uniquification.
//
// Every VM command lowers into its own `AsmEmitter`; the finished block is only
// handed to the program once lowering succeeded, so a rejected command never
// leaves partial lines behind.

use std::fmt;

/// Default data step of a pop: load the popped cell into D.
pub const LOAD: &str = "D=M";

/// Boolean encodings pushed by the comparisons.
pub const TRUE: &str = "-1";
pub const FALSE: &str = "0";

/// Session-wide label counter.
///
/// Advanced exactly once per comparison, call and termination marker, never
/// reset. Its value is embedded in every label the translator synthesizes.
#[derive(Debug, Default)]
pub struct LabelCounter {
    next: u32,
}

impl LabelCounter {
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Hand out the current value and advance.
    pub fn fresh(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of values handed out so far.
    #[must_use]
    pub const fn issued(&self) -> u32 {
        self.next
    }
}

/// Line buffer for a single command's assembly block.
#[derive(Debug, Default)]
pub struct AsmEmitter {
    lines: Vec<String>,
}

impl AsmEmitter {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn emit(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// `@value`: load a literal or symbol into A.
    pub fn at(&mut self, value: impl fmt::Display) {
        self.emit(format!("@{value}"));
    }

    /// `(label)`: bind a symbol to the next instruction.
    pub fn define_label(&mut self, label: &str) {
        self.emit(format!("({label})"));
    }

    /// Store D at the stack top and advance SP.
    pub fn push_d(&mut self) {
        self.at("SP");
        self.emit("A=M");
        self.emit("M=D");
        self.at("SP");
        self.emit("M=M+1");
    }

    /// Retreat SP, address the popped cell and apply `data_op` to it.
    ///
    /// `data_op` sees the popped cell as M; passing something other than
    /// [`LOAD`] fuses a combine step into the pop.
    pub fn pop(&mut self, data_op: &str) {
        self.at("SP");
        self.emit("M=M-1");
        self.emit("A=M");
        self.emit(data_op);
    }

    pub fn pop_d(&mut self) {
        self.pop(LOAD);
    }

    /// Wrap the buffered lines in begin/end markers.
    #[must_use]
    pub fn finish(self, title: &str) -> AsmBlock {
        let mut lines = Vec::with_capacity(self.lines.len() + 2);
        lines.push(format!("// begin {title}"));
        lines.extend(self.lines);
        lines.push(format!("// end {title}"));
        AsmBlock { lines }
    }
}

/// Self-contained assembly for one VM command (or for the bootstrap and
/// termination code), including its begin/end comment markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsmBlock {
    lines: Vec<String>,
}

impl AsmBlock {
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines that are neither comments nor label declarations.
    pub fn instructions(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .map(String::as_str)
            .filter(|l| !l.starts_with("//") && !l.starts_with('('))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for AsmBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// A translated program: blocks concatenated in command order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsmProgram {
    lines: Vec<String>,
}

impl AsmProgram {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn append(&mut self, block: AsmBlock) {
        self.lines.extend(block.lines);
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render as assembly source text, one line per instruction or label.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AsmProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
