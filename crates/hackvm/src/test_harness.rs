//! Test harness for hackvm unit and integration tests
//!
//! Provides a cycle-level emulator of the Hack CPU so translated programs can
//! be executed instead of only inspected, plus helpers for asserting on
//! emitted assembly lines.
//!
//! # Example
//!
//! ```rust
//! use hackvm::test_harness::*;
//!
//! let cpu = execute("push constant 7\npush constant 2\nsub\n");
//! assert_eq!(cpu.stack(), [5]);
//! ```

#![allow(
    clippy::must_use_candidate,
    clippy::missing_panics_doc,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

use crate::abi::{ARG, LCL, SP, STACK_BASE, THAT, THIS};
use crate::hack::{HackProgram, assemble};
use crate::translate::{AsmProgram, TranslateOptions, translate};
use crate::vm::{Command, parse};

/// File name used for the `static` segment of harness programs.
pub const TEST_FILE: &str = "Test";

/// Segment bases installed by [`execute`], matching the usual test scripts.
pub const TEST_LCL: u16 = 300;
pub const TEST_ARG: u16 = 400;
pub const TEST_THIS: u16 = 3000;
pub const TEST_THAT: u16 = 3010;

/// Default step budget for [`HackCpu::run`].
pub const DEFAULT_STEP_LIMIT: usize = 100_000;

const RAM_SIZE: usize = 32 * 1024;

/// Emulated Hack CPU with its ROM and RAM.
#[derive(Debug, Clone)]
pub struct HackCpu {
    rom: Vec<u16>,
    ram: Vec<u16>,
    a: u16,
    d: u16,
    pc: u16,
    halted: bool,
}

impl HackCpu {
    pub fn new(program: &HackProgram) -> Self {
        Self {
            rom: program.words().to_vec(),
            ram: vec![0; RAM_SIZE],
            a: 0,
            d: 0,
            pc: 0,
            halted: false,
        }
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn d(&self) -> i16 {
        self.d as i16
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    /// Read a RAM cell as a signed word.
    pub fn peek(&self, address: u16) -> i16 {
        self.ram[usize::from(address & 0x7FFF)] as i16
    }

    pub fn poke(&mut self, address: u16, value: i16) {
        self.ram[usize::from(address & 0x7FFF)] = value as u16;
    }

    pub fn sp(&self) -> u16 {
        self.ram[usize::from(SP)]
    }

    /// Stack contents from [`STACK_BASE`] up to SP, bottom first.
    pub fn stack(&self) -> Vec<i16> {
        (STACK_BASE..self.sp()).map(|addr| self.peek(addr)).collect()
    }

    pub fn stack_top(&self) -> Option<i16> {
        self.sp()
            .checked_sub(1)
            .filter(|&addr| addr >= STACK_BASE)
            .map(|addr| self.peek(addr))
    }

    /// Execute one instruction. Returns `false`, executing nothing, once the
    /// CPU is halted.
    ///
    /// The CPU halts when it runs off the end of ROM or after it takes the
    /// `@L; 0;JMP` self-loop idiom where `L` is the address of the `@L`.
    pub fn step(&mut self) -> bool {
        if self.halted {
            return false;
        }
        let Some(&word) = self.rom.get(usize::from(self.pc)) else {
            self.halted = true;
            return false;
        };

        if word & 0x8000 == 0 {
            self.a = word;
            self.pc += 1;
            return true;
        }

        let address = self.a;
        let y = if word & 0x1000 == 0 {
            self.a
        } else {
            self.ram[usize::from(address & 0x7FFF)]
        };
        let out = alu(self.d, y, (word >> 6) & 0x3F);

        if word & 0b001_000 != 0 {
            self.ram[usize::from(address & 0x7FFF)] = out;
        }
        if word & 0b100_000 != 0 {
            self.a = out;
        }
        if word & 0b010_000 != 0 {
            self.d = out;
        }

        let signed = out as i16;
        let jump = (word & 0b100 != 0 && signed < 0)
            || (word & 0b010 != 0 && signed == 0)
            || (word & 0b001 != 0 && signed > 0);

        if jump {
            let is_self_loop = address.checked_add(1) == Some(self.pc)
                && self.rom.get(usize::from(address)) == Some(&address);
            self.pc = address;
            self.halted = is_self_loop;
        } else {
            self.pc += 1;
        }
        true
    }

    /// Run until halted. Returns the number of executed steps, or `None` if
    /// `max_steps` ran out first.
    pub fn run(&mut self, max_steps: usize) -> Option<usize> {
        for steps in 0..max_steps {
            if !self.step() {
                return Some(steps);
            }
        }
        None
    }
}

/// The Hack ALU. `control` holds zx, nx, zy, ny, f, no from bit 5 down to 0.
fn alu(x: u16, y: u16, control: u16) -> u16 {
    let bit = |n: u16| control & (1 << n) != 0;
    let mut x = if bit(5) { 0 } else { x };
    if bit(4) {
        x = !x;
    }
    let mut y = if bit(3) { 0 } else { y };
    if bit(2) {
        y = !y;
    }
    let out = if bit(1) { x.wrapping_add(y) } else { x & y };
    if bit(0) { !out } else { out }
}

/// Parse VM source with [`TEST_FILE`] as the static scope.
pub fn parse_vm(source: &str) -> Vec<Command> {
    parse(source, TEST_FILE).unwrap_or_else(|e| panic!("VM parse failed: {e}"))
}

/// Translate, assemble and load `commands` without running them.
pub fn load(commands: &[Command], options: &TranslateOptions) -> (AsmProgram, HackCpu) {
    let asm = translate(commands, options).unwrap_or_else(|e| panic!("translation failed: {e}"));
    let program =
        assemble(&asm.to_text()).unwrap_or_else(|e| panic!("assembly failed: {e}\n{asm}"));
    let cpu = HackCpu::new(&program);
    (asm, cpu)
}

/// Run VM source as a bare command sequence (no bootstrap) with SP at the
/// stack base and the segment bases at their test values.
pub fn execute(source: &str) -> HackCpu {
    execute_commands(&parse_vm(source))
}

pub fn execute_commands(commands: &[Command]) -> HackCpu {
    let (asm, mut cpu) = load(commands, &TranslateOptions::default());
    for (register, value) in [
        (SP, STACK_BASE),
        (LCL, TEST_LCL),
        (ARG, TEST_ARG),
        (THIS, TEST_THIS),
        (THAT, TEST_THAT),
    ] {
        cpu.poke(register, value as i16);
    }
    run_to_halt(&mut cpu, &asm);
    cpu
}

/// Run VM source behind the bootstrap code, starting from a zeroed RAM.
pub fn execute_bootstrapped(source: &str) -> HackCpu {
    let options = TranslateOptions {
        bootstrap: true,
        terminate: true,
    };
    let (asm, mut cpu) = load(&parse_vm(source), &options);
    run_to_halt(&mut cpu, &asm);
    cpu
}

fn run_to_halt(cpu: &mut HackCpu, asm: &AsmProgram) {
    if cpu.run(DEFAULT_STEP_LIMIT).is_none() {
        panic!(
            "program did not halt within {DEFAULT_STEP_LIMIT} steps (pc = {})\n{asm}",
            cpu.pc()
        );
    }
}

/// Find `pattern` as a contiguous run of lines.
pub fn find_lines(lines: &[String], pattern: &[&str]) -> Option<usize> {
    if pattern.is_empty() {
        return Some(0);
    }
    lines
        .windows(pattern.len())
        .position(|window| window.iter().zip(pattern).all(|(l, p)| l == p))
}

/// Assert that `lines` contains `pattern` as a contiguous run.
pub fn assert_has_lines(lines: &[String], pattern: &[&str]) {
    if find_lines(lines, pattern).is_none() {
        panic!(
            "Pattern not found in assembly.\n\nExpected lines:\n  {}\n\nActual lines:\n  {}",
            pattern.join("\n  "),
            lines.join("\n  ")
        );
    }
}

/// Count lines exactly equal to `line`.
pub fn count_lines(lines: &[String], line: &str) -> usize {
    lines.iter().filter(|l| *l == line).count()
}

/// Lines that declare a label, with the parentheses removed.
pub fn declared_labels(lines: &[String]) -> Vec<&str> {
    lines
        .iter()
        .filter_map(|l| l.strip_prefix('(').and_then(|l| l.strip_suffix(')')))
        .collect()
}
