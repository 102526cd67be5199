//! Hack platform ABI constants (register cells, memory layout, frame layout).
//!
//! This module centralizes the fixed addressing conventions shared by the
//! translator, the assembler's predefined symbols and the test emulator.
//!
//! ```text
//! RAM Address Space:
//!   0 - 4          SP, LCL, ARG, THIS, THAT (convention registers)
//!   5 - 12         temp segment
//!   13 - 15        scratch registers (R13-R15)
//!   16 - 255       static variables
//!   256 - 2047     stack (STACK_BASE)
//!   16384 - 24575  screen memory map (SCREEN)
//!   24576          keyboard memory map (KBD)
//! ```

// ── Convention registers ──

/// Stack pointer: address of the next free stack cell.
pub const SP: u16 = 0;

/// Base of the current function's local segment.
pub const LCL: u16 = 1;

/// Base of the current function's argument segment.
pub const ARG: u16 = 2;

/// Base of the `this` segment, aliased by `pointer 0`.
pub const THIS: u16 = 3;

/// Base of the `that` segment, aliased by `pointer 1`.
pub const THAT: u16 = 4;

/// First register of the temp segment.
pub const TEMP_BASE: u16 = 5;

/// Number of cells in the temp segment.
pub const TEMP_SIZE: u16 = 8;

/// Scratch register holding a computed segment address, or the frame
/// pointer during `return`.
pub const SCRATCH_ADDR: &str = "R13";

/// Scratch register holding the return address during `return`.
pub const SCRATCH_RET: &str = "R14";

// ── Memory layout ──

/// Address the bootstrap code loads into SP before calling `Sys.init`.
pub const STACK_BASE: u16 = 256;

/// First RAM cell handed out to assembler variables (statics included).
pub const VARIABLE_BASE: u16 = 16;

/// Screen memory map base.
pub const SCREEN: u16 = 16384;

/// Keyboard memory map.
pub const KBD: u16 = 24576;

/// Largest value an A-instruction can load; bit 15 selects a C-instruction.
pub const MAX_ADDRESS: u16 = 0x7FFF;

// ── Call frame layout ──

/// Number of words a `call` pushes before jumping to the callee:
/// return address, LCL, ARG, THIS, THAT.
///
/// Relative to the callee's frame pointer (its LCL):
/// - `frame - 1`: saved THAT
/// - `frame - 2`: saved THIS
/// - `frame - 3`: saved ARG
/// - `frame - 4`: saved LCL
/// - `frame - 5`: return address
pub const FRAME_SIZE: u16 = 5;

/// Symbolic names of the registers saved by `call`, in push order.
pub const SAVED_REGISTERS: [&str; 4] = ["LCL", "ARG", "THIS", "THAT"];

/// Name of the function the bootstrap code calls.
pub const ENTRY_FUNCTION: &str = "Sys.init";
