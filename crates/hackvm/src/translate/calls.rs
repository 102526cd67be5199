// Calling convention: function entry, call, return, bootstrap and program end.

use crate::abi::{
    ENTRY_FUNCTION, FRAME_SIZE, SAVED_REGISTERS, SCRATCH_ADDR, SCRATCH_RET, STACK_BASE,
};

use super::emitter::{AsmEmitter, LabelCounter};

/// Entry label followed by one zeroed stack cell per local.
pub fn lower_function(e: &mut AsmEmitter, name: &str, locals: u16) {
    e.define_label(name);
    for _ in 0..locals {
        e.at(0);
        e.emit("D=A");
        e.push_d();
    }
}

/// Save the caller's frame, reposition ARG and LCL, jump to `name`.
///
/// The return label embeds a fresh counter value so repeated and recursive
/// calls of the same callee each get their own return target.
pub fn lower_call(e: &mut AsmEmitter, labels: &mut LabelCounter, name: &str, args: u16) {
    let return_label = format!("{name}$ret.{}", labels.fresh());

    e.at(&return_label);
    e.emit("D=A");
    e.push_d();

    for register in SAVED_REGISTERS {
        e.at(register);
        e.emit("D=M");
        e.push_d();
    }

    // ARG = SP - args - 5
    e.at("SP");
    e.emit("D=M");
    e.at(u32::from(args) + u32::from(FRAME_SIZE));
    e.emit("D=D-A");
    e.at("ARG");
    e.emit("M=D");

    // LCL = SP
    e.at("SP");
    e.emit("D=M");
    e.at("LCL");
    e.emit("M=D");

    e.at(name);
    e.emit("0;JMP");
    e.define_label(&return_label);
}

/// Tear down the callee frame and jump back to the caller.
///
/// Frame pointer and return address go to scratch registers first: the
/// return value overwrites `argument 0`, which is the return address slot
/// when the callee takes no arguments, and the restores overwrite LCL.
pub fn lower_return(e: &mut AsmEmitter) {
    // R13 = frame = LCL
    e.at("LCL");
    e.emit("D=M");
    e.at(SCRATCH_ADDR);
    e.emit("M=D");

    // R14 = RAM[frame - 5]
    e.at(FRAME_SIZE);
    e.emit("A=D-A");
    e.emit("D=M");
    e.at(SCRATCH_RET);
    e.emit("M=D");

    // RAM[ARG] = pop()
    e.pop_d();
    e.at("ARG");
    e.emit("A=M");
    e.emit("M=D");

    // SP = ARG + 1
    e.at("ARG");
    e.emit("D=M+1");
    e.at("SP");
    e.emit("M=D");

    // THAT, THIS, ARG, LCL = RAM[frame - 1] .. RAM[frame - 4]
    for register in SAVED_REGISTERS.iter().rev() {
        e.at(SCRATCH_ADDR);
        e.emit("AM=M-1");
        e.emit("D=M");
        e.at(register);
        e.emit("M=D");
    }

    e.at(SCRATCH_RET);
    e.emit("A=M");
    e.emit("0;JMP");
}

/// `SP = 256`, then `call Sys.init 0`.
pub fn lower_bootstrap(e: &mut AsmEmitter, labels: &mut LabelCounter) {
    e.at(STACK_BASE);
    e.emit("D=A");
    e.at("SP");
    e.emit("M=D");
    lower_call(e, labels, ENTRY_FUNCTION, 0);
}

/// Tight self-loop that parks the CPU once the program is done.
pub fn lower_end_program(e: &mut AsmEmitter, labels: &mut LabelCounter) {
    let label = format!("END_PROGRAM_{}", labels.fresh());
    e.define_label(&label);
    e.at(&label);
    e.emit("0;JMP");
}
