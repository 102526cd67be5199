// Control flow: label declarations, unconditional and conditional jumps.
//
// Label names are not checked against declarations here; a dangling target
// surfaces when the assembler allocates it as a variable.

use super::emitter::AsmEmitter;

/// Declared labels are uppercased. Jump targets below are emitted as given.
pub fn lower_label(e: &mut AsmEmitter, label: &str) {
    e.define_label(&label.to_uppercase());
}

pub fn lower_goto(e: &mut AsmEmitter, label: &str) {
    e.at(label);
    e.emit("0;JMP");
}

/// Pop the stack top and jump if it is non-zero.
pub fn lower_if_goto(e: &mut AsmEmitter, label: &str) {
    e.pop_d();
    e.at(label);
    e.emit("D;JNE");
}
