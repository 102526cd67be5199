// Segment addressing: push/pop against the eight virtual memory segments.

use crate::abi::{SCRATCH_ADDR, TEMP_BASE, TEMP_SIZE};
use crate::vm::{Segment, StackOp};
use crate::{Error, Result};

use super::emitter::AsmEmitter;

/// Lower `push`/`pop` of `segment[index]`.
///
/// All operand checks happen before anything is emitted.
pub fn lower_push_pop(
    e: &mut AsmEmitter,
    op: StackOp,
    segment: Segment,
    index: i32,
    file: &str,
) -> Result<()> {
    if index < 0 {
        return Err(Error::NegativeIndex { segment, index });
    }

    if let Some(base) = segment.base_register() {
        lower_indirect(e, op, base, index);
        return Ok(());
    }

    match segment {
        Segment::Argument | Segment::Local | Segment::This | Segment::That => {
            unreachable!("indirect segment {segment} has a base register")
        }
        Segment::Pointer => {
            // Direct: the base registers themselves, no indirection.
            let register = match index {
                0 => "THIS",
                1 => "THAT",
                _ => return Err(Error::PointerIndexOutOfRange(index)),
            };
            lower_direct(e, op, register);
        }
        Segment::Temp => {
            if index >= i32::from(TEMP_SIZE) {
                return Err(Error::TempIndexOutOfRange(index));
            }
            e.at(TEMP_BASE);
            e.emit("D=A");
            e.at(index);
            e.emit("D=D+A");
            e.at(SCRATCH_ADDR);
            e.emit("M=D");
            transfer_through_scratch(e, op);
        }
        Segment::Constant => {
            if op == StackOp::Pop {
                return Err(Error::PopConstant);
            }
            e.at(index);
            e.emit("D=A");
            e.push_d();
        }
        Segment::Static => lower_direct(e, op, &format!("{file}.{index}")),
    }
    Ok(())
}

/// `R13 = base + index`, then move the value through `RAM[R13]`.
fn lower_indirect(e: &mut AsmEmitter, op: StackOp, base: &str, index: i32) {
    e.at(index);
    e.emit("D=A");
    e.at(base);
    e.emit("D=D+M");
    e.at(SCRATCH_ADDR);
    e.emit("M=D");
    transfer_through_scratch(e, op);
}

fn transfer_through_scratch(e: &mut AsmEmitter, op: StackOp) {
    match op {
        StackOp::Push => {
            e.at(SCRATCH_ADDR);
            e.emit("A=M");
            e.emit("D=M");
            e.push_d();
        }
        StackOp::Pop => {
            e.pop_d();
            e.at(SCRATCH_ADDR);
            e.emit("A=M");
            e.emit("M=D");
        }
    }
}

/// Push or pop the named cell itself.
fn lower_direct(e: &mut AsmEmitter, op: StackOp, symbol: &str) {
    match op {
        StackOp::Push => {
            e.at(symbol);
            e.emit("D=M");
            e.push_d();
        }
        StackOp::Pop => {
            e.pop_d();
            e.at(symbol);
            e.emit("M=D");
        }
    }
}
