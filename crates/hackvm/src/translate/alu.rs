// Arithmetic and logical operators: binary, unary and comparisons.

use crate::vm::ArithmeticOp;

use super::emitter::{AsmEmitter, FALSE, LabelCounter, TRUE};

/// Branch shape of a comparison.
///
/// After both pops D holds `right - left`. `jump` is taken towards
/// `branch_label`, which pushes `taken`; the fall-through path pushes the
/// opposite value.
struct Comparison {
    branch_label: &'static str,
    end_label: &'static str,
    jump: &'static str,
    taken: bool,
}

const EQ: Comparison = Comparison {
    branch_label: "NOT_EQUAL",
    end_label: "END_EQUAL",
    jump: "D;JNE",
    taken: false,
};

// right - left < 0 means left > right.
const GT: Comparison = Comparison {
    branch_label: "GREATER",
    end_label: "END_GREATER",
    jump: "D;JLT",
    taken: true,
};

// right - left <= 0 means left >= right.
const LT: Comparison = Comparison {
    branch_label: "NOT_LESS",
    end_label: "END_LESS",
    jump: "D;JLE",
    taken: false,
};

pub fn lower_arithmetic(e: &mut AsmEmitter, labels: &mut LabelCounter, op: ArithmeticOp) {
    match op {
        ArithmeticOp::Add => lower_binary(e, "D=D+M"),
        ArithmeticOp::Sub => lower_binary(e, "D=M-D"),
        ArithmeticOp::And => lower_binary(e, "D=D&M"),
        ArithmeticOp::Or => lower_binary(e, "D=D|M"),
        ArithmeticOp::Neg => lower_unary(e, "D=-M"),
        ArithmeticOp::Not => lower_unary(e, "D=!M"),
        ArithmeticOp::Eq => lower_comparison(e, labels, &EQ),
        ArithmeticOp::Gt => lower_comparison(e, labels, &GT),
        ArithmeticOp::Lt => lower_comparison(e, labels, &LT),
    }
}

/// Right operand into D, then combine it with the left operand during the
/// second pop.
fn lower_binary(e: &mut AsmEmitter, combine: &str) {
    e.pop_d();
    e.pop(combine);
    e.push_d();
}

fn lower_unary(e: &mut AsmEmitter, op: &str) {
    e.pop(op);
    e.push_d();
}

fn lower_comparison(e: &mut AsmEmitter, labels: &mut LabelCounter, cmp: &Comparison) {
    let id = labels.fresh();
    let branch = format!("{}_{id}", cmp.branch_label);
    let end = format!("{}_{id}", cmp.end_label);
    let (taken, fallthrough) = if cmp.taken {
        (TRUE, FALSE)
    } else {
        (FALSE, TRUE)
    };

    e.pop_d();
    e.pop("D=D-M");
    e.at(&branch);
    e.emit(cmp.jump);

    e.emit(format!("D={fallthrough}"));
    e.push_d();
    e.at(&end);
    e.emit("0;JMP");

    e.define_label(&branch);
    e.emit(format!("D={taken}"));
    e.push_d();
    e.define_label(&end);
}
