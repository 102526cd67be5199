//! Function call tests
//!
//! Programs run behind the bootstrap code with `Sys.init` parking the CPU in a
//! `HALT` loop, so frame setup and teardown are observed on real RAM.

use hackvm::abi::{ARG, LCL, THIS};
use hackvm::test_harness::*;
use hackvm::{Command, TranslateOptions, Translator};

fn sys_init(body: &str) -> String {
    format!("function Sys.init 0\n{body}label HALT\ngoto HALT\n")
}

#[test]
fn test_zero_arg_function_returns_value_into_caller_frame() {
    let source = sys_init("call Main.answer 0\n")
        + "function Main.answer 0\npush constant 42\nreturn\n";
    let cpu = execute_bootstrapped(&source);

    // Bootstrap frame occupies 256..261; the value replaces the callee frame.
    assert_eq!(cpu.sp(), 262);
    assert_eq!(cpu.peek(261), 42);
    assert_eq!(cpu.peek(LCL), 261);
    assert_eq!(cpu.peek(ARG), 256);
}

#[test]
fn test_arguments_are_visible_to_callee() {
    let source = sys_init("push constant 30\npush constant 12\ncall Math.diff 2\n")
        + "function Math.diff 0\npush argument 0\npush argument 1\nsub\nreturn\n";
    let cpu = execute_bootstrapped(&source);
    assert_eq!(cpu.sp(), 262);
    assert_eq!(cpu.stack_top(), Some(18));
}

#[test]
fn test_caller_pointers_restored_after_return() {
    let source = sys_init(
        "push constant 3000\npop pointer 0\ncall Main.clobber 0\npop temp 0\n",
    ) + "function Main.clobber 0\npush constant 5000\npop pointer 0\npush constant 0\nreturn\n";
    let cpu = execute_bootstrapped(&source);
    assert_eq!(cpu.peek(THIS), 3000);
    assert_eq!(cpu.peek(LCL), 261);
    assert_eq!(cpu.sp(), 261);
}

#[test]
fn test_recursive_sum() {
    let source = sys_init("push constant 10\ncall Sum.sum 1\n")
        + "\
function Sum.sum 0
push argument 0
push constant 0
eq
if-goto BASE
push argument 0
push argument 0
push constant 1
sub
call Sum.sum 1
add
return
label BASE
push constant 0
return
";
    let cpu = execute_bootstrapped(&source);
    assert_eq!(cpu.stack_top(), Some(55));
    assert_eq!(cpu.sp(), 262);
}

#[test]
fn test_locals_start_zeroed() {
    let source = sys_init("call Main.locals 0\n")
        + "function Main.locals 2\npush local 0\npush local 1\nadd\nreturn\n";
    let options = TranslateOptions {
        bootstrap: true,
        terminate: true,
    };
    let (_, mut cpu) = load(&parse_vm(&source), &options);
    for address in 256..300 {
        cpu.poke(address, 77);
    }
    assert!(cpu.run(DEFAULT_STEP_LIMIT).is_some());
    assert_eq!(cpu.peek(261), 0);
}

#[test]
fn test_each_call_site_gets_its_own_return_label() {
    let commands = [Command::call("Foo", 0), Command::call("Foo", 0)];
    let program = Translator::new()
        .translate(&commands, &TranslateOptions::default())
        .unwrap();
    let labels = declared_labels(program.lines());
    assert!(labels.contains(&"Foo$ret.0"));
    assert!(labels.contains(&"Foo$ret.1"));
}

#[test]
fn test_bootstrap_sets_stack_pointer_before_entry_call() {
    let options = TranslateOptions {
        bootstrap: true,
        terminate: false,
    };
    let program = Translator::new()
        .translate(&[Command::function("Sys.init", 0)], &options)
        .unwrap();
    assert_has_lines(
        program.lines(),
        &["@256", "D=A", "@SP", "M=D", "@Sys.init$ret.0"],
    );
    assert_has_lines(program.lines(), &["@Sys.init", "0;JMP", "(Sys.init$ret.0)"]);
}

#[test]
fn test_labels_keep_counting_after_bootstrap() {
    let source = sys_init("push constant 1\npush constant 1\neq\n");
    let options = TranslateOptions {
        bootstrap: true,
        terminate: true,
    };
    let mut translator = Translator::new();
    let program = translator.translate(&parse_vm(&source), &options).unwrap();
    // bootstrap call, then the comparison, then the end loop
    assert_eq!(translator.labels_issued(), 3);
    let labels = declared_labels(program.lines());
    assert!(labels.contains(&"END_EQUAL_1"));
    assert!(labels.contains(&"END_PROGRAM_2"));
}
