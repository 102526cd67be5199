use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use hackvm::{Command, TranslateOptions, Translator};

#[derive(Parser)]
#[command(name = "hackvm")]
#[command(about = "Hack VM translator and assembler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate VM code to Hack assembly
    Translate {
        #[arg(help = "Input .vm file or directory of .vm files")]
        input: PathBuf,

        #[arg(short, long, help = "Output .asm file")]
        output: Option<PathBuf>,

        #[command(flatten)]
        codegen: CodegenArgs,
    },
    /// Assemble Hack assembly to binary machine code
    Assemble {
        #[arg(help = "Input .asm file")]
        input: PathBuf,

        #[arg(short, long, help = "Output .hack file")]
        output: Option<PathBuf>,
    },
    /// Translate and assemble in one go, keeping the intermediate .asm
    Build {
        #[arg(help = "Input .vm file or directory of .vm files")]
        input: PathBuf,

        #[arg(short, long, help = "Output .hack file")]
        output: Option<PathBuf>,

        #[command(flatten)]
        codegen: CodegenArgs,
    },
}

#[derive(Args)]
struct CodegenArgs {
    #[arg(long, help = "Prepend bootstrap code (SP = 256, call Sys.init)")]
    bootstrap: bool,

    #[arg(long, help = "Do not append the end-of-program loop")]
    no_terminate: bool,
}

impl CodegenArgs {
    fn options(&self) -> TranslateOptions {
        TranslateOptions {
            bootstrap: self.bootstrap,
            terminate: !self.no_terminate,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Translate {
            input,
            output,
            codegen,
        } => {
            let output = output.unwrap_or_else(|| default_output(&input, "asm"));
            let asm = translate_input(&input, &codegen.options())?;
            write_output(&output, &asm)?;
            println!("Translated {} -> {}", input.display(), output.display());
        }
        Commands::Assemble { input, output } => {
            let output = output.unwrap_or_else(|| default_output(&input, "hack"));
            let source = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let program = hackvm::assemble(&source)
                .with_context(|| format!("Assembly of {} failed", input.display()))?;
            write_output(&output, &program.to_text())?;
            println!(
                "Assembled {} -> {} ({} words)",
                input.display(),
                output.display(),
                program.len()
            );
        }
        Commands::Build {
            input,
            output,
            codegen,
        } => {
            let asm_path = default_output(&input, "asm");
            let output = output.unwrap_or_else(|| default_output(&input, "hack"));

            let asm = translate_input(&input, &codegen.options())?;
            write_output(&asm_path, &asm)?;

            let program = hackvm::assemble(&asm)
                .with_context(|| format!("Assembly of {} failed", asm_path.display()))?;
            write_output(&output, &program.to_text())?;
            println!(
                "Built {} -> {} -> {} ({} words)",
                input.display(),
                asm_path.display(),
                output.display(),
                program.len()
            );
        }
    }

    Ok(())
}

/// Translate a single `.vm` file, or every `.vm` file of a directory in name
/// order, within one translation session.
fn translate_input(input: &Path, options: &TranslateOptions) -> Result<String> {
    let mut commands = Vec::new();
    for path in vm_sources(input)? {
        tracing::debug!(path = %path.display(), "reading VM source");
        commands.extend(read_vm(&path)?);
    }

    let program = Translator::new()
        .translate(&commands, options)
        .with_context(|| format!("Translation of {} failed", input.display()))?;
    Ok(program.to_text())
}

fn vm_sources(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.is_dir() {
        if input.extension().is_none_or(|e| e != "vm") {
            anyhow::bail!("{}: expected a .vm file or a directory", input.display());
        }
        return Ok(vec![input.to_path_buf()]);
    }

    let mut sources = Vec::new();
    for entry in
        fs::read_dir(input).with_context(|| format!("Failed to read {}", input.display()))?
    {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == "vm") {
            sources.push(path);
        }
    }
    if sources.is_empty() {
        anyhow::bail!("{}: no .vm files found", input.display());
    }
    sources.sort();
    Ok(sources)
}

fn read_vm(path: &Path) -> Result<Vec<Command>> {
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .with_context(|| format!("{}: missing file name", path.display()))?;
    hackvm::vm::parse(&source, &file_name)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// `Foo.vm` -> `Foo.<ext>`; directory `Prog/` -> `Prog/Prog.<ext>`.
fn default_output(input: &Path, ext: &str) -> PathBuf {
    if input.is_dir() {
        let name = input
            .file_name()
            .map_or_else(|| "out".into(), |n| n.to_string_lossy());
        input.join(format!("{name}.{ext}"))
    } else {
        input.with_extension(ext)
    }
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)
        .with_context(|| format!("Failed to write output to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_swaps_extension() {
        assert_eq!(
            default_output(Path::new("prog/Main.vm"), "asm"),
            PathBuf::from("prog/Main.asm")
        );
        assert_eq!(
            default_output(Path::new("Max.asm"), "hack"),
            PathBuf::from("Max.hack")
        );
    }

    #[test]
    fn test_codegen_flags_map_to_options() {
        let args = CodegenArgs {
            bootstrap: true,
            no_terminate: true,
        };
        let options = args.options();
        assert!(options.bootstrap);
        assert!(!options.terminate);
    }

    /// Fresh scratch directory under the system temp dir, unique per test.
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "hackvm-cli-{}-{name}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_directory_translated_in_name_order_in_one_session() {
        let dir = scratch_dir("order");
        fs::write(dir.join("B.vm"), "push constant 2\npop static 0\n").unwrap();
        fs::write(dir.join("A.vm"), "push constant 1\npop static 0\n").unwrap();
        fs::write(dir.join("notes.txt"), "not vm code\n").unwrap();

        let asm = translate_input(&dir, &TranslateOptions::default()).unwrap();
        let a = asm.find("@A.0").expect("A.vm statics");
        let b = asm.find("@B.0").expect("B.vm statics");
        assert!(a < b, "A.vm must come before B.vm:\n{asm}");
        assert_eq!(asm.matches("(END_PROGRAM_").count(), 1);
        assert!(asm.contains("(END_PROGRAM_0)"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_vm_sources_rejects_non_vm_file() {
        let dir = scratch_dir("non-vm");
        let path = dir.join("Main.txt");
        fs::write(&path, "push constant 1\n").unwrap();

        let err = vm_sources(&path).unwrap_err();
        assert!(err.to_string().contains("expected a .vm file"), "{err}");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_vm_sources_rejects_directory_without_vm_files() {
        let dir = scratch_dir("empty");

        let err = vm_sources(&dir).unwrap_err();
        assert!(err.to_string().contains("no .vm files found"), "{err}");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_cli_parses_build() {
        let cli = Cli::try_parse_from(["hackvm", "build", "Prog", "--bootstrap"]).unwrap();
        match cli.command {
            Commands::Build { input, codegen, .. } => {
                assert_eq!(input, PathBuf::from("Prog"));
                assert!(codegen.bootstrap);
                assert!(!codegen.no_terminate);
            }
            _ => panic!("expected build"),
        }
    }
}
