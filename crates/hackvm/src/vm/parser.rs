use crate::{Error, Result};

use super::{ArithmeticOp, Command, StackOp};

/// Parse VM source text into commands.
///
/// Format (one command per line):
/// ```text
/// // Comments start with //
/// push constant 7
/// add
/// label LOOP
/// function Main.main 2
/// call Math.max 2
/// return
/// ```
///
/// `file_name` is the source file's stem; it scopes the `static` segment of
/// every access parsed from this text.
pub fn parse(source: &str, file_name: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();

    for (line_num, line) in source.lines().enumerate() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }
        let command = parse_line(line, file_name).map_err(|e| e.at_line(line_num + 1))?;
        commands.push(command);
    }

    tracing::debug!(file = file_name, commands = commands.len(), "parsed VM source");
    Ok(commands)
}

fn strip_comment(line: &str) -> &str {
    line.split_once("//").map_or(line, |(code, _)| code)
}

fn parse_line(line: &str, file_name: &str) -> Result<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (&keyword, operands) = tokens
        .split_first()
        .ok_or_else(|| malformed("empty command"))?;

    match keyword {
        "push" | "pop" => {
            let [segment, index] = expect_operands::<2>(keyword, operands)?;
            Ok(Command::Access {
                op: keyword.parse::<StackOp>()?,
                segment: segment.parse()?,
                index: parse_number(index)?,
                file: file_name.to_string(),
            })
        }
        "label" | "goto" | "if-goto" => {
            let [label] = expect_operands::<1>(keyword, operands)?;
            let label = label.to_string();
            Ok(match keyword {
                "label" => Command::Label(label),
                "goto" => Command::Goto(label),
                _ => Command::IfGoto(label),
            })
        }
        "function" => {
            let [name, locals] = expect_operands::<2>(keyword, operands)?;
            Ok(Command::function(*name, parse_number(locals)?))
        }
        "call" => {
            let [name, args] = expect_operands::<2>(keyword, operands)?;
            Ok(Command::call(*name, parse_number(args)?))
        }
        "return" => {
            expect_operands::<0>(keyword, operands)?;
            Ok(Command::Return)
        }
        _ => {
            expect_operands::<0>(keyword, operands)?;
            Ok(Command::Arithmetic(keyword.parse::<ArithmeticOp>()?))
        }
    }
}

fn expect_operands<'a, const N: usize>(
    keyword: &str,
    operands: &'a [&'a str],
) -> Result<&'a [&'a str; N]> {
    operands.try_into().map_err(|_| {
        malformed(format!(
            "'{keyword}' expects {N} operand(s), got {}",
            operands.len()
        ))
    })
}

fn parse_number<T: std::str::FromStr>(token: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| malformed(format!("invalid number '{token}'")))
}

fn malformed(message: impl Into<String>) -> Error {
    Error::Parse {
        line: 0,
        message: message.into(),
    }
}
