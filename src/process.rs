//! Subprocess execution with logged output.

use crate::error::{BunenvError, Result};
use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Sender};
use std::thread;
use tracing::{debug, error, info};

const MAX_PART_LEN: usize = 45;

/// Short, quoted form of a command line for log messages.
///
/// Parts longer than 45 characters keep their first and last 20 characters.
/// Parts with whitespace or quotes are wrapped in double quotes.
pub fn describe_command(cmd: &[String]) -> String {
    cmd.iter()
        .map(|part| describe_part(part))
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe_part(part: &str) -> String {
    let chars: Vec<char> = part.chars().collect();
    let mut part = if chars.len() > MAX_PART_LEN {
        let head: String = chars[..20].iter().collect();
        let tail: String = chars[chars.len() - 20..].iter().collect();
        format!("{head}...{tail}")
    } else {
        part.to_string()
    };
    if part.contains([' ', '\n', '"', '\'']) {
        part = format!("\"{}\"", part.replace('"', "\\\""));
    }
    part
}

/// Run `cmd` to completion, stderr merged into the captured output.
///
/// Lines are read from both pipes as the command produces them. With
/// `show_stdout` each line is logged at info level as it arrives, and the
/// whole output again at error level if the command fails. Returns the output
/// lines on success.
pub fn run_command(cmd: &[String], show_stdout: bool) -> Result<Vec<String>> {
    let desc = describe_command(cmd);
    debug!(" ** Running command {}", desc);

    let Some((program, args)) = cmd.split_first() else {
        return Err(anyhow::anyhow!("Empty command").into());
    };

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            error!("Error {} while executing command {}", e, desc);
            e
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (tx, rx) = mpsc::channel::<String>();

    let lines = thread::scope(|scope| {
        if let Some(pipe) = stdout {
            let tx = tx.clone();
            scope.spawn(move || forward_lines(pipe, tx));
        }
        if let Some(pipe) = stderr {
            let tx = tx.clone();
            scope.spawn(move || forward_lines(pipe, tx));
        }
        drop(tx);

        let mut lines = Vec::new();
        for line in rx {
            if show_stdout {
                info!("{}", line);
            }
            lines.push(line);
        }
        lines
    });

    let status = child.wait()?;
    if !status.success() {
        if show_stdout {
            for line in &lines {
                error!("{}", line);
            }
        }
        return Err(BunenvError::CommandFailed {
            command: desc,
            code: status.code().unwrap_or(-1),
        });
    }

    Ok(lines)
}

/// Send each line of `pipe` down `tx` until EOF.
fn forward_lines(pipe: impl Read, tx: Sender<String>) {
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                if tx.send(line).is_err() {
                    break;
                }
            }
        }
    }
}
