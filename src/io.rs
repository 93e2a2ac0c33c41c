//! Script input and report output for the command-line driver.
//!
//! A script holds one operation per line. `#` starts a comment and blank lines
//! are skipped, but line numbers still count them so errors point at the file.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::constants::KB;
use crate::error::{ScriptError, SimError};
use crate::policy::{FitStrategy, ReplacementPolicy};

/// A command parsed from the whitespace-separated tokens of one script line.
pub trait Command: Sized {
    fn from_tokens(tokens: &[&str]) -> Result<Self, String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PagingCommand {
    Alloc {
        process_id: String,
        size: usize,
        policy: ReplacementPolicy,
    },
    Access {
        process_id: String,
        page: usize,
        policy: ReplacementPolicy,
    },
    Free {
        process_id: String,
    },
    /// Report the next eviction under a policy named at run time
    Victim {
        policy: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SegmentCommand {
    Alloc {
        process_id: String,
        name: String,
        size: usize,
        strategy: FitStrategy,
    },
    Access {
        process_id: String,
        name: String,
        offset: usize,
    },
    /// Without a name every segment of the process goes
    Free {
        process_id: String,
        name: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum VmCommand {
    Alloc {
        process_id: String,
        size: usize,
    },
    Access {
        process_id: String,
        address: usize,
        write: bool,
        policy: ReplacementPolicy,
    },
    Free {
        process_id: String,
    },
    Victim {
        policy: String,
    },
}

impl Command for PagingCommand {
    fn from_tokens(tokens: &[&str]) -> Result<Self, String> {
        match tokens {
            ["alloc", pid, size] | ["alloc", pid, size, _] => Ok(PagingCommand::Alloc {
                process_id: pid.to_string(),
                size: parse_size(size)?,
                policy: parse_policy(tokens.get(3))?,
            }),
            ["access", pid, page] | ["access", pid, page, _] => Ok(PagingCommand::Access {
                process_id: pid.to_string(),
                page: parse_number(page, "page number")?,
                policy: parse_policy(tokens.get(3))?,
            }),
            ["free", pid] => Ok(PagingCommand::Free {
                process_id: pid.to_string(),
            }),
            ["victim", policy] => Ok(PagingCommand::Victim {
                policy: policy.to_string(),
            }),
            _ => Err(usage(
                tokens,
                "alloc PID SIZE [POLICY] | access PID PAGE [POLICY] | free PID | victim POLICY",
            )),
        }
    }
}

impl Command for SegmentCommand {
    fn from_tokens(tokens: &[&str]) -> Result<Self, String> {
        match tokens {
            ["alloc", pid, name, size] | ["alloc", pid, name, size, _] => {
                let strategy = match tokens.get(4) {
                    Some(token) => token.parse::<FitStrategy>().map_err(|e: SimError| e.to_string())?,
                    None => FitStrategy::default(),
                };
                Ok(SegmentCommand::Alloc {
                    process_id: pid.to_string(),
                    name: name.to_string(),
                    size: parse_size(size)?,
                    strategy,
                })
            }
            ["access", pid, name, offset] => Ok(SegmentCommand::Access {
                process_id: pid.to_string(),
                name: name.to_string(),
                offset: parse_number(offset, "offset")?,
            }),
            ["free", pid] | ["free", pid, _] => Ok(SegmentCommand::Free {
                process_id: pid.to_string(),
                name: tokens.get(2).map(|name| name.to_string()),
            }),
            _ => Err(usage(
                tokens,
                "alloc PID NAME SIZE [FIT] | access PID NAME OFFSET | free PID [NAME]",
            )),
        }
    }
}

impl Command for VmCommand {
    fn from_tokens(tokens: &[&str]) -> Result<Self, String> {
        match tokens {
            ["alloc", pid, size] => Ok(VmCommand::Alloc {
                process_id: pid.to_string(),
                size: parse_size(size)?,
            }),
            [op @ ("read" | "write"), pid, address] | [op @ ("read" | "write"), pid, address, _] => {
                Ok(VmCommand::Access {
                    process_id: pid.to_string(),
                    address: parse_number(address, "virtual address")?,
                    write: *op == "write",
                    policy: parse_policy(tokens.get(3))?,
                })
            }
            ["free", pid] => Ok(VmCommand::Free {
                process_id: pid.to_string(),
            }),
            ["victim", policy] => Ok(VmCommand::Victim {
                policy: policy.to_string(),
            }),
            _ => Err(usage(
                tokens,
                "alloc PID SIZE | read PID ADDR [POLICY] | write PID ADDR [POLICY] | free PID | victim POLICY",
            )),
        }
    }
}

/// One parsed script line. `text` is the line without its comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine<C> {
    pub line: usize,
    pub text: String,
    pub command: C,
}

pub fn parse_script<C: Command>(content: &str) -> Result<Vec<ScriptLine<C>>, ScriptError> {
    let mut script = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let text = raw.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let command = C::from_tokens(&tokens).map_err(|message| ScriptError::parse(line, message))?;
        script.push(ScriptLine {
            line,
            text: text.to_string(),
            command,
        });
    }
    Ok(script)
}

pub fn read_script<C: Command, P: AsRef<Path>>(path: P) -> Result<Vec<ScriptLine<C>>, ScriptError> {
    let content = fs::read_to_string(path.as_ref())?;
    parse_script(&content)
}

/// Pretty JSON to `path`, or to stdout when no path is given.
pub fn write_report<T: Serialize>(path: Option<&Path>, report: &T) -> Result<(), ScriptError> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    match path {
        Some(path) => fs::write(path, json)?,
        None => io::stdout().lock().write_all(json.as_bytes())?,
    }
    Ok(())
}

/// Byte count, optionally with a `K`/`KB` suffix meaning 1024 bytes.
fn parse_size(token: &str) -> Result<usize, String> {
    let upper = token.to_ascii_uppercase();
    let (digits, unit) = match upper.strip_suffix("KB").or_else(|| upper.strip_suffix('K')) {
        Some(digits) => (digits, KB),
        None => (upper.as_str(), 1),
    };
    let value = parse_number(digits, "size").map_err(|_| format!("invalid size: {token}"))?;
    value
        .checked_mul(unit)
        .ok_or_else(|| format!("size too large: {token}"))
}

fn parse_number(token: &str, what: &str) -> Result<usize, String> {
    token
        .parse()
        .map_err(|_| format!("invalid {what}: {token}"))
}

fn parse_policy(token: Option<&&str>) -> Result<ReplacementPolicy, String> {
    match token {
        Some(token) => token.parse().map_err(|e: SimError| e.to_string()),
        None => Ok(ReplacementPolicy::default()),
    }
}

fn usage(tokens: &[&str], expected: &str) -> String {
    format!("unrecognized operation '{}', expected {expected}", tokens.join(" "))
}
