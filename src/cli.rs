// File: ./src/cli.rs
//! Command-line parsing and help for the `dayplan` binary.
use crate::paths::parse_strict_date;
use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Today { json: bool },
    Remind { force: bool },
    Add { text: String, date: Option<NaiveDate> },
    Move { path: String, line: usize, date: NaiveDate },
    Generate,
    Pending,
    Config,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub root: Option<PathBuf>,
    pub vault: Option<PathBuf>,
    pub verbose: bool,
    pub command: Command,
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate> {
    parse_strict_date(raw).ok_or_else(|| anyhow!("Invalid date '{}', expected YYYY-MM-DD", raw))
}

/// Parses `args` without the binary name.
pub fn parse_args(args: &[String]) -> Result<Args> {
    let mut root = None;
    let mut vault = None;
    let mut verbose = false;
    let mut json = false;
    let mut force = false;
    let mut date = None;
    let mut positional: Vec<String> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--root" | "-r" => {
                i += 1;
                root = Some(args.get(i).context("--root needs a path")?.into());
            }
            "--vault" => {
                i += 1;
                vault = Some(args.get(i).context("--vault needs a path")?.into());
            }
            "--date" | "-d" => {
                i += 1;
                date = Some(parse_date_arg(args.get(i).context("--date needs a value")?)?);
            }
            "-v" | "--verbose" => verbose = true,
            "--json" => json = true,
            "--force" | "-f" => force = true,
            "-h" | "--help" => positional.insert(0, "help".to_string()),
            arg if arg.starts_with("--") => bail!("Unknown option: {}", arg),
            arg => positional.push(arg.to_string()),
        }
        i += 1;
    }

    let mut rest = positional.into_iter();
    let command = match rest.next().as_deref() {
        None | Some("today") => Command::Today { json },
        Some("remind") => Command::Remind { force },
        Some("add") => {
            let text = rest.collect::<Vec<_>>().join(" ");
            if text.trim().is_empty() {
                bail!("add needs the task text");
            }
            Command::Add { text, date }
        }
        Some("move") => {
            let (Some(path), Some(line), Some(target)) = (rest.next(), rest.next(), rest.next())
            else {
                bail!("move needs <path> <line> <date>");
            };
            let line = line
                .parse::<usize>()
                .with_context(|| format!("Invalid line number '{}'", line))?;
            Command::Move {
                path,
                line,
                date: parse_date_arg(&target)?,
            }
        }
        Some("generate") => Command::Generate,
        Some("pending") => Command::Pending,
        Some("config") => Command::Config,
        Some("help") => Command::Help,
        Some(other) => bail!("Unknown command: {}", other),
    };

    Ok(Args {
        root,
        vault,
        verbose,
        command,
    })
}

pub fn print_help(binary_name: &str) {
    println!(
        "Dayplan v{} - Daily-note task reminders for a markdown vault",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [OPTIONS] [COMMAND]", binary_name);
    println!();
    println!("COMMANDS:");
    println!("    today [--json]              Show today's open tasks (default)");
    println!("    remind [--force]            Run the daily reminder once");
    println!("    add <text...> [--date D]    Add '- [ ] text' to the daily note for D (default today)");
    println!("    move <path> <line> <D>      Move the task at path:line (0-based) to date D");
    println!("    generate                    Write today's pending recurring tasks");
    println!("    pending                     List today's pending recurring tasks");
    println!("    config                      Show the config file path and values");
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and logs.");
    println!("    --vault <path>        Vault directory (overrides 'vault_path' in the config).");
    println!("    -v, --verbose         Log debug output to the terminal.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("Dates are YYYY-MM-DD (or YYYY/MM/DD).");
}
