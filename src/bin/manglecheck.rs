//! Mangled name checker.
//!
//! Validates names against the mangling alphabet, or with `--backref` decodes
//! back-reference codes such as `QBb` into their distance.

use std::process::ExitCode;

use clap::Parser;
use dmangle::mangle::{decode_backref, first_invalid_char};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "manglecheck", version, about = "Check mangled symbol names")]
struct Cli {
    /// Names to check, or back-reference codes with --backref.
    #[arg(required = true)]
    names: Vec<String>,

    /// Decode each argument as a back-reference code.
    #[arg(long)]
    backref: bool,

    /// More log output; repeat for more.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Error, Debug, PartialEq, Eq)]
enum CheckError {
    #[error("`{name}`: invalid character {ch:?} at offset {offset}")]
    InvalidChar { name: String, offset: usize, ch: char },

    #[error("`{code}` is not a back-reference code")]
    InvalidBackref { code: String },

    #[error("`{code}`: {trailing} trailing bytes after the back-reference")]
    TrailingBytes { code: String, trailing: usize },
}

fn check_name(name: &str) -> Result<String, CheckError> {
    if let Some((offset, ch)) = first_invalid_char(name) {
        return Err(CheckError::InvalidChar {
            name: name.to_string(),
            offset,
            ch,
        });
    }
    log::debug!("{} is {} bytes", name, name.len());
    Ok(format!("{}: ok", name))
}

fn check_backref(code: &str) -> Result<String, CheckError> {
    let (distance, consumed) =
        decode_backref(code.as_bytes()).ok_or_else(|| CheckError::InvalidBackref {
            code: code.to_string(),
        })?;
    if consumed != code.len() {
        return Err(CheckError::TrailingBytes {
            code: code.to_string(),
            trailing: code.len() - consumed,
        });
    }
    Ok(format!("{}: distance {}", code, distance))
}

fn run(cli: &Cli) -> Vec<Result<String, CheckError>> {
    cli.names
        .iter()
        .map(|arg| if cli.backref { check_backref(arg) } else { check_name(arg) })
        .collect()
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let mut failed = 0;
    for result in run(&cli) {
        match result {
            Ok(line) => println!("{}", line),
            Err(err) => {
                eprintln!("Error: {}", err);
                failed += 1;
            }
        }
    }
    log::info!("checked {} arguments, {} failed", cli.names.len(), failed);

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
