// src/commands/mod.rs
//! Command handlers for the jpm CLI

mod install;
mod list;
pub mod progress;
mod search;
mod update;

pub use install::{cmd_install, InstallOptions};
pub use list::cmd_list;
pub use search::cmd_search;
pub use update::cmd_update;

use anyhow::{bail, Result};
use jpm::{Config, Error};
use std::io::{self, BufRead, Write};

/// Refuse to run a network command under --offline
pub fn require_network(offline: bool, command: &str) -> Result<()> {
    if offline {
        println!("This command cannot be run offline");
        return Err(Error::Offline(command.to_string()).into());
    }
    Ok(())
}

/// Refuse to run when no Jenkins installation is present
pub fn require_jenkins(config: &Config) -> Result<()> {
    if !config.jenkins_installed() {
        println!("Jenkins is not installed!");
        bail!(
            "no Jenkins installation at {} (set JENKINS_HOME or jenkins_home in the config)",
            config.jenkins_home.display()
        );
    }
    Ok(())
}

/// Ask a y/n question on stdin
pub fn confirm(question: &str) -> Result<bool> {
    let stdin = io::stdin();
    Ok(ask_yes_no(question, &mut stdin.lock(), &mut io::stdout())?)
}

/// Ask until the answer is `y` or `n`; end of input counts as `n`
fn ask_yes_no<R: BufRead, W: Write>(question: &str, input: &mut R, output: &mut W) -> io::Result<bool> {
    loop {
        write!(output, "{question} [y/n] ")?;
        output.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            writeln!(output)?;
            return Ok(false);
        }
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(output, "Please answer y or n")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jpm::config::ConfigFile;
    use std::io::Cursor;
    use std::path::PathBuf;

    #[test]
    fn test_require_network() {
        assert!(require_network(false, "update").is_ok());
        let err = require_network(true, "update").unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Offline(_))));
    }

    #[test]
    fn test_require_jenkins() {
        let missing = Config::from_file(ConfigFile::default(), Some(PathBuf::from("/nonexistent")));
        assert!(require_jenkins(&missing).is_err());

        let temp = tempfile::tempdir().unwrap();
        let present = Config::from_file(ConfigFile::default(), Some(temp.path().to_path_buf()));
        assert!(require_jenkins(&present).is_ok());
    }

    #[test]
    fn test_ask_yes_no_retries_until_valid() {
        let mut input = Cursor::new("maybe\nY\n");
        let mut output = Vec::new();
        assert!(ask_yes_no("Overwrite?", &mut input, &mut output).unwrap());
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Please answer y or n"));
    }

    #[test]
    fn test_ask_yes_no_eof_is_no() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        assert!(!ask_yes_no("Overwrite?", &mut input, &mut output).unwrap());
    }
}
