use core::fmt;
use std::{
    io,
    path::{Path, PathBuf},
    process::Command,
};

use log::info;
use thiserror::Error;

/// An external executable together with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Path of the executable.
    pub program: PathBuf,
    /// Arguments in the order they are passed.
    pub args: Vec<String>,
}

impl CommandLine {
    /// A command without arguments.
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: vec![],
        }
    }

    /// Appends a single argument.
    pub fn arg(mut self, arg: impl ToString) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// Appends `--<name> <value>`.
    pub fn option(self, name: &str, value: impl ToString) -> Self {
        self.arg(format!("--{name}")).arg(value)
    }

    /// Appends every argument of `args`.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.args.extend(args.into_iter().map(|a| a.to_string()));
        self
    }

    /// Value following `--<name>`, if present.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        let flag = format!("--{name}");
        self.args
            .iter()
            .position(|a| *a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Why an external command did not complete.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// The executable could not be started at all.
    #[error("failed to execute `{command}`: {source}")]
    Spawn {
        /// The rendered command line.
        command: String,
        /// Error reported by the operating system.
        #[source]
        source: io::Error,
    },
    /// The executable ran and reported a failure.
    #[error("`{command}` exited with {status}")]
    Failed {
        /// The rendered command line.
        command: String,
        /// Exit status as reported by the process.
        status: String,
    },
}

/// Runs external commands synchronously. Any failure is fatal for the caller.
pub trait Invoker {
    /// Runs `command` to completion. Only a successful exit is `Ok`.
    fn invoke(&mut self, command: &CommandLine) -> Result<(), InvocationError>;
}

/// Spawns the command as a child process and waits for it.
#[derive(Debug, Default)]
pub struct ProcessInvoker;

impl Invoker for ProcessInvoker {
    fn invoke(&mut self, command: &CommandLine) -> Result<(), InvocationError> {
        info!("{command}");
        let status = Command::new(&command.program)
            .args(&command.args)
            .status()
            .map_err(|source| InvocationError::Spawn {
                command: command.to_string(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(InvocationError::Failed {
                command: command.to_string(),
                status: status.to_string(),
            })
        }
    }
}

/// Logs and records commands without executing them.
#[derive(Debug, Default)]
pub struct DryRunInvoker {
    /// Every command seen so far, in call order.
    pub commands: Vec<CommandLine>,
}

impl Invoker for DryRunInvoker {
    fn invoke(&mut self, command: &CommandLine) -> Result<(), InvocationError> {
        info!("(dry run) {command}");
        self.commands.push(command.clone());
        Ok(())
    }
}
