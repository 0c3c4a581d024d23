#![allow(dead_code)]
use std::{fs, path::Path};

use shop_bench::invoker::{CommandLine, InvocationError, Invoker};
use shop_bench::orchestrator::result_path;

/// Records commands and fails the `fail_at`-th call (0-based).
#[derive(Default)]
pub struct FailingInvoker {
    pub fail_at: Option<usize>,
    pub commands: Vec<CommandLine>,
}

impl FailingInvoker {
    pub fn failing_at(n: usize) -> Self {
        Self {
            fail_at: Some(n),
            commands: vec![],
        }
    }
}

impl Invoker for FailingInvoker {
    fn invoke(&mut self, command: &CommandLine) -> Result<(), InvocationError> {
        if self.fail_at == Some(self.commands.len()) {
            return Err(InvocationError::Failed {
                command: command.to_string(),
                status: "exit status: 1".to_string(),
            });
        }
        self.commands.push(command.clone());
        Ok(())
    }
}

pub fn write_result(run_dir: &Path, row_path: &str, field: &str, value: i64) {
    let path = result_path(run_dir, row_path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        path,
        format!(r#"{{"Output": {{"Solution": {{"{field}": {value}}}}}}}"#),
    )
    .unwrap();
}

pub fn write_table(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}
