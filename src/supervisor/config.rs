// Supervisor configuration
// The launch settings are baked in at build time; nothing is read at runtime

use crate::error::GateError;
use serde::Serialize;
use std::path::PathBuf;

const DEFAULT_WORKDIR: &str = "/opt/trustgate";
const DEFAULT_PATH: &str = "/opt/homebrew/bin:/usr/local/bin:/usr/bin:/bin:/usr/sbin:/sbin";
const DEFAULT_CHILD: &str = "/bin/bash ./scripts/watchdog.sh";

/// What the supervisor launches, and where
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupervisorConfig {
    /// Absolute directory the supervisor changes into before launch
    pub workdir: PathBuf,
    /// Value `PATH` is set to for the supervisor and the child
    pub path_env: String,
    /// Program (a path, not searched on `PATH`) followed by its arguments
    pub child_command: Vec<String>,
}

impl SupervisorConfig {
    /// The configuration compiled into this binary
    ///
    /// Each setting can be overridden when building by exporting
    /// `TRUSTGATE_WORKDIR`, `TRUSTGATE_PATH` or `TRUSTGATE_CHILD`
    /// (whitespace-separated command line).
    pub fn compiled_in() -> Self {
        let workdir = option_env!("TRUSTGATE_WORKDIR").unwrap_or(DEFAULT_WORKDIR);
        let path_env = option_env!("TRUSTGATE_PATH").unwrap_or(DEFAULT_PATH);
        let child = option_env!("TRUSTGATE_CHILD").unwrap_or(DEFAULT_CHILD);

        Self {
            workdir: PathBuf::from(workdir),
            path_env: path_env.to_string(),
            child_command: child.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Reject settings that cannot possibly launch anything
    pub fn validate(&self) -> Result<(), GateError> {
        if self.child_command.is_empty() {
            return Err(GateError::Config("child command is empty".to_string()));
        }
        if !self.workdir.is_absolute() {
            return Err(GateError::Config(format!(
                "workdir must be an absolute path, got {}",
                self.workdir.display()
            )));
        }
        if self.child_command.iter().any(|arg| arg.contains('\0'))
            || self.path_env.contains('\0')
        {
            return Err(GateError::Config(
                "settings must not contain NUL bytes".to_string(),
            ));
        }
        Ok(())
    }
}
