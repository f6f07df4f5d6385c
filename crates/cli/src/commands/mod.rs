pub mod config;
pub mod doctor;
pub mod encode_clients;

use serde::Serialize;

/// What a subcommand prints and the process exit code that goes with it.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandError<'a> {
    command: &'a str,
    status: &'static str,
    error_class: &'a str,
    message: String,
}

impl CommandResult {
    pub fn printed(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    /// Single-line JSON error payload so scripts can branch on `error_class`.
    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload =
            CommandError { command, status: "error", error_class, message: message.into() };
        let output = serde_json::to_string(&payload).unwrap_or_else(|_| {
            serde_json::json!({ "command": command, "status": "error", "error_class": error_class })
                .to_string()
        });
        Self { exit_code, output }
    }
}
