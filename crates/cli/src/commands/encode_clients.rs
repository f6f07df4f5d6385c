use std::fs;
use std::path::Path;

use dopgen_core::catalog::encode_inline_roster;
use serde_json::Value;

use crate::commands::CommandResult;

/// Prints the payload for `CLIENTS_JSON_B64` on success. Errors use the
/// structured JSON outcome.
pub fn run(input: &Path) -> CommandResult {
    let raw = match fs::read_to_string(input) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                "encode-clients",
                "read_input",
                format!("could not read `{}`: {error}", input.display()),
                2,
            );
        }
    };

    match serde_json::from_str::<Value>(raw.trim_start_matches('\u{feff}')) {
        Ok(Value::Object(_)) => {}
        Ok(_) => {
            return CommandResult::failure(
                "encode-clients",
                "roster_shape",
                "client roster must be a JSON object keyed by client id",
                3,
            );
        }
        Err(error) => {
            return CommandResult::failure(
                "encode-clients",
                "roster_json",
                format!("invalid JSON in `{}`: {error}", input.display()),
                3,
            );
        }
    }

    CommandResult::printed(encode_inline_roster(&raw))
}
