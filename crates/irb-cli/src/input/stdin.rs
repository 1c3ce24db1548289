use serde_json::Value;
use std::io::{self, Read};

/// Read a piped JSON input (a `CapitalInput` or `SimulationInput` document)
/// from stdin. Returns `None` when stdin is an interactive terminal or the
/// pipe carries nothing but whitespace, so the caller can fall back to its
/// usage error.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse piped input as JSON: {}", e))?;
    Ok(Some(value))
}
