use serde_json::Value;

/// Pretty-print the full computation envelope as JSON. This is the default
/// format and the only one that preserves every field, including the raw
/// scenario-loss sequence from `simulate --raw`.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}
