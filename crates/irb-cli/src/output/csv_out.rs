use serde_json::Value;
use std::io;

use super::render_value;

/// Write output as CSV to stdout. A per-obligor record array becomes a
/// row-per-obligor CSV; anything else becomes two-column field/value rows.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(fields) => {
            if let Some(Value::Array(records)) = fields.values().find(
                |v| matches!(v, Value::Array(arr) if arr.first().map(Value::is_object).unwrap_or(false)),
            ) {
                write_records(&mut wtr, records);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in fields {
                    let _ = wtr.write_record([key.as_str(), &render_value(val)]);
                }
            }
        }
        Value::Array(arr) => {
            for item in arr {
                let _ = wtr.write_record([&render_value(item)]);
            }
        }
        other => {
            let _ = wtr.write_record([&render_value(other)]);
        }
    }

    let _ = wtr.flush();
}

fn write_records(wtr: &mut csv::Writer<io::StdoutLock<'_>>, records: &[Value]) {
    let headers: Vec<&str> = match records.first() {
        Some(Value::Object(first)) => first.keys().map(|k| k.as_str()).collect(),
        _ => return,
    };
    let _ = wtr.write_record(&headers);

    for record in records {
        if let Value::Object(map) = record {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(render_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
