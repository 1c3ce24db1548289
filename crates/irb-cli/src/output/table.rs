use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::render_value;

/// Format the computation envelope as tables: scalar result fields first,
/// then one table per embedded array of records (e.g. the per-obligor
/// breakdown), then warnings and methodology.
pub fn print_table(value: &Value) {
    let envelope = match value.as_object() {
        Some(map) => map,
        None => {
            println!("{}", value);
            return;
        }
    };

    let result = envelope.get("result").unwrap_or(value);

    if let Value::Object(fields) = result {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in fields {
            if !matches!(val, Value::Array(arr) if arr.first().map(Value::is_object).unwrap_or(false))
            {
                builder.push_record([key.as_str(), &render_value(val)]);
            }
        }
        println!("{}", Table::from(builder));

        for (key, val) in fields {
            if let Value::Array(records) = val {
                if records.first().map(Value::is_object).unwrap_or(false) {
                    println!("\n{}:", key);
                    print_records(records);
                }
            }
        }
    } else {
        println!("{}", render_value(result));
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

fn print_records(records: &[Value]) {
    let headers: Vec<String> = match records.first() {
        Some(Value::Object(first)) => first.keys().cloned().collect(),
        _ => return,
    };

    let mut builder = Builder::default();
    builder.push_record(&headers);
    for record in records {
        if let Value::Object(map) = record {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(render_value).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}
