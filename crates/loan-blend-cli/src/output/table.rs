use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, headers};

/// Render the result envelope as tables: scalar result fields first, then
/// every array of rows (candidate evaluations, schedule months) on its own.
pub fn print_table(value: &Value) {
    let Value::Object(envelope) = value else {
        println!("{}", cell(value));
        return;
    };

    if let Some(Value::Object(result)) = envelope.get("result") {
        print_fields(result);
        for (key, val) in result {
            if let Value::Array(rows) = val {
                if !rows.is_empty() {
                    println!("\n{}:", key);
                    print_rows(rows);
                }
            }
        }
    }

    if let Some(Value::Array(rows)) = envelope.get("results") {
        println!();
        print_rows(rows);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                println!("  - {}", cell(w));
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        if !val.is_array() {
            builder.push_record([key.as_str(), &cell(val)]);
        }
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    let Some(columns) = headers(rows) else {
        for item in rows {
            println!("{}", cell(item));
        }
        return;
    };

    let mut builder = Builder::default();
    builder.push_record(&columns);
    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = columns
                .iter()
                .map(|h| map.get(h.as_str()).map(cell).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}
