use serde_json::Value;
use std::io;

use super::{cell, headers};

/// Write output as CSV to stdout. Row arrays (`results`) are written with
/// a header line; otherwise the scalar result fields become field,value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let rows = value.get("results").and_then(Value::as_array);
    let result = value.get("result").and_then(Value::as_object);

    match (rows, result) {
        (Some(rows), _) => write_rows(&mut wtr, rows),
        (None, Some(result)) => {
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in result {
                if let Value::Array(items) = val {
                    for (i, item) in items.iter().enumerate() {
                        let _ = wtr.write_record([format!("{key}[{i}]"), cell(item)]);
                    }
                } else {
                    let _ = wtr.write_record([key.as_str(), &cell(val)]);
                }
            }
        }
        (None, None) => {
            let _ = wtr.write_record([cell(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) {
    let Some(columns) = headers(rows) else {
        for item in rows {
            let _ = wtr.write_record([cell(item)]);
        }
        return;
    };

    let _ = wtr.write_record(&columns);
    for item in rows {
        if let Value::Object(map) = item {
            let record: Vec<String> = columns
                .iter()
                .map(|h| map.get(h.as_str()).map(cell).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&record);
        }
    }
}
