use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::scalar_text;

/// Format output as tables using the tabled crate.
///
/// Scalar result fields go into a Field/Value table. Sweeps, surfaces and
/// cash-flow schedules get a table of their own.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                print_result(result);
                print_envelope_notes(map);
            } else {
                print_fields(map);
            }
        }
        _ => println!("{}", value),
    }
}

fn print_result(result: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in result {
        if is_tabular(val) {
            continue;
        }
        builder.push_record([key.clone(), cell_text(val)]);
    }
    println!("{}", Table::from(builder));

    if let (Some(Value::Array(rates)), Some(Value::Array(values))) =
        (result.get("discount_rates"), result.get("present_values"))
    {
        match result.get("maturities") {
            Some(Value::Array(maturities)) => print_surface(rates, maturities, values),
            _ => print_columns(&["discount_rate", "present_value"], &[rates, values]),
        }
    }

    if let Some(Value::Array(rows)) = result.get("cashflows") {
        if rows.iter().all(Value::is_object) && !rows.is_empty() {
            println!();
            print_rows(rows);
        }
    }
}

/// Arrays that get a dedicated table instead of a Field/Value row.
fn is_tabular(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|v| v.is_object() || v.is_array()) || items.len() > 24,
        _ => false,
    }
}

fn print_columns(headers: &[&str], columns: &[&Vec<Value>]) {
    let len = columns.iter().map(|c| c.len()).max().unwrap_or(0);
    let mut builder = Builder::default();
    builder.push_record(headers.iter().copied());
    for i in 0..len {
        let row: Vec<String> = columns
            .iter()
            .map(|c| c.get(i).map(scalar_text).unwrap_or_default())
            .collect();
        builder.push_record(row);
    }
    println!();
    println!("{}", Table::from(builder));
}

fn print_surface(rates: &[Value], maturities: &[Value], values: &[Value]) {
    let mut builder = Builder::default();
    let mut header = vec!["maturity \\ rate".to_string()];
    header.extend(rates.iter().map(scalar_text));
    builder.push_record(header);

    for (maturity, row) in maturities.iter().zip(values) {
        let mut record = vec![scalar_text(maturity)];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(scalar_text));
        }
        builder.push_record(record);
    }
    println!();
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);

    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(cell_text).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.clone(), cell_text(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
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

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Array(items) => items.iter().map(cell_text).collect::<Vec<_>>().join(", "),
        _ => scalar_text(value),
    }
}
