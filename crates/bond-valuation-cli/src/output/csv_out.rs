use serde_json::{Map, Value};
use std::io;

use super::scalar_text;

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// Sweeps become `discount_rate,present_value` rows, surfaces are written in
/// long form (`time_to_maturity,discount_rate,present_value`) and schedules
/// one row per cash flow. Anything else is a two-column field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => write_result(&mut wtr, map),
        _ => {
            let _ = wtr.write_record([scalar_text(result)]);
        }
    }

    let _ = wtr.flush();
}

fn write_result(wtr: &mut StdoutWriter<'_>, map: &Map<String, Value>) {
    if let (Some(Value::Array(rates)), Some(Value::Array(values))) =
        (map.get("discount_rates"), map.get("present_values"))
    {
        match map.get("maturities") {
            Some(Value::Array(maturities)) => write_surface(wtr, rates, maturities, values),
            _ => {
                let _ = wtr.write_record(["discount_rate", "present_value"]);
                for (rate, pv) in rates.iter().zip(values) {
                    let _ = wtr.write_record([scalar_text(rate), scalar_text(pv)]);
                }
            }
        }
        return;
    }

    if let Some(Value::Array(rows)) = map.get("cashflows") {
        if !rows.is_empty() && rows.iter().all(Value::is_object) {
            write_rows(wtr, rows);
            return;
        }
    }

    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.clone(), field_text(val)]);
    }
}

fn write_surface(wtr: &mut StdoutWriter<'_>, rates: &[Value], maturities: &[Value], values: &[Value]) {
    let _ = wtr.write_record(["time_to_maturity", "discount_rate", "present_value"]);
    for (maturity, row) in maturities.iter().zip(values) {
        if let Value::Array(cells) = row {
            for (rate, pv) in rates.iter().zip(cells) {
                let _ = wtr.write_record([scalar_text(maturity), scalar_text(rate), scalar_text(pv)]);
            }
        }
    }
}

fn write_rows(wtr: &mut StdoutWriter<'_>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for item in rows {
        if let Value::Object(row) = item {
            let record: Vec<String> = headers
                .iter()
                .map(|h| row.get(*h).map(scalar_text).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&record);
        }
    }
}

fn field_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join(";"),
        _ => scalar_text(value),
    }
}
