use crate::domain::price::{default_unit, PriceSnapshot};
use crate::time::dates::parse_iso_datetime;
use serde_json::Value;

/// Converts loosely-typed feed rows into `PriceSnapshot`s.
///
/// Rows missing `commodity`, `market` or a parseable `date` are skipped. `unit` defaults
/// to "kg"; price fields must be JSON numbers to count.
pub fn normalise_snapshots(rows: &[Value]) -> Vec<PriceSnapshot> {
    let mut out = Vec::with_capacity(rows.len());
    let mut skipped: usize = 0;

    for row in rows {
        match normalise_row(row) {
            Some(snapshot) => out.push(snapshot),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, kept = out.len(), "skipped malformed snapshot rows");
    }
    out
}

fn normalise_row(row: &Value) -> Option<PriceSnapshot> {
    let obj = row.as_object()?;

    let text = |key: &str| -> Option<String> {
        match obj.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    };
    let number = |key: &str| obj.get(key).and_then(Value::as_f64);

    let date = text("date").and_then(|s| parse_iso_datetime(&s))?;

    Some(PriceSnapshot {
        commodity: text("commodity")?,
        market: text("market")?,
        date,
        unit: obj
            .get("unit")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(default_unit),
        min_price: number("minPrice"),
        max_price: number("maxPrice"),
        avg_price: number("avgPrice"),
        median_price: number("medianPrice"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_well_formed_rows_and_defaults_unit() {
        let rows = vec![json!({
            "commodity": "Maize",
            "market": "Kericho",
            "date": "2024-05-06",
            "avgPrice": 42.5
        })];
        let out = normalise_snapshots(&rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].unit, "kg");
        assert_eq!(out[0].avg_price, Some(42.5));
        assert_eq!(out[0].min_price, None);
    }

    #[test]
    fn skips_rows_missing_keys_or_with_bad_dates() {
        let rows = vec![
            json!({"market": "Kericho", "date": "2024-05-06", "avgPrice": 40}),
            json!({"commodity": "Maize", "market": "Kericho", "date": "yesterday"}),
            json!({"commodity": "Maize", "market": "Kericho"}),
            json!("not an object"),
            json!({
                "commodity": "Beans",
                "market": "Eldoret",
                "date": "2024-05-06T10:00:00",
                "unit": "bag_90kg",
                "minPrice": 7000,
                "maxPrice": 8000
            }),
        ];
        let out = normalise_snapshots(&rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].commodity, "Beans");
        assert_eq!(out[0].unit, "bag_90kg");
        assert_eq!(out[0].usable_price(), Some(7500.0));
    }

    #[test]
    fn string_prices_are_not_coerced() {
        let rows = vec![json!({
            "commodity": "Maize",
            "market": "Kericho",
            "date": "2024-05-06",
            "avgPrice": "40"
        })];
        let out = normalise_snapshots(&rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].avg_price, None);
    }
}
