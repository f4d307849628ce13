use serde_json::Value;

/// Headline figure for each command, in priority order.
const HEADLINE_KEYS: [&str; 8] = [
    "total_roc",
    "estimated_rent",
    "trailing_12m_average",
    "slope",
    "basic_coc",
    "first_year_roi",
    "monthly_payment",
    "interest_rate",
];

/// Print just the headline value of the result.
///
/// For the market table this is one `region_id<TAB>value` line per region.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(Value::Array(rows)) = result_obj.get("metrics") {
        for row in rows {
            let id = row.get("region_id").map(format_minimal).unwrap_or_default();
            let headline = headline(row).unwrap_or_default();
            println!("{}\t{}", id, headline);
        }
        return;
    }

    match headline(result_obj) {
        Some(s) => println!("{}", s),
        None => println!("{}", format_minimal(result_obj)),
    }
}

fn headline(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    HEADLINE_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|v| !v.is_null())
        .map(format_minimal)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
