use serde_json::Value;
use std::collections::HashMap;

use crate::error::PxError;

/// A PxWeb statistical table flattened down to its region dimension.
///
/// `codes` preserves the table's own region order (ascending by the
/// `category.index` position), and `by_code` holds one observation per code.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub labels: HashMap<String, String>,
    pub codes: Vec<String>,
    pub by_code: HashMap<String, f64>,
}

/// Normalize a raw PxWeb response into a [`Dataset`].
///
/// The dimension root is the response itself when it carries a `dimension`
/// field, otherwise its `dataset` field (the two response variants the API
/// serves). The `Alue` dimension and a flat `value` array must be present,
/// else this fails with [`PxError::FormatMismatch`].
pub fn parse_dataset(px: &Value) -> Result<Dataset, PxError> {
    let root = if px.get("dimension").is_some() {
        px
    } else {
        px.get("dataset").ok_or(PxError::FormatMismatch)?
    };

    let dim = root
        .get("dimension")
        .and_then(|d| d.get("Alue"))
        .ok_or(PxError::FormatMismatch)?;
    let values = px
        .get("value")
        .or_else(|| root.get("value"))
        .and_then(Value::as_array)
        .ok_or(PxError::FormatMismatch)?;

    let category = dim.get("category").ok_or(PxError::FormatMismatch)?;
    let index = category
        .get("index")
        .and_then(Value::as_object)
        .ok_or(PxError::FormatMismatch)?;

    let mut labels = HashMap::new();
    if let Some(label_map) = category.get("label").and_then(Value::as_object) {
        for (code, label) in label_map {
            if let Some(text) = label.as_str() {
                labels.insert(code.clone(), text.to_string());
            }
        }
    }

    let mut codes: Vec<(String, f64)> = index
        .iter()
        .map(|(code, pos)| (code.clone(), pos.as_f64().unwrap_or(f64::MAX)))
        .collect();
    codes.sort_by(|a, b| a.1.total_cmp(&b.1));
    let codes: Vec<String> = codes.into_iter().map(|(code, _)| code).collect();

    let numbers: Vec<f64> = values.iter().map(coerce_number).collect();
    let by_code: HashMap<String, f64> = codes
        .iter()
        .enumerate()
        .map(|(i, code)| {
            (
                code.clone(),
                numbers.get(i).copied().unwrap_or(f64::NAN),
            )
        })
        .collect();

    Ok(Dataset {
        labels,
        codes,
        by_code,
    })
}

/// Coerce one observation to `f64`. Non-numeric input (including the API's
/// `"."`-style missing markers and nulls) becomes NaN, never zero; downstream
/// code treats non-finite values as missing.
fn coerce_number(v: &Value) -> f64 {
    match v {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}
