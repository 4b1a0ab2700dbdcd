use serde_json::{json, Map, Value};
use std::collections::HashSet;

use crate::workbook::{SheetError, Workbook};

/// Convert the worksheet into `{"products": [...]}`: row 1 is the header,
/// each later row becomes one object keyed by header text. Cells carrying an
/// embedded image export as `""` rather than pixel data; rows with no values
/// at all are dropped.
pub fn export_products(wb: &Workbook) -> Result<Value, SheetError> {
    let (max_col, max_row) = wb.dimensions()?;

    let mut headers = Vec::new();
    for col in 1..=max_col {
        if let Some(text) = wb.cell_text(col, 1)? {
            headers.push((col, text));
        }
    }

    let image_cells: HashSet<(u32, u32)> =
        wb.images()?.iter().map(|img| (img.col, img.row)).collect();

    let mut products = Vec::new();
    for row in 2..=max_row {
        let mut object = Map::new();
        let mut any_value = false;
        for (col, header) in &headers {
            let value = if image_cells.contains(&(*col, row)) {
                any_value = true;
                Value::String(String::new())
            } else {
                match wb.cell_text(*col, row)? {
                    Some(text) => {
                        any_value = true;
                        cell_value(&text)
                    }
                    None => Value::Null,
                }
            };
            object.insert(header.clone(), value);
        }
        if any_value {
            products.push(Value::Object(object));
        }
    }

    Ok(json!({ "products": products }))
}

/// Preserve numeric cells as JSON numbers; everything else stays text.
/// Values with a leading zero (padded GTINs) must survive as text.
fn cell_value(text: &str) -> Value {
    if text.len() > 1 && text.starts_with('0') && !text.starts_with("0.") {
        return Value::String(text.to_string());
    }
    if let Ok(n) = text.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = text.parse::<f64>() {
        if f.is_finite() {
            return Value::from(f);
        }
    }
    Value::String(text.to_string())
}
