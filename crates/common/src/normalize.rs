// Empty-string normalization for nullable text fields.
//
// An explicitly-empty string is never stored: it collapses to `None`.

/// Collapse `Some("")` to `None`; everything else passes through.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}

/// Deduplicate a list while keeping first-seen order.
pub fn dedup_in_order<T: PartialEq>(values: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}
