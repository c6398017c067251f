/// Normalise extracted concept text: trim surrounding whitespace, collapse
/// internal whitespace runs, preserve case. Spec §4.5 step 1.
pub fn normalize_label(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive comparison key for `find_node_by_label` (spec §4.2,
/// §8: `"Oat Milk" == "oat milk"`).
pub fn label_key(text: &str) -> String {
    normalize_label(text).to_lowercase()
}
