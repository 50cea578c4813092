/// Strip invisible characters and collapse inner whitespace, keeping the original casing.
pub(crate) fn normalize_defect_name(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn normalize_category(value: &str) -> String {
    normalize_defect_name(value).to_lowercase()
}
