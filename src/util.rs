/// Lowercases and collapses runs of whitespace. Blank input gives `None`.
pub fn normalize_name(input: &str) -> Option<String> {
    let normalized = input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

pub fn normalize_names(input: &[String]) -> Vec<String> {
    let mut names: Vec<String> = input.iter().filter_map(|n| normalize_name(n)).collect();
    names.sort();
    names.dedup();
    names
}
