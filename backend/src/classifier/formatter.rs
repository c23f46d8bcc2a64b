pub const UNKNOWN_CONDITION: &str = "Unknown condition";

const MINOR_WORDS: [&str; 10] = ["and", "or", "the", "of", "in", "on", "at", "to", "for", "with"];

/// Turns a raw class identifier into display text.
///
/// `Corn_(maize)___Common_rust_` becomes `Corn (maize) - Common Rust`.
pub fn format_prediction(raw: &str) -> String {
    let spaced = raw.replacen("___", " - ", 1).replace('_', " ");
    let words: Vec<String> = spaced
        .split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            if MINOR_WORDS.contains(&lower.as_str()) {
                lower
            } else {
                capitalize(word)
            }
        })
        .collect();

    if words.is_empty() {
        return UNKNOWN_CONDITION.to_string();
    }
    words.join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
