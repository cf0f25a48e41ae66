//! Lightweight text rules for news annotation: keyword topics and lead summaries.

/// Topic tags and the lowercase phrases that trigger them.
pub const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("inflation", &["inflation", "cpi", "prices", "costs"]),
    (
        "interest rates",
        &["interest rate", "rate hike", "rate cut", "fed funds"],
    ),
    ("jobs", &["employment", "jobless", "jobs report", "labor"]),
    ("earnings", &["earnings", "profits", "quarterly results"]),
    ("recession", &["recession", "slowdown", "contraction"]),
    ("growth", &["gdp", "growth", "expansion"]),
    ("stocks", &["stock", "equities", "market"]),
    ("bonds", &["bond", "treasury", "yield"]),
    ("central bank", &["federal reserve", "fed", "central bank"]),
    ("commodities", &["oil", "gold", "commodity", "energy"]),
];

/// Comma-separated, alphabetically sorted topics whose keywords occur in `text`.
pub fn infer_topics(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut hits: Vec<&str> = TOPIC_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(topic, _)| *topic)
        .collect();
    hits.sort_unstable();
    hits.dedup();
    hits.join(", ")
}

/// Extractive summary: leading sentences up to `max_chars`, cut on a word boundary.
pub fn lead_summary(text: &str, max_chars: usize) -> String {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= max_chars {
        return text;
    }

    let mut summary = String::new();
    for sentence in text.split_inclusive(|c: char| matches!(c, '.' | '!' | '?')) {
        if summary.chars().count() + sentence.chars().count() > max_chars {
            break;
        }
        summary.push_str(sentence);
    }
    if !summary.trim().is_empty() {
        return summary.trim().to_string();
    }

    // First sentence alone is too long: cut at the last space before the limit.
    let cut: String = text.chars().take(max_chars).collect();
    match cut.rfind(' ') {
        Some(idx) if idx > 0 => format!("{}...", &cut[..idx]),
        _ => format!("{}...", cut),
    }
}
