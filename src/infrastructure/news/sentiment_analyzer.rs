//! Sentiment scoring for market news: VADER compound score plus a
//! finance keyword boost.
//!
//! ```rust,ignore
//! let analyzer = SentimentAnalyzer::new();
//! assert!(analyzer.analyze("Stocks rally to a record high") > 0.0);
//! ```

use vader_sentiment::SentimentIntensityAnalyzer;

/// Market jargon VADER's general lexicon underweights.
const BULLISH_KEYWORDS: &[(&str, f64)] = &[
    ("surge", 0.4),
    ("rally", 0.4),
    ("rallies", 0.4),
    ("soar", 0.5),
    ("bullish", 0.5),
    ("record high", 0.4),
    ("all-time high", 0.5),
    ("beats expectations", 0.4),
    ("rate cut", 0.3),
    ("soft landing", 0.4),
    ("cooling inflation", 0.3),
    ("upgrade", 0.3),
    ("rebound", 0.3),
    ("strong jobs", 0.3),
];

const BEARISH_KEYWORDS: &[(&str, f64)] = &[
    ("crash", -0.5),
    ("plunge", -0.5),
    ("tumble", -0.4),
    ("sell-off", -0.4),
    ("selloff", -0.4),
    ("bearish", -0.5),
    ("recession", -0.4),
    ("downgrade", -0.3),
    ("default", -0.4),
    ("layoffs", -0.3),
    ("misses expectations", -0.4),
    ("rate hike", -0.2),
    ("hot inflation", -0.3),
    ("panic", -0.4),
    ("fear", -0.3),
];

/// Score at or above which text reads as positive; the negative threshold mirrors it.
pub const POLARITY_THRESHOLD: f64 = 0.05;

pub struct SentimentAnalyzer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }

    fn financial_boost(&self, text: &str) -> f64 {
        let text_lower = text.to_lowercase();
        BULLISH_KEYWORDS
            .iter()
            .chain(BEARISH_KEYWORDS)
            .filter(|(keyword, _)| text_lower.contains(keyword))
            .map(|(_, score)| score)
            .sum()
    }

    /// Sentiment in `[-1, 1]`: VADER compound plus half the keyword boost.
    pub fn analyze(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }

        let scores = self.analyzer.polarity_scores(text);
        let combined = scores["compound"] + self.financial_boost(text) * 0.5;
        combined.clamp(-1.0, 1.0)
    }

    /// `POSITIVE`, `NEGATIVE` or `NEUTRAL` for a score from [`Self::analyze`].
    pub fn label_for(score: f64) -> &'static str {
        if score >= POLARITY_THRESHOLD {
            "POSITIVE"
        } else if score <= -POLARITY_THRESHOLD {
            "NEGATIVE"
        } else {
            "NEUTRAL"
        }
    }
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullish_headlines() {
        let analyzer = SentimentAnalyzer::new();
        for headline in [
            "Stocks rally to a record high as inflation cools",
            "S&P 500 rebounds after strong jobs data",
            "Earnings beats expectations, shares soar",
        ] {
            let score = analyzer.analyze(headline);
            assert!(score > 0.0, "Expected positive score for '{}', got {}", headline, score);
        }
    }

    #[test]
    fn test_bearish_headlines() {
        let analyzer = SentimentAnalyzer::new();
        for headline in [
            "Stocks plunge as recession fears mount",
            "Market panic triggers broad sell-off",
            "Bank announces layoffs after downgrade",
        ] {
            let score = analyzer.analyze(headline);
            assert!(score < 0.0, "Expected negative score for '{}', got {}", headline, score);
        }
    }

    #[test]
    fn test_empty_text() {
        let analyzer = SentimentAnalyzer::new();
        assert_eq!(analyzer.analyze(""), 0.0);
        assert_eq!(analyzer.analyze("   "), 0.0);
    }

    #[test]
    fn test_labels() {
        assert_eq!(SentimentAnalyzer::label_for(0.4), "POSITIVE");
        assert_eq!(SentimentAnalyzer::label_for(-0.4), "NEGATIVE");
        assert_eq!(SentimentAnalyzer::label_for(0.01), "NEUTRAL");
    }
}
