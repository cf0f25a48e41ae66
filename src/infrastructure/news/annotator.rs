use super::sentiment_analyzer::SentimentAnalyzer;
use crate::domain::news::{infer_topics, lead_summary};
use crate::domain::ports::ArticleAnnotator;
use crate::domain::types::ArticleAnnotation;
use anyhow::Result;

/// Summaries are cut to roughly this many characters.
pub const SUMMARY_MAX_CHARS: usize = 280;

/// Local annotator: VADER sentiment, lead-sentence summary, keyword topics.
pub struct VaderArticleAnnotator {
    analyzer: SentimentAnalyzer,
    summary_max_chars: usize,
}

impl VaderArticleAnnotator {
    pub fn new(summary_max_chars: usize) -> Self {
        Self {
            analyzer: SentimentAnalyzer::new(),
            summary_max_chars,
        }
    }
}

impl Default for VaderArticleAnnotator {
    fn default() -> Self {
        Self::new(SUMMARY_MAX_CHARS)
    }
}

impl ArticleAnnotator for VaderArticleAnnotator {
    fn annotate(&self, text: &str) -> Result<ArticleAnnotation> {
        if text.trim().is_empty() {
            anyhow::bail!("Cannot annotate empty text");
        }
        let score = self.analyzer.analyze(text);
        Ok(ArticleAnnotation {
            sentiment_label: SentimentAnalyzer::label_for(score).to_string(),
            sentiment_score: score,
            summary: lead_summary(text, self.summary_max_chars),
            topics: infer_topics(text),
        })
    }
}
