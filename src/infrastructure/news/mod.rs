pub mod annotator;
pub mod rss;
pub mod sentiment_analyzer;

pub use annotator::VaderArticleAnnotator;
pub use rss::RssNewsFeed;
pub use sentiment_analyzer::SentimentAnalyzer;
