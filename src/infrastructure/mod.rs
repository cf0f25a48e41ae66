// Shared HTTP client
pub mod core;

// Observation feeds: FRED API and market CSV files
pub mod feeds;

// RSS feeds and article annotation
pub mod news;

// Prometheus metrics and the push reporter
pub mod observability;

// SQLite store
pub mod persistence;

// In-memory repositories
pub mod repositories;
