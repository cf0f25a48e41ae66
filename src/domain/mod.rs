// Core data model
pub mod types;

// Well-known series codes and feature names
pub mod series;

// As-of lookup over in-memory histories
pub mod history;

// Per-date feature rows and forward labels
pub mod features;

// Composite dashboard indices
pub mod composite;

// Model inputs and dataset splitting
pub mod ml;

// Topic and summary rules for news
pub mod news;

// Port interfaces
pub mod ports;

// Repository traits
pub mod repositories;

// Domain-specific error types
pub mod errors;
