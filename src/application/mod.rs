// Point-in-time lookup and the feature table builder
pub mod features;

// Dashboard composites
pub mod composite;

// Direction classifier: training and inference
pub mod ml;

// Observation feeds into the store
pub mod ingestion;

// News fetch and annotation
pub mod news;

// Full refresh orchestration
pub mod pipeline;

// Service container
pub mod system;
