//! JSON web API over the MarketPulse services.

pub mod handlers;
pub mod server;

pub use server::{ApiServer, AppState};
