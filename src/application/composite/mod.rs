pub mod composite_service;

pub use composite_service::{CompositeService, MacroSnapshot};
