// Re-export model types for handlers and stores

pub mod temperature;

pub use temperature::*;
