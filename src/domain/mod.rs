// Price history domain
pub mod market;

// Indicator features and labels
pub mod features;

// Signal outcomes and news
pub mod signal;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
