pub mod features;
pub mod ml;
pub mod sentiment;
pub mod signal;
