pub mod alpaca;
pub mod core;
pub mod csv_history;
pub mod factory;
pub mod mock;
pub mod news;
pub mod yahoo;

pub use factory::ServiceFactory;
