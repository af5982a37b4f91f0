pub mod http_client_factory;

pub use http_client_factory::{HttpClientFactory, decode_json, endpoint_url, fetch_text};
