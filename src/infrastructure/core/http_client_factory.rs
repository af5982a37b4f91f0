use crate::domain::errors::ProviderError;
use reqwest::{Client, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};

const USER_AGENT: &str = concat!("stockpulse/", env!("CARGO_PKG_VERSION"));

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// HTTP client shared by every remote provider.
    ///
    /// Transient failures are retried up to 3 times with exponential backoff.
    pub fn create_client() -> ClientWithMiddleware {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(5)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                error!("HttpClientFactory: falling back to default client: {}", e);
                Client::new()
            });

        ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }
}

/// Joins `base` and `path` and appends URL-encoded query parameters.
pub fn endpoint_url(
    provider: &'static str,
    base: &str,
    path: &str,
    params: &[(&str, String)],
) -> Result<Url, ProviderError> {
    let raw = format!("{}{}", base.trim_end_matches('/'), path);
    Url::parse_with_params(&raw, params).map_err(|e| ProviderError::Request {
        provider,
        reason: format!("invalid URL {}: {}", raw, e),
    })
}

/// Sends `request` and returns the body of a 2xx response.
///
/// Non-2xx responses become `ProviderError::Status` carrying the body.
pub async fn fetch_text(
    provider: &'static str,
    request: RequestBuilder,
) -> Result<String, ProviderError> {
    let response = request.send().await.map_err(|e| ProviderError::Request {
        provider,
        reason: e.to_string(),
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| ProviderError::Request {
        provider,
        reason: e.to_string(),
    })?;

    if !status.is_success() {
        debug!("{}: HTTP {} body: {}", provider, status, body);
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}

pub fn decode_json<T: DeserializeOwned>(
    provider: &'static str,
    body: &str,
) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::Decode {
        provider,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Payload {
        value: u32,
    }

    #[test]
    fn test_endpoint_url_encodes_params() {
        let url = endpoint_url(
            "Test",
            "https://example.com/api/",
            "/v8/finance/chart/BRK.B",
            &[("range", "2y".to_string()), ("q", "a b&c".to_string())],
        )
        .unwrap();

        assert_eq!(
            url.as_str(),
            "https://example.com/api/v8/finance/chart/BRK.B?range=2y&q=a+b%26c"
        );
    }

    #[test]
    fn test_endpoint_url_rejects_garbage() {
        let err = endpoint_url("Test", "not a url", "/x", &[]).unwrap_err();
        assert!(matches!(err, ProviderError::Request { provider: "Test", .. }));
    }

    #[test]
    fn test_decode_json() {
        let payload: Payload = decode_json("Test", r#"{"value": 7}"#).unwrap();
        assert_eq!(payload.value, 7);

        let err = decode_json::<Payload>("Test", "{").unwrap_err();
        assert!(matches!(err, ProviderError::Decode { .. }));
    }
}
