use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;

/// Creates the shared HTTP client with retry middleware.
///
/// Transient transport failures are retried here, at the collaborator
/// boundary; the prediction core itself never retries.
pub fn create_client() -> ClientWithMiddleware {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

    let client = Client::builder()
        .pool_max_idle_per_host(5)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| Client::new());

    ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}

/// Build a URL with query parameters appended manually, since
/// reqwest-middleware 0.5 does not expose the `.query()` method.
pub fn build_url_with_query<K, V>(base_url: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if params.is_empty() {
        return base_url.to_string();
    }

    let query_string: String = params
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k.as_ref()), encode(v.as_ref())))
        .collect::<Vec<_>>()
        .join("&");

    if base_url.contains('?') {
        format!("{}&{}", base_url, query_string)
    } else {
        format!("{}?{}", base_url, query_string)
    }
}

fn encode(s: &str) -> String {
    let mut encoded = String::new();
    for c in s.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => encoded.push(c),
            _ => {
                for byte in c.to_string().as_bytes() {
                    encoded.push_str(&format!("%{:02X}", byte));
                }
            }
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_building() {
        let url = build_url_with_query(
            "https://example.com/v8/finance/chart/GOOGL",
            &[("interval", "1d"), ("period1", "1700000000")],
        );
        assert_eq!(
            url,
            "https://example.com/v8/finance/chart/GOOGL?interval=1d&period1=1700000000"
        );
    }

    #[test]
    fn test_no_params_returns_base() {
        let url = build_url_with_query::<&str, &str>("https://example.com", &[]);
        assert_eq!(url, "https://example.com");
    }
}
