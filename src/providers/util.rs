use anyhow::Error;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Runs an HTTP operation again after transport-level failures.
///
/// `retries` is the number of re-runs after the initial attempt; the delay
/// between runs is fixed. Non-2xx responses are not failures at this level,
/// callers inspect the status themselves.
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        match operation().await.map_err(Error::from) {
            Ok(value) => return Ok(value),
            Err(err) if attempt > retries => return Err(err),
            Err(err) => {
                debug!("Attempt {}/{} failed: {}. Retrying...", attempt, retries + 1, err);
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // Timeouts are the only reqwest::Error wiremock can provoke, so the
    // transient failure here is a slow first response.
    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        let url = format!("{}/quote", server.uri());

        let response = with_retry(|| client.get(&url).send(), 2, 10).await.unwrap();
        assert!(response.status().is_success());
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_all_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let url = format!("{}/quote", server.uri());

        let result = with_retry(|| client.get(&url).send(), 1, 10).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_error_status_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/quote", server.uri());

        // The request itself succeeds; the 500 comes back as a response.
        let response = with_retry(|| client.get(&url).send(), 3, 10).await.unwrap();
        assert_eq!(response.status().as_u16(), 500);
    }
}
