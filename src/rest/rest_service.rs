use crate::rest::apis::Error;
use crate::rest::client_config;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

const CONTENT_TYPE_SCHEMA_REGISTRY: &str = "application/vnd.schemaregistry.v1+json";

#[derive(Debug, Clone)]
pub struct RestService {
    config: client_config::ClientConfig,
}

impl RestService {
    pub fn new(config: client_config::ClientConfig) -> Self {
        RestService { config }
    }

    pub fn config(&self) -> &client_config::ClientConfig {
        &self.config
    }

    /// Sends the request to each base URL in turn until one answers without
    /// a retriable failure.
    pub async fn send_request_urls(
        &self,
        url: &str,
        method: reqwest::Method,
        query: Option<&[(String, String)]>,
        body: Option<&str>,
    ) -> Result<reqwest::Response, Error> {
        let base_urls = &self.config.base_urls;
        let mut last_error = None;
        for (i, base_url) in base_urls.iter().enumerate() {
            let new_url = format!("{}{}", base_url.trim_end_matches('/'), url);
            match self
                .try_send_request(&new_url, method.clone(), query, body)
                .await
            {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if !is_retriable(&e) || i == base_urls.len() - 1 {
                        return Err(e.into());
                    }
                    log::debug!("request to {} failed, trying next url: {}", new_url, e);
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) => Err(e.into()),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "base URL is required",
            )
            .into()),
        }
    }

    async fn try_send_request(
        &self,
        url: &str,
        method: reqwest::Method,
        query: Option<&[(String, String)]>,
        body: Option<&str>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut retries = 0;
        loop {
            let result = self.send_request(url, method.clone(), query, body).await;
            let retry = match &result {
                Ok(response) => is_retriable_status(response.status()),
                Err(e) => is_retriable(e),
            };
            if !retry || retries >= self.config.max_retries {
                return result;
            }
            let backoff = calculate_exponential_backoff(
                self.config.retries_wait_ms,
                retries,
                Duration::from_millis(self.config.retries_max_wait_ms as u64),
            );
            log::debug!("retrying {} {} in {:?}", method, url, backoff);
            tokio::time::sleep(backoff).await;
            retries += 1;
        }
    }

    async fn send_request(
        &self,
        url: &str,
        method: reqwest::Method,
        query: Option<&[(String, String)]>,
        body: Option<&str>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let client = &self.config.client;
        let mut request = client.request(method, url);
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some((username, password)) = &self.config.basic_auth {
            request = request.basic_auth(username, password.as_ref());
        } else if let Some(token) = &self.config.bearer_access_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, CONTENT_TYPE_SCHEMA_REGISTRY)
                .body(body.to_string());
        }
        request.send().await
    }
}

fn calculate_exponential_backoff(
    initial_backoff: u32,
    retry_attempts: u32,
    max_backoff: Duration,
) -> Duration {
    let result = match 2_u32
        .checked_pow(retry_attempts)
        .and_then(|power| power.checked_mul(initial_backoff))
    {
        Some(backoff) => Duration::from_millis(backoff as u64).min(max_backoff),
        None => max_backoff,
    };

    // Won't panic because `base` is in range 0..1
    let base = fastrand::f64();
    result.mul_f64(base)
}

fn is_retriable_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::INTERNAL_SERVER_ERROR
        || status == StatusCode::BAD_GATEWAY
        || status == StatusCode::SERVICE_UNAVAILABLE
        || status == StatusCode::GATEWAY_TIMEOUT
}

fn is_retriable(e: &reqwest::Error) -> bool {
    match e.status() {
        Some(status) => is_retriable_status(status),
        None => e.is_connect() || e.is_timeout(),
    }
}
