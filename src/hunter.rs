//! Thin client for the hosted Hunter email-finder API. Entirely
//! optional: without an API key the pipeline simply skips this step,
//! and every failure degrades to "no result".

use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;

#[derive(Debug, Deserialize)]
struct FinderResponse {
    data: FinderData,
}

#[derive(Debug, Deserialize)]
struct FinderData {
    email: Option<String>,
}

pub struct HunterClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HunterClient {
    /// Returns `None` when no API key is configured.
    pub fn from_config(config: &Config, client: Client) -> Option<Self> {
        let api_key = config.hunter_api_key.clone()?;
        Some(Self {
            client,
            base_url: config.hunter_base_url.clone(),
            api_key,
        })
    }

    #[cfg(test)]
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Looks up an address for a person at a domain. Any failure, from
    /// transport errors to a missing email in the payload, is logged
    /// and reported as `None`.
    pub async fn find(&self, domain: &str, first_name: &str, last_name: &str) -> Option<String> {
        let url = format!("{}/v2/email-finder", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("domain", domain),
                ("first_name", first_name),
                ("last_name", last_name),
                ("api_key", &self.api_key),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Hunter request for {} failed: {}", domain, e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(
                "Hunter returned {} for {} at {}",
                response.status(),
                first_name,
                domain
            );
            return None;
        }

        match response.json::<FinderResponse>().await {
            Ok(body) => body.data.email.filter(|e| !e.is_empty()),
            Err(e) => {
                tracing::debug!("Hunter response for {} did not parse: {}", domain, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn find_returns_email_from_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/email-finder"))
            .and(query_param("domain", "acme.io"))
            .and(query_param("first_name", "jane"))
            .and(query_param("last_name", "doe"))
            .and(query_param("api_key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "email": "jane.doe@acme.io", "score": 92 }
            })))
            .mount(&server)
            .await;

        let client = HunterClient::with_base_url(server.uri(), "test-key");
        let email = client.find("acme.io", "jane", "doe").await;
        assert_eq!(email.as_deref(), Some("jane.doe@acme.io"));
    }

    #[tokio::test]
    async fn find_swallows_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/email-finder"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = HunterClient::with_base_url(server.uri(), "test-key");
        assert_eq!(client.find("acme.io", "jane", "doe").await, None);
    }

    #[tokio::test]
    async fn find_treats_null_email_as_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/email-finder"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "email": null }
            })))
            .mount(&server)
            .await;

        let client = HunterClient::with_base_url(server.uri(), "test-key");
        assert_eq!(client.find("acme.io", "jane", "doe").await, None);
    }

    #[test]
    fn from_config_requires_api_key() {
        let config = Config::default();
        assert!(HunterClient::from_config(&config, Client::new()).is_none());

        let config = Config {
            hunter_api_key: Some("k".into()),
            ..Config::default()
        };
        assert!(HunterClient::from_config(&config, Client::new()).is_some());
    }
}
