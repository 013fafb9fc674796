use crate::domain::model::{ContactPayload, ContactReply};
use crate::domain::ports::{ConfigProvider, ContactTransport};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;

/// `reqwest` client for the contact backend.
#[derive(Debug, Clone)]
pub struct HttpContactClient {
    client: Client,
    contact_endpoint: String,
    health_endpoint: String,
}

impl HttpContactClient {
    pub fn new<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client<C: ConfigProvider + ?Sized>(client: Client, config: &C) -> Self {
        Self {
            client,
            contact_endpoint: config.contact_endpoint(),
            health_endpoint: config.health_endpoint(),
        }
    }

    pub fn contact_endpoint(&self) -> &str {
        &self.contact_endpoint
    }

    /// `true` when the backend answers its health probe with `{"status": "ok"}`.
    pub async fn health(&self) -> Result<bool> {
        tracing::debug!("Checking backend health at: {}", self.health_endpoint);
        let response = self.client.get(&self.health_endpoint).send().await?;

        if !response.status().is_success() {
            tracing::warn!("Health probe returned {}", response.status());
            return Ok(false);
        }

        let body: serde_json::Value = response.json().await?;
        Ok(body.get("status").and_then(|s| s.as_str()) == Some("ok"))
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl ContactTransport for HttpContactClient {
    async fn send(&self, payload: &ContactPayload) -> Result<ContactReply> {
        tracing::debug!("Posting contact message to: {}", self.contact_endpoint);
        let response = self
            .client
            .post(&self.contact_endpoint)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Contact API response status: {}", status);

        // the body is parsed before the status is looked at; a non-JSON body is a transport failure
        let bytes = response.bytes().await?;
        let body: serde_json::Value = serde_json::from_slice(&bytes)?;

        if status.is_success() {
            Ok(ContactReply::Accepted { body })
        } else {
            let message = body
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string);
            Ok(ContactReply::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::utils::error::SiteError;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> HttpContactClient {
        let config = SiteConfig::default().with_api_base_override(Some(server.base_url()));
        HttpContactClient::new(&config)
    }

    fn payload() -> ContactPayload {
        ContactPayload {
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            subject: "Hi".to_string(),
            message: "Hello".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_posts_json_payload() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/contact")
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "name": "John Doe",
                    "email": "john@example.com",
                    "subject": "Hi",
                    "message": "Hello"
                }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"success": true, "message": "Message sent successfully"}));
        });

        let reply = client_for(&server).send(&payload()).await.unwrap();

        api_mock.assert();
        assert!(matches!(reply, ContactReply::Accepted { .. }));
    }

    #[tokio::test]
    async fn test_non_success_status_is_rejected_with_message() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/api/contact");
            then.status(400)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"success": false, "message": "All fields required"}));
        });

        let reply = client_for(&server).send(&payload()).await.unwrap();

        api_mock.assert();
        assert_eq!(
            reply,
            ContactReply::Rejected {
                status: 400,
                message: Some("All fields required".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_non_json_body_is_transport_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/contact");
            then.status(200).body("<html>oops</html>");
        });

        let err = client_for(&server).send(&payload()).await.unwrap_err();
        assert!(matches!(err, SiteError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        let config = SiteConfig::default()
            .with_api_base_override(Some("http://127.0.0.1:9".to_string()));
        let err = HttpContactClient::new(&config)
            .send(&payload())
            .await
            .unwrap_err();
        assert!(matches!(err, SiteError::Http(_)));
    }

    #[tokio::test]
    async fn test_health_probe() {
        let server = MockServer::start();
        let health_mock = server.mock(|when, then| {
            when.method(GET).path("/health");
            then.status(200).json_body(serde_json::json!({"status": "ok"}));
        });

        assert!(client_for(&server).health().await.unwrap());
        health_mock.assert();
    }
}
