//! Phone verification adapter.
//!
//! A wrong code comes back as HTTP 400; that is a negative answer, not
//! a failure, so `verify_code` folds it into `Ok(false)`.

use async_trait::async_trait;
use serde::Serialize;

use cw_core::ports::{ApiError, VerificationApiPort};

use super::{network_error, status_error};

pub struct HttpVerificationClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct SendCodeBody<'a> {
    phone: &'a str,
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct VerifyCodeBody<'a> {
    code: &'a str,
    email: &'a str,
}

impl HttpVerificationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_code_request(&self, path: &str, phone: &str, email: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url(path))
            .json(&SendCodeBody { phone, email })
            .send()
            .await
            .map_err(network_error)?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl VerificationApiPort for HttpVerificationClient {
    async fn send_code(&self, phone: &str, email: &str) -> Result<(), ApiError> {
        self.post_code_request("/verify-phone", phone, email).await
    }

    async fn verify_code(&self, code: &str, email: &str) -> Result<bool, ApiError> {
        let response = self
            .client
            .post(self.url("/verify-code"))
            .json(&VerifyCodeBody { code, email })
            .send()
            .await
            .map_err(network_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        if status.as_u16() == 400 {
            return Ok(false);
        }
        Err(status_error(response).await)
    }

    async fn resend_code(&self, phone: &str, email: &str) -> Result<(), ApiError> {
        self.post_code_request("/resend-code", phone, email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_code_posts_phone_and_email() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/verify-phone")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "phone": "+15551234567",
                "email": "ada@example.com",
            })))
            .with_status(200)
            .with_body(r#"{"status":"success","message":"code sent"}"#)
            .create_async()
            .await;

        let client = HttpVerificationClient::new(server.url());
        client
            .send_code("+15551234567", "ada@example.com")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn verify_code_posts_code_and_email() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/verify-code")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "code": "123456",
                "email": "ada@example.com",
            })))
            .with_status(200)
            .with_body(r#"{"status":"success","message":"verified"}"#)
            .create_async()
            .await;

        let client = HttpVerificationClient::new(server.url());
        let matched = client
            .verify_code("123456", "ada@example.com")
            .await
            .unwrap();
        assert!(matched);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn wrong_code_is_a_negative_answer_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/verify-code")
            .with_status(400)
            .with_body(r#"{"status":"error","message":"invalid code"}"#)
            .create_async()
            .await;

        let client = HttpVerificationClient::new(server.url());
        let matched = client
            .verify_code("000000", "ada@example.com")
            .await
            .unwrap();
        assert!(!matched);
    }

    #[tokio::test]
    async fn server_errors_still_surface() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/verify-code")
            .with_status(500)
            .with_body(r#"{"status":"error","message":"boom"}"#)
            .create_async()
            .await;

        let client = HttpVerificationClient::new(server.url());
        let error = client
            .verify_code("123456", "ada@example.com")
            .await
            .unwrap_err();
        assert_eq!(
            error,
            ApiError::Status {
                status: 500,
                message: Some("boom".into()),
            }
        );
    }
}
