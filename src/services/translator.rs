// src/services/translator.rs

//! Translation client.
//!
//! Issues exactly one request per call. Retrying is the caller's business.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::EndpointConfig;
use crate::utils::http;

/// A remote service turning source text into a raw response document.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Send `text` to the service and return the raw response body.
    async fn translate(&self, text: &str) -> Result<String>;
}

/// Translator posting form-encoded requests to a fixed HTTP endpoint.
pub struct HttpTranslator {
    client: Client,
    url: Url,
    target_lang: String,
    output_alphabet: String,
}

impl HttpTranslator {
    /// Create a translator for the configured endpoint.
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_async_client(config)?,
            url: Url::parse(&config.url)?,
            target_lang: config.target_lang.clone(),
            output_alphabet: config.output_alphabet.clone(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let form = [
            ("target_lang", self.target_lang.as_str()),
            ("output_alphabet", self.output_alphabet.as_str()),
            ("text", text),
        ];

        let response = self
            .client
            .post(self.url.clone())
            .header(ACCEPT, "*/*")
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::network(format!(
                "{} returned HTTP {}",
                self.url, status
            )));
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the raw request.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "{status_line}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });

        (format!("http://{addr}/staging"), handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn endpoint(url: String) -> EndpointConfig {
        EndpointConfig {
            url,
            timeout_secs: 5,
            ..EndpointConfig::default()
        }
    }

    #[tokio::test]
    async fn test_posts_form_and_returns_body() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", r#"<p class="fs-3">أهلا</p>"#).await;
        let translator = HttpTranslator::new(&endpoint(url)).unwrap();

        let body = translator.translate("Hello").await.unwrap();
        assert_eq!(body, r#"<p class="fs-3">أهلا</p>"#);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /staging"));
        assert!(request.contains("target_lang=Tunisian+Dialect"));
        assert!(request.contains("output_alphabet=Arabic"));
        assert!(request.contains("text=Hello"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_network_error() {
        let (url, server) = serve_once("HTTP/1.1 503 Service Unavailable", "busy").await;
        let translator = HttpTranslator::new(&endpoint(url)).unwrap();

        let err = translator.translate("Hello").await.unwrap_err();
        assert!(matches!(err, AppError::Network(_)));
        assert!(err.is_transient());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_transient() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let translator = HttpTranslator::new(&endpoint(format!("http://{addr}/"))).unwrap();
        let err = translator.translate("Hello").await.unwrap_err();
        assert!(matches!(err, AppError::Http(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_rejects_invalid_url() {
        assert!(HttpTranslator::new(&endpoint("not a url".to_string())).is_err());
    }
}
