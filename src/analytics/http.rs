use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{AnalyticsError, AnalyticsSink};
use crate::auth::AuthProvider;
use crate::protocol::{InteractionRecord, InteractionRow};

/// Posts interaction rows to a PostgREST-style table endpoint.
pub struct HttpSink {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    auth: Arc<dyn AuthProvider>,
}

impl HttpSink {
    /// # Errors
    ///
    /// Returns `AnalyticsError::Http` if the HTTP client cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        auth: Arc<dyn AuthProvider>,
        timeout: Duration,
    ) -> Result<Self, AnalyticsError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            auth,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnalyticsSink for HttpSink {
    async fn record_interaction(&self, record: &InteractionRecord) -> Result<(), AnalyticsError> {
        let credentials = self.auth.credentials().await?;
        let row = InteractionRow {
            record,
            user_id: credentials.user_id.as_deref(),
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&credentials.access_token)
            .header("Prefer", "return=minimal")
            .json(&row);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AnalyticsError::Status(status));
        }

        tracing::debug!(question_id = record.question_id, %status, "interaction recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticAuth;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accepts one request, answers with `status_line`, returns the raw request.
    async fn serve_once(listener: TcpListener, status_line: &'static str) -> String {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0_u8; 1024];

        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        let response = format!("HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        stream.write_all(response.as_bytes()).await.unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn record() -> InteractionRecord {
        InteractionRecord {
            question_id: 2,
            is_correct: true,
            time_taken: 3.25,
            quiz_id: Some("quiz-7".to_string()),
        }
    }

    #[tokio::test]
    async fn posts_row_with_credentials() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_once(listener, "201 Created"));

        let sink = HttpSink::new(
            format!("http://{addr}/rest/v1/quiz_interactions"),
            Some("anon-key".to_string()),
            Arc::new(StaticAuth::new("jwt-token", Some("user-1".to_string()))),
            Duration::from_secs(3),
        )
        .unwrap();

        sink.record_interaction(&record()).await.unwrap();
        let request = server.await.unwrap();
        let lower = request.to_ascii_lowercase();

        assert!(request.starts_with("POST /rest/v1/quiz_interactions"));
        assert!(lower.contains("authorization: bearer jwt-token"));
        assert!(lower.contains("apikey: anon-key"));
        assert!(request.contains("\"question_id\":2"));
        assert!(request.contains("\"user_id\":\"user-1\""));
        assert!(request.contains("\"quiz_id\":\"quiz-7\""));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_once(listener, "500 Internal Server Error"));

        let sink = HttpSink::new(
            format!("http://{addr}/interactions"),
            None,
            Arc::new(StaticAuth::new("jwt-token", None)),
            Duration::from_secs(3),
        )
        .unwrap();

        let err = sink.record_interaction(&record()).await.unwrap_err();
        server.await.unwrap();
        assert!(matches!(err, AnalyticsError::Status(s) if s.as_u16() == 500));
    }

    #[tokio::test]
    async fn signed_out_fails_before_sending() {
        let sink = HttpSink::new(
            "http://127.0.0.1:9/unused",
            None,
            Arc::new(StaticAuth::signed_out()),
            Duration::from_secs(1),
        )
        .unwrap();

        let err = sink.record_interaction(&record()).await.unwrap_err();
        assert!(matches!(err, AnalyticsError::Auth(_)));
    }
}
