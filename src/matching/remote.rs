//! PermIdMatcher: HTTP client for the record-matching file API

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use super::client::RecordMatcher;
use super::{MatchResponse, RecordType};
use crate::config::MatchSettings;
use crate::error::{BoardnetError, BoardnetResult};

/// Uploads record batches as a multipart CSV file.
pub struct PermIdMatcher {
    endpoint: String,
    access_token: String,
    matches_per_record: u32,
    http_client: Client,
}

impl PermIdMatcher {
    /// Create a matcher from settings; an access token is required.
    pub fn new(settings: &MatchSettings) -> BoardnetResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| BoardnetError::Config(e.to_string()))?;

        Self::with_client(settings, http_client)
    }

    /// Create a matcher that sends through an existing HTTP client.
    pub fn with_client(settings: &MatchSettings, http_client: Client) -> BoardnetResult<Self> {
        let access_token = settings
            .access_token
            .clone()
            .ok_or_else(|| BoardnetError::Config("match API access token is not set".to_string()))?;

        Ok(Self {
            endpoint: settings.endpoint.clone(),
            access_token,
            matches_per_record: settings.matches_per_record,
            http_client,
        })
    }
}

#[async_trait]
impl RecordMatcher for PermIdMatcher {
    async fn match_batch(&self, record_type: RecordType, csv: String) -> BoardnetResult<MatchResponse> {
        debug!("Uploading {} bytes of {} records to {}", csv.len(), record_type, self.endpoint);

        let part = Part::text(csv)
            .file_name("records.csv")
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        let response = self.http_client.post(&self.endpoint)
            .header("x-openmatch-numberOfMatchesPerRecord", self.matches_per_record.to_string())
            .header("x-openmatch-dataType", record_type.as_str())
            .header("X-AG-Access-Token", &self.access_token)
            .multipart(form)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BoardnetError::MatchApi { status, body });
        }

        let result: MatchResponse = response.json().await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(head_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let head = text[..head_end].to_ascii_lowercase();
        let length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok());
        match length {
            Some(len) => raw.len() >= head_end + 4 + len,
            None => text.ends_with("--\r\n"),
        }
    }

    /// Accept one request, answer it and hand back the raw request text.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&raw) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&raw).into_owned()
        });
        (format!("http://{}/permid/match/file", addr), handle)
    }

    fn local_matcher(endpoint: String) -> PermIdMatcher {
        let settings = MatchSettings {
            endpoint,
            access_token: Some("secret-token".to_string()),
            ..MatchSettings::default()
        };
        let client = Client::builder().no_proxy().build().unwrap();
        PermIdMatcher::with_client(&settings, client).unwrap()
    }

    #[tokio::test]
    async fn test_error_status_becomes_match_api_error() {
        let (endpoint, server) = serve_once("429 Too Many Requests", r#"{"error":"quota"}"#).await;
        let matcher = local_matcher(endpoint);

        let err = matcher
            .match_batch(RecordType::Organization, "LocalID,Name\n1,Alpha plc\n".to_string())
            .await
            .unwrap_err();
        match err {
            BoardnetError::MatchApi { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("quota"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.starts_with("post /permid/match/file "));
        assert!(request.contains("x-openmatch-numberofmatchesperrecord: 1\r\n"));
        assert!(request.contains("x-openmatch-datatype: organization\r\n"));
        assert!(request.contains("x-ag-access-token: secret-token\r\n"));
        assert!(request.contains("multipart/form-data"));
        assert!(request.contains("name=\"file\""));
        assert!(request.contains("localid,name"));
    }

    #[tokio::test]
    async fn test_success_parses_rows() {
        let body = r#"{"outputContentResponse":[{"Input_LocalID":"7","Match OpenPermID":"4295","Match Score":"95%"}]}"#;
        let (endpoint, server) = serve_once("200 OK", body).await;
        let matcher = local_matcher(endpoint);

        let rows = matcher
            .match_batch(RecordType::Person, "LocalID,FirstName,LastName\n7,Ann,Smith\n".to_string())
            .await
            .unwrap()
            .into_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Match OpenPermID"], "4295");

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.contains("x-openmatch-datatype: person\r\n"));
    }

    #[test]
    fn test_requires_token() {
        let settings = MatchSettings::default();
        assert!(matches!(PermIdMatcher::new(&settings), Err(BoardnetError::Config(_))));

        let settings = MatchSettings {
            access_token: Some("token".to_string()),
            timeout_secs: Some(30),
            ..MatchSettings::default()
        };
        assert!(PermIdMatcher::new(&settings).is_ok());
    }
}
