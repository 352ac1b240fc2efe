//! AssemblyAI API implementation.
//!
//! Transcription is a three-step exchange:
//! 1. Upload audio binary data to get an upload URL
//! 2. Submit a transcription request with the upload URL
//! 3. Poll for the completed transcript
//!
//! None of the steps are retried. Any transport, HTTP status or decoding
//! failure is returned to the caller as is.

use std::path::Path;

use serde::de::DeserializeOwned;
use tokio::time::Instant;

use super::TranscriptionConfig;
use crate::transcription::error::{ClientError, Result};
use crate::transcription::job::{
    JobId, JobOutcome, SubmitResponse, TranscriptRequest, TranscriptResponse, UploadReference,
    UploadResponse,
};

/// Client for one transcription service account.
///
/// Holds the HTTP connection pool and the configuration; every call attaches
/// the configured credential.
pub struct JobClient {
    http: reqwest::Client,
    config: TranscriptionConfig,
}

impl JobClient {
    /// Builds the HTTP client.
    ///
    /// Only the connect timeout is set on the client. The overall limit is
    /// per request: uploads get `upload_timeout`, everything else
    /// `request_timeout`.
    pub fn new(config: TranscriptionConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(ClientError::HttpClient)?;

        Ok(Self { http, config })
    }

    /// Reads the whole audio file and uploads it.
    pub async fn upload(&self, audio_path: &Path) -> Result<UploadReference> {
        let audio_data = tokio::fs::read(audio_path)
            .await
            .map_err(|source| ClientError::ReadAudio {
                path: audio_path.to_path_buf(),
                source,
            })?;
        tracing::debug!(
            "Read {} bytes from {}",
            audio_data.len(),
            audio_path.display()
        );

        self.upload_bytes(audio_data).await
    }

    /// Uploads raw audio bytes in a single request body.
    pub async fn upload_bytes(&self, audio_data: Vec<u8>) -> Result<UploadReference> {
        let response = self
            .upload_request(audio_data)
            .send()
            .await
            .map_err(|e| ClientError::transport("upload", e))?;

        let upload: UploadResponse = decode(response, "upload", "/upload").await?;
        tracing::debug!("Audio uploaded successfully");

        Ok(UploadReference::new(upload.upload_url))
    }

    /// Registers an uploaded file as a new transcription job.
    pub async fn submit(&self, audio_url: &UploadReference) -> Result<JobId> {
        tracing::debug!("Submitting transcription request...");
        let response = self
            .submit_request(audio_url)
            .send()
            .await
            .map_err(|e| ClientError::transport("submit", e))?;

        let submitted: SubmitResponse = decode(response, "submit", "/transcript").await?;
        tracing::debug!("Transcription submitted, id: {}", submitted.id);

        Ok(JobId::new(submitted.id))
    }

    /// Queries the job until it reaches a terminal status.
    ///
    /// The first query is sent immediately. After every non-terminal status
    /// the client waits the poll interval and asks again. With the default
    /// policy there is no limit on how long this takes.
    pub async fn poll(&self, job_id: &JobId) -> Result<JobOutcome> {
        let policy = &self.config.poll;
        let poll_url = format!("{}/transcript/{}", self.config.base_url, job_id);
        let started = Instant::now();
        let mut wait = policy.interval;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            let response = self
                .status_request(&poll_url)
                .send()
                .await
                .map_err(|e| ClientError::transport("poll", e))?;

            let result: TranscriptResponse = decode(response, "poll", "/transcript/{id}").await?;
            tracing::debug!(
                "Poll attempt {}: status={}, id={}",
                attempts,
                result.status(),
                job_id
            );

            if let Some(outcome) = result.outcome()? {
                return Ok(outcome);
            }

            let elapsed = started.elapsed();
            if !policy.allows_another_attempt(attempts, elapsed, wait) {
                tracing::warn!("Giving up on job {job_id} after {attempts} status checks");
                return Err(ClientError::PollLimitExceeded { attempts, elapsed });
            }

            tokio::time::sleep(wait).await;
            wait = policy.next_interval(wait);
        }
    }

    fn upload_request(&self, audio_data: Vec<u8>) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}/upload", self.config.base_url))
            .timeout(self.config.upload_timeout)
            .header("authorization", self.config.credential.expose())
            .header("content-type", "application/octet-stream")
            .body(audio_data)
    }

    fn submit_request(&self, audio_url: &UploadReference) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}/transcript", self.config.base_url))
            .timeout(self.config.request_timeout)
            .header("authorization", self.config.credential.expose())
            .json(&TranscriptRequest {
                audio_url: audio_url.as_str(),
            })
    }

    fn status_request(&self, poll_url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(poll_url)
            .timeout(self.config.request_timeout)
            .header("authorization", self.config.credential.expose())
    }
}

/// Checks the status code and decodes the JSON body.
async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
    step: &str,
    endpoint: &'static str,
) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ClientError::transport(step, e))?;

    if !status.is_success() {
        tracing::warn!("AssemblyAI {step} failed with status {status}");
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| ClientError::MalformedResponse {
        endpoint,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::api::Credential;
    use crate::transcription::policy::PollPolicy;
    use mockito::{Matcher, Server, ServerGuard};
    use std::time::Duration;

    const API_KEY: &str = "test_api_key_123";

    async fn setup_test_server() -> ServerGuard {
        Server::new_async().await
    }

    fn client_for(server: &ServerGuard, poll: PollPolicy) -> JobClient {
        let config = TranscriptionConfig::new(Credential::new(API_KEY))
            .with_base_url(server.url())
            .with_poll_policy(poll);
        JobClient::new(config).unwrap()
    }

    fn fast_poll() -> PollPolicy {
        PollPolicy::unbounded(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_upload_sends_bytes_and_returns_url() {
        let mut server = setup_test_server().await;
        let mock = server
            .mock("POST", "/upload")
            .match_header("authorization", API_KEY)
            .match_header("content-type", "application/octet-stream")
            .match_body("RIFF fake audio")
            .with_status(200)
            .with_body(r#"{"upload_url":"https://cdn.assemblyai.com/upload/abc"}"#)
            .create_async()
            .await;

        let client = client_for(&server, fast_poll());
        let reference = client.upload_bytes(b"RIFF fake audio".to_vec()).await.unwrap();

        assert_eq!(reference.as_str(), "https://cdn.assemblyai.com/upload/abc");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_reads_file() {
        let mut server = setup_test_server().await;
        let mock = server
            .mock("POST", "/upload")
            .match_body("file contents")
            .with_body(r#"{"upload_url":"https://cdn.assemblyai.com/upload/file"}"#)
            .create_async()
            .await;

        let path = std::env::temp_dir().join(format!("meetscribe-upload-{}.mp3", std::process::id()));
        std::fs::write(&path, "file contents").unwrap();

        let client = client_for(&server, fast_poll());
        let reference = client.upload(&path).await;
        let _ = std::fs::remove_file(&path);

        assert_eq!(
            reference.unwrap().as_str(),
            "https://cdn.assemblyai.com/upload/file"
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_missing_file_sends_nothing() {
        let mut server = setup_test_server().await;
        let mock = server
            .mock("POST", "/upload")
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server, fast_poll());
        let result = client
            .upload(Path::new("/definitely/not/here/meeting.mp3"))
            .await;

        assert!(matches!(result, Err(ClientError::ReadAudio { .. })));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_server_error_is_not_retried() {
        let mut server = setup_test_server().await;
        let mock = server
            .mock("POST", "/upload")
            .with_status(500)
            .with_body("upstream exploded")
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server, fast_poll());
        let result = client.upload_bytes(b"audio".to_vec()).await;

        match result {
            Err(ClientError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("Expected status error, got: {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_malformed_body() {
        let mut server = setup_test_server().await;
        let mock = server
            .mock("POST", "/upload")
            .with_body(r#"{"url":"https://elsewhere"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server, fast_poll());
        let result = client.upload_bytes(b"audio".to_vec()).await;

        assert!(matches!(
            result,
            Err(ClientError::MalformedResponse {
                endpoint: "/upload",
                ..
            })
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_sends_audio_url() {
        let mut server = setup_test_server().await;
        let mock = server
            .mock("POST", "/transcript")
            .match_header("authorization", API_KEY)
            .match_body(Matcher::Json(serde_json::json!({
                "audio_url": "https://cdn.assemblyai.com/upload/abc"
            })))
            .with_body(r#"{"id":"job-42","status":"queued","text":null}"#)
            .create_async()
            .await;

        let client = client_for(&server, fast_poll());
        let job_id = client
            .submit(&UploadReference::new("https://cdn.assemblyai.com/upload/abc"))
            .await
            .unwrap();

        assert_eq!(job_id, JobId::new("job-42"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_server_error_propagates() {
        let mut server = setup_test_server().await;
        let mock = server
            .mock("POST", "/transcript")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server, fast_poll());
        let result = client.submit(&UploadReference::new("https://x")).await;

        assert!(matches!(result, Err(ClientError::Status { status: 500, .. })));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_without_id_is_malformed() {
        let mut server = setup_test_server().await;
        let mock = server
            .mock("POST", "/transcript")
            .with_body(r#"{"status":"queued"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server, fast_poll());
        let result = client.submit(&UploadReference::new("https://x")).await;

        assert!(matches!(result, Err(ClientError::MalformedResponse { .. })));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_poll_waits_through_non_terminal_statuses() {
        let mut server = setup_test_server().await;
        let pending = server
            .mock("GET", "/transcript/job-1")
            .match_header("authorization", API_KEY)
            .with_body(r#"{"id":"job-1","status":"processing","text":null,"error":null}"#)
            .expect(2)
            .create_async()
            .await;
        let done = server
            .mock("GET", "/transcript/job-1")
            .match_header("authorization", API_KEY)
            .with_body(r#"{"id":"job-1","status":"completed","text":" First. Second. "}"#)
            .expect(1)
            .create_async()
            .await;

        let interval = Duration::from_millis(50);
        let client = client_for(&server, PollPolicy::unbounded(interval));
        let started = std::time::Instant::now();
        let outcome = client.poll(&JobId::new("job-1")).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(outcome, JobOutcome::Completed(" First. Second. ".to_string()));
        assert!(elapsed >= interval * 2, "waited only {elapsed:?}");
        pending.assert_async().await;
        done.assert_async().await;
    }

    #[tokio::test]
    async fn test_poll_returns_immediately_on_terminal_first_status() {
        let mut server = setup_test_server().await;
        let mock = server
            .mock("GET", "/transcript/job-2")
            .with_body(r#"{"id":"job-2","status":"completed","text":"done"}"#)
            .expect(1)
            .create_async()
            .await;

        // A long interval would make this test hang if the client waited first.
        let client = client_for(&server, PollPolicy::unbounded(Duration::from_secs(3600)));
        let outcome = client.poll(&JobId::new("job-2")).await.unwrap();

        assert_eq!(outcome, JobOutcome::Completed("done".to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_poll_job_error_is_an_outcome() {
        let mut server = setup_test_server().await;
        let _mock = server
            .mock("GET", "/transcript/job-3")
            .with_body(r#"{"id":"job-3","status":"error","error":"File does not appear to contain audio."}"#)
            .create_async()
            .await;

        let client = client_for(&server, fast_poll());
        let outcome = client.poll(&JobId::new("job-3")).await.unwrap();

        assert_eq!(
            outcome,
            JobOutcome::Failed("File does not appear to contain audio.".to_string())
        );
        assert_eq!(
            outcome.display_text(),
            "Error: File does not appear to contain audio."
        );
    }

    #[tokio::test]
    async fn test_poll_gives_up_when_attempts_are_bounded() {
        let mut server = setup_test_server().await;
        let mock = server
            .mock("GET", "/transcript/job-4")
            .with_body(r#"{"id":"job-4","status":"queued"}"#)
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server, fast_poll().with_max_attempts(2));
        let result = client.poll(&JobId::new("job-4")).await;

        assert!(matches!(
            result,
            Err(ClientError::PollLimitExceeded { attempts: 2, .. })
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_poll_gives_up_when_timeout_is_reached() {
        let mut server = setup_test_server().await;
        let mock = server
            .mock("GET", "/transcript/job-6")
            .with_body(r#"{"id":"job-6","status":"queued"}"#)
            .expect_at_least(2)
            .expect_at_most(3)
            .create_async()
            .await;

        let policy = PollPolicy::unbounded(Duration::from_millis(50))
            .with_timeout(Duration::from_millis(120));
        let client = client_for(&server, policy);
        let started = std::time::Instant::now();
        let result = client.poll(&JobId::new("job-6")).await;

        match result {
            Err(ClientError::PollLimitExceeded { attempts, elapsed }) => {
                assert!((2..=3).contains(&attempts), "attempts: {attempts}");
                assert!(elapsed >= Duration::from_millis(50), "elapsed: {elapsed:?}");
            }
            other => panic!("Expected poll limit error, got: {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(2));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_poll_interval_grows_with_backoff() {
        let mut server = setup_test_server().await;
        let pending = server
            .mock("GET", "/transcript/job-7")
            .with_body(r#"{"id":"job-7","status":"processing"}"#)
            .expect(2)
            .create_async()
            .await;
        let done = server
            .mock("GET", "/transcript/job-7")
            .with_body(r#"{"id":"job-7","status":"completed","text":"ok"}"#)
            .expect(1)
            .create_async()
            .await;

        // Waits 20 ms, then 40 ms.
        let policy = PollPolicy::unbounded(Duration::from_millis(20))
            .with_backoff(2.0, Some(Duration::from_secs(1)));
        let client = client_for(&server, policy);
        let started = std::time::Instant::now();
        let outcome = client.poll(&JobId::new("job-7")).await.unwrap();

        assert_eq!(outcome, JobOutcome::Completed("ok".to_string()));
        assert!(started.elapsed() >= Duration::from_millis(60));
        pending.assert_async().await;
        done.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_uses_its_own_timeout() {
        let server = setup_test_server().await;
        let mut config = TranscriptionConfig::new(Credential::new(API_KEY)).with_base_url(server.url());
        config.request_timeout = Duration::from_secs(30);
        config.upload_timeout = Duration::from_secs(1800);
        let client = JobClient::new(config).unwrap();

        let upload = client.upload_request(b"audio".to_vec()).build().unwrap();
        assert_eq!(upload.timeout(), Some(&Duration::from_secs(1800)));

        let submit = client
            .submit_request(&UploadReference::new("https://x"))
            .build()
            .unwrap();
        assert_eq!(submit.timeout(), Some(&Duration::from_secs(30)));

        let status = client
            .status_request(&format!("{}/transcript/job", server.url()))
            .build()
            .unwrap();
        assert_eq!(status.timeout(), Some(&Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_poll_status_failure_aborts() {
        let mut server = setup_test_server().await;
        let mock = server
            .mock("GET", "/transcript/job-5")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server, fast_poll());
        let result = client.poll(&JobId::new("job-5")).await;

        assert!(matches!(result, Err(ClientError::Status { status: 503, .. })));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let config = TranscriptionConfig::new(Credential::new(API_KEY))
            .with_base_url("http://127.0.0.1:1")
            .with_poll_policy(fast_poll());
        let client = JobClient::new(config).unwrap();

        let result = client.upload_bytes(b"audio".to_vec()).await;

        assert!(matches!(result, Err(ClientError::Transport { .. })));
    }
}
