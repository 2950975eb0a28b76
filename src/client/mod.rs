//! HTTP client for the operator chat functions.
//!
//! Sends the `{ messages, ...context }` body with bearer auth, classifies
//! pre-stream HTTP failures, and pumps the SSE response body through the
//! decoder. The caller receives every cumulative content snapshot through a
//! sink closure and the final text as the return value.

use futures::StreamExt;
use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::models::OperatorChatRequest;
use crate::shared::errors::OperatorError;
use crate::shared::logging;
use crate::stream::{SseDecoder, StreamUpdate};

/// Which serverless function a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFunction {
    /// General operator persona chat
    Chat,
    /// Gun/kit troubleshooting persona
    Diagnostics,
}

impl OperatorFunction {
    pub fn path(&self) -> &'static str {
        match self {
            OperatorFunction::Chat => "functions/v1/operator-chat",
            OperatorFunction::Diagnostics => "functions/v1/operator-diagnostics",
        }
    }
}

/// Caller-side handle that cancels an in-flight stream.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Token threaded into the read loop; resolves when the handle fires.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Completes once `cancel()` has been called. Pends forever if the
    /// handle is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Create a linked cancellation handle/token pair.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Client for the operator functions backend.
pub struct OperatorClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OperatorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// POST a chat request and stream the reply.
    ///
    /// `on_update` receives the full accumulated text after each decoded
    /// delta. Returns the final text once the stream terminates, or the
    /// first error; on error the caller discards any partial reply it has
    /// displayed.
    pub async fn stream_chat(
        &self,
        function: OperatorFunction,
        request: &OperatorChatRequest,
        cancel: &mut CancelToken,
        mut on_update: impl FnMut(&str),
    ) -> Result<String, OperatorError> {
        let request_id = Uuid::new_v4().to_string();
        let started_at = chrono::Utc::now();
        logging::log_stream_start(&request_id, request.messages.len());

        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            function.path()
        );
        let mut builder = self
            .http
            .post(&url)
            .header("x-request-id", &request_id)
            .json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;
        if let Some(err) = OperatorError::from_status(response.status().as_u16()) {
            logging::log_stream_error(&request_id, &err);
            return Err(err);
        }

        let mut decoder = SseDecoder::new();
        let mut updates_applied = 0usize;
        let mut body = response.bytes_stream();

        loop {
            let chunk = tokio::select! {
                _ = cancel.cancelled() => {
                    logging::log_stream_cancelled(&request_id);
                    return Err(OperatorError::Cancelled);
                }
                chunk = body.next() => chunk,
            };
            let Some(chunk) = chunk else {
                break;
            };
            let bytes = match chunk {
                Ok(bytes) => bytes,
                Err(err) => {
                    let err = OperatorError::Transport(err);
                    logging::log_stream_error(&request_id, &err);
                    return Err(err);
                }
            };

            for update in decoder.feed(&bytes) {
                if let StreamUpdate::Content(text) = update {
                    updates_applied += 1;
                    on_update(&text);
                }
            }
            // [DONE] terminates the request even if the connection stays open
            if decoder.is_done() {
                break;
            }
        }

        let content = decoder.finish();
        let elapsed_ms = (chrono::Utc::now() - started_at).num_milliseconds();
        logging::log_stream_complete(&request_id, content.len(), updates_applied, elapsed_ms);
        Ok(content)
    }
}
