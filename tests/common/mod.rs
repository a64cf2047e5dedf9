#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use resume_matcher::core::{
    BaseUrl, ConsistencyPolicy, MatchPayload, MatchTransport, MatchingClient, Notice,
    Orchestrator, RawResponse, ResumeFile,
};
use resume_matcher::error::TransportError;

// ---------------------------------------------------------------------------
// Mock: MatchTransport replaying scripted replies in call order
// ---------------------------------------------------------------------------

enum Reply {
    Ready(Result<RawResponse, TransportError>),
    Gated(oneshot::Receiver<RawResponse>),
}

#[derive(Default)]
pub struct ScriptedTransport {
    calls: AtomicUsize,
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<(String, MatchPayload)>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, status: u16, body: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Ready(Ok(RawResponse::new(status, body))));
    }

    pub fn fail(&self, detail: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Ready(Err(TransportError(detail.to_string()))));
    }

    /// The matching call stays pending until the returned sender fires.
    pub fn gate(&self) -> oneshot::Sender<RawResponse> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(Reply::Gated(rx));
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, MatchPayload)> {
        self.requests.lock().unwrap().clone()
    }

    /// Yield until `n` requests have reached the transport.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl MatchTransport for ScriptedTransport {
    async fn post_multipart(
        &self,
        url: &str,
        payload: &MatchPayload,
    ) -> Result<RawResponse, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), payload.clone()));
        self.calls.fetch_add(1, Ordering::SeqCst);

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Gated(rx)) => rx
                .await
                .map_err(|_| TransportError("gate dropped".to_string())),
            None => Err(TransportError("no scripted reply".to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

pub const BASE: &str = "http://matcher.test";

pub fn orchestrator(
    transport: &Arc<ScriptedTransport>,
    policy: ConsistencyPolicy,
) -> (Orchestrator, mpsc::UnboundedReceiver<Notice>) {
    let base = BaseUrl::parse(BASE, None).unwrap();
    let client = MatchingClient::new(transport.clone(), base);
    Orchestrator::new(client, policy)
}

pub fn resume(name: &str) -> ResumeFile {
    ResumeFile::new(name, "application/pdf", name.as_bytes().to_vec())
}

pub fn dataset_body(title: &str, score: f64) -> String {
    serde_json::json!({
        "matches": [{"title": title, "match_score": score}],
        "matched_keywords": ["python"],
        "suggested_keywords": ["sql"]
    })
    .to_string()
}

pub fn ok(body: &str) -> RawResponse {
    RawResponse::new(200, body)
}
