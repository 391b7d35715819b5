//! In-memory transport for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

type Responder = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync>;

/// Records every request it receives and answers with `responder`.
pub(crate) struct RecordingTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responder: Responder,
}

impl RecordingTransport {
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
    {
        Self::fallible(move |request| Ok(responder(request)))
    }

    pub(crate) fn fallible<F>(responder: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// Fails every call as a custom transport would.
    pub(crate) fn unavailable(reason: &'static str) -> Self {
        Self::fallible(move |_| Err(TransportError::Unavailable(reason.to_string())))
    }

    /// Always answers 200 with `body` as JSON.
    pub(crate) fn ok(body: &'static str) -> Self {
        Self::new(move |_| json_response(200, body))
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        response
    }
}

pub(crate) fn json_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: body.to_string(),
    }
}
