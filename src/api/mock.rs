//! Scripted [`ApiExecutor`] for façade tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::context::Context;

use super::{ApiExecutor, ApiRequest, Error};

/// Returns queued responses in order, then `{"result":true}` forever.
#[derive(Default)]
pub(crate) struct MockExecutor {
    responses: Mutex<VecDeque<Result<Vec<u8>, Error>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockExecutor {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn respond(&self, body: Value) {
        let bytes = serde_json::to_vec(&body).unwrap();
        self.responses.lock().unwrap().push_back(Ok(bytes));
    }

    pub(crate) fn respond_raw(&self, body: &[u8]) {
        self.responses.lock().unwrap().push_back(Ok(body.to_vec()));
    }

    pub(crate) fn fail(&self, error: Error) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn last(&self) -> ApiRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

/// The JSON body of `request`, or `Value::Null` when it has none.
pub(crate) fn json_body(request: &ApiRequest) -> Value {
    request
        .body
        .as_ref()
        .map_or(Value::Null, |b| serde_json::from_slice(b.bytes()).unwrap())
}

impl ApiExecutor for MockExecutor {
    async fn execute_request(&self, _ctx: &Context, request: ApiRequest) -> Result<Vec<u8>, Error> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(br#"{"result":true}"#.to_vec()))
    }
}
