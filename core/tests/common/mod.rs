//! Transports shared by the integration tests.
//!
//! `UreqTransport` talks to a live mock server over real HTTP and records
//! every request so tests can count network calls. `ScriptedTransport`
//! answers from a queue of channels, letting a test decide when (and whether)
//! each response arrives.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use futures::channel::oneshot;
use todo_core::{ApiError, HttpMethod, HttpRequest, HttpResponse, Transport};

/// Start the mock server on a random port and return its API base URL.
pub fn spawn_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}/api")
}

/// A base URL nothing listens on.
pub fn dead_server() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

/// Executes requests with ureq, blocking the calling task.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
pub struct UreqTransport {
    agent: ureq::Agent,
    requests: RefCell<Vec<HttpRequest>>,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            agent,
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }

    /// Number of list-page reads so far.
    pub fn page_reads(&self) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|req| req.method == HttpMethod::Get && req.path.contains("/todos?"))
            .count()
    }

    /// Requests sent with `method`, oldest first.
    pub fn sent(&self, method: HttpMethod) -> Vec<HttpRequest> {
        self.requests
            .borrow()
            .iter()
            .filter(|req| req.method == method)
            .cloned()
            .collect()
    }

    pub fn last(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.borrow_mut().push(req.clone());

        let body = req.body.unwrap_or_default();
        let result = match req.method {
            HttpMethod::Get => with_headers(self.agent.get(&req.path), &req.headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&req.path), &req.headers).call(),
            HttpMethod::Post => {
                with_headers(self.agent.post(&req.path), &req.headers).send(body.as_bytes())
            }
            HttpMethod::Put => {
                with_headers(self.agent.put(&req.path), &req.headers).send(body.as_bytes())
            }
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string().unwrap_or_default();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Answers each request with the next queued channel.
pub struct ScriptedTransport {
    pending: RefCell<VecDeque<oneshot::Receiver<HttpResponse>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            pending: RefCell::new(VecDeque::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Queue a response the test releases later through the returned sender.
    pub fn gate(&self) -> oneshot::Sender<HttpResponse> {
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().push_back(rx);
        tx
    }

    /// Queue a response that is available immediately.
    pub fn respond(&self, response: HttpResponse) {
        self.gate().send(response).unwrap();
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Transport for ScriptedTransport {
    async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.borrow_mut().push(req);
        let next = self.pending.borrow_mut().pop_front();
        match next {
            Some(rx) => rx
                .await
                .map_err(|_| ApiError::Transport("response gate dropped".to_string())),
            None => Err(ApiError::Transport("no scripted response".to_string())),
        }
    }
}

pub fn todo_json(id: &str, title: &str, completed: bool) -> String {
    serde_json::json!({
        "id": id,
        "title": title,
        "completed": completed,
        "createdAt": "2024-05-01T10:00:00Z",
        "updatedAt": "2024-05-01T10:00:00Z",
    })
    .to_string()
}

pub fn todo_response(id: &str, title: &str, etag: &str) -> HttpResponse {
    HttpResponse {
        status: 200,
        headers: vec![("etag".to_string(), etag.to_string())],
        body: todo_json(id, title, false),
    }
}
