//! Fake WebDriver endpoint for integration tests.
//!
//! Serves one page per navigated URL. A page reveals its tiles in stages: each
//! `execute/sync` (scroll) call moves to the next stage, and `elements` reports
//! the tile count of the current stage. `source` returns the page markup.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

use super::http::{read_request, respond, Request};

#[derive(Debug, Clone)]
pub struct FakePage {
    /// Tile counts revealed by successive scrolls; the last one repeats.
    pub stages: Vec<usize>,
    pub markup: String,
}

#[derive(Debug, Default)]
struct Session {
    page: Option<String>,
    stage: usize,
}

#[derive(Debug, Default)]
struct State {
    pages: HashMap<String, FakePage>,
    sessions: HashMap<String, Session>,
    next_id: usize,
    created: usize,
    deleted: usize,
    scrolls: usize,
}

pub struct WebDriverServer {
    /// Endpoint to hand to the connector, e.g. "http://127.0.0.1:12345/wd/hub".
    pub endpoint: String,
    state: Arc<Mutex<State>>,
}

impl WebDriverServer {
    pub fn sessions_created(&self) -> usize {
        self.state.lock().unwrap().created
    }

    pub fn sessions_deleted(&self) -> usize {
        self.state.lock().unwrap().deleted
    }

    pub fn scrolls(&self) -> usize {
        self.state.lock().unwrap().scrolls
    }
}

/// Starts the server with the given `url -> page` table. Unknown URLs render
/// an empty page.
pub fn start(pages: Vec<(String, FakePage)>) -> WebDriverServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(Mutex::new(State {
        pages: pages.into_iter().collect(),
        ..State::default()
    }));
    let shared = Arc::clone(&state);
    thread::spawn(move || {
        for mut stream in listener.incoming().flatten() {
            let state = Arc::clone(&shared);
            thread::spawn(move || {
                let Some(req) = read_request(&mut stream) else {
                    return;
                };
                let (status, value) = dispatch(&state, &req);
                let body = serde_json::to_vec(&json!({ "value": value })).unwrap();
                respond(&mut stream, status, "application/json", &body);
            });
        }
    });
    WebDriverServer {
        endpoint: format!("http://127.0.0.1:{}/wd/hub", port),
        state,
    }
}

fn no_such_session() -> (&'static str, Value) {
    (
        "404 Not Found",
        json!({ "error": "invalid session id", "message": "no such session" }),
    )
}

fn dispatch(state: &Mutex<State>, req: &Request) -> (&'static str, Value) {
    let mut st = state.lock().unwrap();
    let path = req.path.trim_start_matches("/wd/hub");
    let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
    let body: Value = serde_json::from_slice(&req.body).unwrap_or(Value::Null);

    match (req.method.as_str(), parts.as_slice()) {
        ("POST", ["session"]) => {
            st.next_id += 1;
            st.created += 1;
            let id = format!("s{}", st.next_id);
            st.sessions.insert(id.clone(), Session::default());
            ("200 OK", json!({ "sessionId": id, "capabilities": {} }))
        }
        ("DELETE", ["session", id]) => {
            if st.sessions.remove(*id).is_none() {
                return no_such_session();
            }
            st.deleted += 1;
            ("200 OK", Value::Null)
        }
        ("POST", ["session", id, "url"]) => {
            let url = body["url"].as_str().unwrap_or_default().to_string();
            let Some(session) = st.sessions.get_mut(*id) else {
                return no_such_session();
            };
            session.page = Some(url);
            session.stage = 0;
            ("200 OK", Value::Null)
        }
        ("POST", ["session", id, "elements"]) => {
            let count = {
                let Some(session) = st.sessions.get(*id) else {
                    return no_such_session();
                };
                current_count(&st, session)
            };
            let elements: Vec<Value> = (0..count)
                .map(|i| json!({ "element-6066-11e4-a52e-4f735466cecf": format!("e{}", i) }))
                .collect();
            ("200 OK", Value::Array(elements))
        }
        ("POST", ["session", id, "execute", "sync"]) => {
            st.scrolls += 1;
            let Some(session) = st.sessions.get_mut(*id) else {
                return no_such_session();
            };
            session.stage += 1;
            ("200 OK", Value::Null)
        }
        ("GET", ["session", id, "source"]) => {
            let Some(session) = st.sessions.get(*id) else {
                return no_such_session();
            };
            let markup = session
                .page
                .as_ref()
                .and_then(|u| st.pages.get(u))
                .map(|p| p.markup.clone())
                .unwrap_or_else(|| "<html><body></body></html>".to_string());
            ("200 OK", Value::String(markup))
        }
        _ => (
            "404 Not Found",
            json!({ "error": "unknown command", "message": req.path }),
        ),
    }
}

fn current_count(st: &State, session: &Session) -> usize {
    session
        .page
        .as_ref()
        .and_then(|u| st.pages.get(u))
        .and_then(|p| {
            let idx = session.stage.min(p.stages.len().saturating_sub(1));
            p.stages.get(idx).copied()
        })
        .unwrap_or(0)
}
