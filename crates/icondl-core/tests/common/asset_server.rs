//! Minimal HTTP/1.1 server standing in for the icon CDN.
//!
//! Every GET is answered with a body derived from the request path, so tests
//! can check which URL produced which file. Paths containing `missing` get 404.

use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

use super::http::{read_request, respond};

pub struct AssetServer {
    /// Base URL, e.g. "http://127.0.0.1:12345/".
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl AssetServer {
    /// Request paths (with query) seen so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Body served for `path`.
pub fn body_for(path: &str) -> Vec<u8> {
    format!("png:{}", path).into_bytes()
}

/// Starts the server in a background thread; it runs until the process exits.
pub fn start() -> AssetServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);
    thread::spawn(move || {
        for mut stream in listener.incoming().flatten() {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                let Some(req) = read_request(&mut stream) else {
                    return;
                };
                log.lock().unwrap().push(req.path.clone());
                if !req.method.eq_ignore_ascii_case("GET") {
                    respond(&mut stream, "405 Method Not Allowed", "text/plain", b"");
                } else if req.path.contains("missing") {
                    respond(&mut stream, "404 Not Found", "text/plain", b"not found");
                } else {
                    respond(&mut stream, "200 OK", "image/png", &body_for(&req.path));
                }
            });
        }
    });
    AssetServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        requests,
    }
}
