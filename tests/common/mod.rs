#![allow(dead_code)]

use std::process::{Command, Output};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::Value;
use tempfile::TempDir;
use tiny_http::{Header, Response, Server};

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    /// Header names are lowercased
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_cookie(&self, pair: &str) -> bool {
        self.header("cookie")
            .is_some_and(|cookies| cookies.split(';').any(|c| c.trim() == pair))
    }
}

pub struct MockResponse {
    status: u16,
    body: String,
    headers: Vec<(String, String)>,
}

impl MockResponse {
    pub fn json(status: u16, body: Value) -> Self {
        MockResponse {
            status,
            body: body.to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        }
    }

    pub fn empty(status: u16) -> Self {
        MockResponse {
            status,
            body: String::new(),
            headers: Vec::new(),
        }
    }

    pub fn with_cookie(mut self, cookie: &str) -> Self {
        self.headers.push(("Set-Cookie".to_string(), cookie.to_string()));
        self
    }
}

/// Minimal HTTP backend running on a background thread.
pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MockServer {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&Recorded) -> MockResponse + Send + 'static,
    {
        let server = Server::http("127.0.0.1:0").expect("http server");
        let base_url = format!("http://{}", server.server_addr());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));

        let log = Arc::clone(&requests);
        let stopped = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            while !stopped.load(Ordering::SeqCst) {
                let mut req = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let mut body = String::new();
                let _ = req.as_reader().read_to_string(&mut body);
                let recorded = Recorded {
                    method: req.method().to_string(),
                    path: req.url().to_string(),
                    headers: req
                        .headers()
                        .iter()
                        .map(|h| {
                            (
                                h.field.as_str().as_str().to_ascii_lowercase(),
                                h.value.as_str().to_string(),
                            )
                        })
                        .collect(),
                    body,
                };

                let reply = handler(&recorded);
                log.lock().unwrap().push(recorded);

                let mut response = Response::from_string(reply.body).with_status_code(reply.status);
                for (name, value) in reply.headers {
                    response = response.with_header(
                        Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("header"),
                    );
                }
                let _ = req.respond(response);
            }
        });

        MockServer {
            base_url,
            requests,
            stop,
            handle: Some(handle),
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests with the given method whose path starts with `prefix`.
    pub fn count(&self, method: &str, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path.starts_with(prefix))
            .count()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Helper struct to run evcat commands with an isolated config directory
pub struct EvcatTest {
    pub temp_dir: TempDir,
    base_url: Option<String>,
}

impl EvcatTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        EvcatTest {
            temp_dir,
            base_url: None,
        }
    }

    /// Point commands at a backend via `EVCAT_BASE_URL`.
    pub fn with_backend(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    pub fn config_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join(".evcat").join("config.yaml")
    }

    pub fn write_config(&self, content: &str) {
        let path = self.config_path();
        std::fs::create_dir_all(path.parent().unwrap()).expect("Failed to create .evcat");
        std::fs::write(path, content).expect("Failed to write config");
    }

    pub fn run(&self, args: &[&str]) -> Output {
        let mut command = Command::new(env!("CARGO_BIN_EXE_evcat"));
        command
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("EVCAT_ROOT", self.temp_dir.path().join(".evcat"))
            .env("NO_COLOR", "1")
            .env_remove("EVCAT_LOG");
        match &self.base_url {
            Some(url) => command.env("EVCAT_BASE_URL", url),
            None => command.env_remove("EVCAT_BASE_URL"),
        };
        command.output().expect("Failed to execute evcat command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let stdout = self.run_success(args);
        serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
    }
}

/// Narcotic collection entries as the backend returns them.
pub fn narcotics_payload() -> Value {
    serde_json::json!([
        {"id": 1, "drug_type": "ยาบ้า", "drug_category": "แอมเฟตามีน", "weight_grams": "0.1"},
        {"id": 2, "drug_type": "ไอซ์", "drug_category": "แอมเฟตามีน", "weight_grams": 1.5},
        {"id": 3, "drug_type": "กัญชา", "drug_category": "พืช"},
        {"id": 4, "drug_type": "ยาบ้า (แดง)", "drug_category": "แอมเฟตามีน"},
        {"id": 5, "drug_type": "เฮโรอีน", "drug_category": "โอปิออยด์"}
    ])
}
