//! Shared helpers for integration tests

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tradecfg::config::env;

/// In-memory sink for formatted log lines
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber that records log output, returning both
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer.contents())
}

/// Environment with a complete backend profile and exchange credentials
pub fn full_env() -> HashMap<String, String> {
    [
        (env::FIREBASE_PROJECT_ID, "trading-prod"),
        (env::FIREBASE_CREDENTIALS_PATH, "/etc/trading/creds.json"),
        (env::FIREBASE_DATABASE_URL, "https://trading-prod.example.com"),
        (env::EXCHANGE_API_KEY, "env-key"),
        (env::EXCHANGE_API_SECRET, "env-secret"),
        (env::TELEGRAM_BOT_TOKEN, "env-bot-token"),
        (env::TELEGRAM_CHAT_ID, "1001"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Environment with only the backend profile set
pub fn backend_only_env() -> HashMap<String, String> {
    let mut env = full_env();
    env.retain(|k, _| k.starts_with("FIREBASE_"));
    env
}

/// Temporary directory plus a config path inside it
pub fn temp_config() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config").join("trading_config.json");
    (temp_dir, path)
}

pub fn write_config(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}
