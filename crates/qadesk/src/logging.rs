// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing setup with secret redaction.
//!
//! Log lines go to stderr so they never interleave with report text on
//! stdout. Google API keys and the configured key are masked before
//! anything is written.

use std::io::Write;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing_subscriber::EnvFilter;

const REDACTED: &str = "[REDACTED]";

static KEY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Google API keys: AIza...
        Regex::new(r"AIza[0-9A-Za-z_\-]{35}").expect("static regex"),
        // Key passed as a query parameter.
        Regex::new(r"key=[0-9A-Za-z_\-]{16,}").expect("static regex"),
    ]
});

/// Masks known key formats and the given exact values.
pub fn redact(input: &str, secrets: &[String]) -> String {
    let mut result = input.to_string();
    for pattern in KEY_PATTERNS.iter() {
        result = pattern.replace_all(&result, REDACTED).into_owned();
    }

    let mut sorted: Vec<&String> = secrets.iter().filter(|s| !s.is_empty()).collect();
    sorted.sort_by_key(|s| std::cmp::Reverse(s.len()));
    for secret in sorted {
        result = result.replace(secret.as_str(), REDACTED);
    }
    result
}

/// A writer that redacts secrets before forwarding to `inner`.
pub struct RedactingWriter<W> {
    inner: W,
    secrets: Arc<Vec<String>>,
}

impl<W: Write> RedactingWriter<W> {
    pub fn new(inner: W, secrets: Arc<Vec<String>>) -> Self {
        Self { inner, secrets }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let input = String::from_utf8_lossy(buf);
        self.inner
            .write_all(redact(&input, &self.secrets).as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides `log_level`.
pub fn init_tracing(log_level: &str, secrets: Vec<String>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("qadesk={log_level},warn")));
    let secrets = Arc::new(secrets);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(move || RedactingWriter::new(std::io::stderr(), secrets.clone()))
        .init();
}
