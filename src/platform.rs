// Platform services — capability checks and outbound communication dispatch.
// The real implementation hands tel:/sms:/mailto: URIs to a desktop opener
// command; tests inject a recording fake instead.

use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Which composer a completion belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerKind {
    Text,
    Mail,
}

/// How a composer session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerResult {
    Sent,
    Cancelled,
    Failed,
}

/// Capability queries and dispatch for call, text and mail actions
pub trait PlatformServices {
    fn can_dial(&self) -> bool;
    fn can_send_text(&self) -> bool;
    fn can_send_mail(&self) -> bool;

    /// Dispatch a phone call. Fire-and-forget, no completion callback.
    fn dial(&self, number: &str) -> Result<(), String>;

    fn send_text(&self, recipient: &str, body: &str) -> Result<(), String>;

    fn send_mail(&self, recipient: &str, subject: &str, body: &str) -> Result<(), String>;
}

// ── URI construction ─────────────────────────────────────────────────────────

pub fn tel_uri(number: &str) -> String {
    format!("tel:{}", number)
}

pub fn sms_uri(recipient: &str, body: &str) -> String {
    format!("sms:{}?body={}", recipient, encode_component(body))
}

pub fn mailto_uri(recipient: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        recipient,
        encode_component(subject),
        encode_component(body)
    )
}

/// Percent-encode a URI query component (unreserved characters pass through)
fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

// ── System implementation ────────────────────────────────────────────────────

/// Dispatches URIs through a configurable opener command (xdg-open by default).
/// Capability means the opener resolves to an executable on PATH.
pub struct SystemPlatform {
    opener: String,
}

impl SystemPlatform {
    pub fn new(opener: String) -> Self {
        Self { opener }
    }

    fn opener_available(&self) -> bool {
        find_in_path(&self.opener).is_some()
    }

    fn open(&self, uri: &str) -> Result<(), String> {
        // Detach from our terminal; the handler owns its own UI
        Command::new(&self.opener)
            .arg(uri)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| format!("Failed to launch {}: {}", self.opener, e))?;

        Ok(())
    }
}

impl PlatformServices for SystemPlatform {
    fn can_dial(&self) -> bool {
        self.opener_available()
    }

    fn can_send_text(&self) -> bool {
        self.opener_available()
    }

    fn can_send_mail(&self) -> bool {
        self.opener_available()
    }

    fn dial(&self, number: &str) -> Result<(), String> {
        self.open(&tel_uri(number))
    }

    fn send_text(&self, recipient: &str, body: &str) -> Result<(), String> {
        self.open(&sms_uri(recipient, body))
    }

    fn send_mail(&self, recipient: &str, subject: &str, body: &str) -> Result<(), String> {
        self.open(&mailto_uri(recipient, subject, body))
    }
}

/// Resolve a command name against PATH. Names containing a separator are
/// treated as literal paths.
fn find_in_path(name: &str) -> Option<PathBuf> {
    if name.contains(std::path::MAIN_SEPARATOR) {
        let path = PathBuf::from(name);
        return path.is_file().then_some(path);
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
