//! In-memory fakes for the wiki transport and browser launcher (testing only)
//!
//! `MemoryTransport` serves canned bodies by URL and `RecordingOpener`
//! remembers every URL it was asked to open.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::classify::UrlOpener;
use crate::error::BotError;
use crate::session::WikiTransport;
use crate::Result;

// ---------------------------------------------------------------------------
// MemoryTransport
// ---------------------------------------------------------------------------

/// Transport answering from a `HashMap<url, body>`.
///
/// Unknown URLs fail with [`BotError::Http`], like an unreachable wiki.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    pages: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`
    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(url, body);
        self
    }

    pub fn insert(&self, url: impl Into<String>, body: impl Into<String>) {
        let mut pages = self.pages.lock().unwrap();
        pages.insert(url.into(), body.into());
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl WikiTransport for MemoryTransport {
    async fn get_text(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        let pages = self.pages.lock().unwrap();
        pages
            .get(url)
            .cloned()
            .ok_or_else(|| BotError::Http(format!("no page for {url}")))
    }
}

// ---------------------------------------------------------------------------
// RecordingOpener
// ---------------------------------------------------------------------------

/// Opener that records URLs instead of launching a browser
#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) -> Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_transport_serves_and_records() {
        let transport = MemoryTransport::new().with_page("http://wiki/a", "body a");

        assert_eq!(transport.get_text("http://wiki/a").await.unwrap(), "body a");
        assert!(matches!(
            transport.get_text("http://wiki/b").await,
            Err(BotError::Http(_))
        ));
        assert_eq!(transport.requests(), vec!["http://wiki/a", "http://wiki/b"]);
    }

    #[test]
    fn test_recording_opener() {
        let opener = RecordingOpener::new();
        opener.open("http://wiki/x").unwrap();
        assert_eq!(opener.opened(), vec!["http://wiki/x"]);
    }
}
