//! Capability classification of test cases
//!
//! Every test case has a "Test Case Validation" page rendered in its
//! context. A test case whose validation page still mentions the
//! capability marker (`CC-<n>`) is reported as matched (red), all others
//! as unmatched (green). Matched test cases can optionally be opened in a
//! browser for editing.

use std::io::Write;
use std::process::Command;

use colored::Colorize;
use tracing::{debug, info, warn};

use crate::config::WikiConfig;
use crate::error::BotError;
use crate::query::capability_marker;
use crate::record::TestCaseRecord;
use crate::session::WikiTransport;
use crate::Result;

/// Decides whether a validation page carries the marker.
pub trait MarkerProbe {
    fn contains_marker(&self, page_body: &str, marker: &str) -> bool;
}

/// Plain substring search over the raw page body
#[derive(Debug, Default, Clone, Copy)]
pub struct SubstringProbe;

impl MarkerProbe for SubstringProbe {
    fn contains_marker(&self, page_body: &str, marker: &str) -> bool {
        page_body.contains(marker)
    }
}

/// Opens a URL for the operator.
pub trait UrlOpener {
    fn open(&self, url: &str) -> Result<()>;
}

/// Opens URLs with `xdg-open` and waits for it to return
#[derive(Debug, Default, Clone, Copy)]
pub struct XdgOpen;

impl UrlOpener for XdgOpen {
    fn open(&self, url: &str) -> Result<()> {
        launch("xdg-open", url)
    }
}

/// Run `program url`. Only a program that cannot be started is an error;
/// a non-zero exit status is logged and the run continues.
fn launch(program: &str, url: &str) -> Result<()> {
    let status = Command::new(program)
        .arg(url)
        .status()
        .map_err(|e| BotError::Browser(format!("failed to run {program}: {e}")))?;

    if !status.success() {
        warn!(%program, %url, %status, "browser launcher exited unsuccessfully");
    }
    Ok(())
}

/// Which page to open for matched test cases
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BrowseMode {
    /// `--browser`: open the page
    pub view: bool,
    /// `--browseredit`: open the form editor
    pub edit: bool,
}

impl BrowseMode {
    /// URL to open for `record_id`, or `None` when browsing is off.
    ///
    /// The editor wins when both flags are set.
    pub fn target(&self, config: &WikiConfig, record_id: &str) -> Option<String> {
        if self.edit {
            Some(config.edit_url(record_id))
        } else if self.view {
            Some(config.view_url(record_id))
        } else {
            None
        }
    }
}

/// Outcome of one classification run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    /// Marker still present
    pub matched: Vec<String>,
    /// Marker absent
    pub unmatched: Vec<String>,
}

impl ClassificationResult {
    pub fn processed(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }
}

/// Fetches validation pages and buckets test cases by marker presence
pub struct Classifier<'a> {
    transport: &'a dyn WikiTransport,
    config: &'a WikiConfig,
    probe: &'a dyn MarkerProbe,
    opener: &'a dyn UrlOpener,
}

impl<'a> Classifier<'a> {
    pub fn new(
        transport: &'a dyn WikiTransport,
        config: &'a WikiConfig,
        probe: &'a dyn MarkerProbe,
        opener: &'a dyn UrlOpener,
    ) -> Self {
        Classifier {
            transport,
            config,
            probe,
            opener,
        }
    }

    /// Classify at most `limit` records, writing one colored line each to `out`.
    ///
    /// A failed page fetch or browser launch aborts the run.
    pub async fn classify(
        &self,
        records: &[TestCaseRecord],
        capability: &str,
        limit: usize,
        browse: BrowseMode,
        out: &mut dyn Write,
    ) -> Result<ClassificationResult> {
        let marker = capability_marker(capability);
        let mut result = ClassificationResult::default();

        for record in records.iter().take(limit) {
            let url = self.config.validation_url(&record.id);
            let body = self.transport.get_text(&url).await?;

            if self.probe.contains_marker(&body, &marker) {
                writeln!(out, "{}", url.red())?;
                if let Some(target) = browse.target(self.config, &record.id) {
                    debug!(%target, "opening browser");
                    self.opener.open(&target)?;
                }
                result.matched.push(record.id.clone());
            } else {
                writeln!(out, "{}", url.green())?;
                result.unmatched.push(record.id.clone());
            }
        }

        info!(
            matched = result.matched.len(),
            unmatched = result.unmatched.len(),
            "classification finished"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::fakes::{MemoryTransport, RecordingOpener};
    use crate::record::QueryResult;
    use serde_json::json;

    fn config() -> WikiConfig {
        WikiConfig::new("https://wiki/index.php", Credentials::new("u", "p"))
    }

    #[test]
    fn test_substring_probe() {
        let probe = SubstringProbe;
        assert!(probe.contains_marker("<td>CC-321 Radio</td>", "CC-321"));
        assert!(!probe.contains_marker("<td>CC-32</td>", "CC-321"));
        // plain substring: a longer number still matches
        assert!(probe.contains_marker("<td>CC-3210</td>", "CC-321"));
    }

    #[test]
    fn test_browse_mode_targets() {
        let cfg = config();
        assert_eq!(BrowseMode::default().target(&cfg, "TC 1"), None);

        let view = BrowseMode {
            view: true,
            edit: false,
        };
        assert_eq!(
            view.target(&cfg, "TC 1").as_deref(),
            Some("https://wiki/index.php?title=TC%201")
        );

        let edit = BrowseMode {
            view: false,
            edit: true,
        };
        let both = BrowseMode {
            view: true,
            edit: true,
        };
        let expected = Some("https://wiki/index.php?title=TC%201&action=formedit".to_string());
        assert_eq!(edit.target(&cfg, "TC 1"), expected);
        assert_eq!(both.target(&cfg, "TC 1"), expected);
    }

    #[tokio::test]
    async fn test_matched_lines_red_unmatched_green() {
        colored::control::set_override(true);

        let cfg = config();
        let records = QueryResult::from_value(json!({
            "results": {"TC 1": {"printouts": {}}, "TC 2": {"printouts": {}}}
        }))
        .unwrap()
        .records;
        let transport = MemoryTransport::new()
            .with_page(cfg.validation_url("TC 1"), "<li>CC-321</li>")
            .with_page(cfg.validation_url("TC 2"), "<li>nothing left</li>");
        let opener = RecordingOpener::new();
        let classifier = Classifier::new(&transport, &cfg, &SubstringProbe, &opener);

        let mut out: Vec<u8> = Vec::new();
        classifier
            .classify(&records, "321", 10, BrowseMode::default(), &mut out)
            .await
            .unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("\u{1b}[31m"));
        assert!(lines[0].contains(&cfg.validation_url("TC 1")));
        assert!(lines[1].starts_with("\u{1b}[32m"));
        assert!(lines[1].contains(&cfg.validation_url("TC 2")));
    }

    #[test]
    fn test_launch_ignores_exit_status() {
        assert!(launch("false", "https://wiki/index.php?title=TC%201").is_ok());
    }

    #[test]
    fn test_launch_missing_program_is_error() {
        let err = launch("tcbot-no-such-launcher", "https://wiki/").unwrap_err();
        assert!(matches!(err, BotError::Browser(_)));
    }

    #[test]
    fn test_processed_count() {
        let result = ClassificationResult {
            matched: vec!["a".into()],
            unmatched: vec!["b".into(), "c".into()],
        };
        assert_eq!(result.processed(), 3);
    }
}
