//! Wiki connection settings
//!
//! A [`WikiConfig`] is passed to every component that needs to build a
//! wiki URL. `host` is the script URL of the wiki (for example
//! `https://wiki.example.org/index.php`).

use std::fmt;

/// Environment variable holding the wiki script URL
pub const HOST_ENV: &str = "BOT_HOST";

const VALIDATION_PAGE: &str = "Test Case Validation";

/// HTTP basic-auth credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: &str, password: &str) -> Self {
        Credentials {
            user: user.to_string(),
            password: password.to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Wiki configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiConfig {
    /// Wiki script URL, without trailing slash
    pub host: String,
    /// Basic-auth credentials sent with every request
    pub credentials: Credentials,
}

impl WikiConfig {
    /// Create config for a specific wiki
    pub fn new(host: &str, credentials: Credentials) -> Self {
        WikiConfig {
            host: host.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Page fetched once at login to establish the session cookie
    pub fn main_page_url(&self) -> String {
        format!("{}/Main_Page", self.host)
    }

    /// "Test Case Validation" page rendered in the context of a test case
    pub fn validation_url(&self, record_id: &str) -> String {
        format!(
            "{}?title={}&pageContext={}",
            self.host,
            encode_title(VALIDATION_PAGE),
            encode_title(record_id)
        )
    }

    /// Plain view of a test case page
    pub fn view_url(&self, record_id: &str) -> String {
        format!("{}?title={}", self.host, encode_title(record_id))
    }

    /// Page Forms edit view of a test case page
    pub fn edit_url(&self, record_id: &str) -> String {
        format!("{}&action=formedit", self.view_url(record_id))
    }

    /// Full URL for an already assembled query string
    pub fn ask_url(&self, query: &str) -> String {
        format!("{}?{}", self.host, query)
    }
}

fn encode_title(title: &str) -> String {
    urlencoding::encode(title).into_owned()
}
