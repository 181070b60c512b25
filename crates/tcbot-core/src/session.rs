//! Authenticated wiki session
//!
//! One reqwest client with a cookie store. Basic auth is sent with every
//! request; the login GET only exists to pick up the session cookie.

use async_trait::async_trait;
use tracing::debug;

use crate::config::WikiConfig;
use crate::Result;

/// Read-only access to wiki pages.
///
/// Implemented by [`WikiSession`] for real requests and by
/// [`crate::fakes::MemoryTransport`] in tests.
#[async_trait]
pub trait WikiTransport: Send + Sync {
    /// GET `url` and return the response body as text.
    async fn get_text(&self, url: &str) -> Result<String>;
}

/// Wiki session client
pub struct WikiSession {
    config: WikiConfig,
    http_client: reqwest::Client,
}

impl WikiSession {
    /// Build the client without touching the network
    pub fn new(config: WikiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("tcbot/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .build()?;

        Ok(WikiSession {
            config,
            http_client,
        })
    }

    /// Build the client and fetch the main page once.
    ///
    /// The login response is not checked; a rejected login shows up later
    /// as empty or unauthenticated query results.
    pub async fn login(config: WikiConfig) -> Result<Self> {
        let session = Self::new(config)?;
        let url = session.config.main_page_url();

        let response = session.request(&url).send().await?;
        let cookies: Vec<String> = response.cookies().map(|c| c.name().to_string()).collect();
        debug!(status = %response.status(), ?cookies, "login request finished");

        Ok(session)
    }

    pub fn config(&self) -> &WikiConfig {
        &self.config
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let creds = &self.config.credentials;
        self.http_client
            .get(url)
            .basic_auth(&creds.user, Some(&creds.password))
    }
}

#[async_trait]
impl WikiTransport for WikiSession {
    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.request(url).send().await?;
        debug!(%url, status = %response.status(), "fetched page");
        Ok(response.text().await?)
    }
}
