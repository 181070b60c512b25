//! Single-page front end for tcbot dumps.
//!
//! `GET /` renders the bundled template with the wiki base URL taken from
//! the environment. `GET /static/*` serves the dump directory, which is
//! where the page loads `consumed.json` from.

use std::path::Path;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;
use tracing::error;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");
const BASEURL_SLOT: &str = "{{ baseurl }}";

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Environment variable holding the wiki base URL, read per request
    pub host_var: String,
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            host_var: tcbot_core::config::HOST_ENV.to_string(),
        }
    }
}

/// Build the router: `/` plus `/static` served from `static_dir`
pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

/// Render the index page, or 500 when the base URL is not configured
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    match std::env::var(&state.host_var) {
        Ok(baseurl) => Ok(Html(render_index(&baseurl))),
        Err(err) => {
            error!(var = %state.host_var, %err, "wiki base URL is not set");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Fill the template with an HTML-escaped base URL
pub fn render_index(baseurl: &str) -> String {
    INDEX_TEMPLATE.replace(BASEURL_SLOT, &escape_html(baseurl))
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fills_every_slot() {
        let page = render_index("https://wiki.example.org/index.php");
        assert!(!page.contains(BASEURL_SLOT));
        assert!(page.contains(r#"data-baseurl="https://wiki.example.org/index.php""#));
        assert!(page.contains(">https://wiki.example.org/index.php</a>"));
    }

    #[test]
    fn test_render_escapes_base_url() {
        let page = render_index(r#"https://wiki/?a=1&b="x"<"#);
        assert!(page.contains("https://wiki/?a=1&amp;b=&quot;x&quot;&lt;"));
        assert!(!page.contains(r#"b="x""#));
    }

    #[tokio::test]
    async fn test_index_reads_configured_variable() {
        std::env::set_var("TCBOT_WEB_TEST_HOST_SET", "https://wiki/index.php");
        let state = AppState {
            host_var: "TCBOT_WEB_TEST_HOST_SET".to_string(),
        };
        let Html(body) = index(State(state)).await.unwrap();
        assert!(body.contains("https://wiki/index.php"));
    }

    #[tokio::test]
    async fn test_index_without_variable_is_500() {
        let state = AppState {
            host_var: "TCBOT_WEB_TEST_HOST_UNSET".to_string(),
        };
        assert_eq!(
            index(State(state)).await.unwrap_err(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_default_state_uses_bot_host() {
        assert_eq!(AppState::default().host_var, "BOT_HOST");
    }
}
