//! tcbot core library
//!
//! Queries a Semantic MediaWiki `Special:Ask` endpoint for test cases,
//! checks each test case's validation page for a capability marker and
//! dumps result sets for the static consumer page.

pub mod classify;
pub mod config;
pub mod error;
pub mod fakes;
pub mod flatten;
pub mod query;
pub mod record;
pub mod session;
pub mod telemetry;

pub use classify::{
    BrowseMode, ClassificationResult, Classifier, MarkerProbe, SubstringProbe, UrlOpener, XdgOpen,
};
pub use config::{Credentials, WikiConfig};
pub use error::{BotError, Result};
pub use flatten::{dump, flatten, ConsumedDocument, DumpPaths, FlattenedRecord};
pub use query::{
    capability_marker, search, AdditionalColumn, AskQuery, Condition, QueryFilter, Status,
};
pub use record::{PrintoutValue, QueryResult, TestCaseRecord};
pub use session::{WikiSession, WikiTransport};
pub use telemetry::init_tracing;
