//! Ask query assembly and execution
//!
//! A [`QueryFilter`] (what the operator asked for on the command line) is
//! lowered into an [`AskQuery`]: an ordered list of [`Condition`] clauses
//! plus printout directives. Rendering joins the pieces with fixed
//! separators, so an unset filter only ever drops its own clause.

use std::collections::BTreeSet;
use std::fmt;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::WikiConfig;
use crate::error::BotError;
use crate::record::QueryResult;
use crate::session::WikiTransport;
use crate::Result;

const TEST_CASE_CATEGORY: &str = "Test Cases";
const STATUS_PROPERTY: &str = "Test case status";
const CONSUMED_PROPERTY: &str = "Is consumed by";
const PROVIDED_PROPERTY: &str = "Is provided by";
const OBJECTIVE_PROPERTY: &str = "Focus area objectives";
const MAIN_LABEL: &str = "TC";

/// Valid focus-area objective numbers
pub const OBJECTIVE_RANGE: std::ops::RangeInclusive<u8> = 2..=12;

/// Default capability number
pub const DEFAULT_CAPABILITY: &str = "321";

/// Default number of records classified per run
pub const DEFAULT_LIMIT: usize = 1000;

/// Test case review status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Status {
    #[default]
    PerformingDraft,
    InitialDraft,
    InitialReview,
    PerformingReview,
    Final,
    Withdrawn,
}

impl Status {
    /// Value stored in the `Test case status` property
    pub fn wiki_value(self) -> &'static str {
        match self {
            Status::PerformingDraft => "Performing-20Draft",
            Status::InitialDraft => "Initial-20Draft",
            Status::InitialReview => "Initial-20Review",
            Status::PerformingReview => "Performing-20Review",
            Status::Final => "Final",
            Status::Withdrawn => "Withdrawn",
        }
    }
}

/// Extra output column requested with `--additional`
///
/// Declaration order is the order in which columns are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum AdditionalColumn {
    Status,
    Standards,
    Keywords,
    Providers,
    Consumers,
    Objectives,
    Purpose,
    PreCondition,
    ValidationCriteria,
    #[cfg_attr(feature = "clap", value(name = "result"))]
    TestResult,
}

impl AdditionalColumn {
    /// Printout directive without the leading `?`
    pub fn printout(self) -> &'static str {
        match self {
            AdditionalColumn::Status => "Test case status=Status",
            AdditionalColumn::Standards => "Is testing=Standards",
            AdditionalColumn::Keywords => "Keyword=Keywords",
            AdditionalColumn::Providers => "Is provided by=Providers",
            AdditionalColumn::Consumers => "Is consumed by=Consumers",
            AdditionalColumn::Objectives => "Focus area objectives",
            AdditionalColumn::Purpose => "Description=Purpose",
            AdditionalColumn::PreCondition => "Precondition=Pre-condition",
            AdditionalColumn::ValidationCriteria => "Validation criteria",
            AdditionalColumn::TestResult => "Test result=Result",
        }
    }
}

/// One `[[...]]` clause of an Ask query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `[[Category:name]]`
    Category(String),
    /// `[[property::value]]`
    Equals { property: String, value: String },
    /// `[[property::~pattern]]`, `*` is the wildcard
    Like { property: String, pattern: String },
}

impl Condition {
    /// Wildcard match for `needle` anywhere in the property value
    pub fn contains(property: &str, needle: &str) -> Self {
        Condition::Like {
            property: property.to_string(),
            pattern: format!("*{needle}*"),
        }
    }

    pub fn equals(property: &str, value: &str) -> Self {
        Condition::Equals {
            property: property.to_string(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Category(name) => write!(f, "[[Category:{name}]]"),
            Condition::Equals { property, value } => write!(f, "[[{property}::{value}]]"),
            Condition::Like { property, pattern } => write!(f, "[[{property}::~{pattern}]]"),
        }
    }
}

/// Structured `Special:Ask` query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskQuery {
    pub conditions: Vec<Condition>,
    pub printouts: Vec<String>,
    pub mainlabel: String,
}

impl AskQuery {
    pub fn new(mainlabel: &str) -> Self {
        AskQuery {
            conditions: Vec::new(),
            printouts: Vec::new(),
            mainlabel: mainlabel.to_string(),
        }
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn printout(mut self, printout: &str) -> Self {
        self.printouts.push(printout.to_string());
        self
    }

    /// The `q=` part: conditions joined by single spaces
    pub fn conditions_string(&self) -> String {
        self.conditions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Query string for `index.php`, JSON output requested.
    ///
    /// Brackets and spaces are left as they are; the HTTP client encodes
    /// what it has to when the URL is parsed.
    pub fn query_string(&self) -> String {
        let mut query = format!("title=Special:Ask&q={}", self.conditions_string());

        if !self.printouts.is_empty() {
            query.push_str("&po=");
            for printout in &self.printouts {
                query.push('?');
                query.push_str(printout);
                query.push_str("%0D");
            }
        }

        query.push_str("&p[format]=json&p[mainlabel]=");
        query.push_str(&self.mainlabel);
        query
    }
}

/// Filter flags collected from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    pub status: Option<Status>,
    pub objective: Option<u8>,
    /// Match on `Is consumed by`
    pub consumed: bool,
    /// Match on `Is provided by`
    pub provided: bool,
    /// Capability number, without the `CC-` prefix
    pub capability: String,
    pub additional: BTreeSet<AdditionalColumn>,
    /// Maximum number of records to classify
    pub limit: usize,
}

impl Default for QueryFilter {
    fn default() -> Self {
        QueryFilter {
            status: Some(Status::default()),
            objective: None,
            consumed: false,
            provided: false,
            capability: DEFAULT_CAPABILITY.to_string(),
            additional: BTreeSet::new(),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl QueryFilter {
    /// Capability marker searched for, e.g. `CC-321`
    pub fn marker(&self) -> String {
        capability_marker(&self.capability)
    }

    /// Check the filter before any request is made.
    pub fn validate(&self) -> Result<()> {
        if !self.consumed && !self.provided {
            return Err(BotError::MissingCapabilityScope);
        }
        if let Some(objective) = self.objective {
            if !OBJECTIVE_RANGE.contains(&objective) {
                return Err(BotError::ObjectiveOutOfRange(objective));
            }
        }
        Ok(())
    }

    /// Lower the filter into an Ask query.
    ///
    /// Never fails: with neither `consumed` nor `provided` set the
    /// capability clause is left out.
    pub fn to_ask_query(&self) -> AskQuery {
        let marker = self.marker();
        let mut query = AskQuery::new(MAIN_LABEL)
            .condition(Condition::Category(TEST_CASE_CATEGORY.to_string()));

        if let Some(status) = self.status {
            query = query.condition(Condition::equals(STATUS_PROPERTY, status.wiki_value()));
        }
        if self.consumed {
            query = query.condition(Condition::contains(CONSUMED_PROPERTY, &marker));
        }
        if self.provided {
            query = query.condition(Condition::contains(PROVIDED_PROPERTY, &marker));
        }
        if let Some(objective) = self.objective {
            query = query.condition(Condition::contains(
                OBJECTIVE_PROPERTY,
                &format!("Objective {objective} @ FMNCS Focus Area"),
            ));
        }

        self.additional
            .iter()
            .fold(query, |query, column| query.printout(column.printout()))
    }
}

/// `CC-{capability}`
pub fn capability_marker(capability: &str) -> String {
    format!("CC-{capability}")
}

/// Run the filter against the wiki.
///
/// Returns `Ok(None)` when the wiki answers with something that is not an
/// Ask result; the reason is logged. Transport failures are returned as
/// errors.
pub async fn search(
    transport: &dyn WikiTransport,
    config: &WikiConfig,
    filter: &QueryFilter,
) -> Result<Option<QueryResult>> {
    let query = filter.to_ask_query();
    debug!(conditions = %query.conditions_string(), "assembled ask query");

    let url = config.ask_url(&query.query_string());
    info!("{}", url);

    let body = transport.get_text(&url).await?;
    Ok(parse_response(&body))
}

fn parse_response(body: &str) -> Option<QueryResult> {
    let raw: Value = match serde_json::from_str(body) {
        Ok(raw) => raw,
        Err(err) => {
            error!("Empty Resultset Returned");
            debug!(error = %err, "response body is not JSON");
            return None;
        }
    };

    match QueryResult::from_value(raw) {
        Ok(result) => {
            info!(records = result.records.len(), "query returned");
            Some(result)
        }
        Err(err) => {
            error!(error = %err, "unexpected Ask response");
            debug!(%body, "response body");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> QueryFilter {
        QueryFilter {
            status: None,
            ..QueryFilter::default()
        }
    }

    #[test]
    fn test_condition_rendering() {
        assert_eq!(
            Condition::Category("Test Cases".into()).to_string(),
            "[[Category:Test Cases]]"
        );
        assert_eq!(
            Condition::equals("Test case status", "Final").to_string(),
            "[[Test case status::Final]]"
        );
        assert_eq!(
            Condition::contains("Is consumed by", "CC-321").to_string(),
            "[[Is consumed by::~*CC-321*]]"
        );
    }

    #[test]
    fn test_status_wiki_values() {
        assert_eq!(Status::default(), Status::PerformingDraft);
        assert_eq!(Status::PerformingDraft.wiki_value(), "Performing-20Draft");
        assert_eq!(Status::InitialReview.wiki_value(), "Initial-20Review");
        assert_eq!(Status::Withdrawn.wiki_value(), "Withdrawn");
    }

    #[test]
    fn test_validate_requires_a_capability_scope() {
        let err = filter().validate().unwrap_err();
        assert!(matches!(err, BotError::MissingCapabilityScope));

        let consumed = QueryFilter {
            consumed: true,
            ..filter()
        };
        assert!(consumed.validate().is_ok());

        let both = QueryFilter {
            consumed: true,
            provided: true,
            ..filter()
        };
        assert!(both.validate().is_ok());
    }

    #[test]
    fn test_validate_objective_range() {
        for (objective, ok) in [(1, false), (2, true), (12, true), (13, false)] {
            let f = QueryFilter {
                provided: true,
                objective: Some(objective),
                ..filter()
            };
            assert_eq!(f.validate().is_ok(), ok, "objective {objective}");
        }
    }

    #[test]
    fn test_minimal_query() {
        let q = QueryFilter {
            consumed: true,
            ..filter()
        }
        .to_ask_query();
        assert_eq!(
            q.query_string(),
            "title=Special:Ask&q=[[Category:Test Cases]] [[Is consumed by::~*CC-321*]]\
             &p[format]=json&p[mainlabel]=TC"
        );
    }

    #[test]
    fn test_clause_order_status_capability_objective() {
        let q = QueryFilter {
            status: Some(Status::InitialDraft),
            objective: Some(4),
            provided: true,
            capability: "17".into(),
            ..filter()
        }
        .to_ask_query();
        assert_eq!(
            q.conditions_string(),
            "[[Category:Test Cases]] [[Test case status::Initial-20Draft]] \
             [[Is provided by::~*CC-17*]] \
             [[Focus area objectives::~*Objective 4 @ FMNCS Focus Area*]]"
        );
    }

    #[test]
    fn test_additional_columns_in_canonical_order() {
        let additional = [
            AdditionalColumn::TestResult,
            AdditionalColumn::Status,
            AdditionalColumn::Consumers,
        ]
        .into_iter()
        .collect();
        let q = QueryFilter {
            consumed: true,
            additional,
            ..filter()
        }
        .to_ask_query();
        assert!(q.query_string().ends_with(
            "&po=?Test case status=Status%0D?Is consumed by=Consumers%0D?Test result=Result%0D\
             &p[format]=json&p[mainlabel]=TC"
        ));
    }

    #[test]
    fn test_marker() {
        assert_eq!(filter().marker(), "CC-321");
        assert_eq!(capability_marker("9"), "CC-9");
    }

    #[test]
    fn test_parse_response_non_json_is_absent() {
        assert!(parse_response("<html>login required</html>").is_none());
        assert!(parse_response("").is_none());
    }

    #[test]
    fn test_parse_response_unexpected_shape_is_absent() {
        assert!(parse_response(r#"{"results": 5}"#).is_none());
    }

    #[test]
    fn test_parse_response_ok() {
        let result = parse_response(r#"{"results": {"TC 1": {"printouts": []}}}"#).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].id, "TC 1");
    }
}
