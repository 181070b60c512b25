//! Test-case records as returned by `Special:Ask` in JSON format.
//!
//! The raw response is kept next to the typed records so it can be dumped
//! unchanged. Records keep the order in which the wiki returned them.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;

/// One value of a printout column
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PrintoutValue {
    /// Page-typed property value
    Page {
        fulltext: String,
        #[serde(default)]
        fullurl: Option<String>,
    },
    /// Text-typed property value
    Text(String),
    /// Anything else (numbers, dates, records)
    Other(Value),
}

impl PrintoutValue {
    /// Text shown for this value on the wiki, if it has one
    pub fn display_text(&self) -> Option<&str> {
        match self {
            PrintoutValue::Page { fulltext, .. } => Some(fulltext),
            PrintoutValue::Text(text) => Some(text),
            PrintoutValue::Other(_) => None,
        }
    }
}

/// A single test case page and its printouts
#[derive(Debug, Clone, PartialEq)]
pub struct TestCaseRecord {
    /// Wiki page title
    pub id: String,
    /// Printout label → values
    pub printouts: BTreeMap<String, Vec<PrintoutValue>>,
    pub fullurl: Option<String>,
}

impl TestCaseRecord {
    pub fn printout(&self, label: &str) -> Option<&[PrintoutValue]> {
        self.printouts.get(label).map(Vec::as_slice)
    }
}

/// Parsed Ask response
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Response exactly as received
    pub raw: Value,
    /// Typed records in response order
    pub records: Vec<TestCaseRecord>,
}

impl QueryResult {
    /// Interpret an already parsed JSON document as an Ask response
    pub fn from_value(raw: Value) -> serde_json::Result<Self> {
        let response = AskResponse::deserialize(&raw)?;
        let records = response
            .results
            .into_iter()
            .map(|(id, body)| TestCaseRecord {
                id,
                printouts: body.printouts.into_iter().collect(),
                fullurl: body.fullurl,
            })
            .collect();
        Ok(QueryResult { raw, records })
    }

    pub fn record_ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id.as_str())
    }
}

#[derive(Deserialize)]
struct AskResponse {
    #[serde(default, deserialize_with = "object_entries")]
    results: Vec<(String, RecordBody)>,
}

#[derive(Deserialize)]
struct RecordBody {
    #[serde(default, deserialize_with = "object_entries")]
    printouts: Vec<(String, Vec<PrintoutValue>)>,
    #[serde(default)]
    fullurl: Option<String>,
}

/// Object entries in document order. Semantic MediaWiki serialises an
/// empty object as `[]`, so an empty array is accepted too.
fn object_entries<'de, D, V>(
    deserializer: D,
) -> std::result::Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct EntriesVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an object or an empty array")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, V>()? {
                entries.push((key, value));
            }
            Ok(entries)
        }

        fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            if seq.next_element::<de::IgnoredAny>()?.is_some() {
                return Err(de::Error::invalid_length(1, &self));
            }
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(EntriesVisitor(PhantomData))
}
