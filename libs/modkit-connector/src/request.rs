use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sort direction. The query layer historically encodes it as `1` / `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// Map the numeric encoding: negative is descending, anything else ascending.
    #[must_use]
    pub fn from_sign(sign: i64) -> Self {
        if sign < 0 {
            Self::Descending
        } else {
            Self::Ascending
        }
    }
}

/// A query against one registered path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryRequest {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub order: SortOrder,
    pub sort_col: Option<String>,
    /// Raw filters, resolved by the path's [`crate::ParamFilter`].
    pub filters: Map<String, Value>,
}

impl QueryRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.filters.insert(key.to_owned(), value.into());
        self
    }

    #[must_use]
    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }
}

/// Rows returned by a query with the total count before paging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub count: usize,
    pub rows: Vec<Value>,
}

impl QueryResult {
    #[must_use]
    pub fn new(count: usize, rows: Vec<Value>) -> Self {
        Self { count, rows }
    }
}
