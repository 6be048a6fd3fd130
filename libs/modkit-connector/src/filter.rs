//! Alias-resolving, required-field-checking parameter filters.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::FilterError;

#[derive(Debug, Clone)]
struct FilterDef {
    name: String,
    allow_none: bool,
}

/// Declarative description of the filters a query path accepts.
///
/// ```
/// use modkit_connector::ParamFilter;
/// use serde_json::json;
///
/// let f = ParamFilter::new().add_filter("username", &["u", "user"], false);
/// let raw = json!({"u": "alice"});
/// let resolved = f.filter(raw.as_object().unwrap()).unwrap();
/// assert_eq!(resolved.get_str("username"), Some("alice"));
/// ```
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct ParamFilter {
    defs: Vec<FilterDef>,
    // raw key (canonical name or alias) -> index into `defs`
    lookup: HashMap<String, usize>,
}

impl ParamFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a filter under its canonical name with optional aliases.
    ///
    /// When `allow_none` is false the filter is required: an absent or `null`
    /// value makes [`ParamFilter::filter`] fail.
    pub fn add_filter(mut self, name: &str, aliases: &[&str], allow_none: bool) -> Self {
        let idx = self.defs.len();
        self.defs.push(FilterDef {
            name: name.to_owned(),
            allow_none,
        });
        self.lookup.insert(name.to_owned(), idx);
        for alias in aliases {
            self.lookup.insert((*alias).to_owned(), idx);
        }
        self
    }

    /// Canonical names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.iter().map(|d| d.name.as_str())
    }

    /// Resolve raw request filters into canonical names.
    ///
    /// Unknown keys are dropped. If both the canonical key and one of its
    /// aliases are present, the canonical key wins.
    ///
    /// # Errors
    /// Returns [`FilterError::MissingRequired`] when a required filter is absent or `null`.
    pub fn filter(&self, raw: &Map<String, Value>) -> Result<ResolvedFilters, FilterError> {
        let mut out = Map::new();

        for (key, value) in raw {
            let Some(&idx) = self.lookup.get(key) else {
                tracing::trace!(key = %key, "dropping unknown filter");
                continue;
            };
            let def = &self.defs[idx];
            let is_canonical = key == &def.name;
            if is_canonical || !out.contains_key(&def.name) {
                out.insert(def.name.clone(), value.clone());
            }
        }

        for def in self.defs.iter().filter(|d| !d.allow_none) {
            if out.get(&def.name).is_none_or(Value::is_null) {
                return Err(FilterError::MissingRequired {
                    name: def.name.clone(),
                });
            }
        }

        Ok(ResolvedFilters(out))
    }
}

/// Filters after alias resolution, keyed by canonical name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFilters(Map<String, Value>);

impl ResolvedFilters {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    /// The value as a string, or `None` when absent or not a string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Truthiness of the value, `default` when absent or `null`.
    #[must_use]
    pub fn flag(&self, name: &str, default: bool) -> bool {
        self.get(name).map_or(default, is_truthy)
    }

    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// Loose truthiness for flag-like filters.
///
/// Strings `""`, `false`, `0`, `no` and `off` (any case) are false.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Value::String(s) => !matches!(
            s.to_ascii_lowercase().as_str(),
            "" | "false" | "0" | "no" | "off"
        ),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
