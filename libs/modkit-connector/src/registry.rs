//! Query path and column metadata.

use serde::Serialize;

use crate::request::SortOrder;

/// Display and capability flags for one column of a query path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    pub default_visible: bool,
    pub can_sort: bool,
    pub can_filter_wildcards: bool,
}

/// A named query operation and its table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPath {
    pub name: String,
    pub primary_key_col: Option<String>,
    pub default_sort_col: Option<String>,
    pub default_sort_order: SortOrder,
    pub can_paginate: bool,
    pub columns: Vec<ColumnSpec>,
}

impl QueryPath {
    fn new(name: &str, can_paginate: bool) -> Self {
        Self {
            name: name.to_owned(),
            primary_key_col: None,
            default_sort_col: None,
            default_sort_order: SortOrder::Descending,
            can_paginate,
            columns: Vec::new(),
        }
    }

    pub fn primary_key_col(&mut self, col: &str) -> &mut Self {
        self.primary_key_col = Some(col.to_owned());
        self
    }

    pub fn default_sort_col(&mut self, col: &str) -> &mut Self {
        self.default_sort_col = Some(col.to_owned());
        self
    }

    pub fn default_sort_order(&mut self, order: SortOrder) -> &mut Self {
        self.default_sort_order = order;
        self
    }

    /// Append a column. A column registered twice keeps its first position
    /// and takes the latest flags.
    pub fn register_column(
        &mut self,
        name: &str,
        default_visible: bool,
        can_sort: bool,
        can_filter_wildcards: bool,
    ) -> &mut Self {
        let spec = ColumnSpec {
            name: name.to_owned(),
            default_visible,
            can_sort,
            can_filter_wildcards,
        };
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => *existing = spec,
            None => self.columns.push(spec),
        }
        self
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Names of the columns shown when the caller did not pick any.
    pub fn visible_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|c| c.default_visible)
            .map(|c| c.name.as_str())
    }
}

/// Registry of query paths populated by [`crate::Connector::register`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct PathRegistry {
    paths: Vec<QueryPath>,
}

impl PathRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a path and return it for column registration.
    pub fn register_path(&mut self, name: &str, can_paginate: bool) -> &mut QueryPath {
        let path = QueryPath::new(name, can_paginate);
        let idx = if let Some(idx) = self.paths.iter().position(|p| p.name == name) {
            tracing::debug!(path = name, "replacing registered query path");
            self.paths[idx] = path;
            idx
        } else {
            self.paths.push(path);
            self.paths.len() - 1
        };
        &mut self.paths[idx]
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&QueryPath> {
        self.paths.iter().find(|p| p.name == name)
    }

    pub fn paths(&self) -> impl Iterator<Item = &QueryPath> {
        self.paths.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn register_path_with_columns() {
        let mut registry = PathRegistry::new();
        registry
            .register_path("groups", true)
            .primary_key_col("id")
            .default_sort_col("name")
            .register_column("id", false, false, false)
            .register_column("name", true, true, false);

        let path = registry.get("groups").unwrap();
        assert!(path.can_paginate);
        assert_eq!(path.primary_key_col.as_deref(), Some("id"));
        assert_eq!(path.default_sort_col.as_deref(), Some("name"));
        assert_eq!(path.default_sort_order, SortOrder::Descending);
        assert_eq!(path.columns.len(), 2);
        assert!(path.column("name").unwrap().can_sort);
        assert_eq!(path.visible_columns().collect::<Vec<_>>(), ["name"]);
    }

    #[test]
    fn re_registering_replaces_path() {
        let mut registry = PathRegistry::new();
        registry
            .register_path("groups", true)
            .register_column("id", true, false, false);
        registry.register_path("groups", false);

        assert_eq!(registry.len(), 1);
        let path = registry.get("groups").unwrap();
        assert!(!path.can_paginate);
        assert!(path.columns.is_empty());
    }

    #[test]
    fn duplicate_column_keeps_position() {
        let mut registry = PathRegistry::new();
        let path = registry.register_path("groups", true);
        path.register_column("a", true, false, false)
            .register_column("b", true, false, false)
            .register_column("a", false, false, false);

        let names: Vec<_> = path.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert!(!path.column("a").unwrap().default_visible);
    }

    #[test]
    fn unknown_path_is_none() {
        assert!(PathRegistry::new().get("nope").is_none());
        assert!(PathRegistry::new().is_empty());
    }
}
