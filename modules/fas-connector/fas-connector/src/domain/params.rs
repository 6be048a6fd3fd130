//! Typed query parameters, built after filter resolution.

use std::ops::Range;

use fas_connector_sdk::MembershipsQuery;
use modkit_connector::{QueryRequest, ResolvedFilters};

use crate::config::PageEndMode;

/// Parameters of the `userinfo` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfoParams {
    /// `None` when the supplied username was not a string.
    pub username: Option<String>,
}

impl From<&ResolvedFilters> for UserInfoParams {
    fn from(filters: &ResolvedFilters) -> Self {
        Self {
            username: filters.get_str("username").map(str::to_owned),
        }
    }
}

/// Parameters of the `usermemberships` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipsParams {
    /// `None` when the supplied username was not a string.
    pub username: Option<String>,
    pub profile: bool,
    pub show_approved: bool,
    pub show_unapproved: bool,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl MembershipsParams {
    #[must_use]
    pub fn from_filters(filters: &ResolvedFilters, request: &QueryRequest) -> Self {
        Self {
            username: filters.get_str("username").map(str::to_owned),
            profile: filters.flag("profile", false),
            show_approved: filters.flag("show_approved", true),
            show_unapproved: filters.flag("show_unapproved", true),
            offset: request.offset,
            limit: request.limit,
        }
    }
}

impl From<&MembershipsQuery> for MembershipsParams {
    fn from(q: &MembershipsQuery) -> Self {
        Self {
            username: Some(q.username.clone()),
            profile: q.profile,
            show_approved: q.show_approved,
            show_unapproved: q.show_unapproved,
            offset: q.offset,
            limit: q.limit,
        }
    }
}

/// Slice bounds of one page over `count` rows.
///
/// A missing `offset` starts at 0 and a missing `limit` runs to the end.
#[must_use]
pub fn page_range(
    count: usize,
    offset: Option<usize>,
    limit: Option<usize>,
    mode: PageEndMode,
) -> Range<usize> {
    let offset = offset.unwrap_or(0);
    let wanted_end = limit.map_or(usize::MAX, |l| offset.saturating_add(l));

    let end = match mode {
        PageEndMode::Exclusive => wanted_end.min(count),
        PageEndMode::Legacy if wanted_end >= count => count.saturating_sub(1),
        PageEndMode::Legacy => wanted_end,
    };

    offset.min(end)..end
}
