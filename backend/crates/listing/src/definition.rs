//! Per-entity list definitions and the composed [`ListQuery`]

use std::collections::HashMap;

use serde::Deserialize;
use uuid::Uuid;

use crate::error::ListQueryError;
use crate::filter::{Condition, FilterExpression, FilterField, FilterValue, build_filter};
use crate::pagination::{PageRequest, PaginationPolicy};
use crate::search::{SearchTargets, SearchToken};
use crate::sort::{ResolvedSort, SortField, resolve_sort};

/// Raw query-string parameters
///
/// Deserializes from any query string; nothing is interpreted until
/// [`ListDefinition::build`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ListParams(HashMap<String, String>);

impl ListParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for ListParams {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Everything a caller may influence when listing one entity
#[derive(Debug, Clone, Copy)]
pub struct ListDefinition {
    /// Items key in the response envelope (`"products"`)
    pub items_key: &'static str,
    /// Total key in the pagination block (`"totalProducts"`)
    pub total_key: &'static str,
    pub filters: &'static [FilterField],
    pub sort_fields: &'static [SortField],
    /// Column used when no valid sort is requested, always descending
    pub default_sort_column: &'static str,
    /// `None` disables search; the `search` parameter is then ignored
    pub search: Option<SearchTargets>,
    pub pagination: PaginationPolicy,
    /// Unique column appended to every sort so pages are stable
    pub tiebreaker: &'static str,
}

/// Mandatory owner filter for "my records" listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerScope {
    pub column: &'static str,
    pub owner: Uuid,
}

impl ListDefinition {
    /// Build a query from untrusted parameters
    ///
    /// Fails only on a rejected search term, before anything touches a store.
    pub fn build(&self, params: &ListParams) -> Result<ListQuery, ListQueryError> {
        let search = match self.search {
            Some(targets) => SearchToken::parse(params.get("search"))?.map(|token| (token, targets)),
            None => None,
        };

        Ok(ListQuery {
            filter: build_filter(self.filters, params),
            search,
            sort: resolve_sort(
                self.sort_fields,
                self.default_sort_column,
                params.get("sortField"),
                params.get("sortOrder"),
            ),
            tiebreaker: self.tiebreaker,
            page: PageRequest::normalize(
                self.pagination,
                params.get("page"),
                params.get("limit"),
            ),
        })
    }

    /// [`build`](Self::build) with an owner equality placed ahead of every
    /// caller-supplied condition
    pub fn build_scoped(
        &self,
        params: &ListParams,
        scope: OwnerScope,
    ) -> Result<ListQuery, ListQueryError> {
        Ok(self
            .build(params)?
            .restrict(scope.column, FilterValue::Uuid(scope.owner)))
    }
}

/// A fully validated list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    filter: FilterExpression,
    search: Option<(SearchToken, SearchTargets)>,
    sort: ResolvedSort,
    tiebreaker: &'static str,
    page: PageRequest,
}

impl ListQuery {
    pub fn filter(&self) -> &FilterExpression {
        &self.filter
    }

    pub fn search(&self) -> Option<(&SearchToken, &SearchTargets)> {
        self.search.as_ref().map(|(token, targets)| (token, targets))
    }

    pub fn sort(&self) -> ResolvedSort {
        self.sort
    }

    pub fn tiebreaker(&self) -> &'static str {
        self.tiebreaker
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    /// Add a server-side equality ahead of the caller's conditions
    ///
    /// A caller condition on the same column still applies, so a
    /// contradicting one yields an empty page rather than widening access.
    pub fn restrict(mut self, column: &'static str, value: FilterValue) -> Self {
        self.filter.prepend(Condition::Eq { column, value });
        self
    }
}
