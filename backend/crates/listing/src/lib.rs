//! Listing - paginated, filtered, sorted list queries from untrusted input
//!
//! A [`ListDefinition`] names everything a caller may influence for one
//! entity: filterable fields and their types, sortable fields, search
//! columns and the pagination policy. [`ListDefinition::build`] turns raw
//! query-string parameters into a [`ListQuery`] in which every column name
//! comes from that allow-list and every value is typed. Executors run the
//! query against PostgreSQL ([`sql`]) or an in-memory collection
//! ([`memory`], behind the `memory` feature).
//!
//! ```text
//! ListParams ──┬─ PageRequest::normalize ─┐
//!              ├─ resolve_sort ───────────┤
//!              ├─ build_filter ───────────┼─> ListQuery ─> execute_list ─> PageResult
//!              └─ SearchToken::parse ─────┘
//! ```

pub mod definition;
pub mod error;
pub mod executor;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod page;
pub mod pagination;
pub mod filter;
pub mod search;
pub mod sort;
pub mod sql;

pub use definition::{ListDefinition, ListParams, ListQuery, OwnerScope};
pub use error::ListQueryError;
pub use executor::{ListSource, execute_list};
pub use filter::{
    Condition, FieldKind, FilterExpression, FilterField, FilterValue, parse_money_cents,
};
pub use page::{ListEnvelope, PageResult};
pub use pagination::{PageRequest, PaginationPolicy};
pub use search::{SearchTargets, SearchToken};
pub use sort::{ResolvedSort, SortDirection, SortField};
pub use sql::{PgListSource, SqlTable};
