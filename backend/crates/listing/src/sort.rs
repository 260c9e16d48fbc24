//! Sort Resolver

/// A sortable field: the public parameter name and the column it maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortField {
    pub param: &'static str,
    pub column: &'static str,
}

impl SortField {
    pub const fn new(param: &'static str, column: &'static str) -> Self {
        Self { param, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Sort clause after allow-list resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSort {
    pub column: &'static str,
    pub direction: SortDirection,
}

/// Resolve `sortField` / `sortOrder`
///
/// The requested field is honored only when it is in `fields` and a
/// `sortOrder` was also given; `"desc"` sorts descending, any other order
/// value ascending. Everything else falls back to `default_column`
/// descending.
pub fn resolve_sort(
    fields: &[SortField],
    default_column: &'static str,
    sort_field: Option<&str>,
    sort_order: Option<&str>,
) -> ResolvedSort {
    let requested = sort_field.and_then(|name| fields.iter().find(|f| f.param == name));

    match (requested, sort_order) {
        (Some(field), Some(order)) => ResolvedSort {
            column: field.column,
            direction: if order == "desc" {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            },
        },
        _ => ResolvedSort {
            column: default_column,
            direction: SortDirection::Desc,
        },
    }
}
