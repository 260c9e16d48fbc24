//! Page results and the response envelope

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::definition::ListDefinition;
use crate::pagination::PageRequest;

/// One page of items plus the metadata computed from the same request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    /// `ceil(total_count / page_size)`, 0 when nothing matches
    pub total_pages: u64,
    pub current_page: u32,
    pub page_size: u32,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, total_count: u64, page: PageRequest) -> Self {
        let page_size = page.limit();
        Self {
            items,
            total_count,
            total_pages: total_count.div_ceil(u64::from(page_size.max(1))),
            current_page: page.page(),
            page_size,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            total_pages: self.total_pages,
            current_page: self.current_page,
            page_size: self.page_size,
        }
    }

    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<PageResult<U>, E> {
        Ok(PageResult {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            total_count: self.total_count,
            total_pages: self.total_pages,
            current_page: self.current_page,
            page_size: self.page_size,
        })
    }
}

/// `{ "<items>": [...], "pagination": { "total<Entity>", "totalPages",
/// "currentPage", "pageSize" } }`
///
/// Key names come from the [`ListDefinition`].
pub struct ListEnvelope<T> {
    items_key: &'static str,
    total_key: &'static str,
    page: PageResult<T>,
}

impl<T> ListEnvelope<T> {
    pub fn new(definition: &ListDefinition, page: PageResult<T>) -> Self {
        Self {
            items_key: definition.items_key,
            total_key: definition.total_key,
            page,
        }
    }
}

struct PaginationMeta<'a, T> {
    total_key: &'static str,
    page: &'a PageResult<T>,
}

impl<T> Serialize for PaginationMeta<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry(self.total_key, &self.page.total_count)?;
        map.serialize_entry("totalPages", &self.page.total_pages)?;
        map.serialize_entry("currentPage", &self.page.current_page)?;
        map.serialize_entry("pageSize", &self.page.page_size)?;
        map.end()
    }
}

impl<T: Serialize> Serialize for ListEnvelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.items_key, &self.page.items)?;
        map.serialize_entry(
            "pagination",
            &PaginationMeta {
                total_key: self.total_key,
                page: &self.page,
            },
        )?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PaginationPolicy;

    fn page(page: &str, limit: &str) -> PageRequest {
        PageRequest::normalize(PaginationPolicy::new(10, 50), Some(page), Some(limit))
    }

    #[test]
    fn test_total_pages_ceiling() {
        assert_eq!(PageResult::<()>::new(vec![], 12, page("1", "5")).total_pages, 3);
        assert_eq!(PageResult::<()>::new(vec![], 10, page("1", "5")).total_pages, 2);
        assert_eq!(PageResult::<()>::new(vec![], 0, page("1", "5")).total_pages, 0);
        assert_eq!(PageResult::<()>::new(vec![], 1, page("1", "50")).total_pages, 1);
    }

    #[test]
    fn test_envelope_shape() {
        let definition = ListDefinition {
            items_key: "products",
            total_key: "totalProducts",
            filters: &[],
            sort_fields: &[],
            default_sort_column: "created_at",
            search: None,
            pagination: PaginationPolicy::new(10, 50),
            tiebreaker: "product_id",
        };
        let result = PageResult::new(vec!["a", "b"], 12, page("2", "5"));

        let json = serde_json::to_value(ListEnvelope::new(&definition, result)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "products": ["a", "b"],
                "pagination": {
                    "totalProducts": 12,
                    "totalPages": 3,
                    "currentPage": 2,
                    "pageSize": 5
                }
            })
        );
    }

    #[test]
    fn test_try_map_propagates_error() {
        let result = PageResult::new(vec![1, 2], 2, page("1", "5"));
        let mapped: Result<PageResult<i32>, &str> =
            result.try_map(|n| if n == 2 { Err("bad row") } else { Ok(n) });
        assert_eq!(mapped.unwrap_err(), "bad row");
    }
}
