//! In-memory [`ListSource`] with the same semantics as the SQL renderer
//!
//! Backs repository doubles in tests of dependent crates.

use std::cmp::Ordering;

use kernel::error::app_error::AppResult;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::definition::ListQuery;
use crate::executor::ListSource;
use crate::filter::{Condition, FilterValue};
use crate::sort::SortDirection;

/// A record addressable by the same column names the SQL tables use
pub trait Document: Clone + Send + Sync {
    fn id(&self) -> Uuid;

    /// Value of `column`, `None` for unknown columns or SQL NULL
    fn field(&self, column: &str) -> Option<FilterValue>;
}

#[derive(Debug)]
pub struct MemoryCollection<T> {
    items: RwLock<Vec<T>>,
}

impl<T> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Document> MemoryCollection<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<T> {
        self.items.read().await.iter().find(|d| d.id() == id).cloned()
    }

    /// Insert or replace by id
    pub async fn upsert(&self, document: T) {
        let mut items = self.items.write().await;
        match items.iter_mut().find(|d| d.id() == document.id()) {
            Some(existing) => *existing = document,
            None => items.push(document),
        }
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|d| d.id() != id);
        items.len() != before
    }

    pub async fn all(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    async fn matching(&self, query: &ListQuery) -> Vec<T> {
        self.items
            .read()
            .await
            .iter()
            .filter(|d| matches(*d, query))
            .cloned()
            .collect()
    }
}

fn compare(a: &Option<FilterValue>, b: &Option<FilterValue>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp_value(b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn satisfies(document: &impl Document, condition: &Condition) -> bool {
    match condition {
        Condition::Eq { column, value } => document.field(column).as_ref() == Some(value),
        Condition::Range { column, gte, lte } => {
            let Some(actual) = document.field(column) else {
                return false;
            };
            let above = gte.as_ref().is_none_or(|lower| {
                matches!(
                    actual.partial_cmp_value(lower),
                    Some(Ordering::Greater | Ordering::Equal)
                )
            });
            let below = lte.as_ref().is_none_or(|upper| {
                matches!(
                    actual.partial_cmp_value(upper),
                    Some(Ordering::Less | Ordering::Equal)
                )
            });
            above && below
        }
    }
}

fn matches(document: &impl Document, query: &ListQuery) -> bool {
    if !query
        .filter()
        .conditions()
        .iter()
        .all(|c| satisfies(document, c))
    {
        return false;
    }

    let Some((token, targets)) = query.search() else {
        return true;
    };
    let text_hit = targets.text_columns.iter().any(|column| {
        matches!(document.field(column), Some(FilterValue::Text(text)) if token.matches(&text))
    });
    let number_hit = match (targets.numeric_column, token.number()) {
        (Some(column), Some(number)) => {
            document.field(column) == Some(FilterValue::Integer(number))
        }
        _ => false,
    };
    text_hit || number_hit
}

impl<T: Document> ListSource<T> for MemoryCollection<T> {
    async fn fetch_page(&self, query: &ListQuery) -> AppResult<Vec<T>> {
        let mut items = self.matching(query).await;

        let sort = query.sort();
        items.sort_by(|a, b| {
            let primary = compare(&a.field(sort.column), &b.field(sort.column));
            let ordering = primary
                .then_with(|| compare(&a.field(query.tiebreaker()), &b.field(query.tiebreaker())));
            match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let page = query.page();
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        Ok(items
            .into_iter()
            .skip(offset)
            .take(page.limit() as usize)
            .collect())
    }

    async fn count(&self, query: &ListQuery) -> AppResult<u64> {
        Ok(self.matching(query).await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;
    use crate::definition::{ListDefinition, ListParams};
    use crate::executor::execute_list;
    use crate::filter::{FieldKind, FilterField};
    use crate::pagination::PaginationPolicy;
    use crate::search::SearchTargets;
    use crate::sort::SortField;

    #[derive(Debug, Clone)]
    struct Item {
        id: Uuid,
        name: String,
        price_cents: i64,
        created_at: DateTime<Utc>,
    }

    impl Document for Item {
        fn id(&self) -> Uuid {
            self.id
        }

        fn field(&self, column: &str) -> Option<FilterValue> {
            match column {
                "id" => Some(FilterValue::Uuid(self.id)),
                "name" => Some(FilterValue::Text(self.name.clone())),
                "price_cents" => Some(FilterValue::Integer(self.price_cents)),
                "created_at" => Some(FilterValue::Timestamp(self.created_at)),
                _ => None,
            }
        }
    }

    const ITEMS: ListDefinition = ListDefinition {
        items_key: "products",
        total_key: "totalProducts",
        filters: &[
            FilterField::new("price", "price_cents", FieldKind::Money),
            FilterField::new("createdAt", "created_at", FieldKind::Date),
        ],
        sort_fields: &[
            SortField::new("createdAt", "created_at"),
            SortField::new("price", "price_cents"),
        ],
        default_sort_column: "created_at",
        search: Some(SearchTargets {
            text_columns: &["name"],
            numeric_column: None,
        }),
        pagination: PaginationPolicy::new(10, 50),
        tiebreaker: "id",
    };

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()
    }

    fn collection(n: usize) -> MemoryCollection<Item> {
        MemoryCollection::new(
            (0..n)
                .map(|i| Item {
                    id: Uuid::new_v4(),
                    name: format!("Item {i:02}"),
                    price_cents: (i as i64) * 100,
                    created_at: base_time() + Duration::days(i as i64),
                })
                .collect(),
        )
    }

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        pairs.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_twelve_items_page_of_five() {
        let items = collection(12);
        let query = ITEMS.build(&params(&[("page", "1"), ("limit", "5")])).unwrap();

        let page = execute_list(&items, &query).await.unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_count, 12);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.page_size, 5);
        // default sort is newest first
        assert_eq!(page.items[0].name, "Item 11");

        let last = ITEMS.build(&params(&[("page", "3"), ("limit", "5")])).unwrap();
        let page = execute_list(&items, &last).await.unwrap();
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn test_same_request_same_result() {
        let items = MemoryCollection::new(
            (0..6)
                .map(|_| Item {
                    id: Uuid::new_v4(),
                    name: "Same".into(),
                    price_cents: 100,
                    created_at: base_time(),
                })
                .collect(),
        );
        let query = ITEMS
            .build(&params(&[("limit", "3"), ("sortField", "price"), ("sortOrder", "asc")]))
            .unwrap();

        let first = execute_list(&items, &query).await.unwrap();
        let second = execute_list(&items, &query).await.unwrap();
        let ids = |p: &crate::page::PageResult<Item>| p.items.iter().map(|i| i.id).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(first.total_pages, second.total_pages);
    }

    #[tokio::test]
    async fn test_date_range_inclusive_of_last_day() {
        let items = MemoryCollection::new(vec![
            Item {
                id: Uuid::new_v4(),
                name: "before".into(),
                price_cents: 0,
                created_at: Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 59).unwrap(),
            },
            Item {
                id: Uuid::new_v4(),
                name: "first instant".into(),
                price_cents: 0,
                created_at: base_time(),
            },
            Item {
                id: Uuid::new_v4(),
                name: "late on last day".into(),
                price_cents: 0,
                created_at: Utc.with_ymd_and_hms(2024, 8, 1, 23, 59, 59).unwrap()
                    + Duration::milliseconds(500),
            },
            Item {
                id: Uuid::new_v4(),
                name: "after".into(),
                price_cents: 0,
                created_at: Utc.with_ymd_and_hms(2024, 8, 2, 0, 0, 0).unwrap(),
            },
        ]);
        let query = ITEMS
            .build(&params(&[
                ("createdAtFrom", "2024-07-01"),
                ("createdAtTo", "2024-08-01"),
            ]))
            .unwrap();

        let page = execute_list(&items, &query).await.unwrap();
        let mut names: Vec<_> = page.items.iter().map(|i| i.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["first instant", "late on last day"]);
    }

    #[tokio::test]
    async fn test_search_and_price_filter() {
        let items = collection(12);
        let query = ITEMS
            .build(&params(&[("search", "item 1"), ("priceFrom", "10.50")]))
            .unwrap();

        let page = execute_list(&items, &query).await.unwrap();
        // "Item 10" (1000 cents) is below the bound, "Item 11" matches
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].name, "Item 11");
    }

    #[tokio::test]
    async fn test_upsert_and_remove() {
        let items = collection(1);
        let mut item = items.all().await.remove(0);
        item.name = "Renamed".into();
        items.upsert(item.clone()).await;
        assert_eq!(items.get(item.id).await.unwrap().name, "Renamed");
        assert!(items.remove(item.id).await);
        assert!(!items.remove(item.id).await);
    }
}
