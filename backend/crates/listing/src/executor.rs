//! List Query Executor

use kernel::error::app_error::AppResult;

use crate::definition::ListQuery;
use crate::page::PageResult;

/// A collection a [`ListQuery`] can run against
#[trait_variant::make(ListSource: Send)]
pub trait LocalListSource<T> {
    /// Items of the requested page, filtered, searched and sorted
    async fn fetch_page(&self, query: &ListQuery) -> AppResult<Vec<T>>;

    /// Everything matching filter and search, ignoring pagination
    async fn count(&self, query: &ListQuery) -> AppResult<u64>;
}

/// Run the page read and the count concurrently
///
/// The two reads are independent. A write landing between them can make the
/// metadata briefly disagree with the items.
pub async fn execute_list<T, S>(source: &S, query: &ListQuery) -> AppResult<PageResult<T>>
where
    S: ListSource<T> + Sync,
{
    let (items, total) = tokio::try_join!(source.fetch_page(query), source.count(query))?;
    Ok(PageResult::new(items, total, query.page()))
}
