//! Helper for walking paginated list operations

use futures::stream::{self, StreamExt};
use log::{debug, trace};
use std::future::Future;

use crate::config::api;
use crate::error::{Result, TfeError};
use crate::hcp::traits::ListResponse;
use crate::hcp::validation::ListOptions;

/// Fetch every page of a list operation
///
/// Page 1 is fetched first to learn `total-pages`; the remaining pages are
/// then fetched in parallel (at most `MAX_CONCURRENT_PAGE_REQUESTS` at a
/// time). Items are returned in page order. The first failing page aborts
/// the whole walk.
///
/// ```no_run
/// # async fn demo(client: &tfe_client::TfeClient) -> tfe_client::Result<()> {
/// use tfe_client::prelude::*;
/// use tfe_client::hcp::helpers::fetch_all_pages;
/// use tfe_client::hcp::workspaces::WorkspaceListOptions;
///
/// let service = client.workspaces();
/// let service = &service;
/// let all = fetch_all_pages(|page| async move {
///     let options = WorkspaceListOptions { list: page, ..Default::default() };
///     service.list("my-org", Some(&options)).await
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn fetch_all_pages<T, F, Fut>(fetch: F) -> Result<Vec<T>>
where
    F: Fn(ListOptions) -> Fut,
    Fut: Future<Output = Result<ListResponse<T>>>,
{
    let first = fetch(ListOptions::page(1, api::DEFAULT_PAGE_SIZE)).await?;
    let total_pages = first.total_pages();
    let mut all_items = first.items;

    debug!(
        "Page 1/{} returned {} items",
        total_pages,
        all_items.len()
    );

    if total_pages <= 1 {
        return Ok(all_items);
    }

    debug!(
        "Fetching {} remaining pages in parallel (max {} concurrent)",
        total_pages - 1,
        api::MAX_CONCURRENT_PAGE_REQUESTS
    );

    let page_futures = (2..=total_pages).map(|page_num| {
        let page = fetch(ListOptions::page(page_num, api::DEFAULT_PAGE_SIZE));
        async move {
            let response = page.await?;
            trace!("Page {} returned {} items", page_num, response.items.len());
            Ok::<_, TfeError>((page_num, response.items))
        }
    });

    let results: Vec<Result<(u32, Vec<T>)>> = stream::iter(page_futures)
        .buffer_unordered(api::MAX_CONCURRENT_PAGE_REQUESTS)
        .collect()
        .await;

    let mut page_results = results.into_iter().collect::<Result<Vec<_>>>()?;
    page_results.sort_by_key(|(page_num, _)| *page_num);

    for (_, items) in page_results {
        all_items.extend(items);
    }

    debug!("Fetched {} total items", all_items.len());
    Ok(all_items)
}
