//! Walking every page of a list endpoint
//!
//! The caller supplies a `fetch` closure that lists one page given the
//! request overrides to use. The first call gets no overrides; later calls
//! get the override pointing at the next page.

use super::types::{NextPage, PageLimit};
use crate::error::Result;
use crate::request::RequestOption;
use crate::response::Response;
use futures::stream::{self, Stream, TryStreamExt};
use std::future::Future;
use tracing::debug;

struct PageState<F> {
    fetch: F,
    next: Option<Vec<RequestOption>>,
    fetched: usize,
    limit: PageLimit,
}

/// Stream every page, stopping at the first error
pub fn paginate<T, F, Fut>(limit: PageLimit, fetch: F) -> impl Stream<Item = Result<Vec<T>>>
where
    F: FnMut(Vec<RequestOption>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Response)>>,
{
    let state = PageState {
        fetch,
        next: Some(Vec::new()),
        fetched: 0,
        limit,
    };

    stream::try_unfold(state, |mut state| async move {
        let Some(overrides) = state.next.take() else {
            return Ok(None);
        };
        if state.limit.reached(state.fetched) {
            debug!("Page limit reached after {} pages", state.fetched);
            return Ok(None);
        }

        let (items, response) = (state.fetch)(overrides).await?;
        state.fetched += 1;

        let next = NextPage::from_response(&response);
        debug!(
            page = state.fetched,
            items = items.len(),
            next = ?next,
            "fetched page"
        );
        state.next = next.request_option().map(|opt| vec![opt]);

        Ok(Some((items, state)))
    })
}

/// Fetch every page and concatenate the items
pub async fn collect_all<T, F, Fut>(fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Vec<RequestOption>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Response)>>,
{
    collect_pages(PageLimit::Unlimited, fetch).await
}

/// Fetch up to `limit` pages and concatenate the items
pub async fn collect_pages<T, F, Fut>(limit: PageLimit, fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Vec<RequestOption>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Response)>>,
{
    paginate(limit, fetch)
        .try_fold(Vec::new(), |mut all, page| async move {
            all.extend(page);
            Ok(all)
        })
        .await
}
