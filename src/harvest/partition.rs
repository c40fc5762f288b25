//! Cap-bypass retrieval over a date window.
//!
//! The history server refuses to page past the 9,999th record of any
//! single query, whatever `retstart` asks for. A window whose raw match
//! count exceeds that ceiling is therefore bisected at its temporal
//! midpoint until every leaf window fits underneath it; a window reduced
//! to a single day is fetched directly, capped at the ceiling, since it
//! cannot shrink further.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tracing::{debug, info};

use crate::client::wire::SearchHandle;
use crate::client::EutilsClient;
use crate::error::Result;
use crate::harvest::normalize;
use crate::harvest::window::DateWindow;
use crate::models::ArticleRecord;

/// Retrieval-window ceiling: the most records one query+window can yield
pub const RESULT_CEILING: usize = 9999;

/// Append the window clause to the base query
pub(crate) fn windowed_term(query: &str, window: &DateWindow) -> String {
    format!("{} AND {}", query, window.pdat_clause())
}

/// Retrieve up to `remaining` normalized records published within
/// `window`, in ascending temporal order across any splits.
pub fn load_window<'a>(
    client: &'a EutilsClient,
    query: &'a str,
    window: DateWindow,
    remaining: usize,
    page_size: usize,
) -> BoxFuture<'a, Result<Vec<ArticleRecord>>> {
    async move {
        let handle = client.search(&windowed_term(query, &window)).await?;
        let available = handle.count;
        info!(%window, available, "window searched");

        if available == 0 {
            return Ok(Vec::new());
        }

        let want = remaining.min(available).min(RESULT_CEILING);

        if window.is_single_day() || available <= RESULT_CEILING {
            return fetch_pages(client, &handle, want, page_size).await;
        }

        let (first_half, second_half) = window.bisect();
        let mut records = load_window(client, query, first_half, remaining, page_size).await?;
        if records.len() >= remaining {
            return Ok(records);
        }
        let rest = load_window(
            client,
            query,
            second_half,
            remaining - records.len(),
            page_size,
        )
        .await?;
        records.extend(rest);
        Ok(records)
    }
    .boxed()
}

/// Page through the handle's cursor until `want` records are collected or
/// the server returns an empty page. The offset advances by the requested
/// page size.
async fn fetch_pages(
    client: &EutilsClient,
    handle: &SearchHandle,
    want: usize,
    page_size: usize,
) -> Result<Vec<ArticleRecord>> {
    let mut records = Vec::new();
    let mut offset = 0;

    while offset < want {
        let page = page_size.min(want - offset);
        let batch = client.fetch_batch(handle, offset, page).await?;
        if batch.is_empty() {
            break;
        }
        records.extend(batch.into_iter().map(normalize::normalize_record));
        offset += page;
        debug!(fetched = offset, want, "page fetched");
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_windowed_term_appends_pdat_clause() {
        let window = DateWindow::new(
            NaiveDate::from_ymd_opt(2016, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
        );
        assert_eq!(
            windowed_term("(Brain) AND (glymph*)", &window),
            "(Brain) AND (glymph*) AND (\"2016/01/01\"[PDAT] : \"2020/12/31\"[PDAT])"
        );
    }
}
