use crate::errors::{PipelineError, PipelineResult};
use crate::youtube::{ListRequest, YouTubeApi};
use futures::stream::{self, Stream};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Lazily walks every page of a list call.
///
/// The first request is issued without a cursor; each following request
/// carries the `nextPageToken` of the previous response, and the stream ends
/// once a response has none. A failed call is yielded as an
/// [`PipelineError::UpstreamCall`] and ends the stream. Items are handed over
/// raw, one `Vec` per page.
pub fn pages<'a>(
    api: &'a dyn YouTubeApi,
    request: ListRequest,
) -> impl Stream<Item = PipelineResult<Vec<Value>>> + Send + 'a {
    let first = request.page_token(None);

    stream::try_unfold(Some(first), move |state: Option<ListRequest>| async move {
        let Some(request) = state else {
            return Ok::<_, PipelineError>(None);
        };

        let page = api
            .list(&request)
            .await
            .map_err(|e| PipelineError::upstream(&request, e))?;
        debug!(
            "{} returned {} items ({})",
            request.resource,
            page.items.len(),
            request.describe()
        );

        let next = page
            .next_cursor()
            .map(|token| request.clone().page_token(Some(token)));
        Ok::<_, PipelineError>(Some((page.items, next)))
    })
}

/// Issues exactly one call and returns its items, ignoring any cursor.
pub async fn single_page(api: &dyn YouTubeApi, request: &ListRequest) -> PipelineResult<Vec<Value>> {
    api.list(request)
        .await
        .map(|page| page.items)
        .map_err(|e| PipelineError::upstream(request, e))
}

/// Typed mapping step applied to raw items at the API boundary.
pub fn decode<T: DeserializeOwned>(request: &ListRequest, item: Value) -> PipelineResult<T> {
    serde_json::from_value(item).map_err(|e| PipelineError::malformed(request.resource, e))
}
