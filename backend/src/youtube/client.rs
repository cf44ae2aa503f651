use super::{ListPage, ListRequest, YouTubeApi};
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// YouTube Data API v3 over HTTP, authenticated with an API key.
// Documentation: https://developers.google.com/youtube/v3/docs
pub struct HttpYouTubeApi {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl HttpYouTubeApi {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        // Url::join drops the last segment unless the base ends with a slash.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .with_context(|| format!("invalid YouTube API base url: {base_url}"))?;

        Ok(Self {
            client: Client::new(),
            base_url,
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self, request: &ListRequest) -> Result<Url> {
        let mut url = self.base_url.join(request.resource.path())?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("part", request.part);
            for (key, value) in &request.filters {
                query.append_pair(key, value);
            }
            if let Some(max_results) = request.max_results {
                query.append_pair("maxResults", &max_results.to_string());
            }
            if let Some(token) = &request.page_token {
                query.append_pair("pageToken", token);
            }
            query.append_pair("key", &self.api_key);
        }
        Ok(url)
    }
}

#[async_trait]
impl YouTubeApi for HttpYouTubeApi {
    async fn list(&self, request: &ListRequest) -> Result<ListPage> {
        let url = self.endpoint(request)?;
        debug!("GET {} {}", request.resource, request.describe());

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("YouTube API returned {status}: {body}"));
        }

        let page = response
            .json::<ListPage>()
            .await
            .context("invalid YouTube API response body")?;
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::Resource;

    #[test]
    fn test_endpoint_carries_projection_filters_and_cursor() {
        let api = HttpYouTubeApi::new("https://www.googleapis.com/youtube/v3", "secret").unwrap();
        let request = ListRequest::new(Resource::PlaylistItems, "contentDetails")
            .filter("playlistId", "PL 1")
            .max_results(50)
            .page_token(Some("EAAaBlBUOkNESQ".to_string()));

        let url = api.endpoint(&request).unwrap();

        assert_eq!(url.path(), "/youtube/v3/playlistItems");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("part".to_string(), "contentDetails".to_string()),
                ("playlistId".to_string(), "PL 1".to_string()),
                ("maxResults".to_string(), "50".to_string()),
                ("pageToken".to_string(), "EAAaBlBUOkNESQ".to_string()),
                ("key".to_string(), "secret".to_string()),
            ]
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(HttpYouTubeApi::new("not a url", "secret").is_err());
    }
}
