//! MediaWiki API client.

use serde::Deserialize;

use crate::{ArticleError, ArticleSource, WikipediaConfig};

/// Reads articles from a MediaWiki `api.php` endpoint.
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    client: reqwest::Client,
    config: WikipediaConfig,
}

#[derive(Debug, Deserialize)]
struct ParseResponse {
    parse: Option<ParsedPage>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ParsedPage {
    text: Option<ParsedText>,
}

#[derive(Debug, Deserialize)]
struct ParsedText {
    #[serde(rename = "*")]
    html: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    info: String,
}

#[derive(Debug, Deserialize)]
struct RandomResponse {
    query: Option<RandomQuery>,
}

#[derive(Debug, Deserialize)]
struct RandomQuery {
    #[serde(default)]
    random: Vec<RandomPage>,
}

#[derive(Debug, Deserialize)]
struct RandomPage {
    title: String,
}

impl WikipediaClient {
    /// Builds a client with the configured user agent and timeout.
    pub fn new(config: WikipediaConfig) -> Result<Self, ArticleError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ArticleError::Service(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    async fn get_json(&self, query: &[(&str, &str)]) -> Result<serde_json::Value, ArticleError> {
        let response = self
            .client
            .get(&self.config.api_url)
            .query(query)
            .query(&[("format", "json")])
            .send()
            .await
            .map_err(|e| ArticleError::Service(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ArticleError::Service(format!("failed to read response: {e}")))?;

        // MediaWiki reports most failures in a 200 body, but a non-2xx
        // body may still carry a structured error worth surfacing.
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(_) if !status.is_success() => {
                Err(ArticleError::Service(format!("API responded with status {status}")))
            }
            Err(e) => Err(ArticleError::Service(format!("invalid JSON: {e}"))),
        }
    }
}

impl ArticleSource for WikipediaClient {
    async fn fetch_article_html(&self, title: &str) -> Result<String, ArticleError> {
        tracing::debug!(%title, "fetching article");
        let body = self
            .get_json(&[("action", "parse"), ("page", title), ("prop", "text")])
            .await?;
        article_html(title, body)
    }

    async fn fetch_random_title(&self) -> Result<String, ArticleError> {
        let body = self
            .get_json(&[
                ("action", "query"),
                ("list", "random"),
                ("rnnamespace", "0"),
                ("rnlimit", "1"),
            ])
            .await?;
        let title = random_title(body)?;
        tracing::debug!(%title, "picked random article");
        Ok(title)
    }
}

/// Extracts the rendered HTML from an `action=parse` response.
fn article_html(title: &str, body: serde_json::Value) -> Result<String, ArticleError> {
    let response: ParseResponse = serde_json::from_value(body)
        .map_err(|e| ArticleError::Service(format!("unexpected parse response: {e}")))?;

    if let Some(error) = response.error {
        return Err(match error.code.as_str() {
            "missingtitle" | "invalidtitle" => ArticleError::NotFound(title.to_owned()),
            _ => ArticleError::Service(error.info),
        });
    }

    response
        .parse
        .and_then(|page| page.text)
        .map(|text| text.html)
        .ok_or_else(|| ArticleError::NotFound(title.to_owned()))
}

/// Extracts the title from a `list=random` response.
fn random_title(body: serde_json::Value) -> Result<String, ArticleError> {
    let response: RandomResponse = serde_json::from_value(body)
        .map_err(|e| ArticleError::Service(format!("unexpected random response: {e}")))?;

    response
        .query
        .and_then(|q| q.random.into_iter().next())
        .map(|page| page.title)
        .ok_or_else(|| ArticleError::Service("no random article found".to_owned()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_article_html_extracts_text() {
        let body = json!({
            "parse": {
                "title": "Dog",
                "pageid": 4269567,
                "text": { "*": "<div class=\"mw-parser-output\"><p>The dog</p></div>" }
            }
        });
        let html = article_html("Dog", body).unwrap();
        assert!(html.contains("The dog"));
    }

    #[test]
    fn test_article_html_missing_title_is_not_found() {
        let body = json!({
            "error": {
                "code": "missingtitle",
                "info": "The page you specified doesn't exist."
            }
        });
        assert_eq!(
            article_html("Nope Nope", body),
            Err(ArticleError::NotFound("Nope Nope".into()))
        );
    }

    #[test]
    fn test_article_html_other_api_error_is_service_error() {
        let body = json!({
            "error": { "code": "ratelimited", "info": "You've exceeded your rate limit." }
        });
        assert_eq!(
            article_html("Dog", body),
            Err(ArticleError::Service("You've exceeded your rate limit.".into()))
        );
    }

    #[test]
    fn test_article_html_without_text_is_not_found() {
        let body = json!({ "parse": { "title": "Dog" } });
        assert!(matches!(article_html("Dog", body), Err(ArticleError::NotFound(_))));
    }

    #[test]
    fn test_random_title_takes_first_entry() {
        let body = json!({
            "batchcomplete": "",
            "query": { "random": [ { "id": 1, "ns": 0, "title": "Ethiopia" } ] }
        });
        assert_eq!(random_title(body).unwrap(), "Ethiopia");
    }

    #[test]
    fn test_random_title_empty_list_is_service_error() {
        let body = json!({ "query": { "random": [] } });
        assert!(matches!(random_title(body), Err(ArticleError::Service(_))));
    }

    #[test]
    fn test_client_builds_with_default_config() {
        assert!(WikipediaClient::new(WikipediaConfig::default()).is_ok());
    }
}
