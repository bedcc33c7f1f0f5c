//! The article source abstraction.

use std::future::Future;

use crate::ArticleError;

/// Something that can serve article content.
///
/// Implemented by [`WikipediaClient`](crate::WikipediaClient) and by test
/// doubles.
pub trait ArticleSource: Send + Sync {
    /// Rendered HTML of the article titled `title`.
    fn fetch_article_html(
        &self,
        title: &str,
    ) -> impl Future<Output = Result<String, ArticleError>> + Send;

    /// Title of a random main-namespace article.
    fn fetch_random_title(&self) -> impl Future<Output = Result<String, ArticleError>> + Send;
}
