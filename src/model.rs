use chrono::{DateTime, Utc};

// One record per feed entry; lives only for the lifetime of a single query run.

#[derive(Debug, Clone)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub authors: Vec<String>,
    pub primary_category: String,
    pub journal_ref: String,
    pub published: DateTime<Utc>,
    pub page_link: String,
    pub pdf_link: String,
    pub doi: Option<String>,
}

impl Article {
    /// The canonical link for the article: the DOI when the publisher
    /// registered one, the abstract page otherwise.
    pub fn url(&self) -> &str {
        self.doi.as_deref().unwrap_or(&self.page_link)
    }
}

#[derive(Debug)]
pub struct SearchResults {
    pub articles: Vec<Article>,
    /// opensearch total across all pages, not just the retrieved batch.
    pub total_results: usize,
}
