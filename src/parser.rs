use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use quick_xml::de::from_str;
use serde::{
    de::{MapAccess, Visitor},
    Deserialize, Deserializer,
};
use thiserror::Error;

use crate::config::Config;
use crate::model::{Article, SearchResults};

macro_rules! arxiv_query_url {
    () => {
        "https://export.arxiv.org/api/query?search_query={}&start={}&max_results={}"
    };
}

macro_rules! arxiv_id_url {
    () => {
        "https://export.arxiv.org/api/query?id_list={}"
    };
}

// Named aliases accepted by the --period flag.
const YESTERDAY: &[&str] = &["yesterday", "yday", "y"];
const LAST_WEEK: &[&str] = &["last week", "lastweek", "lweek", "lw", "w"];
const LAST_MONTH: &[&str] = &["last month", "lastmonth", "lmonth", "lm", "m"];

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("arXiv request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed arXiv feed: {0}")]
    Feed(#[from] quick_xml::DeError),
}

/// Search criteria layered over the configured defaults.
#[derive(Debug, Default)]
pub struct SearchTerms {
    pub query: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub period: Option<String>,
    pub limit: Option<i32>,
}

#[derive(Debug)]
pub struct ArxivClient {
    config: Config,
}

impl ArxivClient {
    pub fn new(config: Config) -> Self {
        ArxivClient { config }
    }

    /// Fetch a single article by arXiv id.
    pub fn get_id(&self, arxiv_id: &str) -> Result<SearchResults, QueryError> {
        self.query(&format!(arxiv_id_url!(), arxiv_id))
    }

    pub fn search(&self, terms: &SearchTerms) -> Result<SearchResults, QueryError> {
        let expression = self.search_expression(terms, Utc::now());
        println!("Search: {}", expression);
        self.query(&self.query_url(&expression, terms.limit, 0))
    }

    fn search_expression(&self, terms: &SearchTerms, now: DateTime<Utc>) -> String {
        // default categories first, extra criteria after
        let mut q: Vec<String> = self
            .config
            .categories
            .iter()
            .map(|cat| format!("cat:{}", cat))
            .collect();

        if let Some(query) = &terms.query {
            q.push(query.replace(' ', "+"));
        }
        if let Some(author) = &terms.author {
            q.push(format!("au:{}", author));
        }
        if let Some(category) = &terms.category {
            q.push(format!("cat:{}", category));
        }

        // A listing without a query always gets a date window.
        let period = match (&terms.query, &terms.period) {
            (None, None) => Some(String::from("0")),
            (_, period) => period.clone(),
        };

        if let Some(period) = period {
            let days = period_days(&period);
            let d0 = format_date(now - Duration::days(2 + days));
            let d1 = format_date(now - Duration::days(1));
            q.push(format!("submittedDate:[{}+TO+{}]", d0, d1));
        }

        q.join("+AND+")
    }

    fn query_url(&self, expression: &str, limit: Option<i32>, start: i32) -> String {
        let limit = limit.unwrap_or(self.config.default_limit);
        format!(arxiv_query_url!(), expression, start, limit)
    }

    fn query(&self, url: &str) -> Result<SearchResults, QueryError> {
        tracing::debug!("GET {}", url);
        let body = reqwest::blocking::get(url)?.text()?;
        let feed: AtomFeed = from_str(&body)?;
        Ok(SearchResults {
            total_results: feed.total_results.value.trim().parse().unwrap_or(0),
            articles: feed.entries.into_iter().map(AtomEntry::into_article).collect(),
        })
    }
}

fn period_days(period: &str) -> i64 {
    let period = period.to_lowercase();
    if YESTERDAY.contains(&period.as_str()) {
        1
    } else if LAST_WEEK.contains(&period.as_str()) {
        7
    } else if LAST_MONTH.contains(&period.as_str()) {
        30
    } else {
        period.parse().unwrap_or_else(|_| {
            tracing::warn!("unrecognized period {:?}, searching from yesterday", period);
            0
        })
    }
}

// The API expects submittedDate bounds at 21:00 of the given day.
fn format_date(t: DateTime<Utc>) -> String {
    format!("{}210000", t.format("%Y%m%d"))
}

// Arxiv Raw XML Model

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AtomFeed {
    #[serde(rename = "totalResults")]
    total_results: TextField,
    #[serde(rename = "entry")]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AtomEntry {
    id: String,
    title: String,
    summary: String,
    published: String,
    #[serde(rename = "journal_ref")]
    journal_ref: Option<TextField>,
    #[serde(rename = "primary_category")]
    primary_category: CategoryField,
    #[serde(rename = "author", flatten, deserialize_with = "de_author")]
    authors: Vec<AuthorField>,
    #[serde(rename = "link", flatten, deserialize_with = "de_link")]
    links: Vec<LinkField>,
}

impl AtomEntry {
    fn into_article(self) -> Article {
        let id = self.id.rsplit("/abs/").next().unwrap_or("").to_string();

        let published = DateTime::parse_from_rfc3339(&self.published)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|err| {
                tracing::warn!("failed to parse published date: {}", err);
                Utc.timestamp_opt(0, 0).unwrap()
            });

        let journal_ref = match self.journal_ref {
            Some(field) => field.value.replace('\n', " ").trim().to_string(),
            None => format!("arXiv:{}", id),
        };

        let page_link = self
            .links
            .iter()
            .find(|link| link.rel.as_deref() == Some("alternate"))
            .map(|link| link.href.clone())
            .unwrap_or_default();
        let pdf_link = self
            .links
            .iter()
            .find(|link| link.title.as_deref() == Some("pdf"))
            .map(|link| link.href.clone())
            .unwrap_or_default();
        let doi = self
            .links
            .iter()
            .find(|link| link.title.as_deref() == Some("doi"))
            .map(|link| link.href.clone());

        Article {
            id,
            title: self.title.replace('\n', " "),
            summary: self.summary.replace('\n', " "),
            authors: self.authors.into_iter().map(|a| a.name.value).collect(),
            primary_category: self.primary_category.term,
            journal_ref,
            published,
            page_link,
            pdf_link,
            doi,
        }
    }
}

#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
struct TextField {
    #[serde(rename = "$text")]
    value: String,
}

#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
struct CategoryField {
    #[serde(rename = "@term")]
    term: String,
}

#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
struct AuthorField {
    name: TextField,
}

#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
struct LinkField {
    #[serde(rename = "@href")]
    href: String,
    #[serde(rename = "@rel")]
    rel: Option<String>,
    #[serde(rename = "@title")]
    title: Option<String>,
}

fn de_author<'de, D>(deserializer: D) -> Result<Vec<AuthorField>, D::Error>
where
    D: Deserializer<'de>,
{
    struct AuthorVisitor;
    impl<'de> Visitor<'de> for AuthorVisitor {
        type Value = Vec<AuthorField>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("Map of children elements - filtering for field: `author`")
        }

        fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut authors = Vec::<AuthorField>::new();
            while let Some(key) = access.next_key::<String>()? {
                if key == "author" {
                    authors.push(access.next_value::<AuthorField>()?);
                }
            }
            Ok(authors)
        }
    }
    deserializer.deserialize_any(AuthorVisitor {})
}

fn de_link<'de, D>(deserializer: D) -> Result<Vec<LinkField>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LinkVisitor;
    impl<'de> Visitor<'de> for LinkVisitor {
        type Value = Vec<LinkField>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("Map of children elements - filtering for field: `link`")
        }

        fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
        where
            M: MapAccess<'de>,
        {
            let mut links = Vec::<LinkField>::new();
            while let Some(key) = access.next_key::<String>()? {
                if key == "link" {
                    links.push(access.next_value::<LinkField>()?);
                }
            }
            Ok(links)
        }
    }
    deserializer.deserialize_any(LinkVisitor {})
}

// end Arxiv Raw XML Model

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const LISTING_EXPRESSION: &str =
        "cat:quant-ph+AND+submittedDate:[20241230210000+TO+20241231210000]";

    const FULL_EXPRESSION: &str =
        "cat:quant-ph+AND+surface+code+AND+au:Fowler_A_G+AND+cat:cs.IT";

    #[test]
    fn listing_without_query_gets_a_date_window() {
        let date = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 1).unwrap();
        let client = ArxivClient::new(Config::default());
        let expression = client.search_expression(&SearchTerms::default(), date);
        assert_eq!(expression, LISTING_EXPRESSION, "expression improperly formatted");
        assert_eq!(
            client.query_url(&expression, None, 0),
            format!(arxiv_query_url!(), LISTING_EXPRESSION, 0, 100)
        );
    }

    #[test]
    fn query_terms_join_with_and() {
        let date = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 1).unwrap();
        let client = ArxivClient::new(Config::default());
        let terms = SearchTerms {
            query: Some(String::from("surface code")),
            author: Some(String::from("Fowler_A_G")),
            category: Some(String::from("cs.IT")),
            period: None,
            limit: Some(25),
        };
        let expression = client.search_expression(&terms, date);
        assert_eq!(expression, FULL_EXPRESSION, "expression improperly formatted");
        assert_eq!(
            client.query_url(&expression, terms.limit, 0),
            format!(arxiv_query_url!(), FULL_EXPRESSION, 0, 25)
        );
    }

    #[test]
    fn period_aliases_widen_the_window() {
        let date = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 1).unwrap();
        let client = ArxivClient::new(Config::default());
        let terms = SearchTerms {
            period: Some(String::from("w")),
            ..SearchTerms::default()
        };
        let expression = client.search_expression(&terms, date);
        assert_eq!(
            expression,
            "cat:quant-ph+AND+submittedDate:[20241223210000+TO+20241231210000]"
        );
    }

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <link href="http://arxiv.org/api/query?search_query=cat:quant-ph" rel="self" type="application/atom+xml"/>
  <title type="html">ArXiv Query: search_query=cat:quant-ph</title>
  <id>http://arxiv.org/api/cHxbiOdZaP56ODnBPIenZhzg5f8</id>
  <updated>2025-01-01T00:00:00-05:00</updated>
  <opensearch:totalResults xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">217</opensearch:totalResults>
  <opensearch:startIndex xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">0</opensearch:startIndex>
  <opensearch:itemsPerPage xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">1</opensearch:itemsPerPage>
  <entry>
    <id>http://arxiv.org/abs/1208.0928v2</id>
    <updated>2012-10-31T15:05:53Z</updated>
    <published>2012-08-04T19:52:58Z</published>
    <title>Surface codes: towards practical large-scale quantum computation</title>
    <summary>This article provides an introduction to surface code quantum computing.</summary>
    <author>
      <name>Austin G. Fowler</name>
    </author>
    <author>
      <name>Matteo Mariantoni</name>
    </author>
    <arxiv:comment xmlns:arxiv="http://arxiv.org/schemas/atom">54 pages, 43 figures</arxiv:comment>
    <arxiv:journal_ref xmlns:arxiv="http://arxiv.org/schemas/atom">Phys. Rev. A 86, 032324 (2012)</arxiv:journal_ref>
    <link href="http://arxiv.org/abs/1208.0928v2" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/1208.0928v2" rel="related" type="application/pdf"/>
    <link title="doi" href="http://dx.doi.org/10.1103/PhysRevA.86.032324" rel="related"/>
    <arxiv:primary_category xmlns:arxiv="http://arxiv.org/schemas/atom" term="quant-ph" scheme="http://arxiv.org/schemas/atom"/>
    <category term="quant-ph" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>"#;

    #[test]
    fn sample_feed_parses_into_articles() {
        let feed: AtomFeed = from_str(SAMPLE_FEED).expect("feed should deserialize");
        assert_eq!(feed.total_results.value, "217");
        assert_eq!(feed.entries.len(), 1);

        let article = feed.entries.into_iter().next().unwrap().into_article();
        assert_eq!(article.id, "1208.0928v2");
        assert_eq!(
            article.title,
            "Surface codes: towards practical large-scale quantum computation"
        );
        assert_eq!(article.authors, vec!["Austin G. Fowler", "Matteo Mariantoni"]);
        assert_eq!(article.primary_category, "quant-ph");
        assert_eq!(article.journal_ref, "Phys. Rev. A 86, 032324 (2012)");
        assert_eq!(article.published.timestamp(), 1344109978);
        assert_eq!(article.page_link, "http://arxiv.org/abs/1208.0928v2");
        assert_eq!(article.pdf_link, "http://arxiv.org/pdf/1208.0928v2");
        assert_eq!(article.url(), "http://dx.doi.org/10.1103/PhysRevA.86.032324");
    }

    #[test]
    fn missing_journal_ref_falls_back_to_the_arxiv_id() {
        let entry = AtomEntry {
            id: String::from("http://arxiv.org/abs/2501.01234v1"),
            published: String::from("2025-01-02T03:04:05Z"),
            ..AtomEntry::default()
        };
        let article = entry.into_article();
        assert_eq!(article.journal_ref, "arXiv:2501.01234v1");
        assert_eq!(article.url(), "");
    }
}
