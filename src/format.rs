use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::citation;
use crate::config::Config;
use crate::model::Article;

static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse whitespace runs into single spaces.
pub fn clean(text: &str) -> String {
    WHITESPACE_RUNS.replace_all(text, " ").trim().to_string()
}

// Formatter for the listing and BibTeX output modes.
pub struct Formatter;

impl Formatter {
    /// One listing line per article. Articles outside the configured default
    /// categories get their title marked.
    pub fn to_listing(index: usize, article: &Article, score: f32, config: &Config) -> String {
        let mark = if config.categories.contains(&article.primary_category) {
            ""
        } else {
            " ** "
        };
        format!(
            "{:<6} {} ({}) | {} | {} | {}{}{}",
            index,
            article.published.format("%Y-%m-%d"),
            article.id,
            score,
            article.primary_category,
            mark,
            clean(&article.title),
            mark
        )
    }

    /// BibTeX entry keyed by arXiv id. Journal fields come from the parsed
    /// reference when the heuristics hit, from the arXiv metadata otherwise.
    pub fn to_bibtex(article: &Article, config: &Config) -> String {
        let mut fields: Vec<(&str, String)> = vec![
            ("title", format!("{{{}}}", clean(&article.title))),
            ("author", article.authors.join(" and ")),
            ("note", format!("arXiv:{}", article.id)),
        ];

        if config.inc_abstract {
            fields.push(("abstract", clean(&article.summary)));
        }

        match citation::parse_ref(&article.journal_ref) {
            Some(reference) => {
                fields.push(("journal", reference.journal));
                fields.push(("volume", reference.volume));
                fields.push(("pages", reference.pages));
                fields.push(("year", reference.year));
            }
            None => {
                fields.push(("year", article.published.year().to_string()));
                fields.push(("month", article.published.month().to_string()));
                fields.push(("journal", article.journal_ref.clone()));
            }
        }

        let body = fields
            .iter()
            .map(|(key, value)| format!("    {} = {{{}}}", key, value))
            .collect::<Vec<_>>()
            .join(",\n");
        format!("@article{{{},\n{},\n}}\n", article.id, body)
    }
}
