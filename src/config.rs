use std::{env, process};

const ENV_FILE: &str = "arxiv.env";

#[derive(Debug, Clone)]
pub struct Config {
    pub categories: Vec<String>,
    pub default_limit: i32,
    pub inc_abstract: bool,
    pub opener: String,
    pub keywords_path: Option<String>,
    pub bib_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            categories: vec![String::from("quant-ph")],
            default_limit: 100,
            inc_abstract: true,
            opener: String::from("open"),
            keywords_path: None,
            bib_file: None,
        }
    }
}

impl Config {
    /// Layer `ARXIV_*` environment variables (optionally from an `arxiv.env`
    /// file) over the built-in defaults. Everything is optional; a missing
    /// variable keeps its default.
    pub fn from_env() -> Self {
        dotenvy::from_filename(ENV_FILE).ok();
        let mut config = Config::default();
        if let Ok(categories) = env::var("ARXIV_CATEGORIES") {
            config.categories = categories.split_whitespace().map(String::from).collect();
        }
        if let Ok(limit) = env::var("ARXIV_LIMIT") {
            config.default_limit = parse_positive_i32("ARXIV_LIMIT", &limit);
        }
        if let Ok(flag) = env::var("ARXIV_INC_ABSTRACT") {
            config.inc_abstract = flag != "0" && !flag.eq_ignore_ascii_case("false");
        }
        if let Ok(opener) = env::var("ARXIV_OPENER") {
            config.opener = opener;
        }
        config.keywords_path = env::var("ARXIV_KEYWORDS").ok();
        config.bib_file = env::var("ARXIV_BIB_FILE").ok();
        config
    }
}

fn parse_positive_i32(key: &str, value: &str) -> i32 {
    let var: i32 = value.parse().unwrap_or_else(|_| {
        eprintln!("Failed to parse {} as i32", key);
        process::exit(1);
    });
    assert!(var > 0, "{} must be positive", key);
    var
}
