use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use arxiv_search::{
    config::Config,
    format::{clean, Formatter},
    model::SearchResults,
    parser::{ArxivClient, SearchTerms},
    score::{Keywords, RelevanceScorer},
    storage::LocalSaver,
};

#[derive(Parser)]
#[command(
    name = "arxiv",
    version,
    about = "Search arXiv, rank results by keyword relevance, emit BibTeX"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a single paper by its arXiv id
    Id {
        arxiv_id: String,
        /// Print the abstract under the listing
        #[arg(long = "abstract")]
        show_abstract: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Search arXiv with a free-text query
    Search {
        query: String,
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List the latest submissions in the configured categories
    New {
        #[command(flatten)]
        filters: FilterArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print the BibTeX entry for an arXiv id
    Bib { arxiv_id: String },
    /// Open the abstract page for an arXiv id
    Url { arxiv_id: String },
    /// Open the PDF for an arXiv id
    Pdf { arxiv_id: String },
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Restrict results to an author
    #[arg(long)]
    author: Option<String>,
    /// Search an additional category
    #[arg(long)]
    category: Option<String>,
    /// Days into the past to search (or yesterday/lastweek/lastmonth)
    #[arg(long)]
    period: Option<String>,
    /// Maximum number of results to retrieve
    #[arg(long)]
    limit: Option<i32>,
    /// Drop articles scoring below this cutoff
    #[arg(long, default_value_t = 0.0)]
    score: f32,
    /// Print the abstract under each listing
    #[arg(long = "abstract")]
    show_abstract: bool,
}

#[derive(Args, Debug, Default)]
struct OutputArgs {
    /// Print a BibTeX entry for each matching result
    #[arg(long, conflicts_with_all = ["url", "pdf"])]
    bib: bool,
    /// Open each matching result's abstract page
    #[arg(long, conflicts_with = "pdf")]
    url: bool,
    /// Open each matching result's PDF
    #[arg(long)]
    pdf: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let keywords = match &config.keywords_path {
        Some(path) => Keywords::from_json_file(path)?,
        None => Keywords::default(),
    };
    let scorer = RelevanceScorer::new(&keywords);
    let client = ArxivClient::new(config.clone());

    let (results, filters, output) = match cli.command {
        Command::Id { arxiv_id, show_abstract, output } => (
            client.get_id(&arxiv_id)?,
            FilterArgs { show_abstract, ..FilterArgs::default() },
            output,
        ),
        Command::Search { query, filters, output } => {
            let results = client.search(&search_terms(Some(query), &filters))?;
            (results, filters, output)
        }
        Command::New { filters, output } => {
            let results = client.search(&search_terms(None, &filters))?;
            (results, filters, output)
        }
        Command::Bib { arxiv_id } => (
            client.get_id(&arxiv_id)?,
            FilterArgs::default(),
            OutputArgs { bib: true, ..OutputArgs::default() },
        ),
        Command::Url { arxiv_id } => (
            client.get_id(&arxiv_id)?,
            FilterArgs::default(),
            OutputArgs { url: true, ..OutputArgs::default() },
        ),
        Command::Pdf { arxiv_id } => (
            client.get_id(&arxiv_id)?,
            FilterArgs::default(),
            OutputArgs { pdf: true, ..OutputArgs::default() },
        ),
    };

    let SearchResults { mut articles, total_results } = results;
    let retrieved = articles.len();

    // Default-category articles first, oldest to newest within each group.
    articles.sort_by_key(|article| {
        (!config.categories.contains(&article.primary_category), article.published)
    });

    let scored: Vec<_> = articles
        .into_iter()
        .map(|article| {
            let score = scorer.score(&article.title, &article.summary);
            (article, score)
        })
        .filter(|(_, score)| *score >= filters.score)
        .collect();

    println!(
        "Showing: {} of {} retrieved results. Total results: {}",
        scored.len(),
        retrieved,
        total_results
    );

    let mut bib_entries = Vec::new();
    for (index, (article, score)) in scored.iter().enumerate() {
        if output.bib {
            let entry = Formatter::to_bibtex(article, &config);
            println!("{}", entry);
            bib_entries.push(entry);
        } else if output.url {
            open_link(&config.opener, article.url())?;
        } else if output.pdf {
            open_link(&config.opener, &article.pdf_link)?;
        } else {
            println!("{}", Formatter::to_listing(index, article, *score, &config));
            if filters.show_abstract {
                println!("\n{}\n", clean(&article.summary));
            }
        }
    }

    if let (true, Some(bib_file)) = (output.bib, &config.bib_file) {
        LocalSaver::append_bibtex(bib_file, &bib_entries)
            .with_context(|| format!("writing {}", bib_file))?;
    }

    Ok(())
}

fn search_terms(query: Option<String>, filters: &FilterArgs) -> SearchTerms {
    SearchTerms {
        query,
        author: filters.author.clone(),
        category: filters.category.clone(),
        period: filters.period.clone(),
        limit: filters.limit,
    }
}

fn open_link(opener: &str, link: &str) -> anyhow::Result<()> {
    if link.is_empty() {
        anyhow::bail!("no link available for this entry");
    }
    let status = std::process::Command::new(opener)
        .arg(link)
        .status()
        .with_context(|| format!("launching {}", opener))?;
    if !status.success() {
        tracing::warn!("{} exited with {}", opener, status);
    }
    Ok(())
}
