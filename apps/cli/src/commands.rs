//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use docsprompt_core::{
    LlmBackend, Session, find_term_paragraphs, search_content, summarize_term,
};
use docsprompt_fetcher::{FetchProgress, FetchReport, PageFetcher};
use docsprompt_shared::{
    AppConfig, ContextOptions, DocsPromptError, FetchConfig, PageRecord, init_config, load_config,
    load_config_from, validate_api_key,
};
use docsprompt_store::ContentStore;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docsprompt: answer questions with context from documentation pages.
#[derive(Parser)]
#[command(
    name = "docsprompt",
    version,
    about = "Fetch documentation pages and build context-enhanced prompts for LLMs.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.docsprompt/docsprompt.toml.
    #[arg(long, global = true, env = "DOCSPROMPT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Content store file (overrides `store.path` from config).
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch pages and add them to the content store.
    Fetch {
        /// Page URLs, fetched in order.
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Rank stored pages against a query.
    Search {
        /// Free-text query.
        query: String,

        /// Print matches as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the enhanced prompt for a question.
    Prompt {
        /// The user's question.
        question: String,

        /// Maximum number of sources in the context.
        #[arg(long)]
        max_items: Option<usize>,

        /// Snippet length in characters.
        #[arg(long)]
        snippet_length: Option<usize>,
    },

    /// Answer a question with store context through the LLM.
    Ask {
        /// The user's question.
        question: String,

        /// Use the offline simulated responder instead of the API.
        #[arg(long)]
        simulate: bool,

        /// Re-fetch these pages into the store before answering.
        #[arg(long = "refresh", value_name = "URL")]
        refresh: Vec<String>,
    },

    /// Find paragraphs mentioning a term and summarize it.
    FindTerm {
        /// Term to look for, matched case-insensitively.
        term: String,

        /// Pages to scan (can be specified multiple times).
        #[arg(long = "url", value_name = "URL", required = true)]
        urls: Vec<String>,

        /// Use the offline simulated responder instead of the API.
        #[arg(long)]
        simulate: bool,
    },

    /// List stored pages.
    List,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docsprompt=info",
        1 => "docsprompt=debug",
        _ => "docsprompt=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(cli.config.as_deref()),
        };
    }

    let config = resolve_config(cli.config.as_deref())?;
    let store_path = cli
        .store
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.store.path));

    match cli.command {
        Command::Fetch { urls } => cmd_fetch(&config, store_path, &urls).await,
        Command::Search { query, json } => cmd_search(&config, &store_path, &query, json),
        Command::Prompt {
            question,
            max_items,
            snippet_length,
        } => cmd_prompt(&config, store_path, &question, max_items, snippet_length),
        Command::Ask {
            question,
            simulate,
            refresh,
        } => cmd_ask(&config, store_path, &question, simulate, &refresh).await,
        Command::FindTerm {
            term,
            urls,
            simulate,
        } => cmd_find_term(&config, &term, &urls, simulate).await,
        Command::List => cmd_list(&store_path),
        Command::Config { .. } => Ok(()),
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_fetch(config: &AppConfig, store_path: PathBuf, urls: &[String]) -> Result<()> {
    info!(pages = urls.len(), store = %store_path.display(), "fetching pages");

    let mut session = Session::open(config, store_path)?;
    let progress = CliProgress::new();
    let report = session.ingest(urls, &progress).await?;

    print_report(&report);
    println!("  Stored: {} pages", session.store().len());
    println!("  Path:   {}", session.store_path().display());
    println!();

    if report.pages.is_empty() {
        return Err(eyre!("no pages could be fetched"));
    }
    Ok(())
}

fn cmd_search(config: &AppConfig, store_path: &Path, query: &str, json: bool) -> Result<()> {
    let store = ContentStore::load(store_path);
    let options = ContextOptions::from(config);
    let results = search_content(&store, query, options.snippet_length);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No matches for \"{query}\" in {} stored pages.", store.len());
        return Ok(());
    }

    println!();
    for (i, result) in results.iter().enumerate() {
        println!("  {}. {} (score {})", i + 1, result.title, result.score);
        println!("     {}", result.identifier);
        println!("     Matched: {}", result.matched_sections.join(", "));
        println!("     {}", result.snippet);
        println!();
    }
    Ok(())
}

fn cmd_prompt(
    config: &AppConfig,
    store_path: PathBuf,
    question: &str,
    max_items: Option<usize>,
    snippet_length: Option<usize>,
) -> Result<()> {
    let mut session = Session::open(config, store_path)?;

    let mut options = *session.options();
    if let Some(n) = max_items {
        options.max_context_items = n;
    }
    if let Some(n) = snippet_length {
        options.snippet_length = n;
    }
    session.set_options(options);

    let enhanced = session.enhance(question);
    println!("Status: {}", enhanced.status);
    println!("{}", enhanced.prompt);
    Ok(())
}

async fn cmd_ask(
    config: &AppConfig,
    store_path: PathBuf,
    question: &str,
    simulate: bool,
    refresh: &[String],
) -> Result<()> {
    // Resolve the backend first so a missing API key fails before any fetch
    let backend = llm_backend(config, simulate)?;
    let mut session = Session::open(config, store_path)?;

    for url in refresh {
        match session.refresh_page(url).await {
            Ok(outcome) => println!("  {outcome:<9} {url}"),
            Err(e) => {
                warn!(url = %url, error = %e, "refresh failed, answering with stored content");
                println!("  failed  {url}: {e}");
            }
        }
    }

    info!(backend = backend.label(), "answering question");
    let answer = session.answer(question, &backend).await?;

    println!();
    println!("Question: {}", answer.question);
    println!("Context:  {}", answer.enhanced.status);
    for source in &answer.enhanced.sources {
        println!("          - {} ({})", source.title, source.identifier);
    }
    println!();
    println!("{}", answer.response);
    Ok(())
}

async fn cmd_find_term(config: &AppConfig, term: &str, urls: &[String], simulate: bool) -> Result<()> {
    let backend = llm_backend(config, simulate)?;
    let fetcher = PageFetcher::new(FetchConfig::from(config))?;

    let progress = CliProgress::new();
    let report = fetcher.fetch_all(urls, &progress).await;
    print_report(&report);

    let paragraphs: Vec<String> = report
        .pages
        .iter()
        .flat_map(|page| page.paragraphs.iter().cloned())
        .collect();
    let source_urls: Vec<String> = report.pages.iter().map(|p| p.identifier.clone()).collect();

    let found = find_term_paragraphs(&paragraphs, term);
    println!("Paragraphs mentioning \"{term}\": {}", found.len());
    for paragraph in &found {
        println!("  - {paragraph}");
    }
    println!();

    let summary = summarize_term(&backend, term, &found, &source_urls).await?;
    println!("{summary}");
    Ok(())
}

/// Pick the LLM backend, checking the API key first unless simulating.
fn llm_backend(config: &AppConfig, simulate: bool) -> Result<LlmBackend> {
    if !simulate {
        validate_api_key(config)?;
    }
    Ok(LlmBackend::from_config(config, simulate)?)
}

fn cmd_list(store_path: &Path) -> Result<()> {
    let store = ContentStore::load(store_path);
    if store.is_empty() {
        println!("No pages stored at {}.", store_path.display());
        return Ok(());
    }

    println!();
    for (url, page) in &store {
        println!("  {}", page.title);
        println!("     URL:      {url}");
        println!(
            "     Headings: {}  Content: {} chars",
            page.headings.len(),
            page.main_text.chars().count()
        );
    }
    println!();
    println!("  {} pages in {}", store.len(), store_path.display());
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

fn print_report(report: &FetchReport) {
    println!();
    println!("  Fetched: {}", report.pages.len());
    println!("  Failed:  {}", report.failures.len());
    for (url, error) in &report.failures {
        println!("           {url}: {error}");
    }
    println!("  Time:    {:.1}s", report.duration.as_secs_f64());
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl FetchProgress for CliProgress {
    fn page_started(&self, url: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching [{current}/{total}] {url}"));
    }

    fn page_fetched(&self, page: &PageRecord, current: usize, total: usize) {
        self.spinner.println(format!(
            "  ok   [{current}/{total}] {} ({})",
            page.identifier, page.title
        ));
    }

    fn page_failed(&self, url: &str, error: &DocsPromptError, current: usize, total: usize) {
        self.spinner
            .println(format!("  fail [{current}/{total}] {url}: {error}"));
    }

    fn done(&self, _report: &FetchReport) {
        self.spinner.finish_and_clear();
    }
}
