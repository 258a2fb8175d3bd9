#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! `candidatesctl`: list, inspect and browse candidates from the command line.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use candidates_client::{
    load_detail, Config, GraphQlGateway, ListLocation, ListSession, SafeStorage, SessionOptions,
    PAGE_SIZE_KEY,
};
use candidates_core::format::sort_by_applied_date;
use candidates_core::{DetailView, ListViewState, NameFilter};
use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::Url;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod browse;
mod render;

#[derive(Debug, Parser)]
#[command(name = "candidatesctl", version, about = "Browse candidates served by a GraphQL API")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// GraphQL endpoint, e.g. https://api.example.com/graphql
    #[arg(long, env = "GRAPHQL_ENDPOINT", global = true)]
    endpoint: Option<String>,

    #[arg(long, env = "GRAPHQL_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// JSON file remembering preferences such as the page size.
    #[arg(long, global = true)]
    state_file: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Print one or more pages of candidates.
    List(ListArgs),
    /// Print a single candidate.
    Show { id: String },
    /// Interactive session.
    Browse {
        #[arg(long)]
        page_size: Option<usize>,
    },
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long)]
    page_size: Option<usize>,

    /// Number of pages to print, walking forward.
    #[arg(long, default_value_t = 1)]
    pages: usize,

    /// Local search over first and last name.
    #[arg(long)]
    search: Option<String>,

    /// Keep only these statuses; repeatable.
    #[arg(long = "status")]
    statuses: Vec<String>,

    /// Server-side first name filter.
    #[arg(long)]
    first: Option<String>,

    /// Server-side last name filter.
    #[arg(long)]
    last: Option<String>,

    /// Deep link whose `first`, `last`, `search` and `page` seed the listing.
    #[arg(long)]
    url: Option<String>,

    /// Reorder each printed page; server order by default.
    #[arg(long, value_enum)]
    sort: Option<SortKey>,

    /// Print view states as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortKey {
    /// Most recent application first.
    Applied,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let storage = cli.state_file.clone().map(SafeStorage::new);
    let gateway = GraphQlGateway::new(&config.graphql).context("create GraphQL gateway")?;
    info!("endpoint={}", gateway.endpoint());

    match cli.cmd {
        Cmd::List(args) => {
            let page_size = resolve_page_size(&config, storage.as_ref(), args.page_size)?;
            list(Arc::new(gateway), &config, page_size, args).await
        }
        Cmd::Show { id } => {
            eprint!("{}", render::render_detail(&DetailView::Loading));
            let detail = load_detail(&gateway, &id).await;
            print!("{}", render::render_detail(&detail));
            match detail {
                DetailView::Failed(e) => Err(e).context("get candidate"),
                DetailView::NotFound => bail!("candidate {id} not found"),
                _ => Ok(()),
            }
        }
        Cmd::Browse { page_size } => {
            let page_size = resolve_page_size(&config, storage.as_ref(), page_size)?;
            let options = SessionOptions {
                page_size,
                search_debounce: config.list.search_debounce(),
            };
            let session = ListSession::spawn(Arc::new(gateway), options)?;
            browse::run(&session, &config, storage.as_ref()).await
        }
    }
}

/// File, then environment, then flags.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::default(),
    };
    config.apply_env();
    if let Some(endpoint) = &cli.endpoint {
        config.graphql.endpoint = endpoint.clone();
    }
    if let Some(api_key) = &cli.api_key {
        config.graphql.api_key = api_key.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Flag, then remembered value, then configured default. A flag value is
/// remembered for next time.
fn resolve_page_size(config: &Config, storage: Option<&SafeStorage>, flag: Option<usize>) -> Result<usize> {
    let options = &config.list.page_size_options;
    if let Some(size) = flag {
        if !options.contains(&size) {
            bail!("page size {size} is not one of {options:?}");
        }
        if let Some(storage) = storage {
            storage.set_item(PAGE_SIZE_KEY, &size.to_string());
        }
        return Ok(size);
    }
    let remembered = storage
        .and_then(|s| s.get_item(PAGE_SIZE_KEY))
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|size| options.contains(size));
    Ok(remembered.unwrap_or(config.list.default_page_size))
}

async fn list(gateway: Arc<GraphQlGateway>, config: &Config, page_size: usize, args: ListArgs) -> Result<()> {
    let mut link = args
        .url
        .as_deref()
        .map(Url::parse)
        .transpose()
        .context("parse --url")?;
    let location = link.as_ref().map(ListLocation::parse).unwrap_or_default();

    let names = NameFilter::new(
        args.first.as_deref().or(location.first.as_deref()).unwrap_or_default(),
        args.last.as_deref().or(location.last.as_deref()).unwrap_or_default(),
    );
    let search = args.search.or(location.search.clone()).unwrap_or_default();

    let options = SessionOptions {
        page_size,
        search_debounce: config.list.search_debounce(),
    };
    let session = ListSession::spawn(gateway, options)?;
    session.set_search_term(search.clone()).await?;
    session.set_status_filters(args.statuses).await?;
    if names.is_empty() {
        session.load().await?;
    } else {
        session.set_name_filter(names.clone()).await?;
    }
    let mut view = settle(&session).await?;

    // Deep-linked pages are reached by walking the cursor chain.
    let start = location.page_index();
    while view.page < start && view.has_next_page {
        session.next_page().await?;
        view = settle(&session).await?;
    }
    if view.page < start {
        debug!(requested = start + 1, reached = view.page + 1, "deep link beyond last page");
    }

    let pages = args.pages.max(1);
    for printed in 1..=pages {
        let shown = sorted(&view, args.sort);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&shown)?);
        } else {
            print!("{}", render::render_list(&shown));
        }
        if printed == pages || !view.has_next_page {
            break;
        }
        session.next_page().await?;
        view = settle(&session).await?;
    }

    if let Some(link) = link.as_mut() {
        ListLocation {
            first: names.first_name,
            last: names.last_name,
            search: (!search.trim().is_empty()).then_some(search),
            page: view.page + 1,
        }
        .apply_to(link);
        println!("{link}");
    }
    Ok(())
}

/// Only the visible rows are reordered; paging still follows server order.
fn sorted(view: &ListViewState, sort: Option<SortKey>) -> ListViewState {
    let mut view = view.clone();
    if sort == Some(SortKey::Applied) {
        view.rows = sort_by_applied_date(&view.rows);
    }
    view
}

/// Waits for the current fetch and turns a failed one into an error.
async fn settle(session: &ListSession) -> Result<ListViewState> {
    let view = session.settled().await?;
    if let Some(error) = &view.error {
        print!("{}", render::render_list(&view));
        return Err(error.clone()).context("list candidates");
    }
    Ok(view)
}
