use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use repofinder_cache::{CacheManager, KeyValueStore, MemoryStore};
use repofinder_core::{
    filter::parse_min_stars, providers::GitHubProvider, store::BASE_SET_KEY, Config, PageView,
    Region, ResultStore, SortKey, Surface, TypeFilter, UiEvent, ViewController,
};
use repofinder_tui::{run_tui, App};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "repofinder")]
#[command(version, about = "Browse, filter and sort every repository of a GitHub account", long_about = None)]
struct Cli {
    /// GitHub token, raises the search rate limit
    #[arg(long, env = "GITHUB_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Cards per page and per "load more"
    #[arg(long, global = true)]
    page_size: Option<usize>,

    /// Keep results in memory only
    #[arg(long, global = true)]
    no_cache: bool,

    /// Alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Open the interactive page (default)
    Tui,
    /// Search an account once and print the resulting page
    Search {
        /// Account name
        account: String,
        /// Only repositories with at least this many stars
        #[arg(long, value_parser = parse_min_stars)]
        min_stars: Option<u32>,
        /// all, source or fork
        #[arg(long = "type", value_name = "TYPE")]
        repo_type: Option<TypeFilter>,
        /// name or stars; repeat to toggle the direction
        #[arg(long = "sort", value_name = "KEY")]
        sort: Vec<SortKey>,
        /// How many pages to reveal
        #[arg(long, default_value_t = 1)]
        pages: usize,
        /// Print the visible records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect or wipe the persisted results
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Show the effective configuration
    Config {
        /// Write it back to the config file, minus any token from flags or env
        #[arg(long)]
        save: bool,
    },
}

#[derive(clap::Subcommand)]
enum CacheAction {
    /// Print the persisted base set
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Delete the persisted base set
    Clear,
}

/// Keeps only the newest frame; headless runs print it at the end
#[derive(Default)]
struct LastFrame(Option<PageView>);

impl Surface for LastFrame {
    fn render(&mut self, page: &PageView) {
        self.0 = Some(page.clone());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let file_token = config.github.token.clone();
    if cli.token.is_some() {
        config.github.token = cli.token.clone();
    }
    if let Some(page_size) = cli.page_size {
        config.ui.page_size = page_size;
    }
    if cli.no_cache {
        config.cache.enabled = false;
    }

    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    init_logging(&config, interactive)?;

    match cli.command {
        None | Some(Commands::Tui) => {
            let mut controller = build_controller(&config)?;
            let mut app = App::new();
            if config.ui.restore_last_results && controller.restore_persisted() {
                app.enter_normal_mode();
            }
            run_tui(app, controller, config.ui.mouse_enabled).await?;
        }
        Some(Commands::Search {
            account,
            min_stars,
            repo_type,
            sort,
            pages,
            json,
        }) => {
            let mut controller = build_controller(&config)?;
            let mut frame = LastFrame::default();

            controller
                .dispatch(UiEvent::SubmitSearch(account), &mut frame)
                .await;
            if min_stars.is_some() || repo_type.is_some() {
                let event = UiEvent::SubmitFilter {
                    min_stars: min_stars.unwrap_or(0),
                    type_filter: repo_type.unwrap_or_default(),
                };
                controller.dispatch(event, &mut frame).await;
            }
            for key in sort {
                controller.dispatch(UiEvent::ClickSort(key), &mut frame).await;
            }
            for _ in 1..pages {
                controller.dispatch(UiEvent::ClickLoadMore, &mut frame).await;
            }

            let page = frame.0.unwrap_or_else(|| controller.page());
            if page.region != Region::Loaded {
                anyhow::bail!(page.message.unwrap_or_else(|| "No results".to_string()));
            }
            if json {
                let visible: Vec<_> = controller
                    .displayed()
                    .iter()
                    .take(controller.state().visible_count)
                    .collect();
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else {
                print_page(&page);
            }
        }
        Some(Commands::Cache { action }) => {
            let path = config.cache_path()?;
            let cache = CacheManager::new(&path)
                .with_context(|| format!("Failed to open cache at {}", path.display()))?;
            let saved_at = cache.updated_at(BASE_SET_KEY)?;
            let mut store = ResultStore::open(cache);
            match action {
                CacheAction::Show { json } => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(store.base_set())?);
                    } else if store.is_empty() {
                        println!("No persisted results in {}", path.display());
                    } else {
                        if let Some(at) = saved_at {
                            println!("Saved {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
                        }
                        for record in store.base_set() {
                            println!(
                                "{:<40} {:>6}⭐ {:<6} {}",
                                record.name,
                                record.star_count,
                                record.kind,
                                record.updated_day()
                            );
                        }
                    }
                }
                CacheAction::Clear => {
                    store.clear()?;
                    println!("Cleared {}", path.display());
                }
            }
        }
        Some(Commands::Config { save }) => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => Config::config_path()?,
            };
            if save {
                let mut to_save = config.clone();
                to_save.github.token = file_token;
                to_save.save_to(&path)?;
                println!("Saved {}", path.display());
            } else {
                println!("# {}", path.display());
                print!("{}", config.to_toml()?);
            }
        }
    }

    Ok(())
}

fn build_controller(config: &Config) -> anyhow::Result<ViewController<Box<dyn KeyValueStore>>> {
    let provider = GitHubProvider::from_config(&config.github)?;

    let kv: Box<dyn KeyValueStore> = if config.cache.enabled {
        let path = config.cache_path()?;
        Box::new(
            CacheManager::new(&path)
                .with_context(|| format!("Failed to open cache at {}", path.display()))?,
        )
    } else {
        Box::new(MemoryStore::new())
    };

    Ok(ViewController::new(
        Arc::new(provider),
        ResultStore::open(kv),
        config.ui.page_size,
    ))
}

/// Logs go to a file while the TUI owns the terminal, stderr otherwise
fn init_logging(config: &Config, interactive: bool) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "repofinder=info".into());

    if interactive {
        let log_path = config.log_path()?;
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn print_page(page: &PageView) {
    if let Some(owner) = &page.owner {
        println!("{}  ({})", owner.login, owner.avatar_url);
        println!();
    }

    for card in &page.cards {
        println!("{}  {}", card.name, card.url);
        if !card.description.is_empty() {
            println!("  {}", card.description);
        }
        let mut tags = vec![card.kind_tag.as_str(), card.stars_tag.as_str(), card.updated_tag.as_str()];
        if let Some(language) = &card.language_tag {
            tags.push(language.as_str());
        }
        println!("  [{}]", tags.join("] ["));
        println!();
    }

    if page.show_load_more {
        println!(
            "Showing {} of {} - pass --pages to load more",
            page.cards.len(),
            page.total
        );
    }
}
