//! Command-line front end over the core item store.
//!
//! # Responsibility
//! - Parse commands and render results as plain lines or JSON.
//! - Run every command against a freshly seeded in-memory store.
//!
//! Generation commands use the mock provider unless `API_KEY` (or
//! `GEMINI_API_KEY`) is set.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use prompt_architect_core::{
    default_log_level, extract_variables, init_logging, initial_items, provider_from_config,
    GenerationConfig, GenerationProvider, Item, ItemId, ItemKind, ItemQuery, ItemService,
    KindFilter, MemoryItemRepository, SortOrder, REFINEMENT_FRAMEWORKS,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "prompt-architect", author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true, env = "PROMPT_ARCHITECT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "PROMPT_ARCHITECT_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Print JSON instead of plain lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter and sort the collection
    List {
        /// Case-insensitive search text
        #[arg(long, default_value = "")]
        search: String,
        /// Tag filter; repeat to match any of several tags
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// all|note|prompt|bookmark
        #[arg(long, default_value = "all")]
        kind: KindFilter,
        /// recent|alphabetical
        #[arg(long, default_value = "recent")]
        sort: SortOrder,
    },
    /// Print the sorted tag universe
    Tags,
    /// Print the `{{variables}}` of a stored prompt or of a literal body
    Vars {
        #[arg(long, required_unless_present = "body", conflicts_with = "body")]
        id: Option<ItemId>,
        #[arg(long)]
        body: Option<String>,
    },
    /// Print the refinement frameworks
    Frameworks,
    /// Generate prompts from a free-text idea
    Compose { idea: String },
    /// Summarize a bookmark and derive prompts from it
    Distill {
        /// Bookmark id; defaults to the first bookmark
        #[arg(long)]
        id: Option<ItemId>,
    },
    /// Rewrite a prompt with a named framework
    Refine {
        /// Prompt id; defaults to the first prompt
        #[arg(long)]
        id: Option<ItemId>,
        #[arg(long, default_value = REFINEMENT_FRAMEWORKS[0])]
        framework: String,
    },
    /// Suggest values for one prompt variable
    Suggest {
        /// Prompt id; defaults to the first prompt
        #[arg(long)]
        id: Option<ItemId>,
        #[arg(long)]
        variable: String,
    },
}

#[derive(Serialize)]
struct DistillOutput<'a> {
    bookmark: &'a Item,
    prompts: &'a [Item],
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    start_logging(cli.log_level.as_deref(), cli.log_dir.as_deref())?;

    let mut service = ItemService::new(MemoryItemRepository::new());
    service
        .seed(initial_items().context("failed to build seed items")?)
        .context("failed to seed item store")?;

    match cli.command {
        Command::List {
            search,
            tags,
            kind,
            sort,
        } => {
            let query = ItemQuery::new()
                .search(search)
                .tags(tags)
                .kind(kind)
                .sort_by(sort);
            let result = service.query(&query);
            info!("event=cli_list module=cli status=ok count={}", result.count);
            print_items(&result.items, cli.json)?;
            if !cli.json {
                println!("{} item(s)", result.count);
            }
        }
        Command::Tags => print_lines(&service.all_tags(), cli.json)?,
        Command::Vars { id, body } => {
            let body = match (id, body) {
                (_, Some(body)) => body,
                (Some(id), None) => service.prompt_body(id)?,
                (None, None) => bail!("either --id or --body is required"),
            };
            print_lines(&extract_variables(&body), cli.json)?;
        }
        Command::Frameworks => print_lines(&REFINEMENT_FRAMEWORKS, cli.json)?,
        Command::Compose { idea } => {
            let provider = load_provider()?;
            let created = service.compose_from_idea(&*provider, &idea)?;
            print_items(&created, cli.json)?;
        }
        Command::Distill { id } => {
            let provider = load_provider()?;
            let id = resolve_id(&service, id, ItemKind::Bookmark)?;
            let outcome = service.distill_bookmark(&*provider, id)?;
            if cli.json {
                let output = DistillOutput {
                    bookmark: &outcome.bookmark,
                    prompts: &outcome.prompts,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", outcome.bookmark.body().unwrap_or_default());
                print_items(&outcome.prompts, false)?;
            }
        }
        Command::Refine { id, framework } => {
            let provider = load_provider()?;
            let id = resolve_id(&service, id, ItemKind::Prompt)?;
            let refined = service.refine_prompt(&*provider, id, &framework)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&refined)?);
            } else {
                println!("{}", refined.body().unwrap_or_default());
            }
        }
        Command::Suggest { id, variable } => {
            let provider = load_provider()?;
            let id = resolve_id(&service, id, ItemKind::Prompt)?;
            let values = service.suggest_variable_values(&*provider, id, &variable)?;
            print_lines(&values, cli.json)?;
        }
    }

    Ok(())
}

fn start_logging(level: Option<&str>, log_dir: Option<&std::path::Path>) -> Result<()> {
    let Some(log_dir) = log_dir else {
        return Ok(());
    };
    let log_dir = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .context("failed to resolve current directory")?
            .join(log_dir)
    };
    let level = level
        .map(str::to_string)
        .unwrap_or_else(|| default_log_level().to_string());
    init_logging(&level, &log_dir.to_string_lossy()).context("failed to initialize logging")
}

fn load_provider() -> Result<Box<dyn GenerationProvider>> {
    let provider = provider_from_config(&GenerationConfig::from_env())
        .context("failed to configure generation provider")?;
    if provider.is_mock() {
        eprintln!("note: no API key configured, using mock generation");
    }
    Ok(provider)
}

fn resolve_id(
    service: &ItemService<MemoryItemRepository>,
    id: Option<ItemId>,
    kind: ItemKind,
) -> Result<ItemId> {
    if let Some(id) = id {
        return Ok(id);
    }
    service
        .items()
        .iter()
        .find(|item| item.kind() == kind)
        .map(Item::id)
        .with_context(|| format!("collection has no {kind} items"))
}

fn print_items(items: &[Item], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }
    for item in items {
        let tags = item.tags().iter().cloned().collect::<Vec<_>>().join(", ");
        println!(
            "{}  {:<8}  {}  [{}]",
            item.id(),
            item.kind().as_str(),
            item.title(),
            tags
        );
    }
    Ok(())
}

fn print_lines<S: AsRef<str> + Serialize>(values: &[S], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(values)?);
        return Ok(());
    }
    for value in values {
        println!("{}", value.as_ref());
    }
    Ok(())
}
