use billsearch::prelude::*;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Search, filter and page through a legislative bill list
#[derive(Parser, Debug)]
#[command(name = "billsearch")]
#[command(about = "Search, filter and page through a legislative bill list")]
#[command(version)]
struct Args {
    /// Log debug output (cache hits, debounce fires) to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(ClapArgs, Debug, Clone)]
struct SourceArgs {
    /// JSON file containing the bill list
    #[arg(long, conflicts_with = "url")]
    file: Option<PathBuf>,

    /// Bill list endpoint (can also use BILLSEARCH_URL env var)
    #[arg(long)]
    url: Option<String>,

    /// Engine configuration file (.yml/.yaml or .toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bills per page (overrides the configuration file)
    #[arg(long)]
    page_size: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter the bill list once and print the visible bills as JSON lines
    Search {
        #[command(flatten)]
        source: SourceArgs,

        /// Free-text query; every term must appear in the bill
        #[arg(short, long, default_value = "")]
        query: String,

        /// Topics to match (any of them)
        #[arg(long = "topic")]
        topics: Vec<String>,

        /// Sponsors to match (any of them)
        #[arg(long = "sponsor")]
        sponsors: Vec<String>,

        /// Exact status, e.g. "Passed" or "In Committee"
        #[arg(long)]
        status: Option<String>,

        /// Number of pages to reveal
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },

    /// Print the topic, sponsor and status options of the bill list
    Facets {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Interactive session driven by commands on stdin
    Session {
        #[command(flatten)]
        source: SourceArgs,
    },
}

fn print_available_commands() {
    println!("Available commands:");
    println!("  search   Filter the bill list once and print the visible bills");
    println!("  facets   Print the topic, sponsor and status options");
    println!("  session  Interactive session driven by commands on stdin");
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "billsearch=debug" } else { "billsearch=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn bill_source(args: &SourceArgs) -> anyhow::Result<BillSource> {
    // Check flags first, then environment variable
    if let Some(file) = &args.file {
        Ok(BillSource::File(file.clone()))
    } else if let Some(url) = &args.url {
        Ok(BillSource::Url(url.clone()))
    } else if let Ok(url) = std::env::var("BILLSEARCH_URL") {
        Ok(BillSource::Url(url))
    } else {
        Err(anyhow::anyhow!(
            "No bill source given: use --file, --url or BILLSEARCH_URL"
        ))
    }
}

fn engine_config(args: &SourceArgs) -> anyhow::Result<EngineConfig> {
    let base = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    let mut builder = EngineConfigBuilder::from_config(base);
    if let Some(size) = args.page_size {
        builder = builder.page_size(size);
    }
    Ok(builder.build()?)
}

fn parse_status(raw: &str) -> Option<BillStatus> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("any") {
        None
    } else {
        Some(BillStatus::from(trimmed))
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn print_view(controller: &FilterController) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(&controller.view())?);
    Ok(())
}

async fn run_search_command(cmd: Command) -> anyhow::Result<()> {
    let Command::Search {
        source,
        query,
        topics,
        sponsors,
        status,
        pages,
    } = cmd
    else {
        unreachable!()
    };

    let config = engine_config(&source)?;
    let bills = bill_source(&source)?.load().await?;

    let mut controller = FilterController::new(&config);
    controller.set_bill_collection(bills);
    controller.apply_text_query(&query);
    controller.set_facet(Facet::Topics, &topics);
    controller.set_facet(Facet::Sponsors, &sponsors);
    controller.set_status(status.as_deref().and_then(parse_status));

    for _ in 1..pages {
        if !controller.load_more() {
            break;
        }
    }

    // Write JSON to stdout (one bill per line)
    for bill in controller.visible_slice() {
        println!("{}", serde_json::to_string(bill.as_ref())?);
    }

    eprintln!(
        "{} of {} bills match, showing {}{}",
        controller.filtered_count(),
        controller.total_count(),
        controller.visible_count(),
        if controller.has_more() { " (more available)" } else { "" }
    );

    Ok(())
}

async fn run_facets_command(cmd: Command) -> anyhow::Result<()> {
    let Command::Facets { source } = cmd else {
        unreachable!()
    };

    let config = engine_config(&source)?;
    let bills = bill_source(&source)?.load().await?;

    let mut controller = FilterController::new(&config);
    controller.set_bill_collection(bills);
    println!(
        "{}",
        serde_json::to_string_pretty(controller.facet_options())?
    );

    Ok(())
}

/// Apply one session command. Returns false when the session should end.
fn handle_session_line(controller: &mut FilterController, line: &str) -> anyhow::Result<bool> {
    let line = line.trim();
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

    match command {
        "" => {}
        "q" | "query" => {
            // committed once typing pauses; the view is printed then
            controller.set_text_query(rest);
            return Ok(true);
        }
        "topic" | "topics" | "sponsor" | "sponsors" => {
            let facet: Facet = command.parse()?;
            controller.set_facet(facet, split_list(rest));
        }
        "status" => controller.set_status(parse_status(rest)),
        "more" => {
            controller.load_more();
        }
        "clear" => controller.clear_all(),
        "show" => {}
        "quit" | "exit" => return Ok(false),
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Commands: q <text>, topics a,b, sponsors a,b, status <s>|any,");
            eprintln!("          more, clear, show, quit");
            return Ok(true);
        }
    }

    print_view(controller)?;
    Ok(true)
}

async fn run_session_command(cmd: Command) -> anyhow::Result<()> {
    let Command::Session { source } = cmd else {
        unreachable!()
    };

    let config = engine_config(&source)?;
    let bills = bill_source(&source)?.load_or_empty().await;

    let mut controller = FilterController::new(&config);
    controller.set_bill_collection(bills);
    print_view(&controller)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !handle_session_line(&mut controller, &line)? {
                            break;
                        }
                    }
                    None => break,
                }
            }
            Some(changed) = controller.next_text_commit() => {
                if changed {
                    print_view(&controller)?;
                }
            }
        }
    }

    // Let a query typed right before EOF take effect
    while let Some(changed) = controller.next_text_commit().await {
        if changed {
            print_view(&controller)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Some(cmd @ Command::Search { .. }) => run_search_command(cmd).await,
        Some(cmd @ Command::Facets { .. }) => run_facets_command(cmd).await,
        Some(cmd @ Command::Session { .. }) => run_session_command(cmd).await,
        None => {
            print_available_commands();
            Ok(())
        }
    }
}
