//! Command-line client for the AikiNote API.

mod client;

use aikinote_core::models::tag::{normalize_tag_names, parse_tags_csv};
use aikinote_core::models::{
    CreatePageRequest, DateZone, Tag, TagCategory, TrainingPageRecord, TrainingPageWithTags,
    UpdatePageRequest,
};
use aikinote_core::sync::{AlertSink, PagesBackend, TrainingPages, MISSING_USER_MESSAGE};
use aikinote_core::view::{PageListView, VisiblePage};
use aikinote_core::{SyncError, DEFAULT_CLI_SERVER_URL};
use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use client::{normalize_server, HttpBackend};
use std::io::{self, Read};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aikinote", about = "AikiNote training journal CLI", version)]
struct Cli {
    /// Server URL (can also be set via AIKINOTE_SERVER env var)
    #[arg(short, long, env = "AIKINOTE_SERVER", global = true)]
    server: Option<String>,

    /// User whose pages are read and written
    #[arg(short, long, env = "AIKINOTE_USER", global = true)]
    user: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Show training pages, newest first
    List {
        /// Case-insensitive text to look for in title, content, and comment
        #[arg(short, long)]
        query: Option<String>,
        /// Only pages carrying this tag (repeatable; all must match)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Only pages from this day (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Number of 25-item pages to show
        #[arg(short, long, default_value = "1")]
        pages: usize,
    },
    /// Record a new training page (content from --file or stdin)
    New {
        #[arg(long)]
        title: String,
        /// Comma-separated tori tags
        #[arg(long)]
        tori: Option<String>,
        /// Comma-separated uke tags
        #[arg(long)]
        uke: Option<String>,
        /// Comma-separated waza tags
        #[arg(long)]
        waza: Option<String>,
        #[arg(short, long)]
        comment: Option<String>,
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Change fields of a page; omitted fields keep their current value
    Edit {
        id: String,
        #[command(flatten)]
        edits: PageEdits,
    },
    Delete {
        id: String,
    },
    /// List registered tags by category
    Tags,
}

#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
struct PageEdits {
    #[arg(long)]
    title: Option<String>,
    #[arg(long, conflicts_with = "file")]
    content: Option<String>,
    /// Read the new content from a file
    #[arg(short, long)]
    file: Option<String>,
    #[arg(short, long)]
    comment: Option<String>,
    /// Comma-separated tori tags (empty clears)
    #[arg(long)]
    tori: Option<String>,
    /// Comma-separated uke tags (empty clears)
    #[arg(long)]
    uke: Option<String>,
    /// Comma-separated waza tags (empty clears)
    #[arg(long)]
    waza: Option<String>,
}

/// Prints sync-layer alerts to stderr.
struct StderrAlerts;

impl AlertSink for StderrAlerts {
    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}

fn exit_with(action: &str, message: impl std::fmt::Display) -> ! {
    eprintln!("{} failed: {}", action, message);
    std::process::exit(1);
}

fn non_blank_arg(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn resolve_server(server: Option<String>) -> String {
    non_blank_arg(server).unwrap_or_else(|| DEFAULT_CLI_SERVER_URL.to_string())
}

fn read_content(file: Option<&str>) -> io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn csv_or_empty(value: Option<&str>) -> Vec<String> {
    value.map(parse_tags_csv).unwrap_or_default()
}

fn apply_edits(
    current: &TrainingPageWithTags,
    edits: PageEdits,
    content: Option<String>,
) -> UpdatePageRequest {
    let mut request = UpdatePageRequest::from_current(current);
    if let Some(title) = edits.title {
        request.title = title;
    }
    if let Some(content) = content.or(edits.content) {
        request.content = content;
    }
    if let Some(comment) = edits.comment {
        request.comment = comment;
    }
    if let Some(tori) = edits.tori.as_deref() {
        request.tori = parse_tags_csv(tori);
    }
    if let Some(uke) = edits.uke.as_deref() {
        request.uke = parse_tags_csv(uke);
    }
    if let Some(waza) = edits.waza.as_deref() {
        request.waza = parse_tags_csv(waza);
    }
    request
}

/// Run `records` through the list view the way an interactive session would:
/// set filters, render once, then load `pages - 1` more pages.
fn list_view(
    records: &[TrainingPageRecord],
    query: Option<&str>,
    tags: &[String],
    date: Option<NaiveDate>,
    pages: usize,
) -> VisiblePage {
    let mut view = PageListView::default();
    if let Some(query) = query {
        view.set_search_input(query, Instant::now());
        view.commit_search();
    }
    for tag in normalize_tag_names(tags) {
        view.toggle_tag(&tag);
    }
    view.set_date(date);

    view.visible(records);
    for _ in 1..pages.max(1) {
        view.load_more();
    }
    view.visible(records)
}

fn format_record_line(record: &TrainingPageRecord) -> String {
    format!(
        "{:<36} {} {:<30} {}",
        record.id,
        record.date,
        record.title,
        record.tags.join(", ")
    )
}

fn format_list_output(visible: &VisiblePage, json: bool) -> Result<String, String> {
    if json {
        let payload = serde_json::json!({
            "items": visible.items,
            "filtered": visible.filtered_len,
            "has_more": visible.has_more,
        });
        return serde_json::to_string_pretty(&payload)
            .map_err(|err| format!("response encoding error: {}", err));
    }

    let mut rows: Vec<String> = visible.items.iter().map(format_record_line).collect();
    rows.push(format!(
        "Showing {} of {} pages{}",
        visible.items.len(),
        visible.filtered_len,
        if visible.has_more {
            " (more available, raise --pages)"
        } else {
            ""
        }
    ));
    Ok(rows.join("\n"))
}

fn format_record_output(
    action: &str,
    record: &TrainingPageRecord,
    json: bool,
) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(record)
            .map_err(|err| format!("response encoding error: {}", err));
    }
    Ok(format!("{}: {} ({})", action, record.title, record.id))
}

/// Create a page and render the record the server stored.
async fn create_output<B: PagesBackend, A: AlertSink>(
    pages: &TrainingPages<B, A>,
    request: &CreatePageRequest,
    json: bool,
) -> Result<String, String> {
    let record = pages.try_create(request).await.map_err(|err| match err {
        SyncError::MissingUser => MISSING_USER_MESSAGE.to_string(),
        other => other.to_string(),
    })?;
    format_record_output("Created", &record, json)
}

fn format_tags_output(tags: &[Tag], json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(tags)
            .map_err(|err| format!("response encoding error: {}", err));
    }

    let mut rows = Vec::new();
    for category in [TagCategory::Tori, TagCategory::Uke, TagCategory::Waza] {
        let names: Vec<&str> = tags
            .iter()
            .filter(|tag| tag.category == category)
            .map(|tag| tag.name.as_str())
            .collect();
        if names.is_empty() {
            continue;
        }
        rows.push(format!(
            "{} ({}): {}",
            category.label(),
            category.as_str(),
            names.join(", ")
        ));
    }
    Ok(rows.join("\n"))
}

fn print_or_exit(action: &str, output: Result<String, String>) {
    match output {
        Ok(output) if output.is_empty() => {}
        Ok(output) => println!("{}", output),
        Err(message) => exit_with(action, message),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        server,
        user,
        json,
        timeout,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    init_tracing();
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()?;
    let backend = HttpBackend::new(client, normalize_server(resolve_server(server)));
    let user = non_blank_arg(user);
    let pages = TrainingPages::with_alerts(backend, StderrAlerts).with_zone(DateZone::Local);

    match command {
        Commands::Completions { .. } => unreachable!("completions handled before client setup"),
        Commands::List {
            query,
            tags,
            date,
            pages: page_count,
        } => {
            if !pages.fetch_all(user.as_deref().unwrap_or_default()).await {
                std::process::exit(1);
            }
            let records = pages.records();
            let visible = list_view(&records, query.as_deref(), &tags, date, page_count);
            print_or_exit("List", format_list_output(&visible, json));
        }
        Commands::New {
            title,
            tori,
            uke,
            waza,
            comment,
            file,
        } => {
            let content = read_content(file.as_deref())?;
            let request = CreatePageRequest {
                title,
                tori: csv_or_empty(tori.as_deref()),
                uke: csv_or_empty(uke.as_deref()),
                waza: csv_or_empty(waza.as_deref()),
                content,
                comment: comment.unwrap_or_default(),
                user_id: user.unwrap_or_default(),
            };
            print_or_exit("New", create_output(&pages, &request, json).await);
        }
        Commands::Edit { id, edits } => {
            let Some(user_id) = user else {
                exit_with("Edit", MISSING_USER_MESSAGE);
            };
            let content = match edits.file.as_deref() {
                Some(path) => Some(read_content(Some(path))?),
                None => None,
            };
            let current = match pages.backend().get_page(&id, &user_id).await {
                Ok(envelope) => envelope
                    .into_result("Page not found")
                    .unwrap_or_else(|message| exit_with("Edit", message)),
                Err(err) => exit_with("Edit", err),
            };
            let request = apply_edits(&current, edits, content);
            match pages.try_update(&request).await {
                Ok(record) => print_or_exit("Edit", format_record_output("Updated", &record, json)),
                Err(err) => exit_with("Edit", err),
            }
        }
        Commands::Delete { id } => {
            if !pages.remove(&id, user.as_deref()).await {
                std::process::exit(1);
            }
            if json {
                println!("{}", serde_json::json!({ "success": true, "data": true }));
            } else {
                println!("Deleted page: {}", id);
            }
        }
        Commands::Tags => {
            let Some(user_id) = user else {
                exit_with("Tags", MISSING_USER_MESSAGE);
            };
            let tags = match pages.backend().list_tags(&user_id).await {
                Ok(envelope) => envelope
                    .into_result("Failed to load tags.")
                    .unwrap_or_else(|message| exit_with("Tags", message)),
                Err(err) => exit_with("Tags", err),
            };
            print_or_exit("Tags", format_tags_output(&tags.tags, json));
        }
    }

    Ok(())
}
