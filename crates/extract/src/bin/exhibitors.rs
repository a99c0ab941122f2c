// ABOUTME: CLI binary for the exhibitor list extractor.
// ABOUTME: Fetches a URL (or reads an HTML file), extracts records, prints them, and exports CSV.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use exhibitors_extract::export::{self, DEFAULT_EXPORT_FILE_NAME};
use exhibitors_extract::request::{
    DEFAULT_CONTAINER_SELECTOR, DEFAULT_ITEM_SELECTOR, DEFAULT_NAME_SELECTOR,
};
use exhibitors_extract::{
    Extraction, ExtractionRequest, Extractor, NoProgress, Progress, ProgressSink, Record,
    DEFAULT_USER_AGENT,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const SELECTOR_GUIDE: &str = "\
Finding selectors:
  1. Open the list page in a browser and press F12 (DevTools).
  2. Right-click a company name and choose Inspect.
  3. In the Elements panel, right-click the highlighted node and choose
     Copy > Copy selector.
  4. Drop the row-specific part (e.g. :nth-child(3)) so the selector matches
     every row, and use the row element (often `tr`) as --container.
  5. --name and --item are searched inside each container only.

Defaults match table-style exhibitor directories:
  --container 'table.tbl_list tbody tr' --name 'td.al_left a' --item 'td.al_left'";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Csv,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "exhibitors")]
#[command(about = "Extract repeated records from an HTML page with CSS selectors")]
#[command(after_help = SELECTOR_GUIDE)]
struct Args {
    /// Page to fetch
    #[arg()]
    url: Option<String>,

    /// Selector for the repeated container elements (one per record)
    #[arg(short = 'c', long = "container", default_value = DEFAULT_CONTAINER_SELECTOR)]
    container: String,

    /// Selector for the company name, relative to a container
    #[arg(short = 'n', long = "name", default_value = DEFAULT_NAME_SELECTOR)]
    name: String,

    /// Selector for the exhibit items, relative to a container
    #[arg(short = 'i', long = "item", default_value = DEFAULT_ITEM_SELECTOR)]
    item: String,

    /// Read the page from an HTML file instead of fetching it
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// Output format written to stdout
    #[arg(short = 'f', long = "format", value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Write the CSV export (UTF-8 with BOM) to this file
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Write the CSV export to exhibition_data.csv
    #[arg(long = "save")]
    save: bool,

    /// Also list skipped rows in the output, marked as skipped
    #[arg(long = "include-skipped")]
    include_skipped: bool,

    /// Request timeout in seconds
    #[arg(
        long = "timeout",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: u64,

    /// User-Agent header sent with the request
    #[arg(long = "user-agent", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Print progress to stderr
    #[arg(long = "progress")]
    progress: bool,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Spinner while the page loads, then a bar over the matched rows.
///
/// indicatif hides both when stderr is not a terminal.
struct RowProgress {
    bar: ProgressBar,
    last: Option<Progress>,
}

impl RowProgress {
    fn start(message: String) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .map(|style| style.tick_chars(TICK_CHARS))
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar, last: None }
    }

    /// Clears the bar and returns the last event seen, if any.
    fn finish(self) -> Option<Progress> {
        self.bar.finish_and_clear();
        self.last
    }
}

impl ProgressSink for RowProgress {
    fn report(&mut self, progress: Progress) {
        if self.last.is_none() {
            self.bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{bar:40.green/dim}] {pos}/{len} {msg}",
                )
                .map(|style| style.tick_chars(TICK_CHARS).progress_chars("█▓░"))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            self.bar.set_length(progress.total as u64);
            self.bar.set_message("rows");
        }
        self.bar.set_position(progress.completed as u64);
        self.last = Some(progress);
    }
}

fn render(rows: &[Record], extraction: &Extraction, format: Format) -> Result<String, String> {
    match format {
        Format::Table => Ok(export::render_table(rows)),
        // No BOM on stdout; files written with -o/--save keep it.
        Format::Csv => export::to_csv(rows)
            .map_err(|e| e.to_string())
            .and_then(|bytes| {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes).to_vec();
                String::from_utf8(body).map_err(|e| e.to_string())
            }),
        Format::Json => export::render_json(extraction).map_err(|e| e.to_string()),
    }
}

async fn run(
    args: &Args,
    extractor: &Extractor,
    progress: &mut dyn ProgressSink,
) -> Result<Extraction, String> {
    if let Some(html_path) = &args.html {
        let label = args
            .url
            .clone()
            .unwrap_or_else(|| html_path.display().to_string());
        let request = ExtractionRequest::new(label, &args.container, &args.name, &args.item);
        let html = fs::read_to_string(html_path)
            .map_err(|e| format!("reading file {:?}: {}", html_path, e))?;
        return extractor
            .extract_html_with_progress(&html, &request, progress)
            .map_err(|e| e.to_string());
    }

    let url = args.url.clone().unwrap_or_default();
    let request = ExtractionRequest::new(url, &args.container, &args.name, &args.item);
    extractor
        .extract_with_progress(&request, progress)
        .await
        .map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    let missing_url = args.html.is_none() && args.url.as_deref().unwrap_or("").trim().is_empty();
    if missing_url || args.container.trim().is_empty() {
        eprintln!("error: URL and container selector are required");
        return ExitCode::from(1);
    }

    let extractor = match Extractor::builder()
        .timeout(Duration::from_secs(args.timeout))
        .user_agent(args.user_agent.as_str())
        .build()
    {
        Ok(extractor) => extractor,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };

    let start = Instant::now();
    let mut progress = args.progress.then(|| {
        RowProgress::start(match (&args.html, &args.url) {
            (Some(path), _) => format!("reading {}", path.display()),
            (None, Some(url)) => format!("fetching {}", url),
            (None, None) => String::new(),
        })
    });
    let result = match progress.as_mut() {
        Some(sink) => run(&args, &extractor, sink).await,
        None => run(&args, &extractor, &mut NoProgress).await,
    };
    let elapsed = start.elapsed();
    if let Some(last) = progress.and_then(RowProgress::finish) {
        eprintln!("processed {}/{} rows", last.completed, last.total);
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", elapsed.as_millis());
    }

    let extraction = match result {
        Ok(extraction) => extraction,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };

    let summary = export::summarize(&extraction);
    if summary.is_warning() {
        eprintln!("warning: {}", summary.message());
        // --include-skipped still lists rows that all failed.
        if !(args.include_skipped && extraction.containers > 0) {
            return ExitCode::from(2);
        }
    } else {
        eprintln!("{}", summary.message());
    }

    let rows = if args.include_skipped {
        extraction.rows_with_skipped()
    } else {
        extraction.records.clone()
    };

    match render(&rows, &extraction, args.format) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    }

    let export_path = args
        .output
        .clone()
        .or_else(|| args.save.then(|| PathBuf::from(DEFAULT_EXPORT_FILE_NAME)));
    if let Some(path) = export_path {
        if let Err(e) = export::write_csv(&path, &rows) {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
        eprintln!("saved {} rows to {}", rows.len(), path.display());
    }

    if summary.is_warning() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}
