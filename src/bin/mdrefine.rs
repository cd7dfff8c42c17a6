//! CLI binary for edgequake-mdrefine.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `RefineConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_mdrefine::pipeline::input::read_markdown;
use edgequake_mdrefine::{
    refine_batch, refine_markdown, InlineTextPolicy, ProgressCallback, RefineConfig,
    RefineError, RefineProgressCallback, RefinedDocument,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the batch plus a log line per
/// document. Documents finish out of order, so start times are keyed by index.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Refining");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self, index: usize) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&index))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl RefineProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Refining {total_documents} documents…"))
        ));
    }

    fn on_document_start(&self, index: usize, _total: usize) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(index, Instant::now());
        }
    }

    fn on_document_complete(&self, index: usize, total: usize, figure_count: usize) {
        let secs = self.elapsed_secs(index);
        self.bar.println(format!(
            "  {} Doc {:>3}/{:<3}  {:<12}  {}",
            green("✓"),
            index,
            total,
            dim(&format!("{figure_count:>4} figures")),
            dim(&format!("{secs:.2}s")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        let secs = self.elapsed_secs(index);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let first_line = error.lines().next().unwrap_or(error);
        self.bar.println(format!(
            "  {} Doc {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            red(first_line),
            dim(&format!("{secs:.2}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_documents: usize, success_count: usize) {
        let failed = self.errors.load(Ordering::SeqCst);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} documents refined successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} documents refined  ({} failed)",
                if failed == total_documents {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_documents,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Refine one converter output (writes output/document_refined.md)
  mdrefine output/document.md

  # Refine several documents, 8 at a time
  mdrefine -c 8 out/*.md

  # Print the refined Markdown instead of writing a file
  mdrefine --stdout output/document.md

  # Images live in ./assets instead of ./images
  mdrefine --image-dir assets output/document.md

  # JSON report with every figure and its caption
  mdrefine --json output/document.md > figures.json

OUTPUT MARKUP:
  <figure id="fig-001"><img src="images/chart.png" alt="chart" /><figcaption>Revenue</figcaption></figure>

CAPTIONS RECOGNISED (within --caption-window lines below an image):
  Figure 1: text   Fig. 2 - text   図1：text   *italic line*   <figcaption>text</figcaption>
"#;

/// Refine converter-emitted Markdown into <figure> markup with captions.
#[derive(Parser, Debug)]
#[command(
    name = "mdrefine",
    version,
    about = "Refine converter-emitted Markdown into <figure> markup with detected captions",
    long_about = "Rewrite image references in Markdown produced by a document converter into \
<figure> elements with canonical images/<file> paths, normalised alt text and captions detected \
in the lines that follow each image. Each input is written to <name>_refined.<ext> next to it.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown files to refine.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Image directory name used in canonical paths.
    #[arg(long, env = "MDREFINE_IMAGE_DIR", default_value = "images")]
    image_dir: String,

    /// Suffix inserted before the extension of each output file.
    #[arg(long, env = "MDREFINE_SUFFIX", default_value = "_refined")]
    suffix: String,

    /// Lines below an image searched for a caption (1–10).
    #[arg(long, env = "MDREFINE_CAPTION_WINDOW", default_value_t = 3,
          value_parser = clap::value_parser!(u8).range(1..=10))]
    caption_window: u8,

    /// Text sharing a line with an image: preserve or discard.
    #[arg(long, env = "MDREFINE_INLINE", value_enum, default_value = "preserve")]
    inline: InlineTextPolicy,

    /// Skip the whole-document image path rewrite.
    #[arg(long, env = "MDREFINE_NO_NORMALIZE_PATHS")]
    no_normalize_paths: bool,

    /// Print refined Markdown to stdout instead of writing files.
    #[arg(long, conflicts_with = "json")]
    stdout: bool,

    /// Print a JSON report (figures + stats per document).
    #[arg(long, env = "MDREFINE_JSON")]
    json: bool,

    /// Documents refined concurrently.
    #[arg(short, long, env = "MDREFINE_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Disable progress bar.
    #[arg(long, env = "MDREFINE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MDREFINE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MDREFINE_QUIET")]
    quiet: bool,
}

/// One entry of the `--json` report.
#[derive(Serialize)]
struct ReportEntry<'a> {
    source: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    refined: Option<&'a RefinedDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces per-document INFO logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.stdout;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn RefineProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Stdout mode: refine in memory, write nothing ─────────────────────
    if cli.stdout {
        return print_refined(&cli.inputs, &config);
    }

    // ── Run batch ────────────────────────────────────────────────────────
    let results = refine_batch(&cli.inputs, &config).await;
    let failed = results.iter().filter(|(_, r)| r.is_err()).count();

    if cli.json {
        let report: Vec<ReportEntry<'_>> = results
            .iter()
            .map(|(source, r)| ReportEntry {
                source,
                refined: r.as_ref().ok(),
                error: r.as_ref().err().map(RefineError::to_string),
            })
            .collect();
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        for (source, r) in &results {
            match r {
                Ok(doc) => eprintln!(
                    "{}  {}  →  {}  ({} figures, {} captioned)",
                    green("✔"),
                    source.display(),
                    bold(&doc.output_path.display().to_string()),
                    doc.output.stats.image_count,
                    doc.output.stats.captioned_count,
                ),
                Err(e) => eprintln!("{}  {}  {}", red("✘"), source.display(), e),
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} documents failed", results.len());
    }
    Ok(())
}

fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<RefineConfig> {
    let mut builder = RefineConfig::builder()
        .image_dir(cli.image_dir.clone())
        .output_suffix(cli.suffix.clone())
        .caption_window(cli.caption_window as usize)
        .normalize_paths(!cli.no_normalize_paths)
        .inline_text(cli.inline)
        .concurrency(cli.concurrency);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_refined(inputs: &[PathBuf], config: &RefineConfig) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    for path in inputs {
        let text = read_markdown(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let output = refine_markdown(&text, config);
        handle
            .write_all(output.markdown.as_bytes())
            .context("Failed to write to stdout")?;
        if !output.markdown.ends_with('\n') {
            handle
                .write_all(b"\n")
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
