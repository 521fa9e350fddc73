//! CLI binary for obscura-client.
//!
//! A thin shim over the library crate that maps one subcommand per service
//! operation onto a [`Workflow`] and saves the returned artifact.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use obscura_client::{
    ClientConfig, FieldValue, Operation, SubmitOutcome, Workflow, WorkflowObserver,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
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

// ── CLI observer using indicatif ─────────────────────────────────────────────

/// Terminal observer: keeps a spinner alive while the submission is in
/// flight. Media transforms routinely take minutes, so silent waiting reads
/// as a hang without it.
struct CliObserver {
    bar: ProgressBar,
}

impl CliObserver {
    fn new(operation: Operation) -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix(operation.to_string());
        bar.set_message("Submitting…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl WorkflowObserver for CliObserver {
    fn on_artifact_ready(&self, filename: &str, bytes: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {}  {}",
            green("✔"),
            bold(filename),
            dim(&format!("{bytes} bytes"))
        );
    }

    fn on_submit_error(&self, error: &obscura_client::SubmitError) {
        self.bar.finish_and_clear();
        eprintln!("{} {error}", red("✗"));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Blur every pair of eyes in a zip of pictures
  obscura eyes-in-pictures --zip holiday.zip -o blurred.zip

  # Blur all faces in a video, fetched by the server from a link
  obscura faces-in-video --link https://example.com/clip.mp4

  # Blur one person only, given reference shots of them
  obscura specific-faces-in-pictures --zip event.zip --reference alice.zip

  # Redact names from a PDF
  obscura redact-pdf --pdf contract.pdf --instruction "redact all names" -o clean.pdf

  # Point at a non-default service
  obscura --base-url http://blur.internal:5000 eyes-in-video --file clip.mp4

ENVIRONMENT VARIABLES:
  OBSCURA_BASE_URL   Service base URL (default: http://localhost:5000)
  OBSCURA_TIMEOUT    Request timeout in seconds (default: 300)

NOTES:
  The transforms are slow, server-side media operations; the request is sent
  exactly once and never retried. When both --file and --link are given the
  uploaded file wins and the link is dropped.
"#;

/// Blur faces and eyes in pictures and video, redact PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "obscura",
    version,
    about = "Client for the Obscura media-anonymization service",
    long_about = "Submit pictures, video, or PDFs to an Obscura anonymization service and save \
the transformed artifact. One subcommand per service operation; the exchange is a single \
multipart POST with no retries.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Service base URL.
    #[arg(long, global = true, env = "OBSCURA_BASE_URL", default_value = "http://localhost:5000")]
    base_url: String,

    /// Request timeout in seconds.
    #[arg(long, global = true, env = "OBSCURA_TIMEOUT", default_value_t = 300)]
    timeout: u64,

    /// Write the artifact to this path instead of the suggested filename in
    /// the current directory.
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Output filename to request from the server (sent as a form field and
    /// used as the artifact's suggested name).
    #[arg(long, global = true)]
    output_name: Option<String>,

    /// Print the outcome as JSON (artifact metadata or error) on stdout.
    #[arg(long, global = true)]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, global = true)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Blur all eyes in a zip of pictures.
    EyesInPictures {
        /// Zip archive of pictures to upload.
        #[arg(long)]
        zip: PathBuf,
    },
    /// Blur all eyes in a video.
    EyesInVideo {
        /// Video file to upload.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Remote video URL the server fetches instead of an upload.
        #[arg(long)]
        link: Option<String>,
    },
    /// Blur all faces in a zip of pictures.
    FacesInPictures {
        #[arg(long)]
        zip: PathBuf,
    },
    /// Blur all faces in a video.
    FacesInVideo {
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        link: Option<String>,
    },
    /// Blur one person's face in a zip of pictures.
    SpecificFacesInPictures {
        #[arg(long)]
        zip: PathBuf,
        /// Zip archive of reference shots of the person to blur.
        #[arg(long)]
        reference: PathBuf,
    },
    /// Blur one person's face in a video.
    SpecificFacesInVideo {
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        link: Option<String>,
        /// Reference image of the person to blur.
        #[arg(long)]
        reference: PathBuf,
    },
    /// Redact content from a PDF.
    RedactPdf {
        /// PDF file to upload.
        #[arg(long)]
        pdf: PathBuf,
        /// Free-text redaction instruction, e.g. "redact all names".
        #[arg(long)]
        instruction: Option<String>,
    },
}

impl Command {
    fn operation(&self) -> Operation {
        match self {
            Command::EyesInPictures { .. } => Operation::EyesInPictures,
            Command::EyesInVideo { .. } => Operation::EyesInVideo,
            Command::FacesInPictures { .. } => Operation::FacesInPictures,
            Command::FacesInVideo { .. } => Operation::FacesInVideo,
            Command::SpecificFacesInPictures { .. } => Operation::SpecificFacesInPictures,
            Command::SpecificFacesInVideo { .. } => Operation::SpecificFacesInVideo,
            Command::RedactPdf { .. } => Operation::RedactPdf,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // ── Build the workflow ───────────────────────────────────────────────
    let config = ClientConfig::builder()
        .base_url(&cli.base_url)
        .request_timeout_secs(cli.timeout)
        .build()
        .context("Invalid configuration")?;

    let operation = cli.command.operation();
    let mut workflow = Workflow::new(operation, config).context("Failed to build workflow")?;

    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    if show_progress {
        workflow = workflow.with_observer(CliObserver::new(operation));
    }

    populate_fields(&mut workflow, &cli).await?;

    // Surface validation problems before anything is sent, with one line per
    // missing field — the inline-feedback equivalent for a terminal.
    let report = workflow.validate();
    if !report.passed() {
        for issue in &report.issues {
            eprintln!("{} {issue}", red("✗"));
        }
        bail!("{} is not submittable", operation);
    }

    // ── Submit ───────────────────────────────────────────────────────────
    match workflow.submit().await {
        SubmitOutcome::Ready => {
            let saved = match cli.output {
                Some(ref path) => {
                    workflow
                        .save_artifact_to(path)
                        .await
                        .with_context(|| format!("Failed to save artifact to {}", path.display()))?;
                    path.clone()
                }
                None => {
                    let artifact = workflow.artifact().expect("Ready implies artifact");
                    let name = artifact.suggested_filename.clone();
                    workflow
                        .save_artifact_to(&name)
                        .await
                        .with_context(|| format!("Failed to save artifact to ./{name}"))?;
                    PathBuf::from(name)
                }
            };

            if cli.json {
                let artifact = workflow.artifact().expect("Ready implies artifact");
                println!(
                    "{}",
                    serde_json::json!({
                        "operation": operation,
                        "state": workflow.state(),
                        "saved_to": saved,
                        "content_type": artifact.content_type,
                        "suggested_filename": artifact.suggested_filename,
                        "bytes": artifact.len(),
                    })
                );
            } else if !cli.quiet {
                eprintln!("{} saved to {}", green("✔"), bold(&saved.display().to_string()));
            }
            Ok(())
        }
        SubmitOutcome::Failed => {
            let error = workflow.last_error().expect("Failed implies error");
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "operation": operation,
                        "state": workflow.state(),
                        "category": error.category(),
                        "status": error.status(),
                        "error": error.to_string(),
                    })
                );
            }
            bail!("{error}");
        }
        SubmitOutcome::Invalid(report) => {
            // Unreachable in practice: validated above. Kept for completeness.
            for issue in &report.issues {
                eprintln!("{} {issue}", red("✗"));
            }
            bail!("{} is not submittable", operation);
        }
        SubmitOutcome::Rejected => bail!("a submission is already in flight"),
    }
}

/// Map subcommand arguments onto workflow fields.
async fn populate_fields(workflow: &mut Workflow, cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::EyesInPictures { zip } | Command::FacesInPictures { zip } => {
            workflow.set_field("zip_file", file_value(zip).await?);
        }
        Command::EyesInVideo { file, link } | Command::FacesInVideo { file, link } => {
            if let Some(path) = file {
                workflow.set_field("file", file_value(path).await?);
            }
            if let Some(url) = link {
                workflow.set_field("link", FieldValue::text(url));
            }
        }
        Command::SpecificFacesInPictures { zip, reference } => {
            workflow.set_field("zip_file", file_value(zip).await?);
            workflow.set_field("reference_zip_file", file_value(reference).await?);
        }
        Command::SpecificFacesInVideo {
            file,
            link,
            reference,
        } => {
            if let Some(path) = file {
                workflow.set_field("file", file_value(path).await?);
            }
            if let Some(url) = link {
                workflow.set_field("link", FieldValue::text(url));
            }
            workflow.set_field("reference_file", file_value(reference).await?);
        }
        Command::RedactPdf { pdf, instruction } => {
            workflow.set_field("pdf_file", file_value(pdf).await?);
            if let Some(text) = instruction {
                workflow.set_field("instruction", FieldValue::text(text));
            }
        }
    }

    // The service expects output_filename whenever the user names one; blank
    // means "use the operation's default".
    if let Some(ref name) = cli.output_name {
        workflow.set_field("output_filename", FieldValue::text(name));
    }

    Ok(())
}

/// Read an upload from disk into a binary field value.
async fn file_value(path: &Path) -> Result<FieldValue> {
    FieldValue::from_file(path, guess_content_type(path))
        .await
        .with_context(|| format!("Failed to read upload file {}", path.display()))
}

/// Best-effort MIME type from the file extension; the server only needs a
/// rough hint and falls back to sniffing the bytes itself.
fn guess_content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("zip") => "application/zip",
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}
