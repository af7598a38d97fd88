use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use subsift::render::{render_clash, render_singbox};
use subsift::subscription::{encode_subscription, unwrap_container};
use subsift::{SieveConfig, SieveError, Summary, process_text};
use tracing::{debug, error, info, warn};

const PLAIN_OUT: &str = "nodes_plain.txt";
const SAFE_OUT: &str = "nodes_safe.txt";
const CLASH_OUT: &str = "nodes_clash.yaml";
const SINGBOX_OUT: &str = "nodes_singbox.json";

#[derive(Parser, Debug)]
#[command(
    name = "subsift",
    version,
    about = "Filter a proxy subscription and render Clash / sing-box configs"
)]
struct Args {
    /// Subscription file (base64 blob or one link per line)
    input: PathBuf,

    /// Directory for generated files
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// YAML config overriding the safety policy and render settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a JSON report of failures and rejections
    #[arg(long)]
    report: Option<PathBuf>,

    /// Skip the Clash YAML output
    #[arg(long)]
    no_clash: bool,

    /// Skip the sing-box JSON output
    #[arg(long)]
    no_singbox: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// RUST_LOG wins over `--verbose`; SUBSIFT_LOG_FORMAT=json switches to JSON lines.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into());
    let fmt_json = std::env::var("SUBSIFT_LOG_FORMAT")
        .ok()
        .is_some_and(|v| v == "json");
    let builder = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .with_target(false);
    let _ = if fmt_json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    debug!("tracing initialized (json={})", fmt_json);
}

fn read_file(path: &Path) -> Result<String, SieveError> {
    std::fs::read_to_string(path).map_err(|source| SieveError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), SieveError> {
    std::fs::write(path, contents).map_err(|source| SieveError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), bytes = contents.len(), "wrote output");
    Ok(())
}

fn run(args: &Args) -> Result<Summary, SieveError> {
    let config = match &args.config {
        Some(path) => SieveConfig::load(path)?,
        None => SieveConfig::default(),
    };

    let content = read_file(&args.input)?;
    let text = unwrap_container(&content);
    let batch = process_text(&text, &config);

    for failure in &batch.failures {
        warn!(line = %failure.line_preview, reason = %failure.reason, "skipped descriptor");
    }
    for rejection in &batch.rejections {
        warn!(
            name = %rejection.name,
            server = %rejection.server,
            port = rejection.port,
            reason = %rejection.reason,
            "filtered node"
        );
    }

    std::fs::create_dir_all(&args.out_dir).map_err(|source| SieveError::Io {
        path: args.out_dir.display().to_string(),
        source,
    })?;

    let encoded = encode_subscription(&batch.nodes);
    write_file(&args.out_dir.join(PLAIN_OUT), &encoded.plain)?;
    write_file(&args.out_dir.join(SAFE_OUT), &encoded.base64)?;

    if !args.no_clash {
        let yaml = render_clash(&batch.nodes, config.auto_group_limit)?;
        write_file(&args.out_dir.join(CLASH_OUT), &yaml)?;
    }
    if !args.no_singbox {
        let json = render_singbox(&batch.nodes)?;
        write_file(&args.out_dir.join(SINGBOX_OUT), &json)?;
    }
    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&batch.report())?;
        write_file(path, &json)?;
    }

    Ok(batch.summary())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(summary) => {
            println!("✓ Valid nodes: {}", summary.accepted);
            println!("✗ Failed to parse: {}", summary.failed);
            println!("✗ Filtered dangerous nodes: {}", summary.rejected);
            if summary.dropped_duplicates > 0 {
                println!("- Dropped duplicates: {}", summary.dropped_duplicates);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
