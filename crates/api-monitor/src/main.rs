use anyhow::Context;
use api_monitor::{
    split_export, write_split, ApiMonitor, HttpDispatcher, MonitorConfig, RequestOptions,
    RequestTarget,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "api-monitor", version, about = "Capture and export API/GraphQL calls")]
struct Args {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info", env = "API_MONITOR_LOG_LEVEL")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dispatch targets through the monitor and print the captured calls as JSON
    Fetch {
        /// YAML configuration file
        #[arg(short, long, env = "API_MONITOR_CONFIG")]
        config: Option<PathBuf>,

        /// Origin for relative targets (overrides the config file)
        #[arg(long, env = "API_MONITOR_ORIGIN")]
        origin: Option<String>,

        /// HTTP method for every target
        #[arg(short = 'X', long)]
        method: Option<String>,

        /// Request header, `name: value`; repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request body for every target
        #[arg(short, long)]
        data: Option<String>,

        /// Only export calls whose url contains this substring
        #[arg(long)]
        filter: Option<String>,

        /// Write the export to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write each captured call to its own numbered file in this directory
        #[arg(long)]
        split_dir: Option<PathBuf>,

        /// Targets to dispatch (absolute or relative to the origin)
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Split an export file into one file per captured call
    Split {
        input: PathBuf,
        output_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so the JSON export on stdout stays clean
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Fetch {
            config,
            origin,
            method,
            headers,
            data,
            filter,
            output,
            split_dir,
            targets,
        } => {
            let mut config = match config {
                Some(path) => MonitorConfig::from_file(&path)
                    .with_context(|| format!("Failed to load config {path:?}"))?,
                None => MonitorConfig::default(),
            };
            if let Some(origin) = origin {
                config.origin = Some(origin);
            }
            config.validate()?;

            let options = build_options(method, &headers, data)?;
            let dispatcher = HttpDispatcher::new(&config)?;
            let monitor = ApiMonitor::new(Arc::new(dispatcher)).with_origin(config.origin_url()?);

            let calls = targets.iter().map(|target| {
                let monitor = &monitor;
                let options = options.clone();
                async move {
                    let result = monitor
                        .intercept(RequestTarget::from(target.as_str()), options)
                        .await;
                    (target, result)
                }
            });
            for (target, result) in futures::future::join_all(calls).await {
                match result {
                    Ok(response) => info!("{} -> {}", target, response.status()),
                    Err(e) => warn!("{} failed: {}", target, e),
                }
            }

            let captured = match filter.as_deref() {
                Some(pattern) => monitor.get_by_url(pattern),
                None => monitor.responses(),
            };

            match (output, filter.is_some()) {
                (Some(path), false) => {
                    monitor
                        .save_to_file(&path)
                        .with_context(|| format!("Failed to write {path:?}"))?;
                }
                (Some(path), true) => {
                    std::fs::write(&path, serde_json::to_string_pretty(&captured)?)
                        .with_context(|| format!("Failed to write {path:?}"))?;
                    info!("Wrote {} captured calls to {:?}", captured.len(), path);
                }
                (None, false) => println!("{}", monitor.get_json()),
                (None, true) => println!("{}", serde_json::to_string_pretty(&captured)?),
            }

            if let Some(dir) = split_dir {
                write_split(&captured, &dir)?;
            }
        }
        Command::Split { input, output_dir } => {
            let count = split_export(&input, &output_dir)
                .with_context(|| format!("Failed to split {input:?}"))?;
            info!("Created {} files in {:?}", count, output_dir);
        }
    }

    Ok(())
}

fn build_options(
    method: Option<String>,
    headers: &[String],
    data: Option<String>,
) -> anyhow::Result<Option<RequestOptions>> {
    if method.is_none() && headers.is_empty() && data.is_none() {
        return Ok(None);
    }

    let mut options = RequestOptions {
        method,
        ..Default::default()
    };
    for header in headers {
        let (name, value) = header
            .split_once(':')
            .with_context(|| format!("Header {header:?} is not `name: value`"))?;
        options = options.with_header(name.trim(), value.trim());
    }
    if let Some(data) = data {
        options = options.with_body(data);
    }
    Ok(Some(options))
}
