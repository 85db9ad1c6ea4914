mod desktop;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use desktop::{DesktopHost, DesktopRuntime, DialogChooser, WriterBridge};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use video_picker::checkpoint::MemoryCheckpointStore;
use video_picker::config::{self, PickerConfig};
use video_picker::env::load_env;
use video_picker::launcher::{launch_video_picker, register_host_runtime};
use video_picker::{PickerOutcome, ResultPayload};

#[derive(Parser, Debug)]
#[command(version, about = "Pick videos with the native dialog and print the result payload")]
struct Cli {
    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the picker and deliver one result payload
    Pick {
        /// Receiver object the payload is addressed to
        #[arg(long, default_value = "")]
        receiver: String,
        /// Callback method the payload is addressed to
        #[arg(long, default_value = "")]
        method: String,
        /// Write the delivered message here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the effective configuration
    Config {
        /// Also persist it to the config file
        #[arg(long)]
        write: bool,
    },
    /// Decode a result payload
    Decode {
        payload: String,
    },
}

fn init_logging(verbose: bool) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    let _ = builder.try_init();
}

fn load_config(path: Option<&PathBuf>) -> Result<PickerConfig> {
    let mut cfg = match path {
        Some(p) => config::load_from(p).with_context(|| format!("reading {}", p.display()))?,
        None => config::load_or_default().context("reading config")?,
    };
    cfg.apply_env(&load_env());
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let cfg = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Pick { receiver, method, out } => {
            pick(cfg, &receiver, &method, out).await?;
        }
        Commands::Config { write } => {
            if write {
                match cli.config.as_ref() {
                    Some(p) => config::save_to(&cfg, p)?,
                    None => config::save(&cfg)?,
                }
            }
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
        Commands::Decode { payload } => {
            decode(&payload)?;
        }
    }
    Ok(())
}

async fn pick(
    cfg: PickerConfig,
    receiver: &str,
    method: &str,
    out: Option<PathBuf>,
) -> Result<()> {
    let writer: Box<dyn Write + Send> = match &out {
        Some(path) => Box::new(
            fs::File::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };
    let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let host = Arc::new(DesktopHost::new(
        Arc::new(DialogChooser::new(cfg.video_extensions.clone(), done_tx)),
        Arc::new(WriterBridge::new(writer)),
        Arc::new(MemoryCheckpointStore::new()),
        cfg.flow_settings(),
        ui_tx,
    ));
    register_host_runtime(Arc::new(DesktopRuntime(host.clone())));

    launch_video_picker(receiver, method);

    // The main task plays the UI thread.
    while !host.is_done() {
        tokio::select! {
            Some(task) = ui_rx.recv() => task(),
            Some(completion) = done_rx.recv() => host.on_chooser_result(completion),
            else => break,
        }
    }
    Ok(())
}

fn decode(payload: &str) -> Result<()> {
    let Some(parsed) = ResultPayload::parse(payload).context("decoding payload")? else {
        println!("(empty payload)");
        return Ok(());
    };
    match parsed.outcome() {
        PickerOutcome::Success { videos } => {
            for v in videos {
                println!("{}\t{}\t{}", v.size, v.name, v.uri);
            }
        }
        PickerOutcome::Cancelled => println!("cancelled"),
        PickerOutcome::Failure { message } => println!("error: {message}"),
    }
    Ok(())
}
