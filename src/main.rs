use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use ledceiling::config::Config;
use ledceiling::event::AppMsg;
use ledceiling::pipeline::Stage;
use ledceiling::pipeline::packer::read_packed_frame;
use ledceiling::pipeline_worker::PipelineWorker;

#[derive(Parser)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode media from the input directory and pack it for the panel
    Run {
        /// Config file (defaults to the per-user config when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Intermediate text frame directory
        #[arg(short, long)]
        text: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = StageArg::All)]
        stage: StageArg,

        /// Keep outputs from previous runs
        #[arg(long)]
        no_clean: bool,

        #[arg(long)]
        no_previews: bool,

        #[arg(long)]
        no_color_correction: bool,
    },
    /// Render a packed .bin frame back to a PNG
    Inspect { frame: PathBuf, png: PathBuf },
    /// Write a config file with default values
    InitConfig { path: Option<PathBuf> },
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum StageArg {
    All,
    Encode,
    Pack,
}

impl From<StageArg> for Stage {
    fn from(arg: StageArg) -> Self {
        match arg {
            StageArg::All => Stage::All,
            StageArg::Encode => Stage::Encode,
            StageArg::Pack => Stage::Pack,
        }
    }
}

fn run(config: Config, stage: Stage) -> Result<()> {
    let (tx, rx) = crossbeam_channel::unbounded();
    let handle = PipelineWorker::new(tx).start(config, stage);

    let mut outcome = Err(anyhow!("Pipeline stopped without reporting a result"));
    for msg in rx.iter() {
        match msg {
            AppMsg::PipelineStarted => println!("Starting pipeline..."),
            AppMsg::LogMessage(line) => println!("{}", line),
            AppMsg::ErrorOccurred(err) => eprintln!("ERROR: {}", err),
            AppMsg::PipelineProgress(done, total) => println!("[{}/{}]", done, total),
            AppMsg::AnimationPacked {
                index,
                name,
                frames,
            } => println!("A{}: {} ({} frames)", index, name, frames),
            AppMsg::PipelineCompleted(summary) => {
                println!(
                    "Pipeline completed: {} encoded, {} failed, {} animation(s), {} frame(s)",
                    summary.sources_encoded,
                    summary.sources_failed,
                    summary.frame_counts.len(),
                    summary.total_frames()
                );
                outcome = Ok(());
            }
            AppMsg::PipelineFailed(err) => {
                outcome = Err(anyhow!(err));
            }
        }
    }

    handle
        .join()
        .map_err(|_| anyhow!("Pipeline thread panicked"))?;
    outcome
}

fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            config,
            input,
            text,
            output,
            stage,
            no_clean,
            no_previews,
            no_color_correction,
        } => {
            let mut cfg = Config::load_or_default(config.as_deref())
                .context("Failed to load config")?;
            if let Some(input) = input {
                cfg.input_dir = input;
            }
            if let Some(text) = text {
                cfg.text_dir = text;
            }
            if let Some(output) = output {
                cfg.output_dir = output;
            }
            if no_clean {
                cfg.clean_outputs = false;
            }
            if no_previews {
                cfg.write_previews = false;
            }
            if no_color_correction {
                cfg.color_correction = false;
            }
            run(cfg, stage.into())
        }
        Command::Inspect { frame, png } => {
            let decoded = read_packed_frame(&frame)?;
            decoded
                .to_image()
                .save(&png)
                .with_context(|| format!("Failed to write {}", png.display()))?;
            println!("Wrote {}", png.display());
            Ok(())
        }
        Command::InitConfig { path } => {
            let path = path
                .or_else(Config::default_path)
                .ok_or_else(|| anyhow!("No config directory available; pass a path"))?;
            Config::default()
                .save_to_file(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = execute(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
