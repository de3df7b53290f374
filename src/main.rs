use anyhow::Context;
use clap::{Parser, Subcommand};
use flower_classifier::config::Config;
use flower_classifier::inference::init::{initialize_or_degrade, load_tract_onnx};
use flower_classifier::inference::source::ImageSource;
use flower_classifier::library::logger::impl_console::LoggerConsole;
use flower_classifier::library::logger::interface::Logger;
use flower_classifier::menu::{format_prediction, main_menu};
use flower_classifier::server::{serve, AppState};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "flower-classifier", version)]
#[command(about = "Flower species classifier: web server, terminal menu and one-shot CLI")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Serve the web front-end and the prediction endpoints (default)
    Serve,
    /// Interactive terminal menu
    Menu,
    /// Classify image files and print one line per image
    Classify {
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;

    let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerConsole::new(config.logger_timezone));

    let adapter = Arc::new(initialize_or_degrade(&config, &logger, load_tract_onnx));

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            let state = AppState::new(adapter, Arc::new(config), logger);
            runtime.block_on(serve(state)).context("server stopped")?;
        }
        Command::Menu => main_menu(&adapter)?,
        Command::Classify { images } => {
            for path in &images {
                let prediction = adapter.classify(&ImageSource::Path(path));
                println!("{}", format_prediction(&path.display().to_string(), &prediction));
            }
        }
    }

    Ok(())
}
