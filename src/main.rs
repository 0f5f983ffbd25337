use config::Config;
use console_commands::ConsoleCommands;
use library::logger::impl_console::LoggerConsole;
use std::path::PathBuf;
use std::sync::Arc;

mod classifier;
mod config;
mod console_commands;
mod dataset;
mod device_camera;
mod device_display;
mod error;
mod feature_extractor;
#[cfg(test)]
mod fixture;
mod image_classifier;
mod library;
mod model_store;
mod preprocess;
mod realtime;

const USAGE: &str = "usage: falling-detector [--config <file>] train <datasetPath>
       falling-detector [--config <file>] test [--gui]";

enum Command {
    Train(PathBuf),
    Test { use_gui: bool },
}

fn parse_args(args: &[String]) -> Result<(Option<PathBuf>, Command), String> {
    let mut config_path = None;
    let mut rest = args;

    if let [flag, path, tail @ ..] = rest {
        if flag == "--config" {
            config_path = Some(PathBuf::from(path));
            rest = tail;
        }
    }

    let command = match rest {
        [command, dataset_path] if command == "train" => Command::Train(PathBuf::from(dataset_path)),
        [command] if command == "test" => Command::Test { use_gui: false },
        [command, flag] if command == "test" && flag == "--gui" => Command::Test { use_gui: true },
        _ => return Err(USAGE.to_string()),
    };

    Ok((config_path, command))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config_path, command) = parse_args(&args)?;

    let config = match config_path {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    let logger = Arc::new(LoggerConsole::new(config.logger_timezone()));

    let commands = ConsoleCommands::new(config, logger);

    match command {
        Command::Train(dataset_path) => {
            commands.train(&dataset_path)?;
        }
        Command::Test { use_gui } => {
            commands.test(use_gui)?;
        }
    }

    Ok(())
}
