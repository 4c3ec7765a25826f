mod cli;
mod detect;
mod paths;
mod plan;
mod presenter;
mod run;
mod settings;

use anyhow::Result;
use cli::{Command, ConfigAction};
use paths::AppPaths;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Plan(args)) => plan::run(&args.run),
        Some(Command::Config(config_cmd)) => handle_config_command(config_cmd.action),
        None => run::run(cli.run),
    }
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    let paths = AppPaths::discover()?;
    match action {
        ConfigAction::Where => {
            let file = paths.config_file();
            println!("Configuration:");
            println!("  dir:   {}", paths.config_dir().display());
            println!(
                "  file:  {} ({})",
                file.display(),
                if file.exists() { "present" } else { "missing" }
            );
            Ok(())
        }
        ConfigAction::Show(args) => {
            let config = settings::load_config(&paths, args.config.as_deref())?;
            print!("{}", config.to_toml_string());
            Ok(())
        }
    }
}
