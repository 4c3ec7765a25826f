use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tierconfig::{GpuVariant, ThemePreference};

#[derive(Parser, Debug)]
#[command(
    name = "skyfield",
    author,
    version,
    about = "Adaptive particle backdrop renderer",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Clone, Default)]
pub struct RunArgs {
    /// Configuration file; defaults to `skyfield.toml` in the config dir.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Window size in logical pixels (e.g. `1280x800`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Seed for the GPU variant choice; random when absent.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Theme: `system`, `dark` or `light`.
    #[arg(long, value_name = "THEME", value_parser = parse_theme)]
    pub theme: Option<ThemePreference>,

    /// Restrict the GPU variant pool; repeat to allow several.
    #[arg(long = "variant", value_name = "NAME", value_parser = parse_variant)]
    pub variants: Vec<GpuVariant>,

    /// Behave as if the user asked for reduced motion.
    #[arg(long)]
    pub reduced_motion: bool,

    /// Pretend the battery sits at this level (0.0-1.0).
    #[arg(long, value_name = "LEVEL", value_parser = parse_battery)]
    pub battery: Option<f32>,

    /// Pretend the host has this many logical cores.
    #[arg(long, value_name = "COUNT")]
    pub cores: Option<usize>,

    /// Classify the host as mobile regardless of viewport width.
    #[arg(long)]
    pub mobile: bool,

    /// Skip the GPU adapter probe (treats the GPU as unknown).
    #[arg(long)]
    pub no_gpu_probe: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the renderer decision as JSON without opening a window.
    Plan(PlanCommand),
    /// Inspect configuration paths and effective values.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct PlanCommand {
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved configuration directory and file.
    Where,
    /// Print the effective configuration as TOML.
    Show(ShowArgs),
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    let Some((w, h)) = trimmed.split_once(['x', 'X']) else {
        return Err(format!("invalid size '{trimmed}'; expected WIDTHxHEIGHT"));
    };
    let width: u32 = w
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{}'", w.trim()))?;
    let height: u32 = h
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{}'", h.trim()))?;
    if width == 0 || height == 0 {
        return Err("size dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

pub fn parse_theme(value: &str) -> Result<ThemePreference, String> {
    value.parse()
}

pub fn parse_variant(value: &str) -> Result<GpuVariant, String> {
    value.parse()
}

pub fn parse_battery(value: &str) -> Result<f32, String> {
    let trimmed = value.trim();
    let level = match trimmed.strip_suffix('%') {
        Some(percent) => percent
            .trim()
            .parse::<f32>()
            .map(|value| value / 100.0)
            .map_err(|_| format!("invalid battery percentage '{trimmed}'"))?,
        None => trimmed
            .parse::<f32>()
            .map_err(|_| format!("invalid battery level '{trimmed}'"))?,
    };
    if !(0.0..=1.0).contains(&level) {
        return Err(format!("battery level {level} outside 0.0-1.0"));
    }
    Ok(level)
}
