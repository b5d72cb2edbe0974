use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::input::ButtonFilter;

#[derive(Parser)]
#[command(name = "pijast")]
#[command(about = "PIJAST - Toggle your touchscreen by double-pressing the pen button")]
#[command(after_help = "Examples:\n  \
    pijast\n  \
    pijast -p \"Surface Pen\" -t \"ELAN Touchscreen\"\n  \
    pijast -i 0.3 -c \"echo 'Custom toggle command'\"")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub subcommand: Option<Command>,

    /// Name of the pen device (default: auto-detect)
    #[arg(short, long)]
    pub pen_device: Option<String>,

    /// Name of the touchscreen device (default: auto-detect Surface/IPTS touchscreen)
    #[arg(short, long)]
    pub touch_device: Option<String>,

    /// Double-press time window in seconds (default: 0.5)
    #[arg(short, long, allow_negative_numbers = true)]
    pub interval: Option<f64>,

    /// Custom command to run instead of the xinput toggle
    #[arg(short, long)]
    pub command: Option<String>,

    /// Only count presses of this button (key code or stylus, stylus2, stylus3, touch, eraser)
    #[arg(short, long, value_parser = clap::value_parser!(ButtonFilter))]
    pub button: Option<ButtonFilter>,

    /// Timeout in seconds for xinput calls, 0 to wait forever (default: 10)
    #[arg(long, allow_negative_numbers = true)]
    pub command_timeout: Option<f64>,

    /// Path to config file
    #[arg(long, env = "PIJAST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List input devices and show which ones would be auto-detected
    Devices,
    /// Print key events from the pen device to find its button codes
    Dump,
}
