use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "heatwalk",
    version,
    about = "Walking directions that trade speed for shade"
)]
pub struct Cli {
    /// Path to config.json (defaults to the OS config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// GraphHopper base URL (overrides config and HEATWALK_GH_BASE_URL)
    #[arg(long, global = true)]
    pub gh_url: Option<String>,

    /// Per-request routing timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// More log output (-v info, -vv debug); RUST_LOG wins when set
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute a single route for one profile
    Route {
        /// Origin as LNG,LAT
        #[arg(long, allow_hyphen_values = true)]
        from: String,

        /// Destination as LNG,LAT
        #[arg(long, allow_hyphen_values = true)]
        to: String,

        /// fastest | balanced | coolest
        #[arg(long, default_value = "balanced")]
        profile: String,

        /// Print the route as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Compare all three profiles side by side
    Preview {
        #[arg(long, allow_hyphen_values = true)]
        from: String,

        #[arg(long, allow_hyphen_values = true)]
        to: String,
    },

    /// Navigate a simulated walk from origin to destination
    Simulate(SimulateArgs),

    /// Show the effective configuration
    Config,
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub from: String,

    #[arg(long, allow_hyphen_values = true)]
    pub to: String,

    #[arg(long, default_value = "balanced")]
    pub profile: String,

    /// Walking pace in meters per second
    #[arg(long, default_value_t = 1.4)]
    pub pace_mps: f64,

    /// Seconds between position fixes
    #[arg(long, default_value_t = 1.0)]
    pub interval_s: f64,

    /// Walk this many meters left of the route (negative = right)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub offset_m: f64,

    /// Pace the fixes in wall-clock time
    #[arg(long, default_value_t = false)]
    pub real_time: bool,
}
