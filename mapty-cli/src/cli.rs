// src/cli.rs
use clap::{ArgAction, Command, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Log running and cycling workouts on a map", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Use this database file instead of the one in the data directory
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Less output (-q warnings only, -qq errors only)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkoutTypeCli {
    Running,
    Cycling,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortCli {
    /// Order of creation
    #[default]
    Created,
    /// Shortest distance first
    Distance,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log a workout at a location
    Add {
        #[arg(value_enum)]
        type_: WorkoutTypeCli,
        /// Latitude of the workout location
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude of the workout location
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Distance in km
        #[arg(short, long)]
        distance: String,
        /// Duration in minutes
        #[arg(short = 't', long)]
        duration: String,
        /// Steps per minute (running)
        #[arg(short, long)]
        cadence: Option<String>,
        /// Elevation gain in meters, negative for a descent (cycling)
        #[arg(short, long, allow_hyphen_values = true)]
        elevation: Option<String>,
    },
    /// List logged workouts
    List {
        #[arg(short, long, value_enum, default_value_t = SortCli::Created)]
        sort: SortCli,
    },
    /// Show every field of one workout
    Show {
        /// Workout ID
        id: String,
    },
    /// Delete a workout
    Delete {
        /// Workout ID
        id: String,
    },
    /// Delete every stored workout
    Reset {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Print all workouts as JSON (or CSV)
    Export {
        #[arg(long)]
        csv: bool,
    },
    /// Show the config and database paths
    Paths,
    /// Generate shell completion scripts
    GenerateCompletion {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> Command {
    Cli::command()
}
