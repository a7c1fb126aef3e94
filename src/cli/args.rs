use crate::core::LineTransform;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bounded_pipeline")]
#[command(about = "Move lines from input files to output sinks through a bounded queue")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run producers over input files and consumers over output files
    Run {
        /// Input file (one producer per file, repeatable)
        #[arg(short, long = "input")]
        inputs: Vec<PathBuf>,

        /// Directory whose regular files are all used as inputs
        #[arg(long)]
        input_dir: Option<PathBuf>,

        /// Output file (one consumer per file, repeatable)
        #[arg(short, long = "output")]
        outputs: Vec<PathBuf>,

        /// Number of consumers writing to stdout (defaults to CPU count when no output is given)
        #[arg(long)]
        stdout_consumers: Option<usize>,

        /// Queue capacity
        #[arg(short, long)]
        capacity: Option<usize>,

        /// Transform applied by consumers
        #[arg(short, long, value_enum)]
        transform: Option<LineTransform>,

        /// JSON settings file (command line flags take precedence)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write run statistics as JSON to this file
        #[arg(long)]
        stats: Option<PathBuf>,

        /// Only print errors and the final summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Write two sample input files and run two producers and two consumers over them
    Demo {
        /// Directory for the sample input and output files
        #[arg(default_value = "demo_output")]
        directory: PathBuf,

        /// Queue capacity
        #[arg(short, long, default_value = "5")]
        capacity: usize,
    },
}
