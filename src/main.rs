use anyhow::Result;
use bounded_pipeline::{
    cli::{execute_demo, execute_run, Cli, Commands, RunConfig},
    init_tracing,
};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            inputs,
            input_dir,
            outputs,
            stdout_consumers,
            capacity,
            transform,
            config,
            stats,
            quiet,
        } => {
            let config = RunConfig {
                inputs,
                input_dir,
                outputs,
                stdout_consumers,
                capacity,
                transform,
                config_file: config,
                stats_output: stats,
                quiet,
            };
            execute_run(config).await?;
        }
        Commands::Demo {
            directory,
            capacity,
        } => {
            execute_demo(&directory, capacity).await?;
        }
    }

    Ok(())
}
