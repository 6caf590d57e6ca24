use anyhow::Result;

mod cli;
mod commands;
mod configuration;
mod logging;

fn main() -> Result<()> {
    cli::cli()
}
