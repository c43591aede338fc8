use clap::Parser;
use mdp_inventory::cli::{self, Cli};
use mdp_inventory::logging;
use std::io::Write;

fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cli::run(&cli, &mut out)?;
    out.flush()?;
    Ok(())
}
