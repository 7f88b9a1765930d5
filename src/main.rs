use anyhow::Result;
use clap::Parser;

use demerge::args::Args;
use demerge::runner::Runner;

fn main() -> Result<()> {
    let args = Args::parse();
    let runner = Runner::new(args)?;
    runner.start()?;
    Ok(())
}
