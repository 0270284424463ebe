use anyhow::Result;
use unitscan::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
