use anyhow::Result;
use drawio_batch::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
