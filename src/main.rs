use clap::Parser;
use dmca_sender::{run, Cli};
use env_logger::Builder;
use log::LevelFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.into())?;
    let exit_code = run(cli)?;
    std::process::exit(exit_code);
}

fn init_logging(level: LevelFilter) -> anyhow::Result<()> {
    Builder::new().filter(None, level).try_init()?;
    Ok(())
}
