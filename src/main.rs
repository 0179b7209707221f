use clap::{Parser, Subcommand};

mod aggregate;
mod classify;
mod cmd;
mod fifo;
mod pipeline;
mod rates;
mod tax;
mod transaction;
mod warnings;

#[derive(Parser, Debug)]
#[command(name = "capgains", version, about = "Indian capital gains and advance tax calculator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full tax summary: totals, loss set-off, liability
    Report(cmd::report::ReportCommand),
    /// Per-disposal gains with filtering
    Gains(cmd::gains::GainsCommand),
    /// Show how dates resolve against the rate table
    Rates(cmd::rates::RatesCommand),
    /// Check input for problems without generating a report
    Validate(cmd::validate::ValidateCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Command::Report(cmd) => cmd.exec(),
        Command::Gains(cmd) => cmd.exec(),
        Command::Rates(cmd) => cmd.exec(),
        Command::Validate(cmd) => cmd.exec(),
    }
}
