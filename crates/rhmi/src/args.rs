use clap_derive::{Parser, Subcommand};

/// Exports the operational state of an RHMI/RHOAM installation as OpenMetrics gauges
#[derive(Parser, Debug)]
#[command(version, about)]
#[command(propagate_version = true)]
pub(crate) struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Run the server components
    Server(crate::server::args::Args),
    /// Print the admission webhook rules registered by the operator
    Rules,
}
