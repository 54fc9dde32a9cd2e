use clap::ArgAction;
use clap_derive::Args;

/// Run the server components
#[derive(Args, Debug)]
pub(crate) struct Args {
    #[command(flatten, next_help_heading = "Component selection options")]
    pub components: Components,

    #[command(flatten, next_help_heading = "OpenMetrics configuration options")]
    pub metrics: OpenMetricsConfig,

    #[command(flatten, next_help_heading = "Reconciler configuration options")]
    pub reconciler: ReconcilerConfig,
}

/// Components
#[derive(Args, Debug)]
#[group()]
pub(crate) struct Components {
    /// Enable the OpenMetrics HTTP endpoint
    #[arg(env, long, action = ArgAction::Set, default_value_t = true)]
    pub enable_server: bool,

    /// Enable the installation state reconciler
    #[arg(env, long, action = ArgAction::Set, default_value_t = true)]
    pub enable_reconciler: bool,
}

#[derive(Args, Debug)]
#[group(skip)]
pub(crate) struct OpenMetricsConfig {
    /// The address the OpenMetrics endpoint listens on
    #[arg(env, long, default_value = "0.0.0.0:8383")]
    pub openmetrics_listen: String,
}

#[derive(Args, Debug, Clone)]
#[group(skip)]
pub(crate) struct ReconcilerConfig {
    /// The path to the installation state file written by the controller
    #[arg(env, long, default_value = "rhmi-state.toml", value_name = "STATE_FILE")]
    pub state_file: String,

    /// The number of seconds between two reads of the state file
    #[arg(env, long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub reconcile_interval: u64,
}
