mod cmd;
mod context;
mod output;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use cultiva_core::Assignment;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cultiva",
    about = "Greenhouse dashboard: read and switch irrigation, heating, lighting, UV and shading",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ~/.cultiva/config.yaml)
    #[arg(long, global = true, env = "CULTIVA_CONFIG")]
    config: Option<PathBuf>,

    /// Override api.base_url from the config file
    #[arg(long, global = true, env = "CULTIVA_BASE_URL")]
    base_url: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log requests and scheduling decisions
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and cache the session token
    Login {
        #[arg(long)]
        email: String,
        /// Password (prefer the environment variable)
        #[arg(long, env = "CULTIVA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account on the greenhouse backend
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Password (prefer the environment variable)
        #[arg(long, env = "CULTIVA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the cached session token
    Logout,

    /// Fetch and show the current actuator modes
    Status,

    /// Switch actuators, e.g. `cultiva set heater=on lighting=auto`
    ///
    /// Current modes are fetched first; actuators not named keep them.
    Set {
        /// `<actuator>=<off|auto|on>` pairs, applied in order and sent as one update
        #[arg(required = true, num_args = 1.., value_name = "ACTUATOR=MODE")]
        assignments: Vec<Assignment>,
    },

    /// Inspect and validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = context::Context::load(cli.config.as_deref(), cli.base_url).and_then(|ctx| {
        match cli.command {
            Commands::Login { email, password } => {
                cmd::login::run(&ctx, &email, password.as_deref(), cli.json)
            }
            Commands::Register {
                name,
                email,
                password,
            } => cmd::login::register(&ctx, &name, &email, password.as_deref(), cli.json),
            Commands::Logout => cmd::login::logout(&ctx, cli.json),
            Commands::Status => cmd::status::run(&ctx, cli.json),
            Commands::Set { assignments } => cmd::set::run(&ctx, &assignments, cli.json),
            Commands::Config { subcommand } => cmd::config::run(&ctx, subcommand, cli.json),
        }
    });

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
