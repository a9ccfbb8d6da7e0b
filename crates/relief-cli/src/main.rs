mod config;
mod domain_cmds;
mod plan_cmds;
mod resolve;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};

use relief_core::pop::DEFAULT_MAX_NODES;

#[derive(Parser)]
#[command(name = "relief", about = "Partial-order planner for disaster response")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a relief config file
    Init {
        /// Node budget to record in the config file
        #[arg(long, default_value_t = DEFAULT_MAX_NODES)]
        max_nodes: usize,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Inspect domain files
    Domain {
        #[command(subcommand)]
        command: DomainCommands,
    },
    /// Run the planner and print the plan
    Plan {
        #[command(flatten)]
        args: PlanArgs,
        /// Print the plan record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the briefing a narrator would consume for the solved plan
    Brief {
        #[command(flatten)]
        args: PlanArgs,
        /// Safe route from a route-finding component
        #[arg(long, requires = "route_cost")]
        route: Option<String>,
        /// Cost of the safe route
        #[arg(long, requires = "route")]
        route_cost: Option<f64>,
        /// Recommended action from a policy component
        #[arg(long)]
        policy: Option<String>,
    },
    /// Emit the solved plan as Graphviz DOT
    Dot {
        #[command(flatten)]
        args: PlanArgs,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum DomainCommands {
    /// Parse and validate a domain file
    Check {
        /// Path to the domain TOML file
        file: String,
    },
    /// List actions with effects resolved under the current parameters
    Show {
        /// Domain file or built-in name (defaults to flood-preparedness)
        domain: Option<String>,
        /// Flood probability in [0, 1]
        #[arg(long)]
        flood_probability: Option<f64>,
        /// Infrastructure risk in [0, 1]
        #[arg(long)]
        infrastructure_risk: Option<f64>,
    },
}

/// Flags shared by every command that runs the planner.
#[derive(Args, Debug, Clone, Default)]
pub struct PlanArgs {
    /// Domain file or built-in name (defaults to flood-preparedness)
    #[arg(long)]
    pub domain: Option<String>,
    /// Goal to plan for; repeat for several (default: every goal)
    #[arg(long = "goal")]
    pub goals: Vec<String>,
    /// Maximum number of search nodes to expand
    #[arg(long)]
    pub max_nodes: Option<usize>,
    /// Flood probability in [0, 1]
    #[arg(long)]
    pub flood_probability: Option<f64>,
    /// Infrastructure risk in [0, 1]
    #[arg(long)]
    pub infrastructure_risk: Option<f64>,
    /// Record and print the search trace
    #[arg(long)]
    pub debug: bool,
}

impl PlanArgs {
    pub fn overrides(&self) -> config::Overrides {
        config::Overrides {
            max_nodes: self.max_nodes,
            flood_probability: self.flood_probability,
            infrastructure_risk: self.infrastructure_risk,
            debug: self.debug,
        }
    }
}

/// Execute the `relief init` command: write config file.
fn cmd_init(max_nodes: usize, force: bool) -> Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }
    if max_nodes == 0 {
        anyhow::bail!("--max-nodes must be greater than zero");
    }

    let cfg = config::ConfigFile {
        search: config::SearchSection {
            max_nodes: Some(max_nodes),
            debug_trace: Some(false),
        },
        ..config::ConfigFile::default()
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  search.max_nodes = {max_nodes}");
    println!("  search.debug_trace = false");
    println!();
    println!("Add a [parameters] section to pin flood_probability or infrastructure_risk.");

    Ok(())
}

fn main() -> Result<()> {
    // Logs go to stderr so `--json` and `dot` output stay machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let solved = match cli.command {
        Commands::Init { max_nodes, force } => {
            cmd_init(max_nodes, force)?;
            true
        }
        Commands::Domain { command } => {
            domain_cmds::run_domain_command(command)?;
            true
        }
        Commands::Plan { args, json } => plan_cmds::run_plan(&args, json)?,
        Commands::Brief {
            args,
            route,
            route_cost,
            policy,
        } => {
            let extras = plan_cmds::BriefExtras {
                route: route.zip(route_cost),
                policy,
            };
            plan_cmds::run_brief(&args, extras)?
        }
        Commands::Dot { args } => plan_cmds::run_dot(&args)?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "relief", &mut std::io::stdout());
            true
        }
    };

    if !solved {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod test_util {
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serialize tests that read or write process environment variables.
    pub fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
