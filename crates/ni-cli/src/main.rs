use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ni_core::{Config, InterfaceList, InterfaceRecord, OutputFormat};
use ni_netns::{NamespaceContext, NamespaceList, list_namespaces, run_in_namespace};
use ni_nl::NetInformer;
use serde::Serialize;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "netinfo")]
#[command(version, about = "Linux network interface informer", long_about = None)]
struct Cli {
    /// Config file (defaults to /etc/netinformer/config.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format: text or json
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List named network namespaces
    Namespaces,
    /// List interface names
    List {
        /// Named namespace to look into
        #[arg(short = 'n', long)]
        netns: Option<String>,
    },
    /// Show interface details
    Show {
        /// Only this interface
        #[arg(short, long)]
        interface: Option<String>,
        /// Every named namespace
        #[arg(short, long)]
        all: bool,
        /// Named namespaces to show (repeatable)
        #[arg(short = 'n', long)]
        netns: Vec<String>,
        /// Also show the current namespace alongside -n/--all
        #[arg(long, conflicts_with = "no_current")]
        current: bool,
        /// Skip the current namespace
        #[arg(long)]
        no_current: bool,
    },
    /// Bring an interface up or down
    Set {
        interface: String,
        #[arg(value_enum)]
        state: LinkState,
        #[arg(short = 'n', long)]
        netns: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LinkState {
    Up,
    Down,
}

/// One namespace's share of `show` output.
#[derive(Serialize)]
struct NamespaceReport {
    /// `None` for the namespace netinfo was started in.
    namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interfaces: Option<Vec<InterfaceRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(format) = cli.format {
        config.format = format;
    }

    match cli.command {
        Commands::Namespaces => show_namespaces(&config)?,
        Commands::List { netns } => list_interfaces(&config, netns)?,
        Commands::Show {
            interface,
            all,
            netns,
            current,
            no_current,
        } => {
            let current = show_current(&config, all || !netns.is_empty(), current, no_current);
            show_interfaces(&config, interface.as_deref(), all, netns, current)?
        }
        Commands::Set {
            interface,
            state,
            netns,
        } => set_state(&config, interface, state, netns)?,
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn show_namespaces(config: &Config) -> Result<()> {
    let namespaces = list_namespaces(&config.netns_dir)?;

    match config.format {
        OutputFormat::Json => print_json(&NamespaceList { namespaces })?,
        OutputFormat::Text => {
            if namespaces.is_empty() {
                println!("(no named network namespaces)");
            }
            for ns in namespaces {
                println!("{}", ns);
            }
        }
    }
    Ok(())
}

fn list_interfaces(config: &Config, netns: Option<String>) -> Result<()> {
    let interfaces = match netns {
        Some(ns) => run_in_namespace(&config.netns_dir, &ns, || {
            NetInformer::new().map(|informer| informer.list_interface_names())
        })?
        .context(format!("Failed to read interfaces in namespace {}", ns))?,
        None => NetInformer::new()?.list_interface_names(),
    };

    match config.format {
        OutputFormat::Json => print_json(&InterfaceList { interfaces })?,
        OutputFormat::Text => {
            for name in interfaces {
                println!("{}", name);
            }
        }
    }
    Ok(())
}

/// Whether `show` reports the current namespace. Naming namespaces on the
/// command line narrows the output to them unless `--current` is given.
fn show_current(config: &Config, explicit: bool, current: bool, no_current: bool) -> bool {
    if no_current {
        false
    } else if current {
        true
    } else if explicit {
        false
    } else {
        config.include_current
    }
}

fn show_interfaces(
    config: &Config,
    interface: Option<&str>,
    all: bool,
    netns: Vec<String>,
    include_current: bool,
) -> Result<()> {
    let namespaces = if all {
        list_namespaces(&config.netns_dir)?
    } else if !netns.is_empty() {
        netns
    } else {
        config.namespaces.clone()
    };

    let mut reports = vec![];
    if include_current {
        reports.push(report(None, collect(config, None, interface)));
    }
    for ns in namespaces {
        let result = collect(config, Some(&ns), interface);
        reports.push(report(Some(ns), result));
    }

    match config.format {
        OutputFormat::Json => print_json(&reports)?,
        OutputFormat::Text => {
            for report in &reports {
                match &report.namespace {
                    Some(ns) => println!("\n=== Interfaces in namespace: {} ===", ns),
                    None => println!("\n=== Interfaces in current namespace ==="),
                }
                for record in report.interfaces.iter().flatten() {
                    println!();
                    record.display();
                }
            }
        }
    }
    Ok(())
}

/// Failures are logged and kept in the report so the remaining namespaces still run.
fn report(namespace: Option<String>, result: Result<Vec<InterfaceRecord>>) -> NamespaceReport {
    match result {
        Ok(interfaces) => NamespaceReport {
            namespace,
            interfaces: Some(interfaces),
            error: None,
        },
        Err(e) => {
            let scope = namespace.as_deref().unwrap_or("current");
            error!(namespace = scope, "{:#}", e);
            eprintln!("Error in namespace {}: {:#}", scope, e);
            NamespaceReport {
                namespace,
                interfaces: None,
                error: Some(format!("{:#}", e)),
            }
        }
    }
}

/// Read records in `namespace` (or the current one), switching this thread
/// there and back.
fn collect(
    config: &Config,
    namespace: Option<&str>,
    interface: Option<&str>,
) -> Result<Vec<InterfaceRecord>> {
    let Some(ns) = namespace else {
        return read_records(interface);
    };

    let mut ctx = NamespaceContext::with_paths(&config.current_netns_path, &config.netns_dir)?;
    ctx.switch_to_namespace(ns)?;
    let records = read_records(interface);
    ctx.restore()?;
    records
}

fn read_records(interface: Option<&str>) -> Result<Vec<InterfaceRecord>> {
    let informer = NetInformer::new()?;
    match interface {
        Some(name) => Ok(vec![informer.get_interface(name)?]),
        None => Ok(informer.get_all_interfaces()),
    }
}

fn set_state(
    config: &Config,
    interface: String,
    state: LinkState,
    netns: Option<String>,
) -> Result<()> {
    let up = matches!(state, LinkState::Up);

    match netns {
        Some(ns) => {
            let name = interface.clone();
            run_in_namespace(&config.netns_dir, &ns, move || {
                NetInformer::new()?.set_interface_state(&name, up)
            })?
            .context(format!("Failed to change {} in namespace {}", interface, ns))?;
        }
        None => NetInformer::new()?.set_interface_state(&interface, up)?,
    }

    println!(
        "Interface {} is now {}",
        interface,
        if up { "UP" } else { "DOWN" }
    );
    Ok(())
}
