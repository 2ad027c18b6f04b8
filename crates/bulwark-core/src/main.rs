use anyhow::Context;
use bulwark_core::{load, Orchestrator, Session};
use clap::{value_parser, Arg, Command};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Command::new("bulwark")
        .version("0.1.0")
        .about("Workspace backup and disaster-recovery orchestration")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Run one full protection session")
                .arg(
                    Arg::new("workspace")
                        .long("workspace")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Root of the workspace to protect"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Optional TOML config overlay"),
                )
                .arg(
                    Arg::new("threshold")
                        .long("threshold")
                        .value_parser(value_parser!(f64))
                        .help("Compliance threshold override (0-100)"),
                ),
        )
        .subcommand(
            Command::new("schedule")
                .about("Run recurring protection until interrupted")
                .arg(
                    Arg::new("workspace")
                        .long("workspace")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Root of the workspace to protect"),
                )
                .arg(
                    Arg::new("interval")
                        .long("interval")
                        .default_value("24")
                        .value_parser(value_parser!(f64))
                        .help("Hours between backup cycles"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Optional TOML config overlay"),
                ),
        );

    let matches = cli.get_matches();

    match matches.subcommand() {
        Some(("run", args)) => {
            let workspace = args.get_one::<PathBuf>("workspace").unwrap();
            let mut config = load_config(workspace, args.get_one::<PathBuf>("config"))?;
            if let Some(threshold) = args.get_one::<f64>("threshold") {
                config = config.with_threshold(*threshold);
            }

            let orchestrator = Orchestrator::new(config);
            let session = orchestrator.run().await?;
            print_summary(&session);

            std::process::exit(if session.compliant { 0 } else { 1 });
        }
        Some(("schedule", args)) => {
            let workspace = args.get_one::<PathBuf>("workspace").unwrap();
            let interval = *args.get_one::<f64>("interval").unwrap();
            let config = load_config(workspace, args.get_one::<PathBuf>("config"))?
                .with_schedule_interval(interval);
            config.validate()?;

            let handle = bulwark_core::schedule(&config, interval);
            println!(
                "Recurring protection every {} h for {}. Ctrl-C to stop.",
                interval,
                workspace.display()
            );

            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for Ctrl-C")?;
            let cycles = handle.join().await;
            println!("Stopped after {} completed cycles.", cycles);
        }
        _ => {}
    }

    Ok(())
}

fn load_config(
    workspace: &Path,
    file: Option<&PathBuf>,
) -> anyhow::Result<bulwark_core::BulwarkConfig> {
    let text = match file {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?,
        ),
        None => None,
    };
    Ok(load(workspace, text.as_deref())?)
}

fn print_summary(session: &Session) {
    println!("Session {}", session.session_id);
    println!(
        "  Assets: {} found, {} protected",
        session.counts.assets_found, session.counts.assets_protected
    );
    println!(
        "  Backups: {} created, {} failed",
        session.counts.backups_created, session.counts.backups_failed
    );
    println!(
        "  Plans: {} generated, {} failed",
        session.counts.plans_generated, session.counts.plans_failed
    );
    println!(
        "  Tests: {} passed, {} failed",
        session.counts.tests_passed, session.counts.tests_failed
    );
    println!(
        "  Readiness: {:.1} -> {:.1} ({})",
        session.pre_run_score,
        session.composite_score,
        if session.compliant {
            "COMPLIANT"
        } else {
            "BELOW THRESHOLD"
        }
    );
}
