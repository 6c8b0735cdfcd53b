use std::{io::Write, process::ExitCode, str::FromStr};

use glaciersim::{
    GlacierClient, GlacierSdkClient, JobParameters, LoggingConfig, MockGlacierClient,
    VaultError, VaultSimulator,
};
use tracing::{error, info, span, Level};

fn command() -> clap::Command {
    clap::Command::new("glaciersim")
        .about("Replays vault job lifecycles and prints the recorded call log")
        .arg(clap::Arg::new("VAULT_NAME").required(true).index(1))
        .arg(
            clap::Arg::new("archive")
                .long("archive")
                .help("archive body to upload, repeatable")
                .action(clap::ArgAction::Append),
        )
        .arg(
            clap::Arg::new("description")
                .long("description")
                .default_value("test"),
        )
        .arg(
            clap::Arg::new("range")
                .long("range")
                .help("also fetch this byte range of every archive, e.g. bytes=0-4"),
        )
        .arg(
            clap::Arg::new("endpoint-url")
                .long("endpoint-url")
                .conflicts_with("in-memory"),
        )
        .arg(
            clap::Arg::new("in-memory")
                .long("in-memory")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(clap::Arg::new("output").long("output").short('o'))
        .arg(
            clap::Arg::new("log-level")
                .long("log-level")
                .default_value("info")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            clap::Arg::new("json-logs")
                .long("json-logs")
                .action(clap::ArgAction::SetTrue),
        )
}

fn main() -> ExitCode {
    let matches = command().get_matches();

    let level = matches
        .get_one::<String>("log-level")
        .and_then(|level| Level::from_str(level).ok())
        .unwrap_or(Level::INFO);
    LoggingConfig::new(level, matches.get_flag("json-logs")).init();

    let span = span!(Level::INFO, "main", context = "main");
    let _e = span.enter();
    info!("called");

    match run(&matches) {
        Err(err) => {
            error!(error_message=%err, error_group="run");
            ExitCode::FAILURE
        }
        Ok(()) => ExitCode::SUCCESS,
    }
}

fn run(matches: &clap::ArgMatches) -> Result<(), VaultError> {
    let vault_name = matches
        .get_one::<String>("VAULT_NAME")
        .map(String::as_str)
        .unwrap_or_default();
    let description = matches
        .get_one::<String>("description")
        .map(String::as_str)
        .unwrap_or_default();
    let range = matches.get_one::<String>("range");
    let archives: Vec<&String> = matches
        .get_many::<String>("archive")
        .map(|values| values.collect())
        .unwrap_or_default();
    info!(vault_name = vault_name, archives = archives.len(), "args");

    let client: Box<dyn GlacierClient> = if matches.get_flag("in-memory") {
        Box::new(MockGlacierClient::default())
    } else {
        let endpoint_url = matches.get_one::<String>("endpoint-url");
        Box::new(GlacierSdkClient::from_env(endpoint_url.map(String::as_str))?)
    };

    let mut sim = VaultSimulator::new(vault_name, client)?;

    let mut archive_ids = Vec::new();
    for body in archives {
        archive_ids.push(sim.upload_archive(body, description)?);
    }

    let inventory_job_id = sim.initiate_job(&JobParameters::inventory())?;
    sim.get_job_output(&inventory_job_id, "")?;

    for archive_id in &archive_ids {
        let job_id = sim.initiate_job(&JobParameters::archive_retrieval(archive_id))?;
        sim.get_job_output(&job_id, "")?;
        if let Some(range) = range {
            sim.get_job_output(&job_id, range)?;
        }
    }

    let snapshot = serde_json::to_string_pretty(&sim.mock_data()).map_err(std::io::Error::from)?;

    match matches.get_one::<String>("output") {
        Some(path) => std::fs::write(path, snapshot + "\n")?,
        None => writeln!(std::io::stdout(), "{}", snapshot)?,
    }

    Ok(())
}
