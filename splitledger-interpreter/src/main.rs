mod bootstrap;

use std::{borrow::Cow, fs, path::PathBuf, process};

use clap::Parser;
use splitledger_application::{
    EngineConfig, Ledger, LedgerReader, NOISE_THRESHOLD_ENV, SettlementEngine,
    parse_noise_threshold,
};
use splitledger_domain::{MemberId, Money, ScopeId};
use splitledger_infrastructure::TextLedgerReader;
use splitledger_presentation::SettlementPresenter;

type CliResult<T> = Result<T, Cow<'static, str>>;

#[derive(Parser, Debug)]
#[command(name = "splitledger")]
#[command(about = "Settle shared expenses recorded in a plain-text ledger")]
struct Cli {
    /// Ledger file to read.
    file: PathBuf,

    /// Pairwise debts across every scope instead of one plan per scope.
    #[arg(long)]
    across_scopes: bool,

    /// Settle only this scope.
    #[arg(long, conflicts_with = "across_scopes")]
    scope: Option<String>,

    /// What this member still pays or receives across all scopes.
    #[arg(long, conflicts_with_all = ["across_scopes", "scope"])]
    member: Option<String>,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,

    /// Amounts smaller than this many minor units count as settled.
    #[arg(long, env = NOISE_THRESHOLD_ENV, value_parser = parse_threshold_arg)]
    noise_threshold: Option<Money>,
}

fn parse_threshold_arg(raw: &str) -> Result<Money, String> {
    parse_noise_threshold("--noise-threshold", raw).map_err(|err| err.to_string())
}

fn main() {
    bootstrap::init_logging();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let config = bootstrap::load_config()?;
    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.file)
        .map_err(|err| format!("Failed to read '{}': {err}", cli.file.display()))?;
    let ledger = TextLedgerReader
        .read(&source)
        .map_err(|err| err.to_string())?;
    tracing::debug!(
        path = %cli.file.display(),
        scope_count = ledger.scopes.len(),
        participant_count = ledger.participants.len(),
        "Read ledger file"
    );

    let output = render(&cli, &ledger, config)?;
    print!("{output}");
    Ok(())
}

fn render(cli: &Cli, ledger: &Ledger, config: EngineConfig) -> CliResult<String> {
    let config = match cli.noise_threshold {
        Some(threshold) => config.with_noise_threshold(threshold),
        None => config,
    };
    let engine = SettlementEngine::new(config);
    let directory = &ledger.participants;

    if let Some(name) = &cli.member {
        let member = MemberId::new(name);
        if !ledger.participants.contains_key(&member) {
            return Err(format!("Unknown member '{name}'").into());
        }
        let transfers = engine.outstanding_for_member(&ledger.scopes, &member);
        return if cli.json {
            to_json(&transfers)
        } else {
            Ok(
                SettlementPresenter::render_outstanding(&member, &transfers, directory)
                    .to_string(),
            )
        };
    }

    if cli.across_scopes {
        let result = engine.settle_across_scopes(&ledger.scopes);
        return if cli.json {
            to_json(&result)
        } else {
            Ok(SettlementPresenter::render_across_scopes(&result, directory).to_string())
        };
    }

    let scopes = match &cli.scope {
        Some(name) => {
            let scope = ledger
                .scope(&ScopeId::new(name))
                .ok_or_else(|| format!("Unknown scope '{name}'"))?;
            std::slice::from_ref(scope)
        }
        None => ledger.scopes.as_slice(),
    };
    let results: Vec<_> = scopes
        .iter()
        .map(|scope| engine.settle_scope(scope))
        .collect();

    if cli.json {
        return to_json(&results);
    }
    let views: Vec<String> = results
        .iter()
        .map(|result| SettlementPresenter::render_scope(result, directory).to_string())
        .collect();
    Ok(views.join("\n"))
}

fn to_json<T: serde::Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map(|json| json + "\n")
        .map_err(|err| format!("Failed to encode JSON: {err}").into())
}
