//! ledger-runner: headless driver for one account's progression engine.
//!
//! Usage:
//!   ledger-runner --account acct-1 --db progress.db
//!   ledger-runner --account acct-1 --config data/engine_config.json --today 2024-01-02
//!
//! Reads one JSON command per stdin line, writes one JSON response per line.

use anyhow::Result;
use opina_core::{
    clock::{Clock, FixedClock, SystemClock},
    config::EngineConfig,
    engine::ProgressionEngine,
    entitlements::{AccountState, ProfileCompleteness, Role, VerificationStatus},
    event::EventDetail,
    gate::Capability,
    ledger::RecordOptions,
    store::ProgressStore,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Record {
        #[serde(default = "one")]
        delta:   i64,
        #[serde(default)]
        vote_id: Option<String>,
        #[serde(default)]
        event:   Option<EventDetail>,
    },
    Celebrate,
    CompleteOnboarding,
    Entitlements {
        #[serde(flatten)]
        account: AccountInput,
    },
    Check {
        capability: Capability,
        #[serde(flatten)]
        account:    AccountInput,
    },
    Quit,
}

/// Account fields as the auth layer hands them over. Raw strings are
/// normalized, so unknown values degrade to the most restrictive tier.
#[derive(serde::Deserialize)]
struct AccountInput {
    #[serde(default)]
    role:                Option<String>,
    #[serde(default)]
    verification_status: Option<String>,
    #[serde(default)]
    profile:             ProfileCompleteness,
}

impl AccountInput {
    fn into_state(self) -> AccountState {
        AccountState {
            role: Role::parse(self.role.as_deref().unwrap_or_default()),
            verification_status: VerificationStatus::parse(
                self.verification_status.as_deref().unwrap_or_default(),
            ),
            profile: self.profile,
        }
    }
}

fn one() -> i64 {
    1
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let account = arg_value(&args, "--account").unwrap_or("local");
    let db = arg_value(&args, "--db").unwrap_or(":memory:");
    let config = match arg_value(&args, "--config") {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    // A pinned date makes scripted sessions reproducible.
    let clock: Box<dyn Clock> = match arg_value(&args, "--today") {
        Some(date) => Box::new(
            FixedClock::parse(date)
                .ok_or_else(|| anyhow::anyhow!("--today expects YYYY-MM-DD, got {date}"))?,
        ),
        None => Box::new(SystemClock),
    };

    let store = ProgressStore::open(db)?;
    store.migrate()?;
    log::info!("account={account} db={db} today={}", clock.today());

    let mut engine = ProgressionEngine::open(account.to_string(), config, Box::new(store))?;
    engine.subscribe(|l| {
        log::debug!(
            "ledger changed: total={} today={} streak={} level={}",
            l.total_signals,
            l.signals_today,
            l.streak_days,
            l.level
        )
    });

    run_ipc_loop(&mut engine, clock.as_ref())
}

fn run_ipc_loop(engine: &mut ProgressionEngine, clock: &dyn Clock) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let response = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => serde_json::to_value(engine.ledger())?,
            IpcCommand::Record { delta, vote_id, event } => {
                let options = RecordOptions { vote_id, event_detail: event };
                serde_json::to_value(engine.record_signal(delta, options, clock)?)?
            }
            IpcCommand::Celebrate => {
                let changed = engine.mark_mission_celebrated()?;
                serde_json::json!({ "changed": changed, "ledger": engine.ledger() })
            }
            IpcCommand::CompleteOnboarding => {
                let changed = engine.complete_onboarding()?;
                serde_json::json!({ "changed": changed, "ledger": engine.ledger() })
            }
            IpcCommand::Entitlements { account } => {
                serde_json::to_value(engine.entitlements(&account.into_state(), clock))?
            }
            IpcCommand::Check { capability, account } => {
                let state = account.into_state();
                serde_json::json!({
                    "capability": engine.check_capability(&state, capability, clock),
                    "signal_quota": engine.check_signal_quota(&state, clock),
                })
            }
        };
        writeln!(stdout, "{}", response)?;
        stdout.flush()?;
    }
    Ok(())
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
