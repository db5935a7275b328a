use clap::Args;
use pomonote_core::runtime::{self, Command, Input};
use pomonote_core::{Timer, VaultStore};
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

use super::terminal::TerminalStatus;
use super::watch;

const QUEUE_DEPTH: usize = 64;
const WATCH_PERIOD: Duration = Duration::from_secs(1);

const HELP: &str = "commands: start | custom <minutes> | pause | quit | click | log | checklist | exit";

#[derive(Args)]
pub struct RunArgs {
    /// Vault directory (overrides vault.root)
    #[arg(long)]
    vault: Option<PathBuf>,
    /// Config file to use instead of the default
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

/// Forward stdin lines to the loop. Runs on a plain thread because a
/// blocking read would otherwise hold the runtime open at shutdown.
fn spawn_stdin_reader(tx: mpsc::Sender<Input>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "help" {
                eprintln!("{HELP}");
                continue;
            }
            let input = if line == "exit" {
                Input::Shutdown
            } else {
                match line.parse::<Command>() {
                    Ok(command) => Input::Command(command),
                    Err(e) => {
                        eprintln!("{e}");
                        continue;
                    }
                }
            };
            if tx.blocking_send(input).is_err() {
                return;
            }
        }
        let _ = tx.blocking_send(Input::Shutdown);
    });
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::config::load(args.config.as_ref())?;
    if let Some(vault) = &args.vault {
        config.vault.root = vault.display().to_string();
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let store = VaultStore::new(config.vault_root());
        let tick = Duration::from_millis(config.ui.tick_ms);
        let checklist = config.checklist_path().map(PathBuf::from);
        let watcher_store = store.clone();
        let timer = Timer::with_system_clock(config, store);

        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let ticker = runtime::spawn_ticker(tx.clone(), tick);
        let watcher = checklist
            .and_then(|note| watch::spawn_note_watch(tx.clone(), &watcher_store, &note, WATCH_PERIOD));
        let interrupt = {
            let tx = tx.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = tx.send(Input::Shutdown).await;
                }
            })
        };
        spawn_stdin_reader(tx);

        tracing::info!(vault = %watcher_store.root().display(), "session started");
        eprintln!("{HELP}");

        let mut sink = TerminalStatus::new(std::io::stdout(), args.json);
        runtime::run(timer, rx, &mut sink).await;
        println!();

        ticker.abort();
        interrupt.abort();
        if let Some(watcher) = watcher {
            watcher.abort();
        }
    });

    Ok(())
}
