//! Entry point for the amvim binary: a headless binding tester.
//!
//! Key tokens are read from stdin and dispatched against the configured
//! keymaps. Host actions named in the configuration are echoed instead of
//! editing anything.

mod args;
mod tracing_setup;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use amvim_dispatch::{Action, ActionRegistry, AmvimConfig, Args, Dispatcher, Host, SelectionState};
use anyhow::{Context, Result};
use parking_lot::Mutex;

/// Host that prints what an editor would show.
struct TerminalHost {
    selection: Mutex<SelectionState>,
}

impl TerminalHost {
    fn new() -> Self {
        Self {
            selection: Mutex::new(SelectionState::Empty),
        }
    }

    fn set_selection(&self, selection: SelectionState) {
        *self.selection.lock() = selection;
    }
}

fn print_line(line: &str) {
    let _ = writeln!(io::stdout().lock(), "{line}");
}

impl Host for TerminalHost {
    fn set_status(&self, text: &str) {
        print_line(&format!("status: {text}"));
    }

    fn set_mode_context(&self, mode_name: &str) {
        log::info!("mode context: {mode_name}");
    }

    fn selection_state(&self) -> SelectionState {
        *self.selection.lock()
    }

    fn replace_previous_chars(&self, count: usize, text: &str) {
        print_line(&format!("replace {count} previous char(s) with {text:?}"));
    }
}

/// An action that prints its name and arguments.
fn echo_action(name: &str, change: bool) -> Action {
    let label: Arc<str> = Arc::from(name);
    Action::new(name, move |args: Args| {
        let label = Arc::clone(&label);
        async move {
            print_line(&format!("run {label} {}", serde_json::to_string(&args).unwrap_or_default()));
            Ok(())
        }
    })
    .with_change(change)
}

fn echo_registry(config: &AmvimConfig) -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    for name in config.host_action_names() {
        registry.register(echo_action(name, config.is_change(name)));
    }
    registry
}

async fn handle_event(dispatcher: &Dispatcher, host: &TerminalHost, line: &str) {
    let mut words = line.split_whitespace();
    match words.next() {
        Some(":select") => {
            host.set_selection(SelectionState::NonEmpty);
            dispatcher.on_did_change_text_editor_selection().await;
        }
        Some(":clear") => {
            host.set_selection(SelectionState::Empty);
            dispatcher.on_did_change_text_editor_selection().await;
        }
        Some(":focus") => dispatcher.on_did_change_active_text_editor().await,
        Some(":replace") => {
            let count = words.next().and_then(|count| count.parse().ok()).unwrap_or(1);
            let text = words.collect::<Vec<_>>().join(" ");
            dispatcher.replace_previous_chars(count, &text);
        }
        Some(other) => log::warn!("Unknown host event: {other}"),
        None => {}
    }
}

async fn run(config: AmvimConfig) -> Result<()> {
    let registry = echo_registry(&config);
    let host = Arc::new(TerminalHost::new());
    let dispatcher = Dispatcher::builder(host.clone())
        .config(&config, &registry)?
        .build();

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        let line = line.trim();

        if line.starts_with(':') {
            handle_event(&dispatcher, &host, line).await;
        } else {
            for token in line.split_whitespace() {
                let kind = dispatcher.input(token);
                log::debug!("{token} -> {kind:?}");
            }
        }
        dispatcher.wait_idle().await;
    }

    dispatcher.dispose();
    Ok(())
}

fn main() -> Result<()> {
    let args = args::parse_args();
    for warning in &args.warnings {
        eprintln!("Warning: {warning}");
    }
    if args.show_help {
        eprintln!("{}", args::USAGE);
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => AmvimConfig::load_from(path)?,
        None => AmvimConfig::load_default().unwrap_or_else(|err| {
            eprintln!("Warning: failed to load config.toml: {err}");
            eprintln!("Using default configuration");
            AmvimConfig::default()
        }),
    };

    tracing_setup::init(&config.logging)?;

    log::info!("Starting amvim");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config))
}
