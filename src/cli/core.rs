//! Core CLI loop, dispatch, and shell context helpers.

use std::io;

use chrono::{Datelike, NaiveDate};
use dialoguer::theme::ColorfulTheme;
use spendify_config::ConfigManager;
use spendify_core::{CoreError, SyncReport};
use spendify_domain::DateWindowError;
use strsim::levenshtein;

pub use crate::core::errors::CliError;
use crate::core::{errors::AppError, utils::app_data_dir, Spendify};

use super::commands;
use super::io as cli_io;
use super::registry::{CommandEntry, CommandRegistry};
pub use crate::cli::shell_context::{CliMode, ShellContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let home = app_data_dir();
        let config_manager = ConfigManager::with_base_dir(home.clone())?;
        let config = config_manager.load()?;
        cli_io::apply_config(&config);
        let app = Spendify::open(&home, &config)?;

        let context = ShellContext {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            app,
            home,
            config_manager,
            config,
            analytics: None,
            running: true,
        };
        context.sync_on_start();
        Ok(context)
    }

    /// Replays queued expenses left over from an earlier offline session.
    fn sync_on_start(&self) {
        match self.app.sync_pending() {
            Ok(Some(report)) => self.report_sync(&report),
            Ok(None) => {}
            Err(err) => cli_io::print_warning(format!("Could not sync local data: {err}")),
        }
    }

    pub(crate) fn mode(&self) -> CliMode {
        self.mode
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        let user = self
            .app
            .session()
            .ok()
            .flatten()
            .map(|session| format!(" [{}]", session.email))
            .unwrap_or_default();
        let network = if self.app.is_online() {
            ""
        } else {
            " (offline)"
        };
        format!("spendify{user}{network}> ")
    }

    pub(crate) fn currency(&self) -> &str {
        &self.config.currency_symbol
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &needle), key))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = best {
            if distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true)
            .map_err(|err| CliError::Command(err.to_string()))
    }

    /// Asks before a destructive action. Scripts proceed without asking.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                self.print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(AppError::NotSignedIn) => {
                self.print_error("You are not signed in.");
                self.print_hint("Use `login <email> <password>` or `signup` first.");
                Ok(())
            }
            other => {
                self.print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }

    pub(crate) fn print_hint(&self, message: &str) {
        cli_io::print_hint(message);
    }

    pub(crate) fn report_sync(&self, report: &SyncReport) {
        if !report.synced.is_empty() {
            cli_io::print_success(format!(
                "Synced {} offline expense(s).",
                report.synced.len()
            ));
        }
        for rejected in &report.rejected {
            cli_io::print_warning(format!(
                "Dropped a queued expense of {:.2} on {}: {}",
                rejected.draft.amount, rejected.draft.expense_date, rejected.reason
            ));
        }
        if report.remaining > 0 {
            cli_io::print_info(format!(
                "{} expense(s) still waiting to sync.",
                report.remaining
            ));
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] AppError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        CommandError::Core(AppError::from(err))
    }
}

impl From<DateWindowError> for CommandError {
    fn from(err: DateWindowError) -> Self {
        CommandError::InvalidArguments(err.to_string())
    }
}

impl From<spendify_config::ConfigError> for CommandError {
    fn from(err: spendify_config::ConfigError) -> Self {
        CommandError::Core(AppError::from(err))
    }
}

impl From<CliError> for CommandError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Core(err) => CommandError::Core(err),
            CliError::Input(message) => CommandError::InvalidArguments(message),
            CliError::Command(message) => CommandError::Message(message),
        }
    }
}

/// Years accepted from the command line.
const DATE_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })?;
    if !DATE_YEARS.contains(&date.year()) {
        return Err(CommandError::InvalidArguments(format!(
            "date `{}` is out of range (years {} to {})",
            input.trim(),
            DATE_YEARS.start(),
            DATE_YEARS.end()
        )));
    }
    Ok(date)
}

pub(crate) fn parse_amount(input: &str) -> Result<f64, CommandError> {
    let cleaned: String = input.trim().chars().filter(|ch| *ch != ',').collect();
    let amount: f64 = cleaned
        .parse()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid amount `{}`", input)))?;
    if !amount.is_finite() {
        return Err(CommandError::InvalidArguments(format!(
            "invalid amount `{}`",
            input
        )));
    }
    Ok(amount)
}

pub(crate) fn usage(text: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {text}"))
}

/// Positional arguments plus `--name value` options and bare `--switch` flags.
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs<'a> {
    pub positional: Vec<&'a str>,
    options: Vec<(&'a str, Option<&'a str>)>,
}

impl<'a> ParsedArgs<'a> {
    /// Splits `args`, accepting only the listed option names (without `--`).
    pub fn parse(
        args: &[&'a str],
        valued: &[&str],
        switches: &[&str],
    ) -> Result<Self, CommandError> {
        let mut parsed = ParsedArgs::default();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            let Some(name) = arg.strip_prefix("--") else {
                parsed.positional.push(arg);
                continue;
            };
            if switches.contains(&name) {
                parsed.options.push((name, None));
            } else if valued.contains(&name) {
                let value = iter.next().ok_or_else(|| {
                    CommandError::InvalidArguments(format!("option `--{name}` needs a value"))
                })?;
                parsed.options.push((name, Some(value)));
            } else {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `--{name}`"
                )));
            }
        }
        Ok(parsed)
    }

    /// Last value supplied for `name`.
    pub fn value(&self, name: &str) -> Option<&'a str> {
        self.options
            .iter()
            .rev()
            .find(|(option, _)| *option == name)
            .and_then(|(_, value)| *value)
    }

    pub fn has(&self, name: &str) -> bool {
        self.options.iter().any(|(option, _)| *option == name)
    }
}
