//! Shared runtime state for CLI interactions and command execution.

use std::path::PathBuf;

use chrono::NaiveDate;
use dialoguer::theme::ColorfulTheme;
use spendify_config::{Config, ConfigManager};
use spendify_domain::AggregationPeriod;

use crate::core::Spendify;

use super::registry::CommandRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// Period and date the analytics view is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsCursor {
    pub period: AggregationPeriod,
    pub selected: NaiveDate,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub app: Spendify,
    pub home: PathBuf,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub analytics: Option<AnalyticsCursor>,
    pub running: bool,
}
