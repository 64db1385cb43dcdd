use std::collections::HashMap;

use crate::cli::core::CommandResult;
use crate::cli::shell_context::ShellContext;

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// Heading a command is listed under by `help`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Account,
    Spending,
    Insights,
    Debts,
    Sync,
    Maintenance,
    Shell,
}

impl Topic {
    pub fn title(self) -> &'static str {
        match self {
            Topic::Account => "Account",
            Topic::Spending => "Spending",
            Topic::Insights => "Insights",
            Topic::Debts => "Lending and borrowing",
            Topic::Sync => "Connectivity and export",
            Topic::Maintenance => "Backups and settings",
            Topic::Shell => "Shell",
        }
    }
}

pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub aliases: &'static [&'static str],
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            aliases: &[],
            handler,
        }
    }

    pub const fn with_aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }
}

/// Commands grouped by topic, looked up by lowercase name or alias.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandEntry>,
    aliases: HashMap<&'static str, &'static str>,
    topics: Vec<(Topic, Vec<&'static str>)>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entry` under `topic`. A repeated name replaces the earlier handler in place.
    pub fn register(&mut self, topic: Topic, entry: CommandEntry) {
        let name = entry.name;
        for alias in entry.aliases {
            self.aliases.insert(*alias, name);
        }
        if self.commands.insert(name, entry).is_some() {
            return;
        }
        match self.topics.iter_mut().find(|(known, _)| *known == topic) {
            Some((_, names)) => names.push(name),
            None => self.topics.push((topic, vec![name])),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        let canonical = self.aliases.get(name).copied().unwrap_or(name);
        self.commands.get(canonical)
    }

    /// Topics in registration order with their commands.
    pub fn by_topic(&self) -> impl Iterator<Item = (Topic, Vec<&CommandEntry>)> + '_ {
        self.topics.iter().map(|(topic, names)| {
            let entries = names
                .iter()
                .filter_map(|name| self.commands.get(name))
                .collect();
            (*topic, entries)
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.topics
            .iter()
            .flat_map(|(_, names)| names.iter().copied())
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.get(name).map(|entry| entry.handler)
    }
}
