pub mod analytics;
pub mod auth;
pub mod backup;
pub mod budget;
pub mod category;
pub mod config;
pub mod debt;
pub mod expense;
pub mod export;
pub mod network;
pub mod system;

use crate::cli::registry::{CommandEntry, CommandRegistry, Topic};

/// Second-word completions offered by the interactive shell.
pub(crate) const SUBCOMMANDS: &[(&str, &[&str])] = &[
    ("account", &["show", "delete"]),
    ("category", &["add", "list", "delete"]),
    ("expense", &["add", "list", "edit", "delete"]),
    ("analytics", &["day", "week", "month", "year", "prev", "next", "range"]),
    ("budget", &["show", "set"]),
    ("lend", &["add", "list", "delete"]),
    ("borrow", &["add", "list", "delete"]),
    ("network", &["online", "offline", "status"]),
    ("sync", &["status", "clear", "now"]),
    ("export", &["expenses", "lendings", "borrowings"]),
    ("backup", &["create", "list", "restore"]),
    ("config", &["show", "set", "backup", "backups", "restore"]),
];

pub(crate) fn subcommands_of(command: &str) -> &'static [&'static str] {
    SUBCOMMANDS
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, subcommands)| *subcommands)
        .unwrap_or(&[])
}

fn topics() -> Vec<(Topic, Vec<CommandEntry>)> {
    vec![
        (Topic::Account, auth::definitions()),
        (
            Topic::Spending,
            [category::definitions(), expense::definitions()].into_iter().flatten().collect(),
        ),
        (
            Topic::Insights,
            [analytics::definitions(), budget::definitions()].into_iter().flatten().collect(),
        ),
        (Topic::Debts, debt::definitions()),
        (
            Topic::Sync,
            [network::definitions(), export::definitions()].into_iter().flatten().collect(),
        ),
        (
            Topic::Maintenance,
            [backup::definitions(), config::definitions()].into_iter().flatten().collect(),
        ),
        (Topic::Shell, system::definitions()),
    ]
}

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    for (topic, entries) in topics() {
        for entry in entries {
            registry.register(topic, entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMAND_ORDER: &[&str] = &[
        "signup",
        "login",
        "logout",
        "whoami",
        "account",
        "category",
        "expense",
        "today",
        "analytics",
        "budget",
        "lend",
        "borrow",
        "network",
        "sync",
        "export",
        "backup",
        "config",
        "help",
        "version",
        "exit",
    ];

    #[test]
    fn commands_register_in_topic_order() {
        let mut registry = CommandRegistry::new();
        register_all(&mut registry);
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, COMMAND_ORDER.to_vec());
        assert_eq!(registry.by_topic().count(), 7);
    }

    #[test]
    fn subcommand_table_only_names_real_commands() {
        for (command, _) in SUBCOMMANDS {
            assert!(COMMAND_ORDER.contains(command), "{command}");
        }
        assert_eq!(subcommands_of("budget"), &["show", "set"]);
        assert!(subcommands_of("today").is_empty());
    }

    #[test]
    fn aliases_reach_their_commands() {
        let mut registry = CommandRegistry::new();
        register_all(&mut registry);
        for (alias, name) in [("q", "exit"), ("?", "help"), ("exp", "expense"), ("stats", "analytics")] {
            assert_eq!(registry.get(alias).map(|entry| entry.name), Some(name));
        }
    }
}
