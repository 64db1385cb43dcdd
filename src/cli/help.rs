use crate::cli::format::two_column;
use crate::cli::output;
use crate::cli::registry::{CommandEntry, CommandRegistry};

const NAME_WIDTH: usize = 12;

pub fn print_overview(registry: &CommandRegistry) {
    output::section("Spendify commands");
    for (topic, entries) in registry.by_topic() {
        output::line(format!("{}:", topic.title()));
        for entry in entries {
            output::line(format!(
                "  {:<width$} {}",
                entry.name,
                entry.description,
                width = NAME_WIDTH
            ));
        }
    }
    output::hint("Use `help <command>` for usage and subcommands.");
}

pub fn print_command(entry: &CommandEntry, subcommands: &[&str]) {
    output::section(format!("Help: {}", entry.name));
    let mut rows = vec![
        ("Description", entry.description.to_string()),
        ("Usage", entry.usage.to_string()),
    ];
    if !subcommands.is_empty() {
        rows.push(("Subcommands", subcommands.join(", ")));
    }
    if !entry.aliases.is_empty() {
        rows.push(("Aliases", entry.aliases.join(", ")));
    }
    for line in two_column(&rows) {
        output::line(line);
    }
}
