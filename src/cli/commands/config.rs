use spendify_config::Config;

use crate::cli::core::{usage, CommandError, CommandResult, ShellContext};
use crate::cli::format::two_column;
use crate::cli::registry::CommandEntry;
use crate::cli::{io, output};

/// Settings read only when the shell starts.
const RESTART_KEYS: &[&str] = &[
    "utc_offset_minutes",
    "backup_retention",
    "data_root",
    "backup_root",
];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View or change preferences",
        "config <show|set <key> <value>|backup [note]|backups|restore <name|number>>",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return show(context);
    };
    match action.to_lowercase().as_str() {
        "show" => show(context),
        "set" => match rest {
            [key, value @ ..] if !value.is_empty() => set(context, key, &value.join(" ")),
            _ => Err(usage("config set <key> <value>")),
        },
        "backup" => backup(context, rest),
        "backups" => list_backups(context),
        "restore" => match rest {
            [reference] => restore(context, reference),
            _ => Err(usage("config restore <name|number>")),
        },
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config subcommand `{}`",
            other
        ))),
    }
}

fn show(context: &mut ShellContext) -> CommandResult {
    output::section("Configuration");
    let rows = Config::KEYS
        .iter()
        .map(|key| context.config.get(key).map(|value| (*key, value)))
        .collect::<Result<Vec<_>, _>>()?;
    for line in two_column(&rows) {
        output::line(line);
    }
    io::print_info(format!(
        "Stored at {}",
        context.config_manager.config_path().display()
    ));
    Ok(())
}

fn set(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let mut updated = context.config.clone();
    updated.set(key, value)?;
    context.config_manager.save(&updated)?;
    let offline_changed = updated.offline_mode != context.config.offline_mode;
    context.config = updated;
    io::apply_config(&context.config);

    io::print_success(format!("{} = {}", key.trim(), context.config.get(key)?));
    if offline_changed {
        if let Some(report) = context.app.set_online(!context.config.offline_mode)? {
            context.report_sync(&report);
        }
    }
    if RESTART_KEYS.contains(&key.trim()) {
        io::print_hint("Restart the shell for this setting to take effect.");
    }
    Ok(())
}

fn backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let note = (!args.is_empty()).then(|| args.join(" "));
    let name = context
        .config_manager
        .backup(&context.config, note.as_deref())?;
    io::print_success(format!("Configuration backed up as {name}."));
    Ok(())
}

fn list_backups(context: &mut ShellContext) -> CommandResult {
    let backups = context.config_manager.list_backups()?;
    output::section("Configuration backups");
    if backups.is_empty() {
        io::print_info("No configuration backups yet.");
        return Ok(());
    }
    for (index, name) in backups.iter().enumerate() {
        output::line(format!("  {:>2}. {}", index + 1, name));
    }
    Ok(())
}

fn restore(context: &mut ShellContext, reference: &str) -> CommandResult {
    let name = match reference.parse::<usize>() {
        Ok(position) if position > 0 => context
            .config_manager
            .list_backups()?
            .into_iter()
            .nth(position - 1)
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!("no configuration backup #{position}"))
            })?,
        _ => reference.to_string(),
    };
    if !context.confirm(&format!("Replace the current configuration with `{name}`?"))? {
        io::print_info("Restore cancelled.");
        return Ok(());
    }
    let restored = context.config_manager.restore(&name)?;
    let offline_changed = restored.offline_mode != context.config.offline_mode;
    context.config = restored;
    io::apply_config(&context.config);
    if offline_changed {
        if let Some(report) = context.app.set_online(!context.config.offline_mode)? {
            context.report_sync(&report);
        }
    }
    io::print_success(format!("Configuration restored from {name}."));
    Ok(())
}
