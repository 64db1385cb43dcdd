use spendify_storage_json::BackupInfo;

use crate::cli::core::{usage, CommandError, CommandResult, ShellContext};
use crate::cli::format::{Alignment, Table};
use crate::cli::registry::CommandEntry;
use crate::cli::{io, output};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "backup",
        "Snapshot or restore the local data file",
        "backup <create [note]|list|restore <name|number>>",
        cmd_backup,
    )]
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return list(context);
    };
    match action.to_lowercase().as_str() {
        "create" | "new" => create(context, rest),
        "list" | "ls" => list(context),
        "restore" => match rest {
            [reference] => restore(context, reference),
            _ => Err(usage("backup restore <name|number>")),
        },
        other => Err(CommandError::InvalidArguments(format!(
            "unknown backup subcommand `{}`",
            other
        ))),
    }
}

fn create(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let note = (!args.is_empty()).then(|| args.join(" "));
    let backup = context.app.backend().backup(note.as_deref())?;
    io::print_success(format!("Backup written: {}", backup.id));
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    let backups = context.app.backend().list_backups()?;
    output::section("Backups");
    if backups.is_empty() {
        io::print_info("No backups yet. Create one with `backup create [note]`.");
        return Ok(());
    }
    let mut table = Table::new(&[
        ("#", Alignment::Right),
        ("Name", Alignment::Left),
        ("Created", Alignment::Left),
        ("Size", Alignment::Right),
    ]);
    for (index, backup) in backups.iter().enumerate() {
        table.push(vec![
            (index + 1).to_string(),
            backup.id.clone(),
            backup
                .created_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "unknown".into()),
            format!("{} B", backup.size_bytes),
        ]);
    }
    for line in table.render() {
        output::line(line);
    }
    Ok(())
}

/// Resolves `reference` as a 1-based list position or a backup name.
fn resolve(context: &ShellContext, reference: &str) -> Result<BackupInfo, CommandError> {
    let backend = context.app.backend();
    if let Ok(position) = reference.parse::<usize>() {
        return backend
            .list_backups()?
            .into_iter()
            .nth(position.saturating_sub(1))
            .filter(|_| position > 0)
            .ok_or_else(|| CommandError::InvalidArguments(format!("no backup #{position}")));
    }
    backend
        .find_backup(reference)?
        .ok_or_else(|| CommandError::InvalidArguments(format!("backup `{reference}` not found")))
}

fn restore(context: &mut ShellContext, reference: &str) -> CommandResult {
    let backup = resolve(context, reference)?;
    if !context.confirm(&format!(
        "Replace the current data with `{}`?",
        backup.id
    ))? {
        io::print_info("Restore cancelled.");
        return Ok(());
    }
    context.app.backend().restore(&backup)?;
    context.analytics = None;
    io::print_success(format!("Restored data from {}.", backup.id));
    if let Some(session) = context.app.session()? {
        if context.app.is_online() {
            context.app.categories(&session)?;
        }
    }
    Ok(())
}
