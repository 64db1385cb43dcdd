use spendify_core::{CategoryService, SyncService, UNKNOWN_CATEGORY};

use crate::cli::core::{usage, CommandError, CommandResult, ShellContext};
use crate::cli::format::{money, Alignment, Table};
use crate::cli::registry::CommandEntry;
use crate::cli::{io, output};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "network",
            "Simulate connectivity for this session",
            "network <online|offline|status>",
            cmd_network,
        ),
        CommandEntry::new(
            "sync",
            "Sync, inspect or clear expenses saved offline",
            "sync [status|clear|now]",
            cmd_sync,
        ),
    ]
}

fn cmd_network(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|action| action.to_lowercase()).as_deref() {
        None | Some("status") => {
            let pending = SyncService::pending(context.app.store())?.len();
            let state = if context.app.is_online() {
                "online"
            } else {
                "offline"
            };
            io::print_info(format!(
                "Network is {state}. {pending} expense(s) waiting to sync."
            ));
            Ok(())
        }
        Some("online") | Some("on") => {
            let report = context.app.set_online(true)?;
            io::print_success("Network is online.");
            if let Some(report) = report {
                context.report_sync(&report);
            }
            Ok(())
        }
        Some("offline") | Some("off") => {
            context.app.set_online(false)?;
            io::print_warning("Network is offline. New expenses will be saved on this device.");
            Ok(())
        }
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown network state `{}`",
            other
        ))),
    }
}

fn cmd_sync(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => sync_now(context),
        [action] => match action.to_lowercase().as_str() {
            "status" | "list" => show_pending(context),
            "clear" => clear(context),
            "now" => sync_now(context),
            other => Err(CommandError::InvalidArguments(format!(
                "unknown sync subcommand `{}`",
                other
            ))),
        },
        _ => Err(usage("sync [status|clear|now]")),
    }
}

fn sync_now(context: &mut ShellContext) -> CommandResult {
    context.app.require_session()?;
    let report = SyncService::drain(
        context.app.backend(),
        context.app.store(),
        context.app.network(),
    )?;
    if report.offline {
        io::print_warning(format!(
            "You are offline. {} expense(s) will sync when you reconnect.",
            report.remaining
        ));
    } else if report.is_noop() && report.remaining == 0 {
        io::print_info("Nothing to sync.");
    } else {
        context.report_sync(&report);
    }
    Ok(())
}

fn show_pending(context: &mut ShellContext) -> CommandResult {
    let pending = SyncService::pending(context.app.store())?;
    output::section("Waiting to sync");
    if pending.is_empty() {
        io::print_info("No expenses are waiting to sync.");
        return Ok(());
    }
    let cached = CategoryService::cached(context.app.store())?.unwrap_or_default();
    let mut table = Table::new(&[
        ("#", Alignment::Right),
        ("Date", Alignment::Left),
        ("Category", Alignment::Left),
        ("Method", Alignment::Left),
        ("Amount", Alignment::Right),
    ]);
    for (index, draft) in pending.iter().enumerate() {
        let category = cached
            .iter()
            .find(|category| category.id == draft.category_id)
            .map(|category| category.name.clone())
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
        table.push(vec![
            (index + 1).to_string(),
            draft.expense_date.to_string(),
            category,
            draft.method.to_string(),
            money(context.currency(), draft.amount),
        ]);
    }
    for line in table.render() {
        output::line(line);
    }
    Ok(())
}

fn clear(context: &mut ShellContext) -> CommandResult {
    let pending = SyncService::pending(context.app.store())?.len();
    if pending == 0 {
        io::print_info("No expenses are waiting to sync.");
        return Ok(());
    }
    if !context.confirm(&format!("Discard {pending} unsynced expense(s)?"))? {
        io::print_info("Offline expenses kept.");
        return Ok(());
    }
    let dropped = SyncService::clear(context.app.store())?;
    io::print_success(format!("Discarded {dropped} unsynced expense(s)."));
    Ok(())
}
