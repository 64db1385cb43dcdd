use spendify_core::CategoryService;

use crate::cli::core::{usage, CommandError, CommandResult, ShellContext};
use crate::cli::format::{Alignment, Table};
use crate::cli::registry::CommandEntry;
use crate::cli::{io, output};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "category",
        "Manage expense categories",
        "category <add <name>|list|delete <name>>",
        cmd_category,
    )
    .with_aliases(&["cat"])]
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return Err(usage("category <add|list|delete>"));
    };
    match action.to_lowercase().as_str() {
        "add" => handle_add(context, rest),
        "list" | "ls" => handle_list(context),
        "delete" | "remove" | "rm" => handle_delete(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown category subcommand `{}`",
            other
        ))),
    }
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(usage("category add <name>"));
    }
    let session = context.app.require_session()?;
    context.app.require_online("Adding a category")?;
    let category = CategoryService::add(context.app.backend(), &session, &args.join(" "))?;
    context.app.categories(&session)?;
    io::print_success(format!("Category `{}` added.", category.name));
    Ok(())
}

fn handle_list(context: &mut ShellContext) -> CommandResult {
    let session = context.app.require_session()?;
    let categories = context.app.categories(&session)?;
    output::section("Categories");
    if !context.app.is_online() {
        io::print_info("Offline: showing the categories cached on this device.");
    }
    if categories.is_empty() {
        io::print_info("No categories yet. Add one with `category add <name>`.");
        return Ok(());
    }
    let mut table = Table::new(&[
        ("#", Alignment::Right),
        ("Name", Alignment::Left),
        ("Created", Alignment::Left),
    ]);
    for (index, category) in categories.iter().enumerate() {
        table.push(vec![
            (index + 1).to_string(),
            category.name.clone(),
            category.created_at.format("%Y-%m-%d").to_string(),
        ]);
    }
    for line in table.render() {
        output::line(line);
    }
    Ok(())
}

fn handle_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(usage("category delete <name>"));
    }
    let session = context.app.require_session()?;
    context.app.require_online("Deleting a category")?;
    let categories = context.app.categories(&session)?;
    let name = args.join(" ");
    let category = CategoryService::require(&categories, &name)?;
    if !context.confirm(&format!(
        "Delete `{}` and every expense filed under it?",
        category.name
    ))? {
        io::print_info("Category kept.");
        return Ok(());
    }
    let removed = CategoryService::delete(context.app.backend(), category.id)?;
    io::print_success(format!(
        "Category `{}` deleted along with {} expense(s).",
        category.name, removed
    ));
    context.app.categories(&session)?;
    Ok(())
}
