use spendify_core::DebtService;
use spendify_domain::{short_id, DebtKind, NewDebt};

use crate::cli::core::{
    parse_amount, parse_date, usage, CommandError, CommandResult, ParsedArgs, ShellContext,
};
use crate::cli::format::{money, two_column, Alignment, Table};
use crate::cli::registry::CommandEntry;
use crate::cli::{io, output};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "lend",
            "Track money you lent to someone",
            "lend <add <person> <amount> [--date YYYY-MM-DD] [--note text]|list|delete <id>>",
            cmd_lend,
        ),
        CommandEntry::new(
            "borrow",
            "Track money you borrowed from someone",
            "borrow <add <person> <amount> [--date YYYY-MM-DD] [--note text]|list|delete <id>>",
            cmd_borrow,
        ),
    ]
}

fn cmd_lend(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    run(context, DebtKind::Lending, args)
}

fn cmd_borrow(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    run(context, DebtKind::Borrowing, args)
}

fn command_name(kind: DebtKind) -> &'static str {
    match kind {
        DebtKind::Lending => "lend",
        DebtKind::Borrowing => "borrow",
    }
}

fn run(context: &mut ShellContext, kind: DebtKind, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return list(context, kind);
    };
    match action.to_lowercase().as_str() {
        "add" => add(context, kind, rest),
        "list" | "ls" => list(context, kind),
        "delete" | "remove" | "rm" => delete(context, kind, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown {} subcommand `{}`",
            command_name(kind),
            other
        ))),
    }
}

fn add(context: &mut ShellContext, kind: DebtKind, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["date", "note"], &[])?;
    let [person @ .., amount] = parsed.positional.as_slice() else {
        return Err(usage(&format!("{} add <person> <amount>", command_name(kind))));
    };
    if person.is_empty() {
        return Err(usage(&format!("{} add <person> <amount>", command_name(kind))));
    }
    let amount = parse_amount(amount)?;
    let date = match parsed.value("date") {
        Some(raw) => parse_date(raw)?,
        None => context.app.today(),
    };
    let session = context.app.require_session()?;
    context.app.require_online("Saving the record")?;

    let draft = NewDebt::new(session.user_id, kind, person.join(" "), amount, date)
        .with_description(parsed.value("note").map(str::to_string));
    let record = DebtService::add(context.app.backend(), &draft)?;
    io::print_success(format!(
        "Recorded {} {} {} on {} (id {}).",
        money(context.currency(), record.amount),
        match kind {
            DebtKind::Lending => "lent to",
            DebtKind::Borrowing => "borrowed from",
        },
        record.person_name,
        record.date,
        short_id(record.id)
    ));
    Ok(())
}

fn list(context: &mut ShellContext, kind: DebtKind) -> CommandResult {
    let session = context.app.require_session()?;
    context.app.require_online("Loading records")?;
    let records = DebtService::list(context.app.backend(), &session, kind)?;
    let symbol = context.currency();

    output::section(kind.heading());
    if records.is_empty() {
        io::print_info("No records yet.");
    } else {
        let mut table = Table::new(&[
            ("ID", Alignment::Left),
            ("Person", Alignment::Left),
            ("Amount", Alignment::Right),
            ("Date", Alignment::Left),
            ("Note", Alignment::Left),
        ]);
        for record in &records {
            table.push(vec![
                short_id(record.id),
                record.person_name.clone(),
                format!("{}{}", kind.sign(), money(symbol, record.amount)),
                record.date.to_string(),
                record.description.clone().unwrap_or_default(),
            ]);
        }
        for line in table.render() {
            output::line(line);
        }
    }

    let totals = DebtService::totals(context.app.backend(), &session)?;
    let rows = [
        ("Total lent", money(symbol, totals.lent)),
        ("Total borrowed", money(symbol, totals.borrowed)),
        ("Net", money(symbol, totals.net)),
    ];
    output::separator();
    for line in two_column(&rows) {
        output::line(line);
    }
    Ok(())
}

fn delete(context: &mut ShellContext, kind: DebtKind, args: &[&str]) -> CommandResult {
    let [id] = args else {
        return Err(usage(&format!("{} delete <id>", command_name(kind))));
    };
    let session = context.app.require_session()?;
    context.app.require_online("Deleting a record")?;
    let record = DebtService::find(context.app.backend(), &session, kind, id)?;
    if !context.confirm(&format!(
        "Delete the {} record for {} ({})?",
        kind,
        record.person_name,
        money(context.currency(), record.amount)
    ))? {
        io::print_info("Record kept.");
        return Ok(());
    }
    DebtService::delete(context.app.backend(), kind, record.id)?;
    io::print_success(format!(
        "Removed the {} record for {}.",
        kind, record.person_name
    ));
    Ok(())
}
