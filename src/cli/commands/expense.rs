use chrono::NaiveDate;
use spendify_core::{CategoryService, ExpenseService, Submission, SyncService, UNKNOWN_CATEGORY};
use spendify_domain::{short_id, Category, DateWindow, ExpensePatch, NewExpense, PaymentMethod};

use crate::cli::core::{
    parse_amount, parse_date, usage, CommandError, CommandResult, ParsedArgs, ShellContext,
};
use crate::cli::format::{money, Alignment, Table};
use crate::cli::registry::CommandEntry;
use crate::cli::{io, output};

const ADD_USAGE: &str =
    "expense add <amount> <category> [--date YYYY-MM-DD] [--method upi|cash|card|bank|other] [--note text]";
const LIST_USAGE: &str =
    "expense list [--date YYYY-MM-DD | --month YYYY-MM | --from YYYY-MM-DD --to YYYY-MM-DD | --all] [--category name]";
const EDIT_USAGE: &str =
    "expense edit <id> [--amount n] [--category name] [--date YYYY-MM-DD] [--method m] [--note text | --clear-note]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "expense",
            "Log, list, edit or delete expenses",
            "expense <add|list|edit|delete> ...",
            cmd_expense,
        )
        .with_aliases(&["exp"]),
        CommandEntry::new(
            "today",
            "Show one day's spending by category",
            "today [YYYY-MM-DD]",
            cmd_today,
        ),
    ]
}

fn cmd_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return Err(usage("expense <add|list|edit|delete>"));
    };
    match action.to_lowercase().as_str() {
        "add" => handle_add(context, rest),
        "list" | "ls" => handle_list(context, rest),
        "edit" => handle_edit(context, rest),
        "delete" | "remove" | "rm" => handle_delete(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown expense subcommand `{}`",
            other
        ))),
    }
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["date", "method", "note"], &[])?;
    let [amount, category @ ..] = parsed.positional.as_slice() else {
        return Err(usage(ADD_USAGE));
    };
    if category.is_empty() {
        return Err(usage(ADD_USAGE));
    }
    let amount = parse_amount(amount)?;
    let session = context.app.require_session()?;
    let categories = context.app.categories(&session)?;
    let category = CategoryService::require(&categories, &category.join(" "))?;
    let date = match parsed.value("date") {
        Some(raw) => parse_date(raw)?,
        None => context.app.today(),
    };
    let method = match parsed.value("method") {
        Some(raw) => parse_method(raw)?,
        None => context.config.default_payment_method,
    };

    let mut draft = NewExpense::new(session.user_id, category.id, amount, date).with_method(method);
    if let Some(note) = parsed.value("note") {
        draft = draft.with_description(note);
    }

    match SyncService::submit(
        context.app.backend(),
        context.app.store(),
        context.app.network(),
        &draft,
    )? {
        Submission::Saved(expense) => io::print_success(format!(
            "Expense of {} saved under {} on {} (id {}).",
            money(context.currency(), expense.amount),
            category.name,
            expense.expense_date,
            short_id(expense.id)
        )),
        Submission::Queued { pending } => {
            io::print_warning(format!(
                "Saved offline. {} expense(s) will sync when you are back online.",
                pending
            ));
        }
    }
    Ok(())
}

fn handle_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(args, &["date", "month", "from", "to", "category"], &["all"])?;
    if !parsed.positional.is_empty() {
        return Err(usage(LIST_USAGE));
    }
    let session = context.app.require_session()?;
    context.app.require_online("Listing expenses")?;
    let window = list_window(&parsed, context.app.today())?;
    let categories = context.app.categories(&session)?;
    let category_filter = parsed
        .value("category")
        .map(|name| CategoryService::require(&categories, name).map(|category| category.id))
        .transpose()?;

    let mut expenses = match window {
        Some(window) => ExpenseService::for_window(context.app.backend(), &session, window)?,
        None => ExpenseService::list(context.app.backend(), &session)?,
    };
    if let Some(category_id) = category_filter {
        expenses.retain(|expense| expense.category_id == category_id);
    }

    let title = window
        .map(|window| format!("Expenses {window}"))
        .unwrap_or_else(|| "All expenses".to_string());
    output::section(title);
    if expenses.is_empty() {
        io::print_info("No expenses found.");
        return Ok(());
    }

    let symbol = context.currency();
    let mut table = Table::new(&[
        ("ID", Alignment::Left),
        ("Date", Alignment::Left),
        ("Category", Alignment::Left),
        ("Method", Alignment::Left),
        ("Amount", Alignment::Right),
        ("Note", Alignment::Left),
    ]);
    for expense in &expenses {
        table.push(vec![
            short_id(expense.id),
            expense.expense_date.to_string(),
            category_name(&categories, expense.category_id),
            expense.method.to_string(),
            money(symbol, expense.amount),
            expense.description.clone().unwrap_or_default(),
        ]);
    }
    for line in table.render() {
        output::line(line);
    }
    let total: f64 = expenses.iter().map(|expense| expense.amount).sum();
    output::line(format!(
        "  {} expense(s), total {}",
        expenses.len(),
        money(symbol, total)
    ));
    Ok(())
}

/// Date filter for `expense list`. Defaults to the current month; `--all` lifts it.
fn list_window(
    parsed: &ParsedArgs<'_>,
    today: NaiveDate,
) -> Result<Option<DateWindow>, CommandError> {
    if parsed.has("all") {
        return Ok(None);
    }
    if let Some(raw) = parsed.value("date") {
        return Ok(Some(DateWindow::day(parse_date(raw)?)?));
    }
    if let Some(raw) = parsed.value("month") {
        let first = parse_date(&format!("{}-01", raw.trim())).map_err(|_| {
            CommandError::InvalidArguments(format!("invalid month `{}` (use YYYY-MM)", raw))
        })?;
        return Ok(Some(DateWindow::month_of(first)?));
    }
    match (parsed.value("from"), parsed.value("to")) {
        (Some(from), Some(to)) => {
            let (first, last) = (parse_date(from)?, parse_date(to)?);
            if first == last {
                Ok(Some(DateWindow::day(first)?))
            } else {
                Ok(Some(DateWindow::inclusive(first, last)?))
            }
        }
        (None, None) => Ok(Some(DateWindow::month_of(today)?)),
        _ => Err(CommandError::InvalidArguments(
            "`--from` and `--to` must be given together".into(),
        )),
    }
}

fn handle_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let parsed = ParsedArgs::parse(
        args,
        &["amount", "category", "date", "method", "note"],
        &["clear-note"],
    )?;
    let [id] = parsed.positional.as_slice() else {
        return Err(usage(EDIT_USAGE));
    };
    let session = context.app.require_session()?;
    context.app.require_online("Editing an expense")?;
    let expense = ExpenseService::find(context.app.backend(), &session, id)?;

    let mut patch = ExpensePatch {
        amount: parsed.value("amount").map(parse_amount).transpose()?,
        expense_date: parsed.value("date").map(parse_date).transpose()?,
        method: parsed.value("method").map(parse_method).transpose()?,
        ..ExpensePatch::default()
    };
    if let Some(name) = parsed.value("category") {
        let categories = context.app.categories(&session)?;
        patch.category_id = Some(CategoryService::require(&categories, name)?.id);
    }
    if parsed.has("clear-note") {
        patch.description = Some(None);
    } else if let Some(note) = parsed.value("note") {
        let note = note.trim();
        patch.description = Some((!note.is_empty()).then(|| note.to_string()));
    }

    let updated = ExpenseService::update(context.app.backend(), expense.id, &patch)?;
    io::print_success(format!(
        "Expense {} updated: {} on {} [{}].",
        short_id(updated.id),
        money(context.currency(), updated.amount),
        updated.expense_date,
        updated.method
    ));
    Ok(())
}

fn handle_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [id] = args else {
        return Err(usage("expense delete <id>"));
    };
    let session = context.app.require_session()?;
    context.app.require_online("Deleting an expense")?;
    let expense = ExpenseService::find(context.app.backend(), &session, id)?;
    if !context.confirm(&format!(
        "Delete the expense of {} on {}?",
        money(context.currency(), expense.amount),
        expense.expense_date
    ))? {
        io::print_info("Expense kept.");
        return Ok(());
    }
    ExpenseService::delete(context.app.backend(), expense.id)?;
    io::print_success(format!("Expense {} deleted.", short_id(expense.id)));
    Ok(())
}

fn cmd_today(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let date = match args {
        [] => context.app.today(),
        [raw] => parse_date(raw)?,
        _ => return Err(usage("today [YYYY-MM-DD]")),
    };
    let session = context.app.require_session()?;
    context.app.require_online("Loading the daily breakdown")?;
    let breakdown = ExpenseService::daily_breakdown(context.app.backend(), &session, date)?;
    let symbol = context.currency();

    output::section(format!("Spending on {}", date.format("%B %-d, %Y")));
    if breakdown.is_empty() {
        io::print_info("No expenses recorded for this day.");
        return Ok(());
    }

    let mut by_category = Table::new(&[
        ("Category", Alignment::Left),
        ("Count", Alignment::Right),
        ("Amount", Alignment::Right),
    ]);
    for slice in &breakdown.categories {
        by_category.push(vec![
            slice.name.clone(),
            slice.count.to_string(),
            money(symbol, slice.amount),
        ]);
    }
    for line in by_category.render() {
        output::line(line);
    }

    output::section("Entries");
    let mut entries = Table::new(&[
        ("ID", Alignment::Left),
        ("Category", Alignment::Left),
        ("Method", Alignment::Left),
        ("Amount", Alignment::Right),
        ("Note", Alignment::Left),
    ]);
    for line in &breakdown.expenses {
        entries.push(vec![
            short_id(line.expense.id),
            line.category.clone(),
            line.expense.method.to_string(),
            money(symbol, line.expense.amount),
            line.expense.description.clone().unwrap_or_default(),
        ]);
    }
    for line in entries.render() {
        output::line(line);
    }
    output::line(format!("  Total: {}", money(symbol, breakdown.total)));
    Ok(())
}

fn parse_method(raw: &str) -> Result<PaymentMethod, CommandError> {
    raw.parse::<PaymentMethod>()
        .map_err(|err| CommandError::InvalidArguments(err.to_string()))
}

fn category_name(categories: &[Category], id: uuid::Uuid) -> String {
    categories
        .iter()
        .find(|category| category.id == id)
        .map(|category| category.name.clone())
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
}
