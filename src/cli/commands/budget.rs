use spendify_core::{BudgetService, BudgetState};

use crate::cli::core::{
    parse_amount, parse_date, usage, CommandError, CommandResult, ShellContext,
};
use crate::cli::format::{budget_lines, money};
use crate::cli::registry::CommandEntry;
use crate::cli::{io, output};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "budget",
        "Show or set the monthly budget",
        "budget <show [YYYY-MM-DD]|set <amount>>",
        cmd_budget,
    )]
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => show(context, None),
        [action, rest @ ..] => match action.to_lowercase().as_str() {
            "show" => match rest {
                [] => show(context, None),
                [date] => show(context, Some(*date)),
                _ => Err(usage("budget show [YYYY-MM-DD]")),
            },
            "set" => match rest {
                [amount] => set(context, amount),
                _ => Err(usage("budget set <amount>")),
            },
            other => Err(CommandError::InvalidArguments(format!(
                "unknown budget subcommand `{}`",
                other
            ))),
        },
    }
}

fn show(context: &mut ShellContext, date: Option<&str>) -> CommandResult {
    let reference = match date {
        Some(raw) => parse_date(raw)?,
        None => context.app.today(),
    };
    let session = context.app.require_session()?;
    context.app.require_online("Loading the budget")?;
    let status = BudgetService::status(context.app.backend(), &session, reference)?;

    output::section(format!("Budget for {}", reference.format("%B %Y")));
    for line in budget_lines(&status, context.currency()) {
        output::line(line);
    }
    match status.state {
        BudgetState::Unset => io::print_hint("Set a monthly budget with `budget set <amount>`."),
        BudgetState::OverBudget => io::print_warning(format!(
            "You are {} over budget this month.",
            money(context.currency(), -status.remaining)
        )),
        BudgetState::OnTrack | BudgetState::UnderBudget => {}
    }
    Ok(())
}

fn set(context: &mut ShellContext, raw: &str) -> CommandResult {
    let amount = parse_amount(raw)?;
    let session = context.app.require_session()?;
    context.app.require_online("Updating the budget")?;
    BudgetService::set(context.app.backend(), &session, amount)?;
    io::print_success(format!(
        "Monthly budget set to {}.",
        money(context.currency(), amount)
    ));
    Ok(())
}
