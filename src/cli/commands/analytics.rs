use spendify_core::{AnalyticsService, ChartReport};
use spendify_domain::AggregationPeriod;

use crate::cli::core::{parse_date, usage, CommandError, CommandResult, ShellContext};
use crate::cli::format::{line_lines, pie_lines};
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::AnalyticsCursor;
use crate::cli::{io, output};

const USAGE: &str = "analytics [day|week|month|year] [YYYY-MM-DD|prev|next] | analytics <prev|next> | analytics range <start> <end>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "analytics",
        "Spending charts by day, week, month or year",
        USAGE,
        cmd_analytics,
    )
    .with_aliases(&["stats"])]
}

fn cmd_analytics(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let current = context.analytics.unwrap_or(AnalyticsCursor {
        period: context.config.default_period,
        selected: context.app.today(),
    });

    let cursor = match args {
        [] => current,
        [step] if step.eq_ignore_ascii_case("prev") || step.eq_ignore_ascii_case("next") => {
            let steps = if step.eq_ignore_ascii_case("prev") { -1 } else { 1 };
            AnalyticsCursor {
                selected: current.period.shift(current.selected, steps)?,
                ..current
            }
        }
        [range, rest @ ..] if range.eq_ignore_ascii_case("range") => {
            return show_range(context, rest);
        }
        [period, rest @ ..] => {
            let period = period
                .parse::<AggregationPeriod>()
                .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
            let today = context.app.today();
            let selected = match rest {
                [] => today,
                [step] if step.eq_ignore_ascii_case("prev") => period.shift(today, -1)?,
                [step] if step.eq_ignore_ascii_case("next") => period.shift(today, 1)?,
                [raw] => parse_date(raw)?,
                _ => return Err(usage(USAGE)),
            };
            AnalyticsCursor { period, selected }
        }
    };

    let session = context.app.require_session()?;
    context.app.require_online("Loading analytics")?;
    let report = AnalyticsService::load_report(
        context.app.backend(),
        &session,
        cursor.period,
        cursor.selected,
    )?;
    context.analytics = Some(cursor);
    print_report(&report, context.currency());
    Ok(())
}

fn print_report(report: &ChartReport, symbol: &str) {
    output::section(format!(
        "{} spending for {} ({})",
        report.period.label(),
        report.label,
        report.pie.window
    ));
    if report.pie.is_empty() {
        io::print_info("No expenses in this period.");
    } else {
        for line in pie_lines(&report.pie, symbol) {
            output::line(line);
        }
    }

    output::section(format!("{} trend", report.period.label()));
    if report.line.is_empty() {
        io::print_info("No expenses recorded yet.");
        return;
    }
    for line in line_lines(&report.line, symbol) {
        output::line(line);
    }
    io::print_hint("Use `analytics prev` or `analytics next` to move between periods.");
}

fn show_range(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [first, last] = args else {
        return Err(usage("analytics range <start YYYY-MM-DD> <end YYYY-MM-DD>"));
    };
    let (first, last) = (parse_date(first)?, parse_date(last)?);
    let session = context.app.require_session()?;
    context.app.require_online("Loading analytics")?;
    let chart = AnalyticsService::load_range(context.app.backend(), &session, first, last)?;

    output::section(format!("Spending from {first} to {last}"));
    if chart.is_empty() {
        io::print_info("No expenses in this range.");
        return Ok(());
    }
    for line in pie_lines(&chart, context.currency()) {
        output::line(line);
    }
    Ok(())
}
