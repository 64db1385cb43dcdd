//! Text rendering for amounts, tables, and the terminal stand-ins for the
//! pie and line charts.

use spendify_core::{BudgetStatus, LineSeries, PieChart};

const BAR_WIDTH: usize = 30;
const BAR_GLYPH: char = '█';

/// `₹1,234.50` style amount using the configured symbol, grouped Indian style.
pub fn money(symbol: &str, amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{sign}{symbol}{}.{fraction}", group_indian(whole))
}

/// Groups digits as `12,34,567`: the last three, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

pub fn percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Horizontal bar scaled against `max`. Non-zero values always get one glyph.
pub fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max) * BAR_WIDTH as f64).round() as usize;
    std::iter::repeat(BAR_GLYPH)
        .take(cells.clamp(1, BAR_WIDTH))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

/// Plain-text table with per-column alignment.
pub struct Table {
    headers: Vec<(&'static str, Alignment)>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[(&'static str, Alignment)]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, (header, _))| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .fold(header.chars().count(), usize::max)
            })
            .collect()
    }

    fn render_row(&self, cells: &[String], widths: &[usize]) -> String {
        self.headers
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(idx, ((_, alignment), width))| {
                let text = cells.get(idx).map(String::as_str).unwrap_or("");
                let pad = width.saturating_sub(text.chars().count());
                match alignment {
                    Alignment::Left => format!("{text}{}", " ".repeat(pad)),
                    Alignment::Right => format!("{}{text}", " ".repeat(pad)),
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    }

    pub fn render(&self) -> Vec<String> {
        let widths = self.widths();
        let header: Vec<String> = self
            .headers
            .iter()
            .map(|(name, _)| name.to_string())
            .collect();
        let rule_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        let mut lines = vec![
            format!("  {}", self.render_row(&header, &widths)),
            format!("  {}", "-".repeat(rule_width)),
        ];
        lines.extend(
            self.rows
                .iter()
                .map(|row| format!("  {}", self.render_row(row, &widths))),
        );
        lines
    }
}

/// Aligned `label  value` rows.
pub fn two_column(entries: &[(&str, String)]) -> Vec<String> {
    let width = entries
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    entries
        .iter()
        .map(|(label, value)| {
            let pad = width.saturating_sub(label.chars().count());
            format!("  {label}{}  {value}", " ".repeat(pad))
        })
        .collect()
}

/// Legend of the pie chart: one row per category, largest first.
pub fn pie_lines(chart: &PieChart, symbol: &str) -> Vec<String> {
    let mut table = Table::new(&[
        ("Category", Alignment::Left),
        ("Amount", Alignment::Right),
        ("Share", Alignment::Right),
        ("Color", Alignment::Left),
        ("", Alignment::Left),
    ]);
    let max = chart
        .slices
        .first()
        .map(|slice| slice.amount)
        .unwrap_or(0.0);
    for slice in &chart.slices {
        table.push(vec![
            slice.name.clone(),
            money(symbol, slice.amount),
            percent(slice.percent),
            slice.color.to_string(),
            bar(slice.amount, max),
        ]);
    }
    let mut lines = table.render();
    lines.push(format!("  Total: {}", money(symbol, chart.total)));
    lines
}

/// Line chart rendered as one bar per period bucket, oldest first.
pub fn line_lines(series: &LineSeries, symbol: &str) -> Vec<String> {
    let max = series.max();
    let key_width = series
        .points
        .iter()
        .map(|point| point.key.to_string().len())
        .max()
        .unwrap_or(0);
    let label_width = series
        .points
        .iter()
        .map(|point| point.label.chars().count())
        .max()
        .unwrap_or(0);
    series
        .points
        .iter()
        .map(|point| {
            let label_pad = label_width.saturating_sub(point.label.chars().count());
            format!(
                "  {:<key_width$}  {}{}  {:>12}  {}",
                point.key.to_string(),
                point.label,
                " ".repeat(label_pad),
                money(symbol, point.value),
                bar(point.value, max),
            )
        })
        .collect()
}

pub fn budget_lines(status: &BudgetStatus, symbol: &str) -> Vec<String> {
    let mut rows = vec![
        ("Budget", money(symbol, status.budget)),
        ("Spent this month", money(symbol, status.spent)),
        ("Remaining", money(symbol, status.remaining)),
    ];
    if let Some(used) = status.percent_used {
        rows.push(("Used", percent(used)));
    }
    rows.push(("Status", status.state.label().to_string()));
    two_column(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_groups_digits_indian_style() {
        assert_eq!(money("₹", 0.0), "₹0.00");
        assert_eq!(money("₹", 950.5), "₹950.50");
        assert_eq!(money("₹", 1234.5), "₹1,234.50");
        assert_eq!(money("₹", 1234567.0), "₹12,34,567.00");
        assert_eq!(money("$", -42.5), "-$42.50");
    }

    #[test]
    fn bar_scales_against_maximum() {
        assert_eq!(bar(0.0, 100.0), "");
        assert_eq!(bar(100.0, 100.0).chars().count(), BAR_WIDTH);
        assert_eq!(bar(0.01, 100.0).chars().count(), 1);
    }

    #[test]
    fn table_aligns_columns() {
        let mut table = Table::new(&[("Name", Alignment::Left), ("Amount", Alignment::Right)]);
        table.push(vec!["Food".into(), "₹10.00".into()]);
        table.push(vec!["Transport".into(), "₹1,200.00".into()]);
        let lines = table.render();
        assert_eq!(lines[0], "  Name          Amount");
        assert_eq!(lines[2], "  Food          ₹10.00");
        assert_eq!(lines[3], "  Transport  ₹1,200.00");
    }
}
