//! Client-side bucketing of expenses for the pie and line charts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use spendify_domain::{AggregationPeriod, Category, DateWindow, Expense, PeriodKey, Session};
use tracing::debug;

use crate::{
    backend::{Backend, ExpenseQuery},
    expense_service::{category_names, resolve_name},
    CoreError,
};

/// Colors assigned to pie slices in order, wrapping after the last one.
pub const PIE_PALETTE: [&str; 15] = [
    "#FF66D4", "#FEAE65", "#E6F690", "#AADEA7", "#64C2A6", "#2D87BB", "#fd7f6f", "#7eb0d5",
    "#b2e061", "#bd7ebe", "#ffb55a", "#ffee65", "#beb9db", "#fdcce5", "#8bd3c7",
];

pub fn palette_color(index: usize) -> &'static str {
    PIE_PALETTE[index % PIE_PALETTE.len()]
}

/// Expense sums per period bucket and category name, keys in chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodGroups {
    period: AggregationPeriod,
    buckets: BTreeMap<PeriodKey, BTreeMap<String, f64>>,
}

impl PeriodGroups {
    pub fn period(&self) -> AggregationPeriod {
        self.period
    }

    pub fn keys(&self) -> impl Iterator<Item = &PeriodKey> {
        self.buckets.keys()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket(&self, key: &PeriodKey) -> Option<&BTreeMap<String, f64>> {
        self.buckets.get(key)
    }

    pub fn total(&self, key: &PeriodKey) -> f64 {
        self.bucket(key)
            .map(|bucket| bucket.values().sum())
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinePoint {
    pub key: PeriodKey,
    /// Axis label; empty when thinned out.
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub period: AggregationPeriod,
    pub points: Vec<LinePoint>,
}

impl LineSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|point| point.label.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.value).collect()
    }

    pub fn max(&self) -> f64 {
        self.points
            .iter()
            .map(|point| point.value)
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: String,
    pub amount: f64,
    pub percent: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub window: DateWindow,
    pub slices: Vec<PieSlice>,
    pub total: f64,
}

impl PieChart {
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// Everything the analytics screen shows for one period and selected date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartReport {
    pub period: AggregationPeriod,
    pub selected: NaiveDate,
    /// Human label for the selected bucket, e.g. `2024-06` for a month.
    pub label: String,
    pub pie: PieChart,
    pub line: LineSeries,
}

pub struct AnalyticsService;

impl AnalyticsService {
    /// Single pass over `expenses`, summing per bucket and per category name.
    pub fn group_by_period(
        expenses: &[Expense],
        categories: &[Category],
        period: AggregationPeriod,
    ) -> PeriodGroups {
        let names = category_names(categories);
        let mut buckets: BTreeMap<PeriodKey, BTreeMap<String, f64>> = BTreeMap::new();
        for expense in expenses {
            let key = period.bucket_key(expense.expense_date);
            let name = resolve_name(&names, expense.category_id);
            *buckets.entry(key).or_default().entry(name).or_insert(0.0) += expense.amount;
        }
        PeriodGroups { period, buckets }
    }

    pub fn line_series(groups: &PeriodGroups) -> LineSeries {
        let count = groups.len();
        let interval = label_interval(groups.period, count);
        let points = groups
            .buckets
            .iter()
            .enumerate()
            .map(|(index, (key, bucket))| LinePoint {
                key: *key,
                label: if index % interval == 0 {
                    key.chart_label()
                } else {
                    String::new()
                },
                value: bucket.values().sum(),
            })
            .collect();
        LineSeries {
            period: groups.period,
            points,
        }
    }

    /// Pie for the bucket that contains `selected`.
    pub fn pie_chart(groups: &PeriodGroups, selected: NaiveDate) -> Result<PieChart, CoreError> {
        let key = groups.period.bucket_key(selected);
        let amounts: Vec<(String, f64)> = groups
            .bucket(&key)
            .map(|bucket| bucket.iter().map(|(name, amount)| (name.clone(), *amount)).collect())
            .unwrap_or_default();
        Ok(build_pie(key.window()?, amounts))
    }

    /// Pie over an arbitrary date window, used for custom ranges.
    pub fn range_chart(
        expenses: &[Expense],
        categories: &[Category],
        window: DateWindow,
    ) -> PieChart {
        let names = category_names(categories);
        let mut sums: BTreeMap<String, f64> = BTreeMap::new();
        for expense in expenses
            .iter()
            .filter(|expense| window.contains(expense.expense_date))
        {
            *sums
                .entry(resolve_name(&names, expense.category_id))
                .or_insert(0.0) += expense.amount;
        }
        build_pie(window, sums.into_iter().collect())
    }

    pub fn chart_report(
        expenses: &[Expense],
        categories: &[Category],
        period: AggregationPeriod,
        selected: NaiveDate,
    ) -> Result<ChartReport, CoreError> {
        let groups = Self::group_by_period(expenses, categories, period);
        debug!(%period, buckets = groups.len(), "expenses grouped");
        Ok(ChartReport {
            period,
            selected,
            label: period.bucket_key(selected).to_string(),
            pie: Self::pie_chart(&groups, selected)?,
            line: Self::line_series(&groups),
        })
    }

    /// Loads the user's expenses and categories and builds a [`ChartReport`].
    pub fn load_report(
        backend: &dyn Backend,
        user: &Session,
        period: AggregationPeriod,
        selected: NaiveDate,
    ) -> Result<ChartReport, CoreError> {
        let expenses = backend.list_expenses(&ExpenseQuery::for_user(user.user_id))?;
        let categories = backend.list_categories(user.user_id)?;
        Self::chart_report(&expenses, &categories, period, selected)
    }

    /// Custom inclusive range `first..=last`; the last day must come after the first.
    pub fn load_range(
        backend: &dyn Backend,
        user: &Session,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<PieChart, CoreError> {
        let window = DateWindow::inclusive(first, last)?;
        let expenses =
            backend.list_expenses(&ExpenseQuery::for_user(user.user_id).within(window))?;
        let categories = backend.list_categories(user.user_id)?;
        Ok(Self::range_chart(&expenses, &categories, window))
    }
}

/// Every n-th label is kept so the axis does not overlap.
fn label_interval(period: AggregationPeriod, count: usize) -> usize {
    let interval = match period {
        AggregationPeriod::Day if count > 7 => count.div_ceil(5),
        AggregationPeriod::Month if count > 12 => count.div_ceil(6),
        AggregationPeriod::Year if count > 5 => count.div_ceil(4),
        _ => 1,
    };
    interval.max(1)
}

fn build_pie(window: DateWindow, mut amounts: Vec<(String, f64)>) -> PieChart {
    amounts.sort_by(|(name_a, amount_a), (name_b, amount_b)| {
        amount_b
            .total_cmp(amount_a)
            .then_with(|| name_a.cmp(name_b))
    });
    let total: f64 = amounts.iter().map(|(_, amount)| amount).sum();
    let slices = amounts
        .into_iter()
        .enumerate()
        .map(|(index, (name, amount))| PieSlice {
            percent: if total > 0.0 { amount / total * 100.0 } else { 0.0 },
            name,
            amount,
            color: palette_color(index),
        })
        .collect();
    PieChart {
        window,
        slices,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use spendify_domain::{DateWindowError, NewExpense};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        user: Uuid,
        categories: Vec<Category>,
    }

    impl Fixture {
        fn new(names: &[&str]) -> Self {
            let user = Uuid::new_v4();
            let categories = names
                .iter()
                .map(|name| Category::new(user, *name, Utc::now()))
                .collect();
            Self { user, categories }
        }

        fn expense(&self, category: usize, amount: f64, on: NaiveDate) -> Expense {
            Expense::from_draft(
                &NewExpense::new(self.user, self.categories[category].id, amount, on),
                Utc::now(),
            )
        }
    }

    #[test]
    fn groups_by_week_starting_sunday() {
        let fx = Fixture::new(&["Food", "Rent"]);
        let expenses = vec![
            fx.expense(0, 10.0, date(2024, 6, 2)), // Sunday
            fx.expense(1, 20.0, date(2024, 6, 8)), // Saturday, same week
            fx.expense(0, 5.0, date(2024, 6, 9)),  // next Sunday
        ];
        let groups = AnalyticsService::group_by_period(&expenses, &fx.categories, AggregationPeriod::Week);
        let keys: Vec<String> = groups.keys().map(|key| key.to_string()).collect();
        assert_eq!(keys, vec!["2024-06-02", "2024-06-09"]);
        let first = groups.keys().next().copied().unwrap();
        assert_eq!(groups.total(&first), 30.0);
    }

    #[test]
    fn line_points_are_chronological_sums() {
        let fx = Fixture::new(&["Food", "Rent"]);
        let expenses = vec![
            fx.expense(0, 10.0, date(2024, 3, 5)),
            fx.expense(1, 500.0, date(2024, 1, 1)),
            fx.expense(0, 15.0, date(2024, 3, 20)),
        ];
        let groups = AnalyticsService::group_by_period(&expenses, &fx.categories, AggregationPeriod::Month);
        let line = AnalyticsService::line_series(&groups);
        assert_eq!(line.labels(), vec!["Jan 24", "Mar 24"]);
        assert_eq!(line.values(), vec![500.0, 25.0]);
        assert_eq!(line.max(), 500.0);
    }

    #[test]
    fn daily_labels_are_thinned_past_a_week() {
        let fx = Fixture::new(&["Food"]);
        let expenses: Vec<Expense> = (1..=10)
            .map(|day| fx.expense(0, day as f64, date(2024, 6, day)))
            .collect();
        let groups = AnalyticsService::group_by_period(&expenses, &fx.categories, AggregationPeriod::Day);
        let line = AnalyticsService::line_series(&groups);
        // ceil(10 / 5) = 2: every other label survives.
        assert_eq!(
            line.labels(),
            vec!["1/6", "", "3/6", "", "5/6", "", "7/6", "", "9/6", ""]
        );
    }

    #[test]
    fn short_series_keep_every_label() {
        assert_eq!(label_interval(AggregationPeriod::Day, 7), 1);
        assert_eq!(label_interval(AggregationPeriod::Week, 40), 1);
        assert_eq!(label_interval(AggregationPeriod::Month, 13), 3);
        assert_eq!(label_interval(AggregationPeriod::Year, 6), 2);
    }

    #[test]
    fn pie_uses_selected_bucket_sorted_descending() {
        let fx = Fixture::new(&["Food", "Rent", "Travel"]);
        let expenses = vec![
            fx.expense(0, 100.0, date(2024, 6, 3)),
            fx.expense(1, 300.0, date(2024, 6, 10)),
            fx.expense(2, 100.0, date(2024, 6, 12)),
            fx.expense(0, 999.0, date(2024, 5, 31)),
        ];
        let groups = AnalyticsService::group_by_period(&expenses, &fx.categories, AggregationPeriod::Month);
        let pie = AnalyticsService::pie_chart(&groups, date(2024, 6, 20)).unwrap();

        let names: Vec<_> = pie.slices.iter().map(|slice| slice.name.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Food", "Travel"]);
        assert_eq!(pie.total, 500.0);
        assert_eq!(pie.slices[0].percent, 60.0);
        assert_eq!(pie.slices[0].color, PIE_PALETTE[0]);
        assert_eq!(pie.slices[2].color, PIE_PALETTE[2]);
        assert_eq!(pie.window, DateWindow::month_of(date(2024, 6, 1)).unwrap());
    }

    #[test]
    fn pie_for_empty_bucket_is_empty() {
        let fx = Fixture::new(&["Food"]);
        let expenses = vec![fx.expense(0, 10.0, date(2024, 6, 3))];
        let groups = AnalyticsService::group_by_period(&expenses, &fx.categories, AggregationPeriod::Day);
        let pie = AnalyticsService::pie_chart(&groups, date(2024, 6, 4)).unwrap();
        assert!(pie.is_empty());
        assert_eq!(pie.total, 0.0);
    }

    #[test]
    fn range_chart_filters_inclusive_window() {
        let fx = Fixture::new(&["Food", "Rent"]);
        let expenses = vec![
            fx.expense(0, 10.0, date(2024, 6, 1)),
            fx.expense(1, 20.0, date(2024, 6, 5)),
            fx.expense(1, 40.0, date(2024, 6, 6)),
        ];
        let window = DateWindow::inclusive(date(2024, 6, 1), date(2024, 6, 5)).unwrap();
        let pie = AnalyticsService::range_chart(&expenses, &fx.categories, window);
        assert_eq!(pie.total, 30.0);
        assert_eq!(pie.slices[0].name, "Rent");
    }

    #[test]
    fn report_on_the_last_calendar_day_is_an_error() {
        let fx = Fixture::new(&["Food"]);
        let expenses = vec![fx.expense(0, 10.0, date(2024, 6, 3))];
        for period in AggregationPeriod::ALL {
            let err =
                AnalyticsService::chart_report(&expenses, &fx.categories, period, NaiveDate::MAX)
                    .unwrap_err();
            assert!(matches!(err, CoreError::DateRange(DateWindowError::OutOfRange(_))));
        }
    }

    #[test]
    fn palette_wraps_after_fifteen_slices() {
        assert_eq!(palette_color(15), PIE_PALETTE[0]);
        assert_eq!(palette_color(16), PIE_PALETTE[1]);
    }
}
