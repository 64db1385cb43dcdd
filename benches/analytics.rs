use chrono::{Duration, NaiveDate, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spendify_core::AnalyticsService;
use spendify_domain::{AggregationPeriod, Category, Expense, NewExpense};
use uuid::Uuid;

fn build_sample(expense_count: usize) -> (Vec<Expense>, Vec<Category>) {
    let user_id = Uuid::new_v4();
    let now = Utc::now();
    let categories: Vec<Category> = ["Food", "Travel", "Rent", "Bills", "Fun"]
        .iter()
        .map(|name| Category::new(user_id, *name, now))
        .collect();

    let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    let expenses = (0..expense_count)
        .map(|idx| {
            let category = &categories[idx % categories.len()];
            let date = start + Duration::days((idx % 1095) as i64);
            let draft = NewExpense::new(user_id, category.id, 20.0 + (idx % 500) as f64, date);
            Expense::from_draft(&draft, now)
        })
        .collect();
    (expenses, categories)
}

fn bench_grouping(c: &mut Criterion) {
    let (expenses, categories) = build_sample(black_box(10_000));

    for period in [
        AggregationPeriod::Day,
        AggregationPeriod::Week,
        AggregationPeriod::Month,
        AggregationPeriod::Year,
    ] {
        c.bench_function(&format!("group_by_{}_10k", period), |b| {
            b.iter(|| AnalyticsService::group_by_period(&expenses, &categories, period))
        });
    }
}

fn bench_report(c: &mut Criterion) {
    let (expenses, categories) = build_sample(black_box(10_000));
    let selected = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
    let groups = AnalyticsService::group_by_period(&expenses, &categories, AggregationPeriod::Day);

    c.bench_function("line_series_daily_10k", |b| {
        b.iter(|| AnalyticsService::line_series(black_box(&groups)))
    });
    c.bench_function("chart_report_weekly_10k", |b| {
        b.iter(|| {
            AnalyticsService::chart_report(
                &expenses,
                &categories,
                AggregationPeriod::Week,
                black_box(selected),
            )
        })
    });
}

criterion_group!(benches, bench_grouping, bench_report);
criterion_main!(benches);
