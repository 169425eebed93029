//! Expense report: operating expenses and salary settlements in one list.

use super::mutation::run_mutation;
use super::query::{ListQuery, fetch_collection};
use super::validate::{Checks, Validate};
use crate::api::{Method, paths, send_json};
use crate::context::AppContext;
use crate::errors::{FieldError, Result};
use crate::models::{ExpenseKind, ExpenseReportRow, ExpenseRow, PaymentMode};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::instrument;

const DATE_PARAM_FORMAT: &str = "%Y-%m-%d";

/// Report filters: row kind and an inclusive date range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    /// Only expenses or only salaries; both when unset
    pub kind: Option<ExpenseKind>,
    /// Earliest date included
    pub from: Option<NaiveDate>,
    /// Latest date included
    pub to: Option<NaiveDate>,
}

impl ExpenseFilter {
    /// Filter values as query parameters
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(kind) = self.kind {
            query.push(("type".to_string(), kind.as_param().to_string()));
        }
        if let Some(from) = self.from {
            query.push(("from".to_string(), from.format(DATE_PARAM_FORMAT).to_string()));
        }
        if let Some(to) = self.to {
            query.push(("to".to_string(), to.format(DATE_PARAM_FORMAT).to_string()));
        }
        query
    }

    /// Writes the filter into a report's view. Returns true if anything changed.
    pub fn apply(&self, list: &mut ListQuery<ExpenseReportRow>) -> bool {
        let view = list.view_mut();
        let kind = view.set_filter("type", self.kind.map(ExpenseKind::as_param));
        let from = view.set_filter(
            "from",
            self.from
                .map(|d| d.format(DATE_PARAM_FORMAT).to_string())
                .as_deref(),
        );
        let to = view.set_filter(
            "to",
            self.to
                .map(|d| d.format(DATE_PARAM_FORMAT).to_string())
                .as_deref(),
        );
        kind || from || to
    }
}

/// The merged report, paginated and filtered server-side.
#[must_use]
pub fn expense_report(ctx: &AppContext) -> ListQuery<ExpenseReportRow> {
    ListQuery::for_context(ctx, paths::expense_report())
}

/// Totals per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    /// Sum of operating expenses
    pub expense_total: f64,
    /// Sum of salaries
    pub salary_total: f64,
    /// Number of expense rows
    pub expense_count: usize,
    /// Number of salary rows
    pub salary_count: usize,
}

impl ExpenseSummary {
    /// Totals the given rows.
    #[must_use]
    pub fn from_rows(rows: &[ExpenseReportRow]) -> Self {
        rows.iter().fold(Self::default(), |mut summary, row| {
            match row.kind() {
                ExpenseKind::Expense => {
                    summary.expense_total += row.amount();
                    summary.expense_count += 1;
                }
                ExpenseKind::Salary => {
                    summary.salary_total += row.amount();
                    summary.salary_count += 1;
                }
            }
            summary
        })
    }

    /// Everything spent
    #[must_use]
    pub fn total(&self) -> f64 {
        self.expense_total + self.salary_total
    }
}

/// Totals every row matching `filter`, not just the displayed page.
#[instrument(skip(ctx))]
pub async fn expense_summary(ctx: &AppContext, filter: &ExpenseFilter) -> Result<ExpenseSummary> {
    let mut query = filter.to_query();
    if let Some(gym_id) = ctx.tenant() {
        query.push(("gymId".to_string(), gym_id.to_string()));
    }
    let rows: Vec<ExpenseReportRow> =
        fetch_collection(ctx, &paths::expense_report(), &query).await?;
    Ok(ExpenseSummary::from_rows(&rows))
}

/// Form for recording an operating expense
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseForm {
    /// Date incurred
    pub date: Option<NaiveDate>,
    /// Category
    pub category: String,
    /// Details
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Amount spent
    pub amount: f64,
    /// How it was paid
    pub payment_mode: PaymentMode,
}

impl Validate for ExpenseForm {
    fn validate(&self) -> Vec<FieldError> {
        Checks::new()
            .ensure(self.date.is_some(), "date", "Date is required")
            .required("category", &self.category, "Category")
            .positive("amount", self.amount, "Amount")
            .finish()
    }
}

/// Records an operating expense.
#[instrument(skip_all, fields(category = %form.category, amount = form.amount))]
pub async fn create_expense(ctx: &AppContext, form: &ExpenseForm) -> Result<ExpenseRow> {
    form.check()?;
    run_mutation(
        ctx,
        &[&[paths::EXPENSES], &[paths::REPORTS]],
        "Expense recorded successfully",
        send_json(ctx.backend.as_ref(), Method::Post, paths::EXPENSES, form),
    )
    .await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{FakeBackend, test_context};
    use serde_json::{Value, json};

    fn expense_row(id: &str, date: &str, category: &str, amount: f64) -> Value {
        json!({
            "type": "EXPENSE",
            "id": id,
            "date": date,
            "category": category,
            "amount": amount
        })
    }

    fn salary_row(id: &str, date: &str, staff_name: &str, amount: f64) -> Value {
        json!({
            "type": "SALARY",
            "id": id,
            "date": date,
            "staffName": staff_name,
            "designation": "Trainer",
            "amount": amount
        })
    }

    fn seed_report(backend: &FakeBackend) {
        let rows = [
            expense_row("e1", "2026-03-01", "Rent", 25_000.0),
            expense_row("e2", "2026-03-15", "Equipment", 4_000.0),
            salary_row("s1", "2026-03-05", "Ravi", 18_000.0),
        ];
        for row in rows {
            backend.seed("reports/expenses", row);
        }
    }

    #[test]
    fn test_summary_totals_by_kind() {
        let rows: Vec<ExpenseReportRow> = serde_json::from_value(json!([
            expense_row("e1", "2026-03-01", "Rent", 100.0),
            salary_row("s1", "2026-03-05", "Ravi", 50.0),
            expense_row("e2", "2026-03-07", "Power", 25.5)
        ]))
        .unwrap();

        let summary = ExpenseSummary::from_rows(&rows);
        assert_eq!(summary.expense_count, 2);
        assert_eq!(summary.salary_count, 1);
        assert!((summary.total() - 175.5).abs() < 0.005);
    }

    #[test]
    fn test_filter_query_params() {
        let filter = ExpenseFilter {
            kind: Some(ExpenseKind::Salary),
            from: NaiveDate::from_ymd_opt(2026, 3, 1),
            to: None,
        };
        assert_eq!(
            filter.to_query(),
            vec![
                ("type".to_string(), "SALARY".to_string()),
                ("from".to_string(), "2026-03-01".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_report_filters_by_kind_server_side() {
        let backend = FakeBackend::new();
        seed_report(&backend);
        let (ctx, _rx) = test_context(backend.clone());

        let mut report = expense_report(&ctx);
        let filter = ExpenseFilter {
            kind: Some(ExpenseKind::Expense),
            ..ExpenseFilter::default()
        };
        assert!(filter.apply(&mut report));
        report.refresh(&ctx).await.unwrap();

        assert_eq!(report.items().len(), 2);
        assert!(report.items().iter().all(|row| row.kind() == ExpenseKind::Expense));
        assert_eq!(report.pagination().unwrap().total, 2);
        assert!(!filter.apply(&mut report));
    }

    #[tokio::test]
    async fn test_summary_covers_every_matching_row() {
        let backend = FakeBackend::new();
        seed_report(&backend);
        let (ctx, _rx) = test_context(backend);

        let summary = expense_summary(&ctx, &ExpenseFilter::default()).await.unwrap();
        assert!((summary.expense_total - 29_000.0).abs() < 0.005);
        assert!((summary.salary_total - 18_000.0).abs() < 0.005);
    }

    #[tokio::test]
    async fn test_summary_spans_every_page_of_the_report() {
        let backend = FakeBackend::new();
        for day in 1..=12 {
            let row = expense_row(&format!("e{day}"), &format!("2026-03-{day:02}"), "Power", 100.0);
            backend.seed("reports/expenses", row);
        }
        backend.seed("reports/expenses", salary_row("s1", "2026-03-31", "Ravi", 18_000.0));
        let (ctx, _rx) = test_context(backend.clone());

        let summary = expense_summary(&ctx, &ExpenseFilter::default()).await.unwrap();

        assert_eq!(summary.expense_count, 12);
        assert_eq!(summary.salary_count, 1);
        assert!((summary.total() - 19_200.0).abs() < 0.005);
        let pages: Vec<Option<String>> = backend
            .requests()
            .iter()
            .filter(|r| r.label == "GET reports/expenses")
            .map(|r| r.param("page"))
            .collect();
        assert_eq!(pages, vec![None, Some("2".to_string())]);
    }

    #[tokio::test]
    async fn test_create_expense_invalidates_report() {
        let backend = FakeBackend::new();
        seed_report(&backend);
        let (ctx, _rx) = test_context(backend.clone());
        let mut report = expense_report(&ctx);
        report.refresh(&ctx).await.unwrap();

        let form = ExpenseForm {
            date: NaiveDate::from_ymd_opt(2026, 3, 20),
            category: "Cleaning".to_string(),
            description: String::new(),
            amount: 1_200.0,
            payment_mode: PaymentMode::Upi,
        };
        let row = create_expense(&ctx, &form).await.unwrap();
        assert_eq!(row.category, "Cleaning");
        assert!(ctx.cache.is_empty().await);
    }
}
