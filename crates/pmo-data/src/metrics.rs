//! Composite metric pipelines shared by the dashboard, report, and summary.
//!
//! Each product is a pure function over already-normalized tables, composed
//! from the primitives in [`crate::aggregate`] in the fixed order: aggregate
//! child tables independently, left-join onto the parent, fill absent with
//! zero, then derive ratios. Computing ratios before the join-fill would
//! conflate "no child rows" with a genuine zero.

use pmo_core::value::Value;

use crate::aggregate::{
    fill_zero, group_count, group_mean, group_sum, join_left, month_key, top_n, utilization_pct,
    variance,
};
use crate::table::Table;

/// Per-project financial position.
///
/// Joins expense and purchase-order sums onto the projects table and derives
/// `total_actuals`, `budget_variance`, and `utilization_pct` per row.
pub fn financial_health(projects: &Table, expenses: &Table, purchase_orders: &Table) -> Table {
    let expense_sums = group_sum(expenses, "project_id", "amount_aed", "total_expenses");
    let po_sums = group_sum(purchase_orders, "project_id", "amount_aed", "total_pos");

    let joined = join_left(projects, &expense_sums, "project_id");
    let joined = join_left(&joined, &po_sums, "project_id");
    let filled = fill_zero(&joined, &["total_expenses", "total_pos"]);

    filled
        .with_derived_column("total_actuals", |t, i| {
            (t.num(i, "total_expenses") + t.num(i, "total_pos")).into()
        })
        .with_derived_column("budget_variance", |t, i| {
            variance(t.num(i, "budget_aed"), t.num(i, "total_actuals")).into()
        })
        .with_derived_column("utilization_pct", |t, i| {
            utilization_pct(t.num(i, "total_actuals"), t.num(i, "budget_aed")).into()
        })
}

/// Projects spending over budget, worst first. `[.., budget_variance < 0]`
pub fn over_budget(financial: &Table, n: usize) -> Table {
    let over = financial.filtered(|t, i| t.num(i, "budget_variance") < 0.0);
    top_n(&over, n, "budget_variance", false)
}

/// Mean budget utilization per project status.
pub fn utilization_by_status(financial: &Table) -> Table {
    group_mean(financial, "status", "utilization_pct", "avg_utilization")
}

/// Expense totals bucketed by calendar month, ascending.
///
/// Expenses whose date failed to parse carry no month and are left out of
/// the trend (they still count in every non-dated total).
pub fn monthly_expense_trend(expenses: &Table) -> Table {
    let with_month = expenses.with_derived_column("month", |t, i| {
        match t.get(i, "date").and_then(Value::as_date) {
            Some(d) => Value::Text(month_key(d)),
            None => Value::Absent,
        }
    });
    let grouped = group_sum(&with_month, "month", "amount_aed", "amount_aed");
    grouped.filtered(|t, i| !t.text(i, "month").is_empty())
}

/// Billable vs non-billable logged hours.
pub fn billable_split(timesheets: &Table) -> Table {
    let grouped = group_sum(timesheets, "is_billable", "hours_logged", "hours");
    let mut out = Table::with_columns("billable_split", &["category", "hours"]);
    for i in 0..grouped.len() {
        let label = match grouped.text(i, "is_billable").as_str() {
            "true" => "Billable",
            "false" => "Non-Billable",
            _ => "Unrecorded",
        };
        out.push_row(vec![label.into(), grouped.num(i, "hours").into()]);
    }
    out
}

/// Total project budget per client industry, descending.
pub fn budget_by_industry(projects: &Table, clients: &Table) -> Table {
    let joined = join_left(projects, clients, "client_id");
    let grouped = group_sum(&joined, "industry", "budget_aed", "budget_aed");
    top_n(&grouped, grouped.len(), "budget_aed", true)
}

/// Top `n` employees by logged hours, with names joined on.
pub fn top_loggers(timesheets: &Table, employees: &Table, n: usize) -> Table {
    let sums = group_sum(timesheets, "employee_id", "hours_logged", "hours_logged");
    let named = join_left(&sums, employees, "employee_id");
    top_n(&named, n, "hours_logged", true)
}

/// Top `n` vendors by purchase-order spend, with names and categories.
pub fn vendor_spend(purchase_orders: &Table, vendors: &Table, n: usize) -> Table {
    let sums = group_sum(purchase_orders, "vendor_id", "amount_aed", "amount_aed");
    let named = join_left(&sums, vendors, "vendor_id");
    top_n(&named, n, "amount_aed", true)
}

/// Top `n` projects by open risk count, with project names.
pub fn risk_counts_by_project(risks: &Table, projects: &Table, n: usize) -> Table {
    let counts = group_count(risks, "project_id", "risk_count");
    let named = join_left(&counts, projects, "project_id");
    top_n(&named, n, "risk_count", true)
}

/// Project types carrying the most high-impact risks.
pub fn high_impact_risk_types(risks: &Table, projects: &Table, n: usize) -> Table {
    let joined = join_left(risks, projects, "project_id");
    let high = joined.filtered(|t, i| t.text(i, "impact") == "High");
    let counts = group_count(&high, "type", "count");
    top_n(&counts, n, "count", true)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn projects() -> Table {
        let mut t = Table::with_columns(
            "projects",
            &["project_id", "project_name", "status", "budget_aed"],
        );
        t.push_row(vec!["P1".into(), "Tower".into(), "In Progress".into(), 100.0.into()]);
        t.push_row(vec!["P2".into(), "Metro".into(), "In Progress".into(), 200.0.into()]);
        t.push_row(vec!["P3".into(), "Bridge".into(), "Planned".into(), 300.0.into()]);
        t
    }

    fn expenses() -> Table {
        let mut t = Table::with_columns("expenses", &["expense_id", "project_id", "amount_aed", "date"]);
        t.push_row(vec!["E1".into(), "P1".into(), 30.0.into(), date(2024, 1, 5)]);
        t.push_row(vec!["E2".into(), "P1".into(), 20.0.into(), date(2024, 2, 10)]);
        t.push_row(vec!["E3".into(), "P2".into(), 250.0.into(), date(2024, 1, 20)]);
        t
    }

    fn purchase_orders() -> Table {
        Table::with_columns("purchase_orders", &["po_id", "project_id", "vendor_id", "amount_aed"])
    }

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    // ── financial_health ─────────────────────────────────────────────────────

    #[test]
    fn test_financial_health_scenario() {
        let fin = financial_health(&projects(), &expenses(), &purchase_orders());
        assert_eq!(fin.len(), 3);

        // budgets [100, 200, 300], actuals [50, 250, 0]
        assert_eq!(fin.num(0, "total_actuals"), 50.0);
        assert_eq!(fin.num(1, "total_actuals"), 250.0);
        assert_eq!(fin.num(2, "total_actuals"), 0.0);

        assert_eq!(fin.num(0, "budget_variance"), 50.0);
        assert_eq!(fin.num(1, "budget_variance"), -50.0);
        assert_eq!(fin.num(2, "budget_variance"), 300.0);

        assert_eq!(fin.num(0, "utilization_pct"), 50.0);
        assert_eq!(fin.num(1, "utilization_pct"), 125.0);
        assert_eq!(fin.num(2, "utilization_pct"), 0.0);
    }

    #[test]
    fn test_financial_health_includes_po_spend() {
        let mut pos = purchase_orders();
        pos.push_row(vec!["PO1".into(), "P3".into(), "V1".into(), 40.0.into()]);
        let fin = financial_health(&projects(), &expenses(), &pos);
        assert_eq!(fin.num(2, "total_actuals"), 40.0);
        assert_eq!(fin.num(2, "budget_variance"), 260.0);
    }

    #[test]
    fn test_financial_health_empty_children_all_zero() {
        let empty_exp = Table::with_columns("expenses", &["expense_id", "project_id", "amount_aed"]);
        let fin = financial_health(&projects(), &empty_exp, &purchase_orders());
        for i in 0..fin.len() {
            assert_eq!(fin.num(i, "total_actuals"), 0.0);
            assert_eq!(fin.num(i, "utilization_pct"), 0.0);
        }
        // Variance degenerates to the full budget.
        assert_eq!(fin.num(2, "budget_variance"), 300.0);
    }

    // ── over_budget / utilization_by_status ──────────────────────────────────

    #[test]
    fn test_over_budget_worst_first() {
        let fin = financial_health(&projects(), &expenses(), &purchase_orders());
        let over = over_budget(&fin, 5);
        assert_eq!(over.len(), 1);
        assert_eq!(over.text(0, "project_id"), "P2");
    }

    #[test]
    fn test_utilization_by_status_mean() {
        let fin = financial_health(&projects(), &expenses(), &purchase_orders());
        let by_status = utilization_by_status(&fin);
        // In Progress: (50 + 125) / 2 = 87.5, Planned: 0.
        assert_eq!(by_status.text(0, "status"), "In Progress");
        assert_eq!(by_status.num(0, "avg_utilization"), 87.5);
        assert_eq!(by_status.num(1, "avg_utilization"), 0.0);
    }

    // ── monthly_expense_trend ────────────────────────────────────────────────

    #[test]
    fn test_monthly_trend_buckets_sorted() {
        let trend = monthly_expense_trend(&expenses());
        assert_eq!(trend.len(), 2);
        assert_eq!(trend.text(0, "month"), "2024-01");
        assert_eq!(trend.num(0, "amount_aed"), 280.0);
        assert_eq!(trend.text(1, "month"), "2024-02");
        assert_eq!(trend.num(1, "amount_aed"), 20.0);
    }

    #[test]
    fn test_monthly_trend_skips_undated_rows() {
        let mut e = expenses();
        e.push_row(vec!["E4".into(), "P1".into(), 99.0.into(), Value::Absent]);
        let trend = monthly_expense_trend(&e);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend.sum_column("amount_aed"), 300.0);
    }

    // ── billable_split ───────────────────────────────────────────────────────

    #[test]
    fn test_billable_split_labels() {
        let mut t = Table::with_columns("timesheets", &["employee_id", "hours_logged", "is_billable"]);
        t.push_row(vec!["E1".into(), 8.0.into(), Value::Bool(true)]);
        t.push_row(vec!["E1".into(), 2.0.into(), Value::Bool(false)]);
        t.push_row(vec!["E2".into(), 6.0.into(), Value::Bool(true)]);

        let split = billable_split(&t);
        assert_eq!(split.len(), 2);
        // BTreeMap ordering puts "false" before "true".
        assert_eq!(split.text(0, "category"), "Non-Billable");
        assert_eq!(split.num(0, "hours"), 2.0);
        assert_eq!(split.text(1, "category"), "Billable");
        assert_eq!(split.num(1, "hours"), 14.0);
    }

    // ── joins with reference tables ──────────────────────────────────────────

    #[test]
    fn test_budget_by_industry_descending() {
        let mut p = projects();
        p = p.with_derived_column("client_id", |t, i| {
            Value::Text(if t.text(i, "project_id") == "P1" { "C1" } else { "C2" }.to_string())
        });
        let mut clients = Table::with_columns("clients", &["client_id", "industry"]);
        clients.push_row(vec!["C1".into(), "Real Estate".into()]);
        clients.push_row(vec!["C2".into(), "Transport".into()]);

        let out = budget_by_industry(&p, &clients);
        assert_eq!(out.text(0, "industry"), "Transport");
        assert_eq!(out.num(0, "budget_aed"), 500.0);
        assert_eq!(out.text(1, "industry"), "Real Estate");
        assert_eq!(out.num(1, "budget_aed"), 100.0);
    }

    #[test]
    fn test_top_loggers_joined_names() {
        let mut ts = Table::with_columns("timesheets", &["employee_id", "hours_logged"]);
        ts.push_row(vec!["E1".into(), 10.0.into()]);
        ts.push_row(vec!["E2".into(), 30.0.into()]);
        ts.push_row(vec!["E1".into(), 5.0.into()]);
        let mut emp = Table::with_columns("employees", &["employee_id", "full_name"]);
        emp.push_row(vec!["E1".into(), "Aisha".into()]);
        emp.push_row(vec!["E2".into(), "Omar".into()]);

        let top = top_loggers(&ts, &emp, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top.text(0, "full_name"), "Omar");
        assert_eq!(top.num(0, "hours_logged"), 30.0);
    }

    #[test]
    fn test_vendor_spend_unknown_vendor_retained() {
        let mut pos = purchase_orders();
        pos.push_row(vec!["PO1".into(), "P1".into(), "V1".into(), 100.0.into()]);
        pos.push_row(vec!["PO2".into(), "P1".into(), "V9".into(), 400.0.into()]);
        let mut vendors = Table::with_columns("vendors", &["vendor_id", "vendor_name", "category"]);
        vendors.push_row(vec!["V1".into(), "Al Futtaim".into(), "Materials".into()]);

        let spend = vendor_spend(&pos, &vendors, 5);
        // Unattributed vendor keeps its row with blank name (left join).
        assert_eq!(spend.len(), 2);
        assert_eq!(spend.text(0, "vendor_id"), "V9");
        assert_eq!(spend.text(0, "vendor_name"), "");
        assert_eq!(spend.num(0, "amount_aed"), 400.0);
    }

    #[test]
    fn test_risk_counts_and_high_impact_types() {
        let mut risks = Table::with_columns("risks", &["risk_id", "project_id", "impact"]);
        risks.push_row(vec!["R1".into(), "P1".into(), "High".into()]);
        risks.push_row(vec!["R2".into(), "P1".into(), "Low".into()]);
        risks.push_row(vec!["R3".into(), "P2".into(), "High".into()]);
        let p = projects().with_derived_column("type", |t, i| {
            Value::Text(if t.text(i, "project_id") == "P1" { "Construction" } else { "Infrastructure" }.to_string())
        });

        let counts = risk_counts_by_project(&risks, &p, 5);
        assert_eq!(counts.text(0, "project_id"), "P1");
        assert_eq!(counts.num(0, "risk_count"), 2.0);
        assert_eq!(counts.text(0, "project_name"), "Tower");

        let types = high_impact_risk_types(&risks, &p, 3);
        assert_eq!(types.len(), 2);
        assert_eq!(types.sum_column("count"), 2.0);
    }
}
