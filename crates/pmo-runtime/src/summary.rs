//! Console summary: the exploratory-analysis digest as plain text.
//!
//! One section per analysis, each computed through the same metric pipelines
//! the dashboard uses. Sections whose inputs are unavailable print a notice
//! line instead of being dropped silently.

use pmo_core::formatting::{format_aed_full, format_number, format_pct, percentage};
use pmo_data::aggregate::{group_count, group_mean, top_n};
use pmo_data::metrics;

use crate::store::DataStore;

/// Render the full digest.
pub fn render_summary(store: &DataStore) -> String {
    let mut out = String::new();
    out.push_str("PMO Analytics Summary\n");
    out.push_str("=====================\n");

    financial_section(store, &mut out);
    client_section(store, &mut out);
    resource_section(store, &mut out);
    risk_section(store, &mut out);
    vendor_section(store, &mut out);
    operations_section(store, &mut out);

    out.push('\n');
    out.push_str(&format!("[{}]\n", store.report().summary()));
    out
}

fn section(out: &mut String, title: &str) {
    out.push_str(&format!("\n--- {} ---\n", title));
}

fn unavailable(out: &mut String, what: &str) {
    out.push_str(&format!("  (unavailable: {})\n", what));
}

// ── Sections ──────────────────────────────────────────────────────────────────

fn financial_section(store: &DataStore, out: &mut String) {
    section(out, "Project Financial Health");

    let inputs = (
        store
            .table("projects")
            .filter(|t| t.has_columns(&["project_id", "budget_aed"])),
        store
            .table("expenses")
            .filter(|t| t.has_columns(&["project_id", "amount_aed"])),
        store
            .table("purchase_orders")
            .filter(|t| t.has_columns(&["project_id", "amount_aed"])),
    );
    let (Some(projects), Some(expenses), Some(pos)) = inputs else {
        unavailable(out, "projects, expenses, purchase_orders");
        return;
    };

    let fin = metrics::financial_health(projects, expenses, pos);

    out.push_str("  Top projects over budget:\n");
    let over = metrics::over_budget(&fin, 5);
    if over.is_empty() {
        out.push_str("    none\n");
    }
    for i in 0..over.len() {
        out.push_str(&format!(
            "    {:<28} budget {:>16}  actuals {:>16}  variance {:>16}\n",
            over.text(i, "project_name"),
            format_aed_full(over.num(i, "budget_aed")),
            format_aed_full(over.num(i, "total_actuals")),
            format_aed_full(over.num(i, "budget_variance")),
        ));
    }

    out.push_str("  Avg budget utilization by status:\n");
    let by_status = metrics::utilization_by_status(&fin);
    for i in 0..by_status.len() {
        out.push_str(&format!(
            "    {:<16} {:>8}\n",
            by_status.text(i, "status"),
            format_pct(by_status.num(i, "avg_utilization")),
        ));
    }
}

fn client_section(store: &DataStore, out: &mut String) {
    section(out, "Client Analysis");

    let inputs = (
        store
            .table("projects")
            .filter(|t| t.has_columns(&["client_id", "budget_aed"])),
        store
            .table("clients")
            .filter(|t| t.has_columns(&["client_id", "industry"])),
    );
    let (Some(projects), Some(clients)) = inputs else {
        unavailable(out, "projects, clients");
        return;
    };

    out.push_str("  Total budget volume by industry:\n");
    let by_industry = metrics::budget_by_industry(projects, clients);
    for i in 0..by_industry.len() {
        out.push_str(&format!(
            "    {:<20} {:>16}\n",
            by_industry.text(i, "industry"),
            format_aed_full(by_industry.num(i, "budget_aed")),
        ));
    }
}

fn resource_section(store: &DataStore, out: &mut String) {
    section(out, "Resource Analysis");

    match store
        .table("employees")
        .filter(|t| t.has_columns(&["department", "salary_aed"]))
    {
        Some(employees) => {
            out.push_str("  Avg salary by department:\n");
            let by_dept = group_mean(employees, "department", "salary_aed", "avg_salary");
            let ordered = top_n(&by_dept, by_dept.len(), "avg_salary", true);
            for i in 0..ordered.len() {
                out.push_str(&format!(
                    "    {:<20} {:>16}\n",
                    ordered.text(i, "department"),
                    format_aed_full(ordered.num(i, "avg_salary")),
                ));
            }
        }
        None => unavailable(out, "employees"),
    }

    let inputs = (
        store
            .table("timesheets")
            .filter(|t| t.has_columns(&["employee_id", "hours_logged"])),
        store.table("employees"),
    );
    match inputs {
        (Some(timesheets), Some(employees)) => {
            out.push_str("  Top employees by logged hours:\n");
            let top = metrics::top_loggers(timesheets, employees, 5);
            for i in 0..top.len() {
                out.push_str(&format!(
                    "    {:<24} {:>10} h\n",
                    top.text(i, "full_name"),
                    format_number(top.num(i, "hours_logged"), 0),
                ));
            }
        }
        _ => unavailable(out, "timesheets, employees"),
    }
}

fn risk_section(store: &DataStore, out: &mut String) {
    section(out, "Risk Analysis");

    let Some(risks) = store.table("risks").filter(|t| t.has_columns(&["impact"])) else {
        unavailable(out, "risks");
        return;
    };

    out.push_str("  Risk count by impact level:\n");
    let by_impact = group_count(risks, "impact", "count");
    let ordered = top_n(&by_impact, by_impact.len(), "count", true);
    for i in 0..ordered.len() {
        out.push_str(&format!(
            "    {:<12} {:>6}\n",
            ordered.text(i, "impact"),
            format_number(ordered.num(i, "count"), 0),
        ));
    }

    if let Some(projects) = store
        .table("projects")
        .filter(|t| t.has_columns(&["project_id", "type"]))
    {
        out.push_str("  Project types with most high-impact risks:\n");
        let types = metrics::high_impact_risk_types(risks, projects, 3);
        if types.is_empty() {
            out.push_str("    none\n");
        }
        for i in 0..types.len() {
            out.push_str(&format!(
                "    {:<20} {:>6}\n",
                types.text(i, "type"),
                format_number(types.num(i, "count"), 0),
            ));
        }
    }
}

fn vendor_section(store: &DataStore, out: &mut String) {
    section(out, "Vendor Analysis");

    let inputs = (
        store
            .table("purchase_orders")
            .filter(|t| t.has_columns(&["vendor_id", "amount_aed"])),
        store.table("vendors"),
    );
    let (Some(pos), Some(vendors)) = inputs else {
        unavailable(out, "purchase_orders, vendors");
        return;
    };

    out.push_str("  Top vendors by spend:\n");
    let top = metrics::vendor_spend(pos, vendors, 5);
    for i in 0..top.len() {
        out.push_str(&format!(
            "    {:<24} {:>16}\n",
            top.text(i, "vendor_name"),
            format_aed_full(top.num(i, "amount_aed")),
        ));
    }
}

fn operations_section(store: &DataStore, out: &mut String) {
    section(out, "Task & Operational Efficiency");

    match store.table("tasks").filter(|t| t.has_columns(&["status"])) {
        Some(tasks) => {
            out.push_str("  Task status distribution:\n");
            let by_status = group_count(tasks, "status", "count");
            for i in 0..by_status.len() {
                let share = percentage(by_status.num(i, "count"), tasks.len() as f64, 1);
                out.push_str(&format!(
                    "    {:<16} {:>8}\n",
                    by_status.text(i, "status"),
                    format_pct(share),
                ));
            }
        }
        None => unavailable(out, "tasks"),
    }

    match store
        .table("timesheets")
        .filter(|t| t.has_columns(&["is_billable", "hours_logged"]))
    {
        Some(timesheets) => {
            out.push_str("  Billable vs non-billable hours:\n");
            let split = metrics::billable_split(timesheets);
            for i in 0..split.len() {
                out.push_str(&format!(
                    "    {:<16} {:>10} h\n",
                    split.text(i, "category"),
                    format_number(split.num(i, "hours"), 0),
                ));
            }
        }
        None => unavailable(out, "timesheets"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DataStore;
    use crate::views::tests::fixture_store;
    use pmo_data::loader::DataSet;

    #[test]
    fn test_summary_has_all_sections() {
        let text = render_summary(&fixture_store());
        for title in [
            "Project Financial Health",
            "Client Analysis",
            "Resource Analysis",
            "Risk Analysis",
            "Vendor Analysis",
            "Task & Operational Efficiency",
        ] {
            assert!(text.contains(title), "missing section {title}");
        }
    }

    #[test]
    fn test_summary_figures() {
        let text = render_summary(&fixture_store());
        // P2 is over budget: 200 budget vs 250 expenses.
        assert!(text.contains("Metro Ext"));
        assert!(text.contains("AED -50"));
        // Task distribution: 2 of 4 completed.
        assert!(text.contains("Completed"));
        assert!(text.contains("50.0%"));
        // Billable split from the fixture timesheets.
        assert!(text.contains("Billable"));
        assert!(text.contains("Non-Billable"));
    }

    #[test]
    fn test_summary_marks_unavailable_sections() {
        let store = fixture_store();
        let mut ds = DataSet::default();
        for name in ["projects", "clients", "tasks"] {
            ds.tables
                .insert(name.to_string(), store.table(name).unwrap().clone());
        }
        let store = DataStore::from_dataset(ds);

        let text = render_summary(&store);
        assert!(text.contains("(unavailable: projects, expenses, purchase_orders)"));
        assert!(text.contains("(unavailable: employees)"));
        assert!(text.contains("(unavailable: purchase_orders, vendors)"));
        // Tasks are present, so the distribution still renders.
        assert!(text.contains("Task status distribution"));
    }

    #[test]
    fn test_summary_footer_reports_load_state() {
        let text = render_summary(&fixture_store());
        assert!(text.contains("tables loaded"));
    }
}
