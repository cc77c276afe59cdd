//! The view-pipeline registry and presenter boundary.
//!
//! Each dashboard page is a named pipeline: required tables/columns, the
//! aggregations to run, and the chart bindings for their results. The
//! presenter does no arithmetic of its own beyond binding aggregate output
//! to chart specifications; every number comes out of `pmo_data`.
//!
//! Anything whose inputs are missing degrades to an unavailable KPI or an
//! omitted chart plus a note. No view ever fails.

use pmo_core::formatting;
use pmo_data::aggregate::{group_count, group_sum, histogram, ratio, top_n};
use pmo_data::metrics;
use pmo_data::table::Table;

use crate::store::DataStore;

// ── ViewId / registry ─────────────────────────────────────────────────────────

/// The six navigable dashboard views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewId {
    ExecutiveOverview,
    ProjectAnalytics,
    FinancialInsights,
    ResourceManagement,
    RiskCompliance,
    VendorAnalysis,
}

impl ViewId {
    /// All views in navigation order.
    pub const ALL: [ViewId; 6] = [
        ViewId::ExecutiveOverview,
        ViewId::ProjectAnalytics,
        ViewId::FinancialInsights,
        ViewId::ResourceManagement,
        ViewId::RiskCompliance,
        ViewId::VendorAnalysis,
    ];

    pub fn title(self) -> &'static str {
        spec(self).title
    }
}

/// Static description of one view pipeline.
pub struct ViewSpec {
    pub id: ViewId,
    pub title: &'static str,
    /// Tables (and the columns within them) this view draws on.
    pub required: &'static [(&'static str, &'static [&'static str])],
    /// Whether the project multi-select filters apply to this view.
    pub filterable: bool,
}

/// The registry of named view pipelines, in navigation order.
pub static REGISTRY: &[ViewSpec] = &[
    ViewSpec {
        id: ViewId::ExecutiveOverview,
        title: "Executive Overview",
        required: &[
            ("projects", &["status", "type", "budget_aed", "location"]),
            ("employees", &[]),
            ("tasks", &["status"]),
        ],
        filterable: false,
    },
    ViewSpec {
        id: ViewId::ProjectAnalytics,
        title: "Project Analytics",
        required: &[(
            "projects",
            &["type", "status", "priority", "budget_aed", "completion_percentage"],
        )],
        filterable: true,
    },
    ViewSpec {
        id: ViewId::FinancialInsights,
        title: "Financial Insights",
        required: &[
            ("projects", &["budget_aed"]),
            ("expenses", &["project_id", "amount_aed"]),
            ("purchase_orders", &["project_id", "amount_aed"]),
        ],
        filterable: false,
    },
    ViewSpec {
        id: ViewId::ResourceManagement,
        title: "Resource Management",
        required: &[
            ("employees", &["department", "salary_aed"]),
            ("timesheets", &["hours_logged"]),
        ],
        filterable: false,
    },
    ViewSpec {
        id: ViewId::RiskCompliance,
        title: "Risk & Compliance",
        required: &[("risks", &["impact", "status"]), ("milestones", &["status"])],
        filterable: false,
    },
    ViewSpec {
        id: ViewId::VendorAnalysis,
        title: "Vendor Analysis",
        required: &[
            ("vendors", &["category", "location"]),
            ("purchase_orders", &["vendor_id", "amount_aed"]),
        ],
        filterable: false,
    },
];

/// Registry entry for a view.
pub fn spec(id: ViewId) -> &'static ViewSpec {
    REGISTRY
        .iter()
        .find(|s| s.id == id)
        .expect("registry covers all view ids")
}

// ── ProjectFilter ─────────────────────────────────────────────────────────────

/// Multi-select filters over the projects table.
///
/// An empty selection in a dimension means "no restriction", so the default
/// filter is the identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilter {
    pub types: Vec<String>,
    pub statuses: Vec<String>,
    pub priorities: Vec<String>,
}

impl ProjectFilter {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.statuses.is_empty() && self.priorities.is_empty()
    }

    /// Toggle `value` in the selection for `dimension` (column name).
    pub fn toggle(&mut self, dimension: &str, value: &str) {
        let list = match dimension {
            "type" => &mut self.types,
            "status" => &mut self.statuses,
            "priority" => &mut self.priorities,
            _ => return,
        };
        match list.iter().position(|v| v == value) {
            Some(i) => {
                list.remove(i);
            }
            None => list.push(value.to_string()),
        }
    }

    /// Drop all selections.
    pub fn clear(&mut self) {
        self.types.clear();
        self.statuses.clear();
        self.priorities.clear();
    }

    /// Projects restricted to the selected values, as a new table.
    pub fn apply(&self, projects: &Table) -> Table {
        if self.is_empty() {
            return projects.clone();
        }
        projects.filtered(|t, i| {
            let keep = |selected: &[String], column: &str| {
                selected.is_empty() || selected.iter().any(|v| *v == t.text(i, column))
            };
            keep(&self.types, "type")
                && keep(&self.statuses, "status")
                && keep(&self.priorities, "priority")
        })
    }
}

// ── KPI / chart specifications ────────────────────────────────────────────────

/// A single scalar summary metric.
#[derive(Debug, Clone, PartialEq)]
pub enum KpiValue {
    /// AED amount, rendered at M/K scale.
    Money(f64),
    /// Integer count.
    Count(u64),
    /// Percentage, one-decimal rendering.
    Pct(f64),
    /// Plain numeric value, grouped, no unit.
    Number(f64),
    /// Pre-formatted text such as `"3/12"`.
    Text(String),
    /// Inputs missing; rendered as `"unavailable"`.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Kpi {
    pub label: String,
    pub value: KpiValue,
}

impl Kpi {
    pub fn money(label: &str, v: f64) -> Self {
        Self { label: label.to_string(), value: KpiValue::Money(v) }
    }
    pub fn count(label: &str, v: u64) -> Self {
        Self { label: label.to_string(), value: KpiValue::Count(v) }
    }
    pub fn pct(label: &str, v: f64) -> Self {
        Self { label: label.to_string(), value: KpiValue::Pct(v) }
    }
    pub fn number(label: &str, v: f64) -> Self {
        Self { label: label.to_string(), value: KpiValue::Number(v) }
    }
    pub fn text(label: &str, v: impl Into<String>) -> Self {
        Self { label: label.to_string(), value: KpiValue::Text(v.into()) }
    }
    pub fn unavailable(label: &str) -> Self {
        Self { label: label.to_string(), value: KpiValue::Unavailable }
    }

    /// Display string for the value.
    pub fn render(&self) -> String {
        match &self.value {
            KpiValue::Money(v) => formatting::format_aed(*v),
            KpiValue::Count(v) => formatting::format_number(*v as f64, 0),
            KpiValue::Pct(v) => formatting::format_pct(*v),
            KpiValue::Number(v) => formatting::format_number(*v, 0),
            KpiValue::Text(s) => s.clone(),
            KpiValue::Unavailable => "unavailable".to_string(),
        }
    }
}

/// Chart family a series should be drawn as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Pie,
    Bar,
    HBar,
    Histogram,
    Scatter,
    Line,
    Treemap,
}

/// Data bound to a chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    /// Labelled magnitudes (pie, bars, treemap, line over period labels).
    Categories(Vec<(String, f64)>),
    /// Raw XY points (scatter).
    Points(Vec<(f64, f64)>),
    /// Two series compared per label (budget vs actuals).
    PairedBars {
        labels: Vec<String>,
        series_a: String,
        series_b: String,
        a: Vec<f64>,
        b: Vec<f64>,
    },
}

/// A fully bound chart ready for any renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub data: ChartData,
    /// When the series was cut to the top N by magnitude, the N, so the
    /// renderer can label the truncation.
    pub truncated: Option<usize>,
}

impl ChartSpec {
    fn new(title: &str, kind: ChartKind, data: ChartData) -> Self {
        Self { title: title.to_string(), kind, data, truncated: None }
    }

    fn truncated_to(mut self, n: usize) -> Self {
        self.truncated = Some(n);
        self
    }

    /// Title with the truncation marker applied.
    pub fn display_title(&self) -> String {
        match self.truncated {
            Some(n) => format!("{} (top {})", self.title, n),
            None => self.title.clone(),
        }
    }
}

/// Everything one view renders: KPIs, charts, and degradation notes.
#[derive(Debug, Clone)]
pub struct ViewFigures {
    pub id: ViewId,
    pub title: String,
    pub kpis: Vec<Kpi>,
    pub charts: Vec<ChartSpec>,
    /// Human-readable notes about unavailable inputs.
    pub notes: Vec<String>,
}

// ── build_view ────────────────────────────────────────────────────────────────

/// Run the named view pipeline against the store.
///
/// `filter` only affects views whose registry entry is filterable.
pub fn build_view(store: &DataStore, id: ViewId, filter: &ProjectFilter) -> ViewFigures {
    let mut figures = match id {
        ViewId::ExecutiveOverview => executive_overview(store),
        ViewId::ProjectAnalytics => project_analytics(store, filter),
        ViewId::FinancialInsights => financial_insights(store),
        ViewId::ResourceManagement => resource_management(store),
        ViewId::RiskCompliance => risk_compliance(store),
        ViewId::VendorAnalysis => vendor_analysis(store),
    };

    // Note every broken requirement so the renderer can say why a figure
    // is missing instead of silently shrinking.
    for (table, columns) in spec(id).required {
        if store.table(table).is_none() {
            figures.notes.push(format!("{} table unavailable", table));
        } else if !store.has_columns(table, columns) {
            figures
                .notes
                .push(format!("{} is missing expected columns", table));
        }
    }

    figures
}

fn empty_figures(id: ViewId) -> ViewFigures {
    ViewFigures {
        id,
        title: id.title().to_string(),
        kpis: Vec::new(),
        charts: Vec::new(),
        notes: Vec::new(),
    }
}

/// `(label, value)` pairs from a two-column derived table.
fn categories(table: &Table, label_col: &str, value_col: &str) -> Vec<(String, f64)> {
    (0..table.len())
        .map(|i| (table.text(i, label_col), table.num(i, value_col)))
        .collect()
}

fn count_where(table: &Table, column: &str, value: &str) -> u64 {
    (0..table.len())
        .filter(|&i| table.text(i, column) == value)
        .count() as u64
}

// ── Per-view pipelines ────────────────────────────────────────────────────────

fn executive_overview(store: &DataStore) -> ViewFigures {
    let mut f = empty_figures(ViewId::ExecutiveOverview);

    if let Some(projects) = store.table("projects") {
        if store.has_columns("projects", &["budget_aed"]) {
            f.kpis.push(Kpi::money("Total Portfolio", projects.sum_column("budget_aed")));
        } else {
            f.kpis.push(Kpi::unavailable("Total Portfolio"));
        }
        if store.has_columns("projects", &["status"]) {
            let active = count_where(projects, "status", "In Progress");
            f.kpis.push(Kpi::text(
                "Active Projects",
                format!("{} of {}", active, projects.len()),
            ));
            f.charts.push(ChartSpec::new(
                "Project Status Distribution",
                ChartKind::Pie,
                ChartData::Categories(categories(
                    &group_count(projects, "status", "count"),
                    "status",
                    "count",
                )),
            ));
        }
        if store.has_columns("projects", &["type"]) {
            let by_type = group_count(projects, "type", "count");
            let top = top_n(&by_type, 8, "count", true);
            f.charts.push(
                ChartSpec::new(
                    "Projects by Type",
                    ChartKind::HBar,
                    ChartData::Categories(categories(&top, "type", "count")),
                )
                .truncated_to(8),
            );
        }
        if store.has_columns("projects", &["type", "budget_aed"]) {
            let budget_by_type = group_sum(projects, "type", "budget_aed", "budget_aed");
            let ordered = top_n(&budget_by_type, budget_by_type.len(), "budget_aed", true);
            f.charts.push(ChartSpec::new(
                "Budget by Project Type",
                ChartKind::Bar,
                ChartData::Categories(categories(&ordered, "type", "budget_aed")),
            ));
        }
        if store.has_columns("projects", &["location"]) {
            f.charts.push(ChartSpec::new(
                "Projects by Location",
                ChartKind::Treemap,
                ChartData::Categories(categories(
                    &group_count(projects, "location", "count"),
                    "location",
                    "count",
                )),
            ));
        }
    } else {
        f.kpis.push(Kpi::unavailable("Total Portfolio"));
        f.kpis.push(Kpi::unavailable("Active Projects"));
    }

    match store.table("employees") {
        Some(employees) => f.kpis.push(Kpi::count("Team Size", employees.len() as u64)),
        None => f.kpis.push(Kpi::unavailable("Team Size")),
    }

    if let Some(tasks) = store.table("tasks") {
        f.kpis.push(Kpi::count("Total Tasks", tasks.len() as u64));
        if store.has_columns("tasks", &["status"]) {
            let completed = count_where(tasks, "status", "Completed");
            f.kpis.push(Kpi::pct(
                "Completion Rate",
                ratio(completed as f64, tasks.len() as f64),
            ));
        }
    } else {
        f.kpis.push(Kpi::unavailable("Total Tasks"));
        f.kpis.push(Kpi::unavailable("Completion Rate"));
    }

    f
}

fn project_analytics(store: &DataStore, filter: &ProjectFilter) -> ViewFigures {
    let mut f = empty_figures(ViewId::ProjectAnalytics);

    let Some(projects) = store.table("projects") else {
        f.kpis.push(Kpi::unavailable("Projects"));
        return f;
    };
    let filtered = filter.apply(projects);

    f.kpis.push(Kpi::count("Projects", filtered.len() as u64));
    if store.has_columns("projects", &["budget_aed"]) {
        f.kpis.push(Kpi::money("Total Budget", filtered.sum_column("budget_aed")));
    } else {
        f.kpis.push(Kpi::unavailable("Total Budget"));
    }
    if store.has_columns("projects", &["completion_percentage"]) {
        f.kpis.push(Kpi::pct("Avg Progress", filtered.mean_column("completion_percentage")));
    } else {
        f.kpis.push(Kpi::unavailable("Avg Progress"));
    }
    if store.has_columns("projects", &["status"]) {
        let completed = count_where(&filtered, "status", "Completed");
        f.kpis.push(Kpi::text("Completed", format!("{}/{}", completed, filtered.len())));
    }

    if store.has_columns("projects", &["completion_percentage"]) {
        f.charts.push(ChartSpec::new(
            "Progress Distribution",
            ChartKind::Histogram,
            ChartData::Categories(categories(
                &histogram(&filtered, "completion_percentage", 20),
                "bin",
                "count",
            )),
        ));
    }
    if store.has_columns("projects", &["budget_aed", "completion_percentage"]) {
        let points: Vec<(f64, f64)> = (0..filtered.len())
            .map(|i| (filtered.num(i, "budget_aed"), filtered.num(i, "completion_percentage")))
            .collect();
        f.charts.push(ChartSpec::new(
            "Budget vs Progress",
            ChartKind::Scatter,
            ChartData::Points(points),
        ));
    }
    if store.has_columns("projects", &["project_name", "budget_aed"]) {
        let top = top_n(&filtered, 10, "budget_aed", true);
        f.charts.push(
            ChartSpec::new(
                "Projects by Budget",
                ChartKind::HBar,
                ChartData::Categories(categories(&top, "project_name", "budget_aed")),
            )
            .truncated_to(10),
        );
    }

    f
}

fn financial_insights(store: &DataStore) -> ViewFigures {
    let mut f = empty_figures(ViewId::FinancialInsights);

    let expenses_ok = store.has_columns("expenses", &["project_id", "amount_aed"]);
    let pos_ok = store.has_columns("purchase_orders", &["project_id", "amount_aed"]);
    let budget_ok = store.has_columns("projects", &["budget_aed"]);

    let total_expenses = if expenses_ok {
        let v = store.table("expenses").map(|t| t.sum_column("amount_aed")).unwrap_or(0.0);
        f.kpis.push(Kpi::money("Total Expenses", v));
        Some(v)
    } else {
        f.kpis.push(Kpi::unavailable("Total Expenses"));
        None
    };
    if pos_ok {
        let v = store
            .table("purchase_orders")
            .map(|t| t.sum_column("amount_aed"))
            .unwrap_or(0.0);
        f.kpis.push(Kpi::money("Purchase Orders", v));
    } else {
        f.kpis.push(Kpi::unavailable("Purchase Orders"));
    }
    let total_budget = if budget_ok {
        let v = store.table("projects").map(|t| t.sum_column("budget_aed")).unwrap_or(0.0);
        f.kpis.push(Kpi::money("Total Budget", v));
        Some(v)
    } else {
        f.kpis.push(Kpi::unavailable("Total Budget"));
        None
    };
    match (total_expenses, total_budget) {
        (Some(e), Some(b)) => f.kpis.push(Kpi::pct("Budget Utilization", ratio(e, b))),
        _ => f.kpis.push(Kpi::unavailable("Budget Utilization")),
    }

    if let Some(expenses) = store.table("expenses") {
        if store.has_columns("expenses", &["category", "amount_aed"]) {
            let by_cat = group_sum(expenses, "category", "amount_aed", "amount_aed");
            let ordered = top_n(&by_cat, by_cat.len(), "amount_aed", true);
            f.charts.push(ChartSpec::new(
                "Expenses by Category",
                ChartKind::Bar,
                ChartData::Categories(categories(&ordered, "category", "amount_aed")),
            ));
        }
        if store.has_columns("expenses", &["date", "amount_aed"]) {
            f.charts.push(ChartSpec::new(
                "Monthly Expense Trend",
                ChartKind::Line,
                ChartData::Categories(categories(
                    &metrics::monthly_expense_trend(expenses),
                    "month",
                    "amount_aed",
                )),
            ));
        }
    }

    if let Some(pos) = store.table("purchase_orders") {
        if store.has_columns("purchase_orders", &["status", "amount_aed"]) {
            f.charts.push(ChartSpec::new(
                "Purchase Order Status",
                ChartKind::Pie,
                ChartData::Categories(categories(
                    &group_sum(pos, "status", "amount_aed", "amount_aed"),
                    "status",
                    "amount_aed",
                )),
            ));
        }
    }

    if let (Some(expenses), Some(projects)) = (store.table("expenses"), store.table("projects")) {
        if expenses_ok && store.has_columns("projects", &["project_id", "project_name"]) {
            let sums = group_sum(expenses, "project_id", "amount_aed", "amount_aed");
            let named = pmo_data::aggregate::join_left(&sums, projects, "project_id");
            let top = top_n(&named, 10, "amount_aed", true);
            f.charts.push(
                ChartSpec::new(
                    "Projects by Expense",
                    ChartKind::HBar,
                    ChartData::Categories(categories(&top, "project_name", "amount_aed")),
                )
                .truncated_to(10),
            );
        }
    }

    f
}

fn resource_management(store: &DataStore) -> ViewFigures {
    let mut f = empty_figures(ViewId::ResourceManagement);

    if let Some(employees) = store.table("employees") {
        f.kpis.push(Kpi::count("Total Employees", employees.len() as u64));
        if store.has_columns("employees", &["department"]) {
            let departments = employees.distinct_labels("department");
            f.kpis.push(Kpi::count("Departments", departments.len() as u64));
            f.charts.push(ChartSpec::new(
                "Employees by Department",
                ChartKind::HBar,
                ChartData::Categories(categories(
                    &group_count(employees, "department", "count"),
                    "department",
                    "count",
                )),
            ));
        }
        if store.has_columns("employees", &["salary_aed"]) {
            f.kpis.push(Kpi::money("Avg Salary", employees.mean_column("salary_aed")));
        } else {
            f.kpis.push(Kpi::unavailable("Avg Salary"));
        }
        if store.has_columns("employees", &["nationality"]) {
            let by_nat = group_count(employees, "nationality", "count");
            let top = top_n(&by_nat, 10, "count", true);
            f.charts.push(
                ChartSpec::new(
                    "Workforce Nationality",
                    ChartKind::Pie,
                    ChartData::Categories(categories(&top, "nationality", "count")),
                )
                .truncated_to(10),
            );
        }
    } else {
        f.kpis.push(Kpi::unavailable("Total Employees"));
        f.kpis.push(Kpi::unavailable("Avg Salary"));
    }

    if let Some(timesheets) = store.table("timesheets") {
        if store.has_columns("timesheets", &["hours_logged"]) {
            f.kpis.push(Kpi::number("Total Hours Logged", timesheets.sum_column("hours_logged")));
        }
        if store.has_columns("timesheets", &["is_billable", "hours_logged"]) {
            f.charts.push(ChartSpec::new(
                "Billable vs Non-Billable Hours",
                ChartKind::Pie,
                ChartData::Categories(categories(
                    &metrics::billable_split(timesheets),
                    "category",
                    "hours",
                )),
            ));
        }
        if store.has_columns("timesheets", &["status", "hours_logged"]) {
            let by_status = group_sum(timesheets, "status", "hours_logged", "hours");
            let ordered = top_n(&by_status, by_status.len(), "hours", true);
            f.charts.push(ChartSpec::new(
                "Hours by Approval Status",
                ChartKind::Bar,
                ChartData::Categories(categories(&ordered, "status", "hours")),
            ));
        }
    } else {
        f.kpis.push(Kpi::unavailable("Total Hours Logged"));
    }

    f
}

fn risk_compliance(store: &DataStore) -> ViewFigures {
    let mut f = empty_figures(ViewId::RiskCompliance);

    if let Some(risks) = store.table("risks") {
        f.kpis.push(Kpi::count("Total Risks", risks.len() as u64));
        if store.has_columns("risks", &["impact"]) {
            f.kpis.push(Kpi::count("Critical Risks", count_where(risks, "impact", "Critical")));
            f.kpis.push(Kpi::count("High Risks", count_where(risks, "impact", "High")));
            f.charts.push(ChartSpec::new(
                "Risks by Impact Level",
                ChartKind::Pie,
                ChartData::Categories(categories(
                    &group_count(risks, "impact", "count"),
                    "impact",
                    "count",
                )),
            ));
        }
        if store.has_columns("risks", &["status"]) {
            f.kpis.push(Kpi::count("Active Risks", count_where(risks, "status", "Active")));
        }
        if let Some(projects) = store.table("projects") {
            if store.has_columns("risks", &["project_id"])
                && store.has_columns("projects", &["project_id", "project_name"])
            {
                let top = metrics::risk_counts_by_project(risks, projects, 10);
                f.charts.push(
                    ChartSpec::new(
                        "Projects by Risk Count",
                        ChartKind::HBar,
                        ChartData::Categories(categories(&top, "project_name", "risk_count")),
                    )
                    .truncated_to(10),
                );
            }
        }
    } else {
        f.kpis.push(Kpi::unavailable("Total Risks"));
        f.kpis.push(Kpi::unavailable("Critical Risks"));
        f.kpis.push(Kpi::unavailable("High Risks"));
        f.kpis.push(Kpi::unavailable("Active Risks"));
    }

    if let Some(milestones) = store.table("milestones") {
        if store.has_columns("milestones", &["status"]) {
            let by_status = group_count(milestones, "status", "count");
            f.charts.push(ChartSpec::new(
                "Milestone Status Overview",
                ChartKind::Bar,
                ChartData::Categories(categories(&by_status, "status", "count")),
            ));
            for i in 0..by_status.len() {
                let count = by_status.num(i, "count");
                let share = formatting::percentage(count, milestones.len() as f64, 1);
                f.notes.push(format!(
                    "{}: {} ({})",
                    by_status.text(i, "status"),
                    count as u64,
                    formatting::format_pct(share)
                ));
            }
        }
    }

    f
}

fn vendor_analysis(store: &DataStore) -> ViewFigures {
    let mut f = empty_figures(ViewId::VendorAnalysis);

    if let Some(vendors) = store.table("vendors") {
        f.kpis.push(Kpi::count("Total Vendors", vendors.len() as u64));
        if store.has_columns("vendors", &["category"]) {
            let by_cat = group_count(vendors, "category", "count");
            let ordered = top_n(&by_cat, by_cat.len(), "count", true);
            f.charts.push(ChartSpec::new(
                "Vendors by Category",
                ChartKind::HBar,
                ChartData::Categories(categories(&ordered, "category", "count")),
            ));
        }
        if store.has_columns("vendors", &["location"]) {
            f.charts.push(ChartSpec::new(
                "Vendors by Location",
                ChartKind::Pie,
                ChartData::Categories(categories(
                    &group_count(vendors, "location", "count"),
                    "location",
                    "count",
                )),
            ));
        }
    } else {
        f.kpis.push(Kpi::unavailable("Total Vendors"));
    }

    if let Some(pos) = store
        .table("purchase_orders")
        .filter(|t| t.has_columns(&["amount_aed"]))
    {
        let total = pos.sum_column("amount_aed");
        f.kpis.push(Kpi::money("Total PO Value", total));
        f.kpis.push(Kpi::money("Avg PO Value", pos.mean_column("amount_aed")));
        f.kpis.push(Kpi::count("Purchase Orders", pos.len() as u64));

        if store.has_columns("purchase_orders", &["vendor_id"]) {
            if let Some(vendors) = store.table("vendors") {
                let top = metrics::vendor_spend(pos, vendors, 10);
                f.charts.push(
                    ChartSpec::new(
                        "Vendors by PO Value",
                        ChartKind::Bar,
                        ChartData::Categories(categories(&top, "vendor_name", "amount_aed")),
                    )
                    .truncated_to(10),
                );
            }
        }
    } else {
        f.kpis.push(Kpi::unavailable("Total PO Value"));
        f.kpis.push(Kpi::unavailable("Avg PO Value"));
        f.kpis.push(Kpi::unavailable("Purchase Orders"));
    }

    f
}

// ── Tests ─────────────────────────────────────────────────────────────────────
