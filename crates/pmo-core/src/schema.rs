//! The fixed table/column contract.
//!
//! Every logical table, its backing file name, its typed columns, and the
//! columns KPI computation cannot do without are enumerated here. The
//! normalizer and loader consult this module instead of carrying their own
//! column lists.

/// Semantic kind of a schema-typed column.
///
/// Anything not listed for a table passes through as plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Calendar date; conversion failures stay absent.
    Date,
    /// Monetary amount in AED; absent fills to zero, clamped non-negative.
    Money,
    /// Non-monetary quantity (hours); absent fills to zero, clamped non-negative.
    Quantity,
    /// Percentage 0–100; absent fills to zero.
    Percent,
    /// Boolean flag column.
    Flag,
}

impl ColumnKind {
    /// Whether the absent-to-zero fill rule applies after coercion.
    pub fn fills_zero(self) -> bool {
        matches!(
            self,
            ColumnKind::Money | ColumnKind::Quantity | ColumnKind::Percent
        )
    }

    /// Whether negative values are clamped to zero after coercion.
    pub fn clamps_negative(self) -> bool {
        matches!(self, ColumnKind::Money | ColumnKind::Quantity)
    }
}

/// Static description of one logical table.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    /// Logical name used throughout the pipelines.
    pub name: &'static str,
    /// Backing file name under the data directory.
    pub file: &'static str,
    /// Columns with a semantic type to coerce during normalization.
    pub typed_columns: &'static [(&'static str, ColumnKind)],
    /// Columns whose absence makes the table's dependent KPIs unavailable.
    pub required_columns: &'static [&'static str],
}

/// All logical tables, in load order.
pub const TABLES: &[TableSchema] = &[
    TableSchema {
        name: "projects",
        file: "projects.csv",
        typed_columns: &[
            ("start_date", ColumnKind::Date),
            ("end_date", ColumnKind::Date),
            ("budget_aed", ColumnKind::Money),
            ("completion_percentage", ColumnKind::Percent),
        ],
        required_columns: &["project_id", "budget_aed"],
    },
    TableSchema {
        name: "clients",
        file: "clients.csv",
        typed_columns: &[],
        required_columns: &["client_id"],
    },
    TableSchema {
        name: "employees",
        file: "employees.csv",
        typed_columns: &[
            ("joining_date", ColumnKind::Date),
            ("salary_aed", ColumnKind::Money),
        ],
        required_columns: &["employee_id", "salary_aed"],
    },
    TableSchema {
        name: "tasks",
        file: "tasks.csv",
        typed_columns: &[
            ("start_date", ColumnKind::Date),
            ("end_date", ColumnKind::Date),
        ],
        required_columns: &["task_id"],
    },
    TableSchema {
        name: "expenses",
        file: "expenses.csv",
        typed_columns: &[
            ("date", ColumnKind::Date),
            ("amount_aed", ColumnKind::Money),
        ],
        required_columns: &["project_id", "amount_aed"],
    },
    TableSchema {
        name: "timesheets",
        file: "timesheets.csv",
        typed_columns: &[
            ("date", ColumnKind::Date),
            ("hours_logged", ColumnKind::Quantity),
            ("is_billable", ColumnKind::Flag),
        ],
        required_columns: &["employee_id", "hours_logged"],
    },
    TableSchema {
        name: "vendors",
        file: "vendors.csv",
        typed_columns: &[],
        required_columns: &["vendor_id"],
    },
    TableSchema {
        name: "risks",
        file: "risks.csv",
        typed_columns: &[],
        required_columns: &["risk_id"],
    },
    TableSchema {
        name: "milestones",
        file: "project_milestones.csv",
        typed_columns: &[
            ("planned_start", ColumnKind::Date),
            ("planned_end", ColumnKind::Date),
        ],
        required_columns: &["milestone_id"],
    },
    TableSchema {
        name: "purchase_orders",
        file: "purchase_orders.csv",
        typed_columns: &[
            ("issue_date", ColumnKind::Date),
            ("amount_aed", ColumnKind::Money),
        ],
        required_columns: &["project_id", "amount_aed"],
    },
    TableSchema {
        name: "assignments",
        file: "assignments.csv",
        typed_columns: &[
            ("start_date", ColumnKind::Date),
            ("end_date", ColumnKind::Date),
        ],
        required_columns: &[],
    },
];

/// Look up a table schema by logical name.
pub fn table(name: &str) -> Option<&'static TableSchema> {
    TABLES.iter().find(|t| t.name == name)
}

/// Semantic kind of `column` in `table_name`, if the schema types it.
pub fn column_kind(table_name: &str, column: &str) -> Option<ColumnKind> {
    table(table_name)?
        .typed_columns
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, kind)| *kind)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
