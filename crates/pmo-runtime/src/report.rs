//! Static report generation.
//!
//! Renders one self-contained HTML document: KPI cards plus a fixed set of
//! charts drawn as inline SVG, no external assets. Chart rendering is a pure
//! function of [`ChartSpec`], so anything the view registry can produce can
//! also be embedded here.

use pmo_core::formatting;
use pmo_data::aggregate::{group_count, group_mean, top_n};
use pmo_data::metrics;
use pmo_data::table::Table;

use crate::store::DataStore;
use crate::views::{ChartData, ChartKind, ChartSpec};

const SVG_WIDTH: f64 = 600.0;
const SVG_HEIGHT: f64 = 300.0;

/// Build the full report document.
pub fn render_report(store: &DataStore) -> String {
    let mut kpi_cards = String::new();
    let mut chart_cards = String::new();

    // ── KPIs ──────────────────────────────────────────────────────────────
    let financial = financial_table(store);

    let total_budget = match store
        .table("projects")
        .filter(|t| t.has_columns(&["budget_aed"]))
    {
        Some(projects) => formatting::format_aed_full(projects.sum_column("budget_aed")),
        None => "unavailable".to_string(),
    };
    kpi_cards.push_str(&kpi_card("Total Portfolio Budget", &total_budget));

    let total_spend = match &financial {
        Some(fin) => formatting::format_aed_full(fin.sum_column("total_actuals")),
        None => "unavailable".to_string(),
    };
    kpi_cards.push_str(&kpi_card("Total Actual Spend", &total_spend));

    let avg_completion = match store
        .table("projects")
        .filter(|t| t.has_columns(&["completion_percentage"]))
    {
        Some(projects) => formatting::format_pct(projects.mean_column("completion_percentage")),
        None => "unavailable".to_string(),
    };
    kpi_cards.push_str(&kpi_card("Avg. Completion Rate", &avg_completion));

    // ── Charts ────────────────────────────────────────────────────────────
    if let Some(fin) = &financial {
        if fin.has_columns(&["project_name", "budget_aed", "total_actuals"]) {
            let top = top_n(fin, 10, "budget_aed", true);
            let spec = ChartSpec {
                title: "Budget vs Actual Spend".to_string(),
                kind: ChartKind::Bar,
                data: ChartData::PairedBars {
                    labels: (0..top.len()).map(|i| top.text(i, "project_name")).collect(),
                    series_a: "Budget".to_string(),
                    series_b: "Actuals".to_string(),
                    a: (0..top.len()).map(|i| top.num(i, "budget_aed")).collect(),
                    b: (0..top.len()).map(|i| top.num(i, "total_actuals")).collect(),
                },
                truncated: Some(10),
            };
            chart_cards.push_str(&chart_card(&spec));
        }
    }

    if let (Some(projects), Some(clients)) = (store.table("projects"), store.table("clients")) {
        if projects.has_columns(&["client_id", "budget_aed"]) && clients.has_columns(&["industry"])
        {
            let by_industry = metrics::budget_by_industry(projects, clients);
            chart_cards.push_str(&chart_card(&ChartSpec {
                title: "Budget Distribution by Industry".to_string(),
                kind: ChartKind::Pie,
                data: ChartData::Categories(table_categories(&by_industry, "industry", "budget_aed")),
                truncated: None,
            }));
        }
    }

    if let Some(tasks) = store.table("tasks").filter(|t| t.has_columns(&["status"])) {
        chart_cards.push_str(&chart_card(&ChartSpec {
            title: "Global Task Status Distribution".to_string(),
            kind: ChartKind::Pie,
            data: ChartData::Categories(table_categories(
                &group_count(tasks, "status", "count"),
                "status",
                "count",
            )),
            truncated: None,
        }));
    }

    if let Some(employees) = store
        .table("employees")
        .filter(|t| t.has_columns(&["department", "salary_aed"]))
    {
        let by_dept = group_mean(employees, "department", "salary_aed", "avg_salary");
        let ordered = top_n(&by_dept, by_dept.len(), "avg_salary", true);
        chart_cards.push_str(&chart_card(&ChartSpec {
            title: "Avg Salary by Department".to_string(),
            kind: ChartKind::HBar,
            data: ChartData::Categories(table_categories(&ordered, "department", "avg_salary")),
            truncated: None,
        }));
    }

    if let Some(risks) = store.table("risks").filter(|t| t.has_columns(&["impact"])) {
        chart_cards.push_str(&chart_card(&ChartSpec {
            title: "Risk Impact Profile".to_string(),
            kind: ChartKind::Bar,
            data: ChartData::Categories(table_categories(
                &group_count(risks, "impact", "count"),
                "impact",
                "count",
            )),
            truncated: None,
        }));
    }

    let footer = escape(&store.report().summary());

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Project Portfolio Analytics</title>
<style>
  body {{ background: #f8f9fa; font-family: -apple-system, 'Segoe UI', sans-serif; margin: 0; }}
  .header {{ background: linear-gradient(90deg, #002f6c 0%, #0056b3 100%); color: #fff; padding: 24px 32px; }}
  .header p {{ color: #cdd9ea; margin: 4px 0 0 0; }}
  .container {{ max-width: 1100px; margin: 0 auto; padding: 24px 16px; }}
  .kpis {{ display: flex; gap: 16px; margin-bottom: 24px; }}
  .card {{ background: #fff; border-radius: 8px; box-shadow: 0 4px 6px rgba(0,0,0,0.1); padding: 16px; }}
  .kpi {{ flex: 1; text-align: center; }}
  .kpi .label {{ color: #6c757d; font-size: 0.9rem; }}
  .kpi .value {{ color: #0d6efd; font-size: 1.6rem; font-weight: 700; margin-top: 4px; }}
  .chart {{ margin-bottom: 24px; }}
  .chart h3 {{ margin: 0 0 12px 0; font-size: 1.05rem; }}
  footer {{ text-align: center; color: #6c757d; padding: 16px; font-size: 0.85rem; }}
</style>
</head>
<body>
<div class="header">
  <h1>Project Portfolio Analytics Report</h1>
  <p>Data-driven insights into financials, risks, and workforce performance.</p>
</div>
<div class="container">
  <div class="kpis">
{kpi_cards}  </div>
{chart_cards}</div>
<footer>{footer}</footer>
</body>
</html>
"#
    )
}

// ── SVG chart rendering ───────────────────────────────────────────────────────

/// Render any chart specification to an inline `<svg>` element.
pub fn chart_svg(spec: &ChartSpec) -> String {
    match &spec.data {
        ChartData::Categories(cats) => match spec.kind {
            ChartKind::Pie | ChartKind::Treemap => svg_pie(cats),
            ChartKind::HBar => svg_hbar(cats),
            ChartKind::Line => svg_line(cats),
            _ => svg_vbar(cats),
        },
        ChartData::Points(points) => svg_scatter(points),
        ChartData::PairedBars {
            labels,
            series_a,
            series_b,
            a,
            b,
        } => svg_paired_bars(labels, series_a, series_b, a, b),
    }
}

const PALETTE: &[&str] = &[
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];

fn color(i: usize) -> &'static str {
    PALETTE[i % PALETTE.len()]
}

fn svg_open() -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {SVG_WIDTH} {SVG_HEIGHT}" width="100%" role="img">"#
    )
}

fn svg_hbar(cats: &[(String, f64)]) -> String {
    let mut svg = svg_open();
    let max = cats.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let row_h = (SVG_HEIGHT / cats.len().max(1) as f64).min(32.0);
    let label_w = 170.0;
    let bar_span = SVG_WIDTH - label_w - 80.0;

    for (i, (label, value)) in cats.iter().enumerate() {
        let y = i as f64 * row_h;
        let w = if max > 0.0 { value / max * bar_span } else { 0.0 };
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" font-size="11" text-anchor="end">{}</text>"#,
            label_w - 6.0,
            y + row_h * 0.65,
            escape(label)
        ));
        svg.push_str(&format!(
            r#"<rect x="{label_w}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
            y + row_h * 0.15,
            w,
            row_h * 0.7,
            color(i)
        ));
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" font-size="11">{}</text>"#,
            label_w + w + 6.0,
            y + row_h * 0.65,
            formatting::format_number(*value, 0)
        ));
    }
    svg.push_str("</svg>");
    svg
}

fn svg_vbar(cats: &[(String, f64)]) -> String {
    let mut svg = svg_open();
    let max = cats.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let base = SVG_HEIGHT - 40.0;
    let col_w = SVG_WIDTH / cats.len().max(1) as f64;

    for (i, (label, value)) in cats.iter().enumerate() {
        let x = i as f64 * col_w;
        let h = if max > 0.0 { value / max * (base - 20.0) } else { 0.0 };
        svg.push_str(&format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
            x + col_w * 0.15,
            base - h,
            col_w * 0.7,
            h,
            color(i)
        ));
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" font-size="10" text-anchor="middle">{}</text>"#,
            x + col_w / 2.0,
            base + 14.0,
            escape(label)
        ));
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" font-size="10" text-anchor="middle">{}</text>"#,
            x + col_w / 2.0,
            base - h - 6.0,
            formatting::format_number(*value, 0)
        ));
    }
    svg.push_str("</svg>");
    svg
}

fn svg_line(cats: &[(String, f64)]) -> String {
    let mut svg = svg_open();
    let max = cats.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let base = SVG_HEIGHT - 40.0;
    let step = SVG_WIDTH / cats.len().max(2) as f64;

    let points: Vec<String> = cats
        .iter()
        .enumerate()
        .map(|(i, (_, v))| {
            let x = step / 2.0 + i as f64 * step;
            let y = if max > 0.0 { base - v / max * (base - 20.0) } else { base };
            format!("{:.1},{:.1}", x, y)
        })
        .collect();
    svg.push_str(&format!(
        r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
        points.join(" "),
        color(0)
    ));
    for (i, (label, _)) in cats.iter().enumerate() {
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" font-size="10" text-anchor="middle">{}</text>"#,
            step / 2.0 + i as f64 * step,
            base + 14.0,
            escape(label)
        ));
    }
    svg.push_str("</svg>");
    svg
}

fn svg_scatter(points: &[(f64, f64)]) -> String {
    let mut svg = svg_open();
    let max_x = points.iter().map(|(x, _)| *x).fold(0.0_f64, f64::max);
    let max_y = points.iter().map(|(_, y)| *y).fold(0.0_f64, f64::max);
    let base = SVG_HEIGHT - 20.0;

    for (x, y) in points {
        let px = if max_x > 0.0 { x / max_x * (SVG_WIDTH - 40.0) + 20.0 } else { 20.0 };
        let py = if max_y > 0.0 { base - y / max_y * (base - 20.0) } else { base };
        svg.push_str(&format!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="4" fill="{}" fill-opacity="0.7"/>"#,
            px,
            py,
            color(0)
        ));
    }
    svg.push_str("</svg>");
    svg
}

fn svg_pie(cats: &[(String, f64)]) -> String {
    let mut svg = svg_open();
    let total: f64 = cats.iter().map(|(_, v)| *v).sum();
    let (cx, cy, r) = (SVG_HEIGHT / 2.0, SVG_HEIGHT / 2.0, SVG_HEIGHT / 2.0 - 20.0);

    if total > 0.0 {
        let mut angle = -std::f64::consts::FRAC_PI_2;
        for (i, (_, value)) in cats.iter().enumerate() {
            let sweep = value / total * std::f64::consts::TAU;
            // A full-circle single slice degenerates in the arc syntax.
            if sweep >= std::f64::consts::TAU - 1e-9 {
                svg.push_str(&format!(
                    r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{r:.1}" fill="{}"/>"#,
                    color(i)
                ));
                break;
            }
            let (x0, y0) = (cx + r * angle.cos(), cy + r * angle.sin());
            let end = angle + sweep;
            let (x1, y1) = (cx + r * end.cos(), cy + r * end.sin());
            let large = if sweep > std::f64::consts::PI { 1 } else { 0 };
            svg.push_str(&format!(
                r#"<path d="M{cx:.1},{cy:.1} L{x0:.1},{y0:.1} A{r:.1},{r:.1} 0 {large} 1 {x1:.1},{y1:.1} Z" fill="{}"/>"#,
                color(i)
            ));
            angle = end;
        }
    }

    // Legend with shares.
    let legend_x = SVG_HEIGHT + 20.0;
    for (i, (label, value)) in cats.iter().enumerate() {
        let y = 24.0 + i as f64 * 20.0;
        svg.push_str(&format!(
            r#"<rect x="{legend_x:.1}" y="{:.1}" width="12" height="12" fill="{}"/>"#,
            y - 10.0,
            color(i)
        ));
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" font-size="11">{} ({})</text>"#,
            legend_x + 18.0,
            y,
            escape(label),
            formatting::format_pct(formatting::percentage(*value, total, 1))
        ));
    }
    svg.push_str("</svg>");
    svg
}

fn svg_paired_bars(labels: &[String], series_a: &str, series_b: &str, a: &[f64], b: &[f64]) -> String {
    let mut svg = svg_open();
    let max = a.iter().chain(b).cloned().fold(0.0_f64, f64::max);
    let base = SVG_HEIGHT - 60.0;
    let group_w = SVG_WIDTH / labels.len().max(1) as f64;

    for (i, label) in labels.iter().enumerate() {
        let x = i as f64 * group_w;
        let bar_w = group_w * 0.3;
        for (j, (value, fill)) in [(a[i], color(0)), (b[i], color(1))].iter().enumerate() {
            let h = if max > 0.0 { value / max * (base - 20.0) } else { 0.0 };
            svg.push_str(&format!(
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                x + group_w * 0.15 + j as f64 * bar_w,
                base - h,
                bar_w * 0.9,
                h,
                fill
            ));
        }
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" font-size="9" text-anchor="middle">{}</text>"#,
            x + group_w / 2.0,
            base + 12.0,
            escape(label)
        ));
    }

    // Series legend.
    for (j, name) in [series_a, series_b].iter().enumerate() {
        let y = SVG_HEIGHT - 24.0 + j as f64 * 14.0;
        svg.push_str(&format!(
            r#"<rect x="10" y="{:.1}" width="12" height="10" fill="{}"/>"#,
            y - 9.0,
            color(j)
        ));
        svg.push_str(&format!(
            r#"<text x="28" y="{:.1}" font-size="11">{}</text>"#,
            y,
            escape(name)
        ));
    }
    svg.push_str("</svg>");
    svg
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn financial_table(store: &DataStore) -> Option<Table> {
    let projects = store
        .table("projects")
        .filter(|t| t.has_columns(&["project_id", "budget_aed"]))?;
    let expenses = store
        .table("expenses")
        .filter(|t| t.has_columns(&["project_id", "amount_aed"]))?;
    let pos = store
        .table("purchase_orders")
        .filter(|t| t.has_columns(&["project_id", "amount_aed"]))?;
    Some(metrics::financial_health(projects, expenses, pos))
}

fn table_categories(table: &Table, label_col: &str, value_col: &str) -> Vec<(String, f64)> {
    (0..table.len())
        .map(|i| (table.text(i, label_col), table.num(i, value_col)))
        .collect()
}

fn kpi_card(label: &str, value: &str) -> String {
    format!(
        "    <div class=\"card kpi\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>\n",
        escape(label),
        escape(value)
    )
}

fn chart_card(spec: &ChartSpec) -> String {
    format!(
        "  <div class=\"card chart\"><h3>{}</h3>{}</div>\n",
        escape(&spec.display_title()),
        chart_svg(spec)
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
