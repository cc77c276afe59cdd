//! Terminal renderers for KPI rows and chart specifications.
//!
//! Category charts render as rows of unicode bars with right-aligned values;
//! pies render as share legends; scatter uses the braille chart widget. The
//! renderers draw exactly what the view pipeline bound, nothing is recomputed
//! here.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use pmo_core::formatting;
use pmo_runtime::views::{ChartData, ChartKind, ChartSpec, Kpi};

use crate::themes::Theme;

/// Render the KPI row: one bordered cell per KPI.
pub fn render_kpis(frame: &mut Frame, area: Rect, kpis: &[Kpi], theme: &Theme) {
    if kpis.is_empty() {
        return;
    }
    let constraints: Vec<Constraint> =
        kpis.iter().map(|_| Constraint::Ratio(1, kpis.len() as u32)).collect();
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (kpi, cell) in kpis.iter().zip(cells.iter()) {
        let lines = vec![
            Line::from(Span::styled(kpi.label.clone(), theme.label)),
            Line::from(Span::styled(kpi.render(), theme.value)),
        ];
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
            *cell,
        );
    }
}

/// Render one chart specification into `area`.
pub fn render_chart(frame: &mut Frame, area: Rect, spec: &ChartSpec, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", spec.display_title()),
            theme.chart_title,
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match &spec.data {
        ChartData::Categories(cats) => match spec.kind {
            ChartKind::Pie | ChartKind::Treemap => render_shares(frame, inner, cats, theme),
            _ => render_bars(frame, inner, cats, theme),
        },
        ChartData::Points(points) => render_scatter(frame, inner, points, theme),
        ChartData::PairedBars {
            labels,
            series_a,
            series_b,
            a,
            b,
        } => render_paired(frame, inner, labels, series_a, series_b, a, b, theme),
    }
}

// ── Internal renderers ────────────────────────────────────────────────────────

/// Pad `label` to `width` terminal cells, truncating over-wide labels.
fn pad_label(label: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for c in label.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

fn bar_span(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || width == 0 {
        return String::new();
    }
    let filled = ((value / max) * width as f64).round() as usize;
    "\u{2588}".repeat(filled.min(width))
}

fn render_bars(frame: &mut Frame, area: Rect, cats: &[(String, f64)], theme: &Theme) {
    let max = cats.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let label_w = 18usize.min(area.width as usize / 3);
    let value_w = 10usize;
    let bar_w = (area.width as usize).saturating_sub(label_w + value_w + 2);

    let lines: Vec<Line> = cats
        .iter()
        .take(area.height as usize)
        .enumerate()
        .map(|(i, (label, value))| {
            let style = if i % 2 == 0 { theme.bar } else { theme.bar_alt };
            Line::from(vec![
                Span::styled(pad_label(label, label_w), theme.label),
                Span::raw(" "),
                Span::styled(bar_span(*value, max, bar_w), style),
                Span::styled(
                    format!(" {}", formatting::format_number(*value, 0)),
                    theme.text,
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_shares(frame: &mut Frame, area: Rect, cats: &[(String, f64)], theme: &Theme) {
    let total: f64 = cats.iter().map(|(_, v)| *v).sum();
    let label_w = 18usize.min(area.width as usize / 3);
    let bar_w = (area.width as usize).saturating_sub(label_w + 10);

    let lines: Vec<Line> = cats
        .iter()
        .take(area.height as usize)
        .enumerate()
        .map(|(i, (label, value))| {
            let share = formatting::percentage(*value, total, 1);
            let style = if i % 2 == 0 { theme.bar } else { theme.bar_alt };
            Line::from(vec![
                Span::styled(pad_label(label, label_w), theme.label),
                Span::raw(" "),
                Span::styled(bar_span(share, 100.0, bar_w), style),
                Span::styled(format!(" {}", formatting::format_pct(share)), theme.text),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_scatter(frame: &mut Frame, area: Rect, points: &[(f64, f64)], theme: &Theme) {
    let max_x = points.iter().map(|(x, _)| *x).fold(1.0_f64, f64::max);
    let max_y = points.iter().map(|(_, y)| *y).fold(1.0_f64, f64::max);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Scatter)
        .style(theme.bar)
        .data(points);

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .bounds([0.0, max_x])
                .labels(vec![
                    Span::styled("0", theme.dim),
                    Span::styled(formatting::format_number(max_x, 0), theme.dim),
                ])
                .style(theme.dim),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, max_y])
                .labels(vec![
                    Span::styled("0", theme.dim),
                    Span::styled(formatting::format_number(max_y, 0), theme.dim),
                ])
                .style(theme.dim),
        );

    frame.render_widget(chart, area);
}

#[allow(clippy::too_many_arguments)]
fn render_paired(
    frame: &mut Frame,
    area: Rect,
    labels: &[String],
    series_a: &str,
    series_b: &str,
    a: &[f64],
    b: &[f64],
    theme: &Theme,
) {
    let max = a.iter().chain(b).cloned().fold(0.0_f64, f64::max);
    let label_w = 18usize.min(area.width as usize / 3);
    let bar_w = (area.width as usize).saturating_sub(label_w + 14);

    let mut lines: Vec<Line> = vec![Line::from(vec![
        Span::styled(format!("\u{2588} {}  ", series_a), theme.bar),
        Span::styled(format!("\u{2588} {}", series_b), theme.bar_alt),
    ])];
    for (i, label) in labels.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(pad_label(label, label_w), theme.label),
            Span::raw(" "),
            Span::styled(bar_span(a[i], max, bar_w), theme.bar),
            Span::styled(
                format!(" {}", formatting::format_number(a[i], 0)),
                theme.text,
            ),
        ]));
        lines.push(Line::from(vec![
            Span::raw(" ".repeat(label_w + 1)),
            Span::styled(bar_span(b[i], max, bar_w), theme.bar_alt),
            Span::styled(
                format!(" {}", formatting::format_number(b[i], 0)),
                theme.text,
            ),
        ]));
    }

    frame.render_widget(
        Paragraph::new(lines.into_iter().take(area.height as usize).collect::<Vec<_>>()),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn draw(spec: &ChartSpec) {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| render_chart(frame, frame.area(), spec, &theme))
            .unwrap();
    }

    fn cat_spec(kind: ChartKind) -> ChartSpec {
        ChartSpec {
            title: "Sample".to_string(),
            kind,
            data: ChartData::Categories(vec![
                ("Alpha".to_string(), 10.0),
                ("Beta".to_string(), 5.0),
            ]),
            truncated: None,
        }
    }

    #[test]
    fn test_render_all_category_kinds() {
        for kind in [
            ChartKind::Pie,
            ChartKind::Bar,
            ChartKind::HBar,
            ChartKind::Histogram,
            ChartKind::Line,
            ChartKind::Treemap,
        ] {
            draw(&cat_spec(kind));
        }
    }

    #[test]
    fn test_render_scatter() {
        draw(&ChartSpec {
            title: "Scatter".to_string(),
            kind: ChartKind::Scatter,
            data: ChartData::Points(vec![(1.0, 2.0), (100.0, 60.0)]),
            truncated: None,
        });
    }

    #[test]
    fn test_render_paired_bars() {
        draw(&ChartSpec {
            title: "Paired".to_string(),
            kind: ChartKind::Bar,
            data: ChartData::PairedBars {
                labels: vec!["P1".to_string(), "P2".to_string()],
                series_a: "Budget".to_string(),
                series_b: "Actuals".to_string(),
                a: vec![100.0, 200.0],
                b: vec![50.0, 250.0],
            },
            truncated: None,
        });
    }

    #[test]
    fn test_render_empty_categories() {
        draw(&ChartSpec {
            title: "Empty".to_string(),
            kind: ChartKind::Bar,
            data: ChartData::Categories(vec![]),
            truncated: None,
        });
    }

    #[test]
    fn test_render_kpis_row() {
        let backend = TestBackend::new(80, 5);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let kpis = vec![
            Kpi::money("Total Portfolio", 12_340_000.0),
            Kpi::count("Projects", 42),
            Kpi::unavailable("Utilization"),
        ];
        terminal
            .draw(|frame| render_kpis(frame, frame.area(), &kpis, &theme))
            .unwrap();
    }

    #[test]
    fn test_pad_label_truncates_and_pads() {
        assert_eq!(pad_label("ab", 4), "ab  ");
        assert_eq!(pad_label("abcdef", 4), "abcd");
    }

    #[test]
    fn test_bar_span_bounds() {
        assert_eq!(bar_span(5.0, 10.0, 10).chars().count(), 5);
        assert_eq!(bar_span(20.0, 10.0, 10).chars().count(), 10);
        assert_eq!(bar_span(1.0, 0.0, 10), "");
    }
}
