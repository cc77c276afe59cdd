//! Stateless reduction primitives over [`Table`]s.
//!
//! Every operation takes its inputs by reference and returns a new derived
//! table or scalar; source tables are never mutated. Group keys are ordered
//! ascending (BTreeMap) so derived tables are deterministic run to run.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use pmo_core::value::Value;

use crate::table::Table;

// ── Grouping ──────────────────────────────────────────────────────────────────

/// Sum `value_col` per distinct `group_key` label.
///
/// Returns a table `[group_key, out_col]`. Groups with no rows are absent
/// from the result, not zero. Rows whose group cell is absent or blank
/// aggregate under the empty-string bucket so partition totals hold exactly.
/// Missing input columns yield an empty result.
pub fn group_sum(table: &Table, group_key: &str, value_col: &str, out_col: &str) -> Table {
    group_fold(table, group_key, Some(value_col), out_col, |sum, _count| sum)
}

/// Mean of `value_col` per distinct `group_key` label.
pub fn group_mean(table: &Table, group_key: &str, value_col: &str, out_col: &str) -> Table {
    group_fold(table, group_key, Some(value_col), out_col, |sum, count| {
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    })
}

/// Row count per distinct `group_key` label, as an integer-valued column.
pub fn group_count(table: &Table, group_key: &str, out_col: &str) -> Table {
    group_fold(table, group_key, None, out_col, |_sum, count| count as f64)
}

fn group_fold(
    table: &Table,
    group_key: &str,
    value_col: Option<&str>,
    out_col: &str,
    finish: impl Fn(f64, u64) -> f64,
) -> Table {
    let mut out = Table::with_columns(table.name(), &[group_key, out_col]);

    let Some(key_idx) = table.column_index(group_key) else {
        return out;
    };
    let value_idx = match value_col {
        Some(col) => match table.column_index(col) {
            Some(idx) => Some(idx),
            None => return out,
        },
        None => None,
    };

    let mut groups: BTreeMap<String, (f64, u64)> = BTreeMap::new();
    for row in table.rows() {
        let key = row[key_idx].label();
        let value = value_idx.map(|i| row[i].number_or_zero()).unwrap_or(0.0);
        let entry = groups.entry(key).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    for (key, (sum, count)) in groups {
        out.push_row(vec![Value::Text(key), Value::Number(finish(sum, count))]);
    }
    out
}

// ── Joining ───────────────────────────────────────────────────────────────────

/// Left join `right` onto `left` by equality of the `on` column's labels.
///
/// Every left row is kept. The first matching right row contributes its
/// remaining columns; unmatched left rows get [`Value::Absent`] there, to be
/// resolved by [`fill_zero`] per the pipeline order. Right columns whose name
/// collides with an existing left column are skipped.
pub fn join_left(left: &Table, right: &Table, on: &str) -> Table {
    let (Some(left_on), Some(right_on)) = (left.column_index(on), right.column_index(on)) else {
        return left.clone();
    };

    // Right columns to append, with their source indices.
    let appended: Vec<(String, usize)> = right
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, name)| *i != right_on && left.column_index(name).is_none())
        .map(|(i, name)| (name.clone(), i))
        .collect();

    let mut columns = left.columns().to_vec();
    columns.extend(appended.iter().map(|(name, _)| name.clone()));
    let mut out = Table::new(left.name().to_string(), columns);

    // First-match index over the right key labels.
    let mut lookup: HashMap<String, usize> = HashMap::new();
    for (i, row) in right.rows().iter().enumerate() {
        lookup.entry(row[right_on].label()).or_insert(i);
    }

    for row in left.rows() {
        let mut cells = row.clone();
        match lookup.get(&row[left_on].label()) {
            Some(&ri) => {
                let right_row = &right.rows()[ri];
                cells.extend(appended.iter().map(|(_, i)| right_row[*i].clone()));
            }
            None => {
                cells.extend(appended.iter().map(|_| Value::Absent));
            }
        }
        out.push_row(cells);
    }
    out
}

/// Resolve [`Value::Absent`] to `0.0` in the named columns.
pub fn fill_zero(table: &Table, columns: &[&str]) -> Table {
    let indices: Vec<usize> = columns
        .iter()
        .filter_map(|c| table.column_index(c))
        .collect();

    let mut out = Table::new(table.name().to_string(), table.columns().to_vec());
    for row in table.rows() {
        let mut cells = row.clone();
        for &i in &indices {
            if cells[i].is_absent() {
                cells[i] = Value::Number(0.0);
            }
        }
        out.push_row(cells);
    }
    out
}

// ── Ordering ──────────────────────────────────────────────────────────────────

/// The `n` rows with the largest (or smallest) `sort_col` values.
///
/// The sort is stable: rows with equal sort values keep their original
/// relative order, which matters because ties are common in real data.
/// Absent sort cells order as zero.
pub fn top_n(table: &Table, n: usize, sort_col: &str, descending: bool) -> Table {
    let mut out = Table::new(table.name().to_string(), table.columns().to_vec());
    let Some(idx) = table.column_index(sort_col) else {
        return out;
    };

    let mut order: Vec<usize> = (0..table.len()).collect();
    order.sort_by(|&a, &b| {
        let va = table.rows()[a][idx].number_or_zero();
        let vb = table.rows()[b][idx].number_or_zero();
        let cmp = va.partial_cmp(&vb).unwrap_or(std::cmp::Ordering::Equal);
        if descending {
            cmp.reverse()
        } else {
            cmp
        }
    });

    for &i in order.iter().take(n) {
        out.push_row(table.rows()[i].clone());
    }
    out
}

// ── Scalar derivations ────────────────────────────────────────────────────────

/// `numerator / denominator × 100`, defined as `0.0` when the denominator
/// is zero. Never faults.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        (numerator / denominator) * 100.0
    }
}

/// Budget minus actual; negative means overspend.
pub fn variance(budget: f64, actual: f64) -> f64 {
    budget - actual
}

/// Actual spend as a percentage of budget.
pub fn utilization_pct(actual: f64, budget: f64) -> f64 {
    ratio(actual, budget)
}

/// Calendar-month bucket key, e.g. `"2024-03"`.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

// ── Histogram ─────────────────────────────────────────────────────────────────

/// Bin the numeric values of `col` into `nbins` equal-width buckets over the
/// data range. Returns a table `[bin, count]` with bins in ascending order.
pub fn histogram(table: &Table, col: &str, nbins: usize) -> Table {
    let mut out = Table::with_columns(table.name(), &["bin", "count"]);
    let Some(idx) = table.column_index(col) else {
        return out;
    };
    if table.is_empty() || nbins == 0 {
        return out;
    }

    let values: Vec<f64> = table
        .rows()
        .iter()
        .map(|r| r[idx].number_or_zero())
        .collect();
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    // Degenerate range: everything in one bucket.
    if max <= min {
        out.push_row(vec![
            Value::Text(format!("{:.0}", min)),
            Value::Number(values.len() as f64),
        ]);
        return out;
    }

    let width = (max - min) / nbins as f64;
    let mut counts = vec![0u64; nbins];
    for v in &values {
        let mut bin = ((v - min) / width) as usize;
        if bin >= nbins {
            bin = nbins - 1; // v == max lands in the last bucket
        }
        counts[bin] += 1;
    }

    for (i, count) in counts.iter().enumerate() {
        let lo = min + width * i as f64;
        let hi = min + width * (i + 1) as f64;
        out.push_row(vec![
            Value::Text(format!("{:.0}-{:.0}", lo, hi)),
            Value::Number(*count as f64),
        ]);
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn grouped_input() -> Table {
        let mut t = Table::with_columns("t", &["g", "v"]);
        t.push_row(vec!["A".into(), 10.0.into()]);
        t.push_row(vec!["A".into(), 5.0.into()]);
        t.push_row(vec!["B".into(), 7.0.into()]);
        t
    }

    // ── group_sum ────────────────────────────────────────────────────────────

    #[test]
    fn test_group_sum_basic() {
        let out = group_sum(&grouped_input(), "g", "v", "total");
        assert_eq!(out.len(), 2);
        assert_eq!(out.text(0, "g"), "A");
        assert_eq!(out.num(0, "total"), 15.0);
        assert_eq!(out.text(1, "g"), "B");
        assert_eq!(out.num(1, "total"), 7.0);
    }

    #[test]
    fn test_group_sum_partition_law() {
        let t = grouped_input();
        let out = group_sum(&t, "g", "v", "total");
        let per_group: f64 = out.sum_column("total");
        assert_eq!(per_group, t.sum_column("v"));
        assert_eq!(per_group, 22.0);
    }

    #[test]
    fn test_group_sum_absent_key_buckets_to_empty() {
        let mut t = Table::with_columns("t", &["g", "v"]);
        t.push_row(vec!["A".into(), 1.0.into()]);
        t.push_row(vec![Value::Absent, 2.0.into()]);
        let out = group_sum(&t, "g", "v", "total");
        // Empty-string bucket sorts first; total is preserved.
        assert_eq!(out.text(0, "g"), "");
        assert_eq!(out.num(0, "total"), 2.0);
        assert_eq!(out.sum_column("total"), 3.0);
    }

    #[test]
    fn test_group_sum_missing_column_yields_empty() {
        let out = group_sum(&grouped_input(), "nope", "v", "total");
        assert!(out.is_empty());
        let out = group_sum(&grouped_input(), "g", "nope", "total");
        assert!(out.is_empty());
    }

    #[test]
    fn test_group_sum_empty_input_has_no_groups() {
        let t = Table::with_columns("t", &["g", "v"]);
        assert!(group_sum(&t, "g", "v", "total").is_empty());
    }

    // ── group_mean / group_count ─────────────────────────────────────────────

    #[test]
    fn test_group_mean() {
        let out = group_mean(&grouped_input(), "g", "v", "avg");
        assert_eq!(out.num(0, "avg"), 7.5);
        assert_eq!(out.num(1, "avg"), 7.0);
    }

    #[test]
    fn test_group_count() {
        let out = group_count(&grouped_input(), "g", "count");
        assert_eq!(out.num(0, "count"), 2.0);
        assert_eq!(out.num(1, "count"), 1.0);
    }

    // ── join_left ────────────────────────────────────────────────────────────

    fn parent() -> Table {
        let mut t = Table::with_columns("projects", &["project_id", "budget"]);
        t.push_row(vec!["P1".into(), 100.0.into()]);
        t.push_row(vec!["P2".into(), 200.0.into()]);
        t.push_row(vec!["P3".into(), 300.0.into()]);
        t
    }

    #[test]
    fn test_join_left_matches_and_fills_absent() {
        let mut child = Table::with_columns("sums", &["project_id", "spend"]);
        child.push_row(vec!["P1".into(), 50.0.into()]);
        child.push_row(vec!["P2".into(), 250.0.into()]);

        let joined = join_left(&parent(), &child, "project_id");
        assert_eq!(joined.len(), 3);
        assert_eq!(joined.num(0, "spend"), 50.0);
        assert_eq!(joined.num(1, "spend"), 250.0);
        // Unmatched parent row carries Absent until fill_zero resolves it.
        assert_eq!(joined.get(2, "spend"), Some(&Value::Absent));
    }

    #[test]
    fn test_join_left_empty_child_then_fill_zero() {
        let child = Table::with_columns("sums", &["project_id", "spend"]);
        let joined = join_left(&parent(), &child, "project_id");
        let filled = fill_zero(&joined, &["spend"]);
        assert_eq!(filled.len(), 3);
        for i in 0..3 {
            assert_eq!(filled.num(i, "spend"), 0.0);
        }
    }

    #[test]
    fn test_join_left_unmatched_right_rows_ignored() {
        let mut child = Table::with_columns("sums", &["project_id", "spend"]);
        child.push_row(vec!["P9".into(), 999.0.into()]);
        let joined = join_left(&parent(), &child, "project_id");
        assert_eq!(joined.len(), 3);
        assert_eq!(joined.get(0, "spend"), Some(&Value::Absent));
    }

    #[test]
    fn test_join_left_skips_colliding_columns() {
        let mut child = Table::with_columns("c", &["project_id", "budget", "extra"]);
        child.push_row(vec!["P1".into(), 999.0.into(), "x".into()]);
        let joined = join_left(&parent(), &child, "project_id");
        // Left's budget wins; only "extra" is appended.
        assert_eq!(joined.num(0, "budget"), 100.0);
        assert_eq!(joined.text(0, "extra"), "x");
        assert_eq!(joined.columns().len(), 3);
    }

    // ── top_n ────────────────────────────────────────────────────────────────

    #[test]
    fn test_top_n_stable_tie_break() {
        let mut t = Table::with_columns("t", &["name", "v"]);
        t.push_row(vec!["X".into(), 10.0.into()]);
        t.push_row(vec!["Y".into(), 10.0.into()]);
        t.push_row(vec!["Z".into(), 5.0.into()]);

        let out = top_n(&t, 3, "v", true);
        let names: Vec<String> = (0..out.len()).map(|i| out.text(i, "name")).collect();
        assert_eq!(names, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_top_n_truncates() {
        let mut t = Table::with_columns("t", &["name", "v"]);
        for (name, v) in [("a", 1.0), ("b", 9.0), ("c", 5.0), ("d", 7.0)] {
            t.push_row(vec![name.into(), v.into()]);
        }
        let out = top_n(&t, 2, "v", true);
        assert_eq!(out.len(), 2);
        assert_eq!(out.text(0, "name"), "b");
        assert_eq!(out.text(1, "name"), "d");
    }

    #[test]
    fn test_top_n_ascending() {
        let mut t = Table::with_columns("t", &["name", "v"]);
        for (name, v) in [("a", 3.0), ("b", -5.0), ("c", 1.0)] {
            t.push_row(vec![name.into(), v.into()]);
        }
        let out = top_n(&t, 2, "v", false);
        assert_eq!(out.text(0, "name"), "b");
        assert_eq!(out.text(1, "name"), "c");
    }

    // ── scalars ──────────────────────────────────────────────────────────────

    #[test]
    fn test_ratio_zero_denominator() {
        assert_eq!(ratio(0.0, 0.0), 0.0);
        assert_eq!(ratio(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_ratio_percentage_semantics() {
        assert!((ratio(50.0, 200.0) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_variance_and_utilization_scenario() {
        // budgets [100, 200, 300] with actuals [50, 250, 0]
        let budgets = [100.0, 200.0, 300.0];
        let actuals = [50.0, 250.0, 0.0];
        let variances: Vec<f64> = budgets
            .iter()
            .zip(&actuals)
            .map(|(b, a)| variance(*b, *a))
            .collect();
        let utilizations: Vec<f64> = budgets
            .iter()
            .zip(&actuals)
            .map(|(b, a)| utilization_pct(*a, *b))
            .collect();
        assert_eq!(variances, vec![50.0, -50.0, 300.0]);
        assert_eq!(utilizations, vec![50.0, 125.0, 0.0]);
    }

    #[test]
    fn test_month_key() {
        let d = chrono::NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(month_key(d), "2024-03");
    }

    // ── histogram ────────────────────────────────────────────────────────────

    #[test]
    fn test_histogram_bins_and_counts() {
        let mut t = Table::with_columns("t", &["v"]);
        for v in [0.0, 10.0, 50.0, 90.0, 100.0] {
            t.push_row(vec![v.into()]);
        }
        let out = histogram(&t, "v", 10);
        assert_eq!(out.len(), 10);
        // Total count is preserved across buckets.
        assert_eq!(out.sum_column("count"), 5.0);
        // Max value lands in the last bucket.
        assert_eq!(out.num(9, "count"), 2.0);
    }

    #[test]
    fn test_histogram_degenerate_range() {
        let mut t = Table::with_columns("t", &["v"]);
        t.push_row(vec![42.0.into()]);
        t.push_row(vec![42.0.into()]);
        let out = histogram(&t, "v", 5);
        assert_eq!(out.len(), 1);
        assert_eq!(out.num(0, "count"), 2.0);
    }

    #[test]
    fn test_histogram_empty() {
        let t = Table::with_columns("t", &["v"]);
        assert!(histogram(&t, "v", 5).is_empty());
    }
}
