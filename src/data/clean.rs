use crate::config::PipelineConfig;

use super::model::{CellValue, ColumnKind, RawTable, WellLogDataset};

// ---------------------------------------------------------------------------
// Cleaning summary
// ---------------------------------------------------------------------------

/// Bounds applied to one column by the outlier trim.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnTrim {
    pub column: String,
    pub lower: f64,
    pub upper: f64,
    pub removed: usize,
}

/// What the cleaning pipeline did to a table, for logging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningSummary {
    pub rows_read: usize,
    pub sentinel_cells: usize,
    pub incomplete_rows: usize,
    pub trims: Vec<ColumnTrim>,
    pub rows_kept: usize,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full cleaning pipeline over a parsed table:
/// sentinel → missing, drop incomplete rows, sequential percentile trim.
///
/// Column kinds are decided on the table as parsed, before any row is dropped.
pub fn clean_table(table: RawTable, config: &PipelineConfig) -> (WellLogDataset, CleaningSummary) {
    let RawTable { columns, mut rows } = table;
    let kinds: Vec<ColumnKind> = (0..columns.len())
        .map(|i| ColumnKind::infer(rows.iter().map(|r| &r[i])))
        .collect();

    let mut summary = CleaningSummary {
        rows_read: rows.len(),
        ..Default::default()
    };

    summary.sentinel_cells = replace_sentinel(&mut rows, config.missing_sentinel);
    summary.incomplete_rows = drop_incomplete_rows(&mut rows);

    for (idx, column) in columns.iter().enumerate() {
        if kinds[idx] != ColumnKind::Numeric || *column == config.depth_column {
            continue;
        }
        if let Some((lower, upper, removed)) = trim_column(
            &mut rows,
            idx,
            config.lower_quantile,
            config.upper_quantile,
        ) {
            summary.trims.push(ColumnTrim {
                column: column.clone(),
                lower,
                upper,
                removed,
            });
        }
    }

    summary.rows_kept = rows.len();
    let dataset = WellLogDataset::from_parts(columns, kinds, rows, &config.depth_column);
    (dataset, summary)
}

/// Replace every cell whose numeric value equals `sentinel` with `Missing`.
/// Returns how many cells were replaced.
pub fn replace_sentinel(rows: &mut [Vec<CellValue>], sentinel: f64) -> usize {
    let mut replaced = 0;
    for cell in rows.iter_mut().flatten() {
        if cell.as_f64() == Some(sentinel) {
            *cell = CellValue::Missing;
            replaced += 1;
        }
    }
    replaced
}

/// Remove every row holding at least one missing cell. Returns the number removed.
pub fn drop_incomplete_rows(rows: &mut Vec<Vec<CellValue>>) -> usize {
    let before = rows.len();
    rows.retain(|row| !row.iter().any(CellValue::is_missing));
    before - rows.len()
}

/// Remove rows whose value in column `idx` lies outside the
/// `[q(lower), q(upper)]` band of the column's *current* values.
///
/// Returns `(lower_bound, upper_bound, rows_removed)`, or `None` when the
/// column has no numeric values left to measure.
pub fn trim_column(
    rows: &mut Vec<Vec<CellValue>>,
    idx: usize,
    lower_q: f64,
    upper_q: f64,
) -> Option<(f64, f64, usize)> {
    let mut values: Vec<f64> = rows.iter().filter_map(|r| r[idx].as_f64()).collect();
    values.sort_by(f64::total_cmp);
    let lower = quantile(&values, lower_q)?;
    let upper = quantile(&values, upper_q)?;

    let before = rows.len();
    rows.retain(|row| {
        row[idx]
            .as_f64()
            .is_some_and(|v| v >= lower && v <= upper)
    });
    Some((lower, upper, before - rows.len()))
}

/// Quantile of ascending-sorted `values` using linear interpolation between
/// the closest ranks (numpy's default `linear` method).
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let t = pos - lo as f64;
    let (a, b) = (sorted[lo], sorted[hi]);
    let diff = b - a;
    // Interpolate from the nearer endpoint so t = 1 lands exactly on b.
    if t >= 0.5 {
        Some(b - diff * (1.0 - t))
    } else {
        Some(a + diff * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(v: f64) -> CellValue {
        CellValue::Float(v)
    }

    fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> RawTable {
        let mut t = RawTable::with_header(columns);
        t.rows = rows;
        t
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile(&v, 0.0), Some(1.0));
        assert_eq!(quantile(&v, 1.0), Some(5.0));
        assert_eq!(quantile(&v, 0.5), Some(3.0));
        assert!((quantile(&v, 0.05).unwrap() - 1.2).abs() < 1e-12);
        assert!((quantile(&v, 0.98).unwrap() - 4.92).abs() < 1e-12);
        assert_eq!(quantile(&[7.0], 0.98), Some(7.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn sentinel_rows_are_dropped() {
        // DEPTH, POROSITY, PERM – 10 rows, one PERM reading missing.
        let rows = (0..10)
            .map(|i| {
                let perm = if i == 4 { -999.25 } else { 50.0 };
                vec![f(1000.0 + i as f64), f(0.2), f(perm)]
            })
            .collect();
        let (ds, summary) = clean_table(
            table(&["DEPTH", "POROSITY", "PERM"], rows),
            &PipelineConfig::default(),
        );

        assert_eq!(summary.sentinel_cells, 1);
        assert_eq!(summary.incomplete_rows, 1);
        assert_eq!(ds.len(), 9);
        let perm = ds.numeric_column("PERM").unwrap();
        assert!(perm.iter().all(|v| *v == 50.0));
        assert!(ds.rows.iter().flatten().all(|c| !c.is_missing()));
        // The 1004 m row is the one that went.
        assert!(!ds.numeric_column("DEPTH").unwrap().contains(&1004.0));
    }

    #[test]
    fn missing_text_cell_drops_row() {
        let rows = vec![
            vec![f(1.0), CellValue::Text("sand".into())],
            vec![f(2.0), CellValue::Missing],
        ];
        let (ds, _) = clean_table(table(&["DEPTH", "FACIES"], rows), &PipelineConfig::default());
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn outlier_is_removed_before_scaling() {
        let rows = vec![
            vec![f(1000.0), f(0.1)],
            vec![f(1001.0), f(0.9)],
            vec![f(1002.0), f(5.0)],
        ];
        let (ds, summary) = clean_table(
            table(&["DEPTH", "POROSITY"], rows),
            &PipelineConfig::default(),
        );
        let porosity = ds.numeric_column("POROSITY").unwrap();
        assert!(!porosity.contains(&5.0));
        assert!(porosity.contains(&0.9));
        assert_eq!(summary.trims.len(), 1);
        assert_eq!(summary.trims[0].column, "POROSITY");
    }

    #[test]
    fn depth_and_text_columns_are_not_trimmed() {
        let rows = (0..20)
            .map(|i| {
                vec![
                    f(i as f64 * 10.0),
                    CellValue::Text(format!("zone{i}")),
                    f(0.5),
                ]
            })
            .collect();
        let (ds, summary) = clean_table(
            table(&["DEPTH", "ZONE", "PHIE"], rows),
            &PipelineConfig::default(),
        );
        assert_eq!(ds.len(), 20);
        assert_eq!(summary.trims.len(), 1);
        assert_eq!(summary.trims[0].column, "PHIE");
        assert_eq!(summary.trims[0].removed, 0);
    }

    #[test]
    fn trim_bounds_follow_the_narrowed_table() {
        // Column A's extremes coincide with column B's extremes on the
        // unfiltered table, so a single joint pass would keep four rows.
        // Filtering B on the table already narrowed by A removes two more.
        let rows = vec![
            vec![f(0.0), f(1.0), f(1.0)],
            vec![f(1.0), f(2.0), f(5.0)],
            vec![f(2.0), f(3.0), f(3.0)],
            vec![f(3.0), f(4.0), f(4.0)],
            vec![f(4.0), f(5.0), f(2.0)],
            vec![f(5.0), f(6.0), f(6.0)],
        ];
        let (ds, summary) = clean_table(
            table(&["DEPTH", "A", "B"], rows),
            &PipelineConfig::default(),
        );

        assert_eq!(ds.numeric_column("DEPTH").unwrap(), vec![2.0, 3.0]);
        assert_eq!(summary.trims[0].removed, 2);
        assert_eq!(summary.trims[1].removed, 2);
        // B's bounds were measured on {5, 3, 4, 2}, not on the full column.
        assert!((summary.trims[1].lower - 2.15).abs() < 1e-12);
        assert!((summary.trims[1].upper - 4.94).abs() < 1e-12);

        for trim in &summary.trims {
            let values = ds.numeric_column(&trim.column).unwrap();
            assert!(values.iter().all(|v| *v >= trim.lower && *v <= trim.upper));
        }
    }

    #[test]
    fn kinds_are_decided_before_rows_are_dropped() {
        // The only text cell sits in a row that is later dropped; the
        // column still counts as non-numeric and is never trimmed.
        let rows = vec![
            vec![f(1.0), f(10.0)],
            vec![f(2.0), CellValue::Text("n/a".into())],
            vec![f(3.0), f(-999.25)],
            vec![f(4.0), f(90.0)],
        ];
        let (ds, summary) = clean_table(table(&["DEPTH", "GR"], rows), &PipelineConfig::default());
        assert_eq!(ds.kinds, vec![ColumnKind::Numeric, ColumnKind::Other]);
        assert!(summary.trims.is_empty());
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn integer_columns_are_trimmed() {
        let rows = (0..5)
            .map(|i| vec![f(i as f64), CellValue::Integer(i * 10)])
            .collect();
        let (ds, _) = clean_table(table(&["DEPTH", "COUNT"], rows), &PipelineConfig::default());
        assert_eq!(ds.numeric_column("COUNT").unwrap(), vec![10.0, 20.0, 30.0]);
    }
}
