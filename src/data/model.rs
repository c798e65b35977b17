// ---------------------------------------------------------------------------
// CellValue – a single cell of the well-log table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a spreadsheet reader produces.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Missing,
}

impl CellValue {
    /// Numeric view of the cell. Booleans and text are not numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// `Missing`, or a float NaN (readers hand NaN through for blank numeric cells).
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Missing => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }
}

// ---------------------------------------------------------------------------
// ColumnKind
// ---------------------------------------------------------------------------

/// Declared kind of a column, decided once on the table as parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every non-missing cell is an integer or a float.
    Numeric,
    Other,
}

impl ColumnKind {
    /// Infer the kind from a column's cells, ignoring missing ones.
    pub fn infer<'a>(cells: impl IntoIterator<Item = &'a CellValue>) -> Self {
        let all_numeric = cells
            .into_iter()
            .filter(|c| !c.is_missing())
            .all(CellValue::is_numeric);
        if all_numeric {
            ColumnKind::Numeric
        } else {
            ColumnKind::Other
        }
    }
}

// ---------------------------------------------------------------------------
// RawTable – what a reader hands to the cleaning pipeline
// ---------------------------------------------------------------------------

/// A parsed table before any cleaning. Rows are aligned with `columns`.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Build a table from raw header cells, naming blank headers and
    /// disambiguating duplicates (`NAME`, `NAME.1`, `NAME.2`, …).
    pub fn with_header<S: AsRef<str>>(header: &[S]) -> Self {
        let mut columns: Vec<String> = Vec::with_capacity(header.len());
        for (i, raw) in header.iter().enumerate() {
            let trimmed = raw.as_ref().trim();
            let base = if trimmed.is_empty() {
                format!("Unnamed: {i}")
            } else {
                trimmed.to_string()
            };
            let mut name = base.clone();
            let mut n = 1;
            while columns.contains(&name) {
                name = format!("{base}.{n}");
                n += 1;
            }
            columns.push(name);
        }
        RawTable {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

// ---------------------------------------------------------------------------
// WellLogDataset – the cleaned, session-held table
// ---------------------------------------------------------------------------

/// The cleaned dataset: ordered columns, their kinds, and complete rows.
#[derive(Debug, Clone)]
pub struct WellLogDataset {
    /// Column names in declared (file) order.
    pub columns: Vec<String>,
    /// Kind of each column, parallel to `columns`.
    pub kinds: Vec<ColumnKind>,
    /// Rows; each row is aligned with `columns`.
    pub rows: Vec<Vec<CellValue>>,
    /// Name of the reference vertical-position column.
    pub depth_column: String,
}

impl WellLogDataset {
    /// Assemble a dataset from kinds decided earlier, typically on the table
    /// as parsed, before incomplete rows were dropped.
    pub fn from_parts(
        columns: Vec<String>,
        kinds: Vec<ColumnKind>,
        rows: Vec<Vec<CellValue>>,
        depth_column: &str,
    ) -> Self {
        debug_assert_eq!(columns.len(), kinds.len());
        WellLogDataset {
            columns,
            kinds,
            rows,
            depth_column: depth_column.to_string(),
        }
    }

    /// Build a dataset, inferring each column's kind from its cells.
    #[cfg(test)]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>, depth_column: &str) -> Self {
        let kinds = (0..columns.len())
            .map(|i| ColumnKind::infer(rows.iter().filter_map(|r| r.get(i))))
            .collect();
        Self::from_parts(columns, kinds, rows, depth_column)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.column_index(name).map(|i| self.kinds[i])
    }

    /// Every column except the depth column, in declared order.
    pub fn feature_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| **c != self.depth_column)
            .cloned()
            .collect()
    }

    /// Values of a numeric column as `f64`, or `None` if the column is absent
    /// or holds a non-numeric cell.
    pub fn numeric_column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        self.rows.iter().map(|row| row[idx].as_f64()).collect()
    }
}
