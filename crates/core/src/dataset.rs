//! CSV dataset loading
//!
//! Reads a header-addressed CSV file into a raw [`DataTable`] (kept around for
//! the data-preview panel) and extracts the seven columns the classifier
//! consumes into typed [`Record`]s. Columns outside the schema are ignored.

use std::path::Path;

use crate::encoding::CustomerInput;
use crate::errors::{ChurnError, Result};

/// Column names as they appear in the source CSV header.
pub const COL_GENDER: &str = "gender";
pub const COL_SENIOR: &str = "SeniorCitizen";
pub const COL_INTERNET: &str = "InternetService";
pub const COL_PAYMENT: &str = "PaymentMethod";
pub const COL_TENURE: &str = "tenure";
pub const COL_CHARGES: &str = "MonthlyCharges";
pub const COL_CHURN: &str = "Churn";

/// The four categorical feature columns, in feature-vector order.
pub const CATEGORICAL_COLUMNS: [&str; 4] = [COL_GENDER, COL_SENIOR, COL_INTERNET, COL_PAYMENT];

/// A raw tabular view of the source file: header plus string cells.
/// No transformation is applied; this backs the data-preview panel.
#[derive(Clone, Debug)]
pub struct DataTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Load a table from a CSV file.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse CSV text. The first non-blank line is the header; blank lines
    /// and `#` comments are skipped. Every data row must match the header
    /// width.
    pub fn parse(content: &str) -> Result<Self> {
        let mut headers: Vec<String> = Vec::new();
        let mut rows = Vec::new();

        for (line_idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let cells: Vec<String> = line.split(',').map(|s| s.trim().to_string()).collect();

            if headers.is_empty() {
                headers = cells;
                continue;
            }

            if cells.len() != headers.len() {
                return Err(ChurnError::Schema(format!(
                    "line {}: expected {} columns, got {}",
                    line_idx + 1,
                    headers.len(),
                    cells.len()
                )));
            }

            rows.push(cells);
        }

        if headers.is_empty() {
            return Err(ChurnError::Schema("missing header row".into()));
        }

        Ok(Self { headers, rows })
    }

    /// (rows, columns) shape of the table.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.headers.len())
    }

    /// First `n` rows, for preview rendering.
    pub fn head(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..self.rows.len().min(n)]
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ChurnError::Schema(format!("missing required column {name:?}")))
    }
}

/// One customer row with the fields the classifier consumes.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub gender: String,
    pub senior_citizen: String,
    pub internet_service: String,
    pub payment_method: String,
    pub tenure: f64,
    pub monthly_charges: f64,
    pub churn: String,
}

impl Record {
    /// The feature-side view of this record, as the manual-input path sees it.
    pub fn input(&self) -> CustomerInput {
        CustomerInput {
            gender: self.gender.clone(),
            senior_citizen: self.senior_citizen.clone(),
            internet_service: self.internet_service.clone(),
            payment_method: self.payment_method.clone(),
            tenure: self.tenure,
            monthly_charges: self.monthly_charges,
        }
    }
}

/// The typed training dataset extracted from a [`DataTable`].
#[derive(Clone, Debug)]
pub struct Dataset {
    pub records: Vec<Record>,
}

impl Dataset {
    /// Select the schema columns out of a raw table. Fails with
    /// [`ChurnError::EmptyDataset`] when the table has no data rows and with
    /// [`ChurnError::Schema`] when a required column is missing or a numeric
    /// cell does not parse.
    pub fn from_table(table: &DataTable) -> Result<Self> {
        if table.rows.is_empty() {
            return Err(ChurnError::EmptyDataset);
        }

        let gender = table.column_index(COL_GENDER)?;
        let senior = table.column_index(COL_SENIOR)?;
        let internet = table.column_index(COL_INTERNET)?;
        let payment = table.column_index(COL_PAYMENT)?;
        let tenure = table.column_index(COL_TENURE)?;
        let charges = table.column_index(COL_CHARGES)?;
        let churn = table.column_index(COL_CHURN)?;

        let mut records = Vec::with_capacity(table.rows.len());
        for (row_idx, row) in table.rows.iter().enumerate() {
            let parse_num = |col: usize, name: &str| -> Result<f64> {
                row[col].parse::<f64>().map_err(|_| {
                    ChurnError::Schema(format!(
                        "row {}: invalid number {:?} in column {name}",
                        row_idx + 1,
                        row[col]
                    ))
                })
            };

            records.push(Record {
                gender: row[gender].clone(),
                senior_citizen: row[senior].clone(),
                internet_service: row[internet].clone(),
                payment_method: row[payment].clone(),
                tenure: parse_num(tenure, COL_TENURE)?,
                monthly_charges: parse_num(charges, COL_CHARGES)?,
                churn: row[churn].clone(),
            });
        }

        Ok(Self { records })
    }

    /// Load and extract in one step.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let table = DataTable::from_csv(path)?;
        Self::from_table(&table)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
