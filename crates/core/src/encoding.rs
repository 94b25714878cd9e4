//! Label encoding for categorical columns
//!
//! One [`EncodingTable`] is fitted from the training dataset and is the single
//! source of truth for three consumers: batch encoding of the training data,
//! encoding of a manually entered record, and decoding the predicted target
//! back to a display label. Keeping one table eliminates the drift hazard of
//! a hand-maintained copy of the fitted codes.
//!
//! Codes are assigned per column by lexicographic order of the distinct
//! observed values (`0..k-1`). Model-facing values are fixed-point `i64` in
//! micro units; categorical codes are scaled to micro units as well so the
//! trainer's threshold quantization can separate adjacent codes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::dataset::{
    Dataset, Record, CATEGORICAL_COLUMNS, COL_CHURN, COL_GENDER, COL_INTERNET, COL_PAYMENT,
    COL_SENIOR,
};
use crate::errors::{ChurnError, Result};
use crate::gbdt::SCALE;

/// Convert a display-side number to fixed-point micro units.
pub fn to_micro(value: f64) -> i64 {
    (value * SCALE as f64).round() as i64
}

/// A manually entered customer record; the target is absent by construction.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CustomerInput {
    pub gender: String,
    pub senior_citizen: String,
    pub internet_service: String,
    pub payment_method: String,
    pub tenure: f64,
    pub monthly_charges: f64,
}

impl CustomerInput {
    fn categorical(&self, column: &str) -> &str {
        match column {
            COL_GENDER => &self.gender,
            COL_SENIOR => &self.senior_citizen,
            COL_INTERNET => &self.internet_service,
            COL_PAYMENT => &self.payment_method,
            other => unreachable!("not a categorical feature column: {other}"),
        }
    }
}

/// Per-column mapping from categorical strings to stable integer codes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncodingTable {
    /// Column name -> distinct values in lexicographic order; the code of a
    /// value is its index.
    columns: BTreeMap<String, Vec<String>>,
}

impl EncodingTable {
    /// Fit the table from the training dataset's observed values.
    pub fn fit(dataset: &Dataset) -> Result<Self> {
        if dataset.is_empty() {
            return Err(ChurnError::EmptyDataset);
        }

        let mut columns = BTreeMap::new();
        for column in CATEGORICAL_COLUMNS
            .into_iter()
            .chain(std::iter::once(COL_CHURN))
        {
            let distinct: BTreeSet<String> = dataset
                .records
                .iter()
                .map(|r| match column {
                    COL_GENDER => r.gender.clone(),
                    COL_SENIOR => r.senior_citizen.clone(),
                    COL_INTERNET => r.internet_service.clone(),
                    COL_PAYMENT => r.payment_method.clone(),
                    COL_CHURN => r.churn.clone(),
                    other => unreachable!("unexpected encoding column: {other}"),
                })
                .collect();
            columns.insert(column.to_string(), distinct.into_iter().collect());
        }

        Ok(Self { columns })
    }

    /// Distinct values of a column in code order; backs the fixed-choice
    /// selectors in the UI so the input domain is the fitted domain.
    pub fn values(&self, column: &str) -> Result<&[String]> {
        self.columns
            .get(column)
            .map(|v| v.as_slice())
            .ok_or_else(|| ChurnError::Schema(format!("no encoding for column {column:?}")))
    }

    /// Encode one categorical value to its integer code.
    pub fn encode(&self, column: &str, value: &str) -> Result<u32> {
        let values = self.values(column)?;
        values
            .binary_search_by(|v| v.as_str().cmp(value))
            .map(|idx| idx as u32)
            .map_err(|_| ChurnError::UnseenCategory {
                column: column.to_string(),
                value: value.to_string(),
            })
    }

    /// Decode a target code back to its display label. Only the target
    /// supports decoding; feature encodings are write-only.
    pub fn decode_target(&self, code: u32) -> Result<&str> {
        let values = self.values(COL_CHURN)?;
        values
            .get(code as usize)
            .map(|s| s.as_str())
            .ok_or_else(|| ChurnError::UnseenCategory {
                column: COL_CHURN.to_string(),
                value: format!("code {code}"),
            })
    }

    /// Assemble the model-facing feature vector for one customer:
    /// four scaled categorical codes followed by the two numeric fields in
    /// micro units. This is the only place the vector layout is defined.
    pub fn encode_features(&self, input: &CustomerInput) -> Result<Vec<i64>> {
        let mut features = Vec::with_capacity(CATEGORICAL_COLUMNS.len() + 2);
        for column in CATEGORICAL_COLUMNS {
            let code = self.encode(column, input.categorical(column))?;
            features.push(code as i64 * SCALE);
        }
        features.push(to_micro(input.tenure));
        features.push(to_micro(input.monthly_charges));
        Ok(features)
    }

    /// Encode the target of one training record, scaled to micro units.
    pub fn encode_target(&self, record: &Record) -> Result<i64> {
        let code = self.encode(COL_CHURN, &record.churn)?;
        Ok(code as i64 * SCALE)
    }
}

/// Model-ready dataset: fixed-point feature rows plus target vector, with
/// row order matching the source.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EncodedDataset {
    pub features: Vec<Vec<i64>>,
    pub targets: Vec<i64>,
    pub feature_count: usize,
}

impl EncodedDataset {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Blake3 hash of the canonical JSON representation. Recorded in trained
    /// models so a persisted artifact can be matched against the data it was
    /// trained on.
    pub fn content_hash(&self) -> Result<String> {
        let json = crate::serde_canon::to_canonical_json(self)?;
        Ok(hex::encode(blake3::hash(json.as_bytes()).as_bytes()))
    }
}

/// Apply the table to every record of the dataset.
pub fn encode_dataset(dataset: &Dataset, table: &EncodingTable) -> Result<EncodedDataset> {
    if dataset.is_empty() {
        return Err(ChurnError::EmptyDataset);
    }

    let mut features = Vec::with_capacity(dataset.len());
    let mut targets = Vec::with_capacity(dataset.len());
    for record in &dataset.records {
        features.push(table.encode_features(&record.input())?);
        targets.push(table.encode_target(record)?);
    }

    let feature_count = features[0].len();
    Ok(EncodedDataset {
        features,
        targets,
        feature_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DataTable;

    fn demo_dataset() -> Dataset {
        let csv = "\
gender,SeniorCitizen,InternetService,PaymentMethod,tenure,MonthlyCharges,Churn
Male,No,DSL,Mailed Cheque,5,50.0,No
Female,Yes,Fiber Optic,Electronic Cheque,30,90.0,Yes
Female,No,No Internet Service,Bank Transfer,12,20.5,No
Male,Yes,Fiber Optic,Credit Card,2,95.0,Yes
";
        Dataset::from_table(&DataTable::parse(csv).unwrap()).unwrap()
    }

    #[test]
    fn test_codes_follow_lexicographic_fit_order() {
        let table = EncodingTable::fit(&demo_dataset()).unwrap();

        // The documented contract: distinct values sorted, codes 0..k-1.
        assert_eq!(table.encode(COL_GENDER, "Female").unwrap(), 0);
        assert_eq!(table.encode(COL_GENDER, "Male").unwrap(), 1);
        assert_eq!(table.encode(COL_SENIOR, "No").unwrap(), 0);
        assert_eq!(table.encode(COL_SENIOR, "Yes").unwrap(), 1);
        assert_eq!(table.encode(COL_INTERNET, "DSL").unwrap(), 0);
        assert_eq!(table.encode(COL_INTERNET, "Fiber Optic").unwrap(), 1);
        assert_eq!(table.encode(COL_INTERNET, "No Internet Service").unwrap(), 2);
        assert_eq!(table.encode(COL_PAYMENT, "Bank Transfer").unwrap(), 0);
        assert_eq!(table.encode(COL_PAYMENT, "Credit Card").unwrap(), 1);
        assert_eq!(table.encode(COL_PAYMENT, "Electronic Cheque").unwrap(), 2);
        assert_eq!(table.encode(COL_PAYMENT, "Mailed Cheque").unwrap(), 3);
        assert_eq!(table.encode(COL_CHURN, "No").unwrap(), 0);
        assert_eq!(table.encode(COL_CHURN, "Yes").unwrap(), 1);
    }

    #[test]
    fn test_target_decode_roundtrip() {
        let table = EncodingTable::fit(&demo_dataset()).unwrap();
        for value in ["No", "Yes"] {
            let code = table.encode(COL_CHURN, value).unwrap();
            assert_eq!(table.decode_target(code).unwrap(), value);
        }
    }

    #[test]
    fn test_unseen_category_rejected() {
        let table = EncodingTable::fit(&demo_dataset()).unwrap();
        let err = table.encode(COL_GENDER, "Other").unwrap_err();
        assert!(matches!(err, ChurnError::UnseenCategory { .. }));
    }

    #[test]
    fn test_fit_on_empty_dataset_fails() {
        let dataset = Dataset { records: vec![] };
        assert!(matches!(
            EncodingTable::fit(&dataset),
            Err(ChurnError::EmptyDataset)
        ));
    }

    #[test]
    fn test_feature_vector_layout() {
        let dataset = demo_dataset();
        let table = EncodingTable::fit(&dataset).unwrap();
        let features = table.encode_features(&dataset.records[1].input()).unwrap();

        // Female, Yes, Fiber Optic, Electronic Cheque, 30 months, 90.0
        assert_eq!(features, vec![0, SCALE, SCALE, 2 * SCALE, 30 * SCALE, 90 * SCALE]);
    }

    #[test]
    fn test_numeric_passthrough_allows_negative() {
        // Negative numerics are semantically invalid but accepted.
        assert_eq!(to_micro(-1.5), -1_500_000);
        assert_eq!(to_micro(0.000001), 1);
    }

    #[test]
    fn test_encode_dataset_shape_and_targets() {
        let dataset = demo_dataset();
        let table = EncodingTable::fit(&dataset).unwrap();
        let encoded = encode_dataset(&dataset, &table).unwrap();

        assert_eq!(encoded.len(), 4);
        assert_eq!(encoded.feature_count, 6);
        assert_eq!(encoded.targets, vec![0, SCALE, 0, SCALE]);
    }

    #[test]
    fn test_content_hash_stable() {
        let dataset = demo_dataset();
        let table = EncodingTable::fit(&dataset).unwrap();
        let encoded = encode_dataset(&dataset, &table).unwrap();

        let h1 = encoded.content_hash().unwrap();
        let h2 = encoded.content_hash().unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }
}
