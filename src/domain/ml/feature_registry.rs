use crate::domain::errors::FeatureError;
use crate::domain::series::feature;
use crate::domain::types::FeatureRow;

/// Ordered list of model input columns.
/// Training and inference must use exactly this order; a change here is a
/// breaking change for stored model artifacts.
pub const FEATURE_NAMES: &[&str] = &[
    feature::SPX_CLOSE,
    feature::SPX_RET_1D,
    feature::VIX_CLOSE,
    feature::SPY_VOLUME,
    feature::CPI_LEVEL,
    feature::UNRATE,
    feature::US10Y,
    feature::US2Y,
    feature::TERM_SPREAD,
];

/// Extract `columns` from a row in order. Any absent column is an error; no defaults.
pub fn extract_feature_vector<S: AsRef<str>>(
    row: &FeatureRow,
    columns: &[S],
) -> Result<Vec<f64>, FeatureError> {
    columns
        .iter()
        .map(|col| {
            row.feature(col.as_ref())
                .ok_or_else(|| FeatureError::MissingFeature {
                    column: col.as_ref().to_string(),
                    date: row.date,
                })
        })
        .collect()
}

/// Like [`extract_feature_vector`] but returns `None` for incomplete rows.
pub fn complete_feature_vector<S: AsRef<str>>(row: &FeatureRow, columns: &[S]) -> Option<Vec<f64>> {
    extract_feature_vector(row, columns).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn full_row() -> FeatureRow {
        let mut row = FeatureRow::empty(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            row.features.insert(name.to_string(), i as f64);
        }
        row
    }

    #[test]
    fn test_feature_vector_length() {
        let vec = extract_feature_vector(&full_row(), FEATURE_NAMES).unwrap();
        assert_eq!(vec.len(), FEATURE_NAMES.len());
    }

    #[test]
    fn test_feature_order_is_registry_order() {
        let vec = extract_feature_vector(&full_row(), FEATURE_NAMES).unwrap();
        // spx_close is index 0
        assert_eq!(vec[0], 0.0);
        // term spread is last index (8)
        assert_eq!(vec[8], 8.0);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let mut row = full_row();
        row.features.remove("vix_close");

        let err = extract_feature_vector(&row, FEATURE_NAMES).unwrap_err();
        assert_eq!(
            err,
            FeatureError::MissingFeature {
                column: "vix_close".to_string(),
                date: row.date,
            }
        );
        assert!(complete_feature_vector(&row, FEATURE_NAMES).is_none());
    }
}
