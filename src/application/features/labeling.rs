use crate::domain::features::{FeatureRow, LabeledRow};

/// Sessions between a row and the close its label compares against.
pub const LABEL_HORIZON: usize = 5;

/// Feature rows split into a labeled training set and the row to score.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSeries {
    /// Rows whose forward close is known, oldest first.
    pub training: Vec<LabeledRow>,
    /// Most recent row; never part of `training`.
    pub latest: FeatureRow,
}

impl LabeledSeries {
    pub fn positive_ratio(&self) -> f64 {
        if self.training.is_empty() {
            return 0.0;
        }
        let positives = self.training.iter().filter(|r| r.target).count();
        positives as f64 / self.training.len() as f64
    }
}

/// Labels each row with whether the close `horizon` rows later is higher.
///
/// The last `horizon` rows have no forward close and are left out of the
/// training set. Returns `None` for an empty input or a zero horizon.
pub fn label_rows(rows: &[FeatureRow], horizon: usize) -> Option<LabeledSeries> {
    if horizon == 0 {
        return None;
    }
    let latest = *rows.last()?;

    let training = rows
        .iter()
        .zip(rows.iter().skip(horizon))
        .map(|(row, future)| LabeledRow {
            row: *row,
            target: future.close > row.close,
        })
        .collect();

    Some(LabeledSeries { training, latest })
}
