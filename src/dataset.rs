use crate::peaks::{self, Peak};
use crate::smoothing::{SavitzkyGolay, SmoothingError};
use thiserror::Error;

/// A pair of aligned arrays: features `x` and a dependent series `y`,
/// plus the maxima cached by [`Dataset::prepare`].
///
/// The container keeps `features.len() == series.len()` by validating at
/// every mutation point. There is no internal synchronisation; a shared
/// instance needs callers to serialise writes.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Vec<f64>,
    series: Vec<f64>,
    maxima: Option<Vec<Peak>>,
}

impl Dataset {
    pub fn new(features: Vec<f64>, series: Vec<f64>) -> Result<Self, DatasetError> {
        if features.len() != series.len() {
            return Err(DatasetError::LengthMismatch {
                expected: features.len(),
                actual: series.len(),
            });
        }
        Ok(Self {
            features,
            series,
            maxima: None,
        })
    }

    /// Returns the stored `(features, series)` pair.
    pub fn data(&self) -> (&[f64], &[f64]) {
        (&self.features, &self.series)
    }

    pub fn features(&self) -> &[f64] {
        &self.features
    }

    pub fn series(&self) -> &[f64] {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Locates the local maxima of `series` with default constraints.
    ///
    /// A pure pass-through to [`peaks::find_maxima`] that reads nothing from
    /// the container; the series is explicit so it can be applied to a
    /// smoothed copy just as well as to the stored one.
    pub fn find_maximum(&self, series: &[f64]) -> Vec<Peak> {
        peaks::find_maxima(series)
    }

    /// Smooths `series` with a Savitzky-Golay filter and returns the result
    /// without committing it; use [`Self::update_y`] for that. Like
    /// [`Self::find_maximum`], a pure pass-through that leaves the stored
    /// data untouched.
    pub fn smooth_y(
        &self,
        series: &[f64],
        window: usize,
        poly_order: usize,
    ) -> Result<Vec<f64>, SmoothingError> {
        SavitzkyGolay::new(window, poly_order)?.apply(series)
    }

    /// Replaces the stored series, discarding the previous one and any
    /// cached maxima.
    pub fn update_y(&mut self, series: Vec<f64>) -> Result<(), DatasetError> {
        if series.len() != self.features.len() {
            return Err(DatasetError::LengthMismatch {
                expected: self.features.len(),
                actual: series.len(),
            });
        }
        self.series = series;
        self.maxima = None;
        Ok(())
    }

    /// Appends aligned feature/series pairs to the stored arrays.
    pub fn extend(&mut self, features: &[f64], series: &[f64]) -> Result<(), DatasetError> {
        if features.len() != series.len() {
            return Err(DatasetError::LengthMismatch {
                expected: features.len(),
                actual: series.len(),
            });
        }
        self.features.extend_from_slice(features);
        self.series.extend_from_slice(series);
        self.maxima = None;
        Ok(())
    }

    /// Smooths the stored series in place, then locates and caches its
    /// maxima. The typical preparation step for loading-curve data.
    pub fn prepare(
        &mut self,
        window: usize,
        poly_order: usize,
    ) -> Result<&[Peak], SmoothingError> {
        let smoothed = SavitzkyGolay::new(window, poly_order)?.apply(&self.series)?;
        self.series = smoothed;
        let maxima = peaks::find_maxima(&self.series);
        Ok(self.maxima.insert(maxima))
    }

    /// The maxima cached by the last [`Self::prepare`] call, if the series
    /// has not been replaced since.
    pub fn maxima(&self) -> Option<&[Peak]> {
        self.maxima.as_deref()
    }
}

#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DatasetError {
    #[error("features has {expected} points but series has {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_returns_the_constructed_pair() -> Result<(), anyhow::Error> {
        let dataset = Dataset::new(vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0])?;
        assert_eq!(dataset.data(), (&[1.0, 2.0, 3.0][..], &[4.0, 5.0, 6.0][..]));
        Ok(())
    }

    #[test]
    fn mismatched_construction_is_rejected() {
        assert_eq!(
            Dataset::new(vec![1.0], vec![1.0, 2.0]).err(),
            Some(DatasetError::LengthMismatch {
                expected: 1,
                actual: 2,
            })
        );
    }

    #[test]
    fn smooth_then_commit_then_read() -> Result<(), anyhow::Error> {
        let mut dataset = Dataset::new(
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![0.0, 1.0, 4.0, 1.0, 0.0],
        )?;

        let maxima = dataset.find_maximum(dataset.series());
        assert_eq!(
            maxima,
            vec![Peak {
                index: 2,
                value: 4.0
            }]
        );

        let smoothed = dataset.smooth_y(dataset.series(), 3, 1)?;
        assert_eq!(smoothed.len(), 5);

        dataset.update_y(smoothed.clone())?;
        assert_eq!(dataset.series(), &smoothed[..]);
        Ok(())
    }

    #[test]
    fn rejected_update_leaves_the_series_untouched() -> Result<(), anyhow::Error> {
        let mut dataset = Dataset::new(vec![1.0, 2.0], vec![3.0, 4.0])?;
        assert_eq!(
            dataset.update_y(vec![1.0]).err(),
            Some(DatasetError::LengthMismatch {
                expected: 2,
                actual: 1,
            })
        );
        assert_eq!(dataset.series(), &[3.0, 4.0]);
        Ok(())
    }

    #[test]
    fn prepare_caches_maxima_and_update_clears_them() -> Result<(), anyhow::Error> {
        let series: Vec<f64> = (0..21)
            .map(|i| {
                let x = (i as f64 - 10.0) / 4.0;
                (-x * x).exp()
            })
            .collect();
        let features: Vec<f64> = (0..21).map(f64::from).collect();
        let mut dataset = Dataset::new(features, series)?;

        let maxima = dataset.prepare(5, 3)?.to_vec();
        assert_eq!(maxima.len(), 1);
        assert_eq!(maxima[0].index, 10);
        assert_eq!(dataset.maxima(), Some(&maxima[..]));

        let flat = vec![0.0; dataset.len()];
        dataset.update_y(flat)?;
        assert_eq!(dataset.maxima(), None);
        Ok(())
    }

    #[test]
    fn extend_appends_aligned_pairs() -> Result<(), anyhow::Error> {
        let mut dataset = Dataset::new(vec![1.0, 2.0], vec![10.0, 20.0])?;
        dataset.extend(&[3.0, 4.0], &[30.0, 40.0])?;
        assert_eq!(dataset.features(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(dataset.series(), &[10.0, 20.0, 30.0, 40.0]);

        assert!(dataset.extend(&[5.0], &[]).is_err());
        assert_eq!(dataset.len(), 4);
        Ok(())
    }
}
