use crate::functions;
use nalgebra::{DMatrix, DVector};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use thiserror::Error;

pub const DEFAULT_WINDOW: usize = 5;
pub const DEFAULT_POLY_ORDER: usize = 3;

/// Savitzky-Golay smoothing filter: fits a polynomial of `poly_order` to each
/// window of `window` points by least squares and takes the fitted value.
#[derive(Debug, Clone)]
pub struct SavitzkyGolay {
    window: usize,
    poly_order: usize,
    parallel: bool,
}

impl SavitzkyGolay {
    pub fn new(window: usize, poly_order: usize) -> Result<Self, SmoothingError> {
        if window % 2 == 0 {
            return Err(SmoothingError::EvenWindow(window));
        }
        if window < poly_order + 1 {
            return Err(SmoothingError::WindowTooSmall { window, poly_order });
        }
        Ok(Self {
            window,
            poly_order,
            parallel: false,
        })
    }

    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn poly_order(&self) -> usize {
        self.poly_order
    }

    /// Smooths `series`, returning a new series of the same length.
    ///
    /// Interior points use symmetric window weights. Near the edges the
    /// window is shifted to stay in bounds and the fitted polynomial is
    /// evaluated at the off-centre position, so polynomials up to
    /// `poly_order` are reproduced exactly everywhere.
    pub fn apply(&self, series: &[f64]) -> Result<Vec<f64>, SmoothingError> {
        let n = series.len();
        if self.window > n {
            return Err(SmoothingError::WindowTooLarge {
                window: self.window,
                len: n,
            });
        }

        let half = self.window / 2;
        let center = self.weights(0.0)?;
        let mut smoothed = vec![0.0; n];
        for i in 0..n {
            let start = i.saturating_sub(half).min(n - self.window);
            if i >= half && i + half < n {
                smoothed[i] = functions::dot(&center, &series[start..start + self.window]);
            } else {
                let offset = i as f64 - (start + half) as f64;
                let weights = self.weights(offset)?;
                smoothed[i] = functions::dot(&weights, &series[start..start + self.window]);
            }
        }
        Ok(smoothed)
    }

    /// Smooths each row independently, in parallel when [`Self::parallel`]
    /// is enabled.
    pub fn apply_many(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, SmoothingError> {
        if self.parallel {
            rows.par_iter().map(|row| self.apply(row)).collect()
        } else {
            rows.iter().map(|row| self.apply(row)).collect()
        }
    }

    /// Filter weights for one window, evaluated at `offset` points from the
    /// window centre (`0.0` is the symmetric case).
    fn weights(&self, offset: f64) -> Result<Vec<f64>, SmoothingError> {
        let half = (self.window / 2) as isize;
        let terms = self.poly_order + 1;

        // Vandermonde matrix of the window positions, centred on zero.
        let mut vandermonde = DMatrix::<f64>::zeros(self.window, terms);
        for j in 0..self.window {
            let x = (j as isize - half) as f64;
            for k in 0..terms {
                vandermonde[(j, k)] = x.powi(k as i32);
            }
        }

        // Normal equations of the least-squares fit, evaluated at `offset`.
        let ata = vandermonde.transpose() * &vandermonde;
        let rhs = DVector::from_iterator(terms, (0..terms).map(|k| offset.powi(k as i32)));
        let solution = ata.lu().solve(&rhs).ok_or(SmoothingError::SingularFit)?;

        Ok((0..self.window)
            .map(|j| {
                let x = (j as isize - half) as f64;
                (0..terms).map(|k| solution[k] * x.powi(k as i32)).sum()
            })
            .collect())
    }
}

impl Default for SavitzkyGolay {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            poly_order: DEFAULT_POLY_ORDER,
            parallel: false,
        }
    }
}

/// Smooths `series` with the default window and polynomial order.
pub fn smooth(series: &[f64]) -> Result<Vec<f64>, SmoothingError> {
    SavitzkyGolay::default().apply(series)
}

#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SmoothingError {
    #[error("window length must be odd, got {0}")]
    EvenWindow(usize),

    #[error("window length {window} is too small for polynomial order {poly_order}")]
    WindowTooSmall { window: usize, poly_order: usize },

    #[error("window length {window} exceeds series length {len}")]
    WindowTooLarge { window: usize, len: usize },

    #[error("polynomial fit produced singular normal equations")]
    SingularFit,
}
