pub use dataset::{Dataset, DatasetError};
pub use peaks::{find_maxima, Peak, PeakFinder};
pub use smoothing::{smooth, SavitzkyGolay, SmoothingError, DEFAULT_POLY_ORDER, DEFAULT_WINDOW};

mod dataset;
mod functions;
mod peaks;
mod smoothing;
