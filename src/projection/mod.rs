pub mod growth;
pub mod seasonal;
pub mod series;

pub use growth::{elapsed_years, future_value};
pub use seasonal::{MONTH_LABELS, Seasonality};
pub use series::{ProjectionPoint, ProjectionSeries};
