mod metrics;
mod pipeline;
mod session;

pub use metrics::{CustomerRanking, LoyaltyMetrics, NumericSummary, ProductRanking, Summary};
pub use pipeline::{apply_filters, FilteredResult};
pub use session::{Session, SessionConfig};
