pub mod training_metrics;
pub mod training_stats;

pub use training_metrics::{MetricsSnapshot, Outcome, TrainingMetrics};
pub use training_stats::TrainingStats;
