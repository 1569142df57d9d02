pub mod job;
pub mod loaders;
pub mod measurement;
pub mod pagespeed;
pub mod score;
pub mod stats;

pub use job::{Device, JobRecord, JobStatus};
pub use loaders::{load_urls_from_file, normalize_url, parse_manual_input};
pub use measurement::{MeasurementOutcome, Scores, SourceKind};
pub use pagespeed::PageSpeedResponse;
pub use score::{scale_score, ScoreBand};
pub use stats::BatchStats;
