pub mod category;
pub mod engine;
pub mod progress;
pub mod stage;

pub use category::{Category, CleanPlan, StageSet, StatusSet};
pub use engine::{clean, clean_with_config, delete_pending, execute, run_clean, CleanSummary, StageReport};
pub use progress::{progress_pipe, PipeWriter, ProgressReader, ProgressSink, QuietSink};
pub use stage::{collect_pending, Stage};
