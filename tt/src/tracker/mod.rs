//! Progress tracking facade: the API surface algorithm code holds while
//! it runs

mod error;
mod progress_tracker;
mod task_tracker;
mod user_log;

pub use error::TrackerError;
pub use progress_tracker::{EndTask, ErrorPolicy, NullProgressTracker, ProgressTracker, SubTask};
pub use task_tracker::TaskProgressTracker;
pub use user_log::{EmptyUserLogStore, UserLogStore};
