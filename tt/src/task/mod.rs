//! The task tree: lifecycle states, progress values, tree nodes,
//! traversal and rendering

mod error;
mod node;
mod progress;
mod render;
mod status;
mod visitor;

pub use error::TaskError;
pub use node::{IterationMode, NOT_FINISHED, NOT_STARTED, SubtaskSupplier, Task};
pub use progress::{Progress, UNKNOWN_VOLUME};
pub use status::Status;
pub use visitor::{TaskVisitor, visit_pre_order_with_depth};
