//! The task tree and its state machine
//!
//! A [`Task`] is a node in the unit-of-work tree. Its kind decides how
//! progress is produced: leaf tasks own a real counter, intermediate tasks
//! aggregate their children, iterative tasks grow their children in
//! repeating batches supplied by a closure.
//!
//! Tasks are shared between the driving tracker and observers querying a
//! task store, so status, timestamps and counters use atomics and the
//! child list sits behind a lock. Mutation is single-writer by contract;
//! only the leaf progress counter is meant for concurrent increments.

use std::sync::atomic::{AtomicI64, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use taskregistry::{MemoryRange, now_ms};

use super::error::TaskError;
use super::progress::{Progress, UNKNOWN_VOLUME};
use super::status::Status;
use crate::concurrency::Concurrency;

/// Sentinel for a task that has not started yet
pub const NOT_STARTED: i64 = -1;
/// Sentinel for a task that has not finished yet
pub const NOT_FINISHED: i64 = -1;

/// Produces one iteration's worth of fresh subtasks per call
pub type SubtaskSupplier = Box<dyn Fn() -> Vec<Arc<Task>> + Send + Sync>;

/// How an iterative task treats its iteration budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationMode {
    /// All iterations pre-created; exhausting them is an error
    Fixed,
    /// All iterations pre-created; may finish early, canceling the rest
    Dynamic,
    /// Iterations appended on demand until the task finishes
    Open,
}

impl std::fmt::Display for IterationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IterationMode::Fixed => write!(f, "fixed"),
            IterationMode::Dynamic => write!(f, "dynamic"),
            IterationMode::Open => write!(f, "open"),
        }
    }
}

pub(crate) struct LeafState {
    volume: AtomicI64,
    progress: AtomicI64,
}

pub(crate) struct IterativeState {
    supplier: SubtaskSupplier,
    mode: IterationMode,
    /// Size of one supplier batch; 0 until the first batch is seen
    tasks_per_iteration: AtomicUsize,
    max_iterations: AtomicUsize,
}

pub(crate) enum TaskKind {
    Intermediate,
    Leaf(LeafState),
    Iterative(IterativeState),
}

/// A node in the hierarchical unit-of-work tree
pub struct Task {
    description: String,
    children: RwLock<Vec<Arc<Task>>>,
    kind: TaskKind,
    status: AtomicU8,
    start_time: AtomicI64,
    finish_time: AtomicI64,
    estimated_memory: Mutex<MemoryRange>,
    max_concurrency: Mutex<Option<Concurrency>>,
}

impl Task {
    fn with_kind(description: impl Into<String>, children: Vec<Arc<Task>>, kind: TaskKind) -> Arc<Self> {
        Arc::new(Self {
            description: description.into(),
            children: RwLock::new(children),
            kind,
            status: AtomicU8::new(Status::Pending.as_u8()),
            start_time: AtomicI64::new(NOT_STARTED),
            finish_time: AtomicI64::new(NOT_FINISHED),
            estimated_memory: Mutex::new(MemoryRange::empty()),
            max_concurrency: Mutex::new(None),
        })
    }

    /// Intermediate task whose progress is derived from `children`
    pub fn intermediate(description: impl Into<String>, children: Vec<Arc<Task>>) -> Arc<Self> {
        Self::with_kind(description, children, TaskKind::Intermediate)
    }

    /// Leaf task with unknown volume
    pub fn leaf(description: impl Into<String>) -> Arc<Self> {
        Self::leaf_with_volume(description, UNKNOWN_VOLUME)
    }

    /// Leaf task with a known volume
    pub fn leaf_with_volume(description: impl Into<String>, volume: i64) -> Arc<Self> {
        Self::with_kind(
            description,
            Vec::new(),
            TaskKind::Leaf(LeafState {
                volume: AtomicI64::new(volume),
                progress: AtomicI64::new(0),
            }),
        )
    }

    /// Placeholder task for disabled tracking
    pub fn empty() -> Arc<Self> {
        Self::leaf("")
    }

    /// Iterative task with all `iterations` pre-created; errors on exhaustion
    pub fn iterative_fixed(description: impl Into<String>, supplier: SubtaskSupplier, iterations: usize) -> Arc<Self> {
        Self::iterative_bounded(description, supplier, iterations, IterationMode::Fixed)
    }

    /// Like fixed, but the controller may finish before all iterations ran
    pub fn iterative_dynamic(
        description: impl Into<String>,
        supplier: SubtaskSupplier,
        iterations: usize,
    ) -> Arc<Self> {
        Self::iterative_bounded(description, supplier, iterations, IterationMode::Dynamic)
    }

    fn iterative_bounded(
        description: impl Into<String>,
        supplier: SubtaskSupplier,
        iterations: usize,
        mode: IterationMode,
    ) -> Arc<Self> {
        let mut children = Vec::new();
        let mut per_iteration = 0;
        for _ in 0..iterations {
            let batch = supplier();
            per_iteration = batch.len();
            children.extend(batch);
        }
        let max_iterations = if per_iteration == 0 {
            iterations
        } else {
            children.len() / per_iteration
        };
        Self::with_kind(
            description,
            children,
            TaskKind::Iterative(IterativeState {
                supplier,
                mode,
                tasks_per_iteration: AtomicUsize::new(per_iteration),
                max_iterations: AtomicUsize::new(max_iterations),
            }),
        )
    }

    /// Unbounded iterative task; iterations are appended on demand
    pub fn iterative_open(
        description: impl Into<String>,
        supplier: SubtaskSupplier,
        initial_iterations: usize,
    ) -> Arc<Self> {
        let mut children = Vec::new();
        let mut per_iteration = 0;
        for _ in 0..initial_iterations {
            let batch = supplier();
            per_iteration = batch.len();
            children.extend(batch);
        }
        Self::with_kind(
            description,
            children,
            TaskKind::Iterative(IterativeState {
                supplier,
                mode: IterationMode::Open,
                tasks_per_iteration: AtomicUsize::new(per_iteration),
                max_iterations: AtomicUsize::new(initial_iterations),
            }),
        )
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Snapshot of the child list, in stored order
    pub fn sub_tasks(&self) -> Vec<Arc<Task>> {
        self.children.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn status(&self) -> Status {
        Status::from_u8(self.status.load(Ordering::Acquire))
    }

    fn set_status(&self, status: Status) {
        self.status.store(status.as_u8(), Ordering::Release);
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, TaskKind::Leaf(_))
    }

    /// Iteration mode, for iterative tasks
    pub fn iteration_mode(&self) -> Option<IterationMode> {
        match &self.kind {
            TaskKind::Iterative(state) => Some(state.mode),
            _ => None,
        }
    }

    pub(crate) fn kind(&self) -> &TaskKind {
        &self.kind
    }

    /// Unix-ms start timestamp, or [`NOT_STARTED`]
    pub fn start_time(&self) -> i64 {
        self.start_time.load(Ordering::Acquire)
    }

    /// Unix-ms finish timestamp, or [`NOT_FINISHED`]
    pub fn finish_time(&self) -> i64 {
        self.finish_time.load(Ordering::Acquire)
    }

    /// Wall-clock duration once both ends were recorded
    pub fn duration_ms(&self) -> Option<i64> {
        let (start, finish) = (self.start_time(), self.finish_time());
        (start != NOT_STARTED && finish != NOT_FINISHED).then(|| finish - start)
    }

    // === State machine ===

    pub fn start(&self) -> Result<(), TaskError> {
        let current = self.status();
        if current != Status::Pending {
            return Err(TaskError::InvalidTransition {
                description: self.description.clone(),
                from: current,
                to: Status::Running,
            });
        }
        self.set_status(Status::Running);
        self.start_time.store(now_ms(), Ordering::Release);
        Ok(())
    }

    /// Complete the task, canceling any child left pending
    ///
    /// A finishing leaf first fixes an unknown volume to whatever progress
    /// accumulated, then closes any remaining gap so it reads as 100%.
    pub fn finish(&self) -> Result<(), TaskError> {
        let current = self.status();
        if current != Status::Running {
            return Err(TaskError::InvalidTransition {
                description: self.description.clone(),
                from: current,
                to: Status::Finished,
            });
        }
        self.set_status(Status::Finished);
        self.finish_time.store(now_ms(), Ordering::Release);

        for child in self.sub_tasks() {
            if child.status() == Status::Pending {
                child.cancel()?;
            }
        }

        if let TaskKind::Leaf(leaf) = &self.kind {
            if leaf.volume.load(Ordering::Acquire) == UNKNOWN_VOLUME {
                leaf.volume.store(leaf.progress.load(Ordering::Acquire), Ordering::Release);
            }
            leaf.progress.store(leaf.volume.load(Ordering::Acquire), Ordering::Release);
        }
        Ok(())
    }

    /// Cancel the task; legal from any state except Finished
    pub fn cancel(&self) -> Result<(), TaskError> {
        let current = self.status();
        if current == Status::Finished {
            return Err(TaskError::InvalidTransition {
                description: self.description.clone(),
                from: current,
                to: Status::Canceled,
            });
        }
        self.set_status(Status::Canceled);
        Ok(())
    }

    /// Force the task into Failed, from any state
    pub fn fail(&self) {
        self.set_status(Status::Failed);
    }

    /// Advance to the next subtask to run
    ///
    /// The task itself must be Running and no child may currently be
    /// Running. Open iterative tasks grow a fresh iteration when all
    /// existing children are exhausted; everything else errors.
    pub fn next_subtask(self: &Arc<Self>) -> Result<Arc<Task>, TaskError> {
        let current = self.status();
        if current != Status::Running {
            return Err(TaskError::NotRunning {
                description: self.description.clone(),
                status: current,
            });
        }
        match self.next_pending_subtask() {
            Err(TaskError::NoPendingSubtasks { .. })
                if matches!(&self.kind, TaskKind::Iterative(state) if state.mode == IterationMode::Open) =>
            {
                self.add_iteration()?;
                self.next_pending_subtask()
            }
            result => result,
        }
    }

    fn next_pending_subtask(&self) -> Result<Arc<Task>, TaskError> {
        let children = self.children.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(active) = children.iter().find(|c| c.status() == Status::Running) {
            return Err(TaskError::SubtaskStillRunning {
                description: self.description.clone(),
                subtask: active.description.clone(),
            });
        }
        children
            .iter()
            .find(|c| c.status() == Status::Pending)
            .cloned()
            .ok_or_else(|| TaskError::NoPendingSubtasks {
                description: self.description.clone(),
            })
    }

    /// Append one supplier batch to an open iterative task
    pub fn add_iteration(&self) -> Result<(), TaskError> {
        let TaskKind::Iterative(state) = &self.kind else {
            return Err(TaskError::NotIterative {
                description: self.description.clone(),
            });
        };
        if state.mode != IterationMode::Open {
            return Err(TaskError::IterationsExhausted {
                description: self.description.clone(),
                mode: state.mode,
            });
        }
        if self.status() == Status::Finished {
            return Err(TaskError::IterationAfterFinish {
                description: self.description.clone(),
            });
        }
        let batch = (state.supplier)();
        if state.tasks_per_iteration.load(Ordering::Acquire) == 0 {
            state.tasks_per_iteration.store(batch.len(), Ordering::Release);
        }
        state.max_iterations.fetch_add(1, Ordering::AcqRel);
        let concurrency = *self.max_concurrency.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(concurrency) = concurrency {
            for task in &batch {
                task.set_max_concurrency(concurrency);
            }
        }
        self.children
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(batch);
        Ok(())
    }

    /// Number of fully finished iterations
    pub fn current_iteration(&self) -> Result<usize, TaskError> {
        let TaskKind::Iterative(state) = &self.kind else {
            return Err(TaskError::NotIterative {
                description: self.description.clone(),
            });
        };
        let per_iteration = state.tasks_per_iteration.load(Ordering::Acquire);
        if per_iteration == 0 {
            return Ok(0);
        }
        let finished = self
            .children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|c| c.status() == Status::Finished)
            .count();
        Ok(finished / per_iteration)
    }

    /// Iteration budget; grows for open tasks
    pub fn max_iterations(&self) -> Result<usize, TaskError> {
        match &self.kind {
            TaskKind::Iterative(state) => Ok(state.max_iterations.load(Ordering::Acquire)),
            _ => Err(TaskError::NotIterative {
                description: self.description.clone(),
            }),
        }
    }

    // === Progress ===

    /// Computed progress of this subtree
    ///
    /// Leaves report their own counter; everything else sums its children,
    /// with unknown volume absorbing. An open iterative task reports an
    /// unknown volume until it has finished, since its total cannot be
    /// known ahead of time.
    pub fn progress(&self) -> Progress {
        match &self.kind {
            TaskKind::Leaf(leaf) => Progress::new(leaf.progress.load(Ordering::Acquire), leaf.volume.load(Ordering::Acquire)),
            TaskKind::Iterative(state) if state.mode == IterationMode::Open && self.status() != Status::Finished => {
                let aggregated = self.aggregate_progress();
                Progress::new(aggregated.current(), UNKNOWN_VOLUME)
            }
            _ => self.aggregate_progress(),
        }
    }

    fn aggregate_progress(&self) -> Progress {
        self.children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|c| c.progress())
            .fold(Progress::default(), Progress::combine)
    }

    /// Set the total work volume; leaf tasks only
    pub fn set_volume(&self, volume: i64) -> Result<(), TaskError> {
        match &self.kind {
            TaskKind::Leaf(leaf) => {
                leaf.volume.store(volume, Ordering::Release);
                Ok(())
            }
            _ => Err(TaskError::NotALeaf {
                description: self.description.clone(),
                operation: "set_volume",
            }),
        }
    }

    /// Add to the progress counter; leaf tasks only
    ///
    /// Safe for concurrent increments from multiple workers. No upper
    /// clamp is applied; overshoot is reconciled at `finish`.
    pub fn log_progress(&self, value: i64) -> Result<(), TaskError> {
        match &self.kind {
            TaskKind::Leaf(leaf) => {
                leaf.progress.fetch_add(value, Ordering::AcqRel);
                Ok(())
            }
            _ => Err(TaskError::NotALeaf {
                description: self.description.clone(),
                operation: "log_progress",
            }),
        }
    }

    // === Resource metadata ===

    pub fn set_estimated_memory_range(&self, range: MemoryRange) {
        *self.estimated_memory.lock().unwrap_or_else(PoisonError::into_inner) = range;
    }

    pub fn estimated_memory_range(&self) -> MemoryRange {
        *self.estimated_memory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set this task's concurrency and push it to children without one
    pub fn set_max_concurrency(&self, concurrency: Concurrency) {
        *self.max_concurrency.lock().unwrap_or_else(PoisonError::into_inner) = Some(concurrency);
        for child in self.sub_tasks() {
            if child.max_concurrency().is_none() {
                child.set_max_concurrency(concurrency);
            }
        }
    }

    pub fn max_concurrency(&self) -> Option<Concurrency> {
        *self.max_concurrency.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("description", &self.description)
            .field("status", &self.status())
            .field("progress", &self.progress())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tree() -> Arc<Task> {
        Task::intermediate(
            "root",
            vec![
                Task::leaf_with_volume("load", 10),
                Task::leaf_with_volume("compute", 10),
            ],
        )
    }

    #[test]
    fn test_start_records_time() {
        let task = Task::leaf("l");
        assert_eq!(task.start_time(), NOT_STARTED);
        task.start().unwrap();
        assert_eq!(task.status(), Status::Running);
        assert!(task.start_time() > 0);
        assert_eq!(task.finish_time(), NOT_FINISHED);
    }

    #[test]
    fn test_start_requires_pending() {
        let task = Task::leaf("l");
        task.start().unwrap();
        let err = task.start().unwrap_err();
        assert!(matches!(err, TaskError::InvalidTransition { from: Status::Running, .. }));
    }

    #[test]
    fn test_finish_requires_running() {
        let task = Task::leaf("l");
        assert!(task.finish().is_err());
        task.start().unwrap();
        task.finish().unwrap();
        assert_eq!(task.status(), Status::Finished);
        assert!(task.duration_ms().is_some());
    }

    #[test]
    fn test_cancel_from_any_state_except_finished() {
        let pending = Task::leaf("p");
        pending.cancel().unwrap();
        assert_eq!(pending.status(), Status::Canceled);

        let finished = Task::leaf("f");
        finished.start().unwrap();
        finished.finish().unwrap();
        assert!(finished.cancel().is_err());
    }

    #[test]
    fn test_fail_is_unconditional() {
        let task = Task::leaf("l");
        task.start().unwrap();
        task.finish().unwrap();
        task.fail();
        assert_eq!(task.status(), Status::Failed);
    }

    #[test]
    fn test_next_subtask_requires_running() {
        let root = make_tree();
        assert!(matches!(root.next_subtask(), Err(TaskError::NotRunning { .. })));
    }

    #[test]
    fn test_next_subtask_picks_first_pending() {
        let root = make_tree();
        root.start().unwrap();

        let first = root.next_subtask().unwrap();
        assert_eq!(first.description(), "load");
        first.start().unwrap();

        // Cannot advance while a child runs
        assert!(matches!(root.next_subtask(), Err(TaskError::SubtaskStillRunning { .. })));

        first.finish().unwrap();
        let second = root.next_subtask().unwrap();
        assert_eq!(second.description(), "compute");
        second.start().unwrap();
        second.finish().unwrap();

        assert!(matches!(root.next_subtask(), Err(TaskError::NoPendingSubtasks { .. })));
    }

    #[test]
    fn test_finish_cancels_pending_children() {
        let root = make_tree();
        root.start().unwrap();
        root.finish().unwrap();

        for child in root.sub_tasks() {
            assert_eq!(child.status(), Status::Canceled);
        }
    }

    #[test]
    fn test_leaf_finish_fixes_unknown_volume() {
        let leaf = Task::leaf("l");
        leaf.start().unwrap();
        leaf.log_progress(42).unwrap();
        assert_eq!(leaf.progress(), Progress::new(42, UNKNOWN_VOLUME));

        leaf.finish().unwrap();
        assert_eq!(leaf.progress(), Progress::new(42, 42));
    }

    #[test]
    fn test_leaf_finish_closes_progress_gap() {
        let leaf = Task::leaf_with_volume("l", 100);
        leaf.start().unwrap();
        leaf.log_progress(60).unwrap();
        leaf.finish().unwrap();
        assert_eq!(leaf.progress(), Progress::new(100, 100));
    }

    #[test]
    fn test_non_leaf_rejects_volume_and_progress() {
        let root = make_tree();
        assert!(matches!(root.set_volume(5), Err(TaskError::NotALeaf { .. })));
        assert!(matches!(root.log_progress(5), Err(TaskError::NotALeaf { .. })));
    }

    #[test]
    fn test_progress_aggregates_children() {
        let root = make_tree();
        let children = root.sub_tasks();
        children[0].log_progress(5).unwrap();
        children[1].log_progress(2).unwrap();
        assert_eq!(root.progress(), Progress::new(7, 20));
    }

    #[test]
    fn test_unknown_volume_child_poisons_parent() {
        let root = Task::intermediate(
            "root",
            vec![
                Task::leaf_with_volume("a", 10),
                Task::leaf("b"), // unknown volume
                Task::leaf_with_volume("c", 10),
            ],
        );
        let children = root.sub_tasks();
        children[0].log_progress(5).unwrap();
        children[1].log_progress(3).unwrap();
        children[2].log_progress(2).unwrap();
        assert_eq!(root.progress(), Progress::new(10, UNKNOWN_VOLUME));
    }

    #[test]
    fn test_max_concurrency_propagates_to_unset_children() {
        let fixed = Task::leaf("fixed");
        fixed.set_max_concurrency(Concurrency::new(2).unwrap());
        let root = Task::intermediate("root", vec![fixed.clone(), Task::leaf("free")]);

        root.set_max_concurrency(Concurrency::new(8).unwrap());
        assert_eq!(root.max_concurrency().unwrap().value(), 8);
        assert_eq!(fixed.max_concurrency().unwrap().value(), 2);
        assert_eq!(root.sub_tasks()[1].max_concurrency().unwrap().value(), 8);
    }

    #[test]
    fn test_estimated_memory_range() {
        let task = Task::leaf("l");
        assert!(task.estimated_memory_range().is_empty());
        task.set_estimated_memory_range(MemoryRange::of_range(64, 128));
        assert_eq!(task.estimated_memory_range(), MemoryRange::of_range(64, 128));
    }

    #[test]
    fn test_concurrent_leaf_progress() {
        let leaf = Task::leaf_with_volume("l", 8000);
        leaf.start().unwrap();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let leaf = leaf.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    leaf.log_progress(1).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(leaf.progress(), Progress::new(8000, 8000));
    }

    mod iterative {
        use super::*;

        fn two_leaves() -> SubtaskSupplier {
            Box::new(|| vec![Task::leaf_with_volume("expand", 10), Task::leaf_with_volume("contract", 10)])
        }

        fn drive_through(parent: &Arc<Task>, count: usize) {
            for _ in 0..count {
                let sub = parent.next_subtask().unwrap();
                sub.start().unwrap();
                sub.finish().unwrap();
            }
        }

        #[test]
        fn test_fixed_precreates_all_iterations() {
            let task = Task::iterative_fixed("iter", two_leaves(), 3);
            assert_eq!(task.sub_tasks().len(), 6);
            assert_eq!(task.max_iterations().unwrap(), 3);
        }

        #[test]
        fn test_fixed_exhaustion_errors() {
            let task = Task::iterative_fixed("iter", two_leaves(), 3);
            task.start().unwrap();
            drive_through(&task, 6);

            assert_eq!(task.current_iteration().unwrap(), 3);
            assert!(matches!(task.next_subtask(), Err(TaskError::NoPendingSubtasks { .. })));
        }

        #[test]
        fn test_fixed_cannot_add_iterations() {
            let task = Task::iterative_fixed("iter", two_leaves(), 1);
            assert!(matches!(task.add_iteration(), Err(TaskError::IterationsExhausted { .. })));
        }

        #[test]
        fn test_dynamic_early_finish_cancels_rest() {
            let task = Task::iterative_dynamic("iter", two_leaves(), 3);
            task.start().unwrap();
            drive_through(&task, 2);
            task.finish().unwrap();

            let statuses: Vec<Status> = task.sub_tasks().iter().map(|t| t.status()).collect();
            assert_eq!(
                statuses,
                vec![
                    Status::Finished,
                    Status::Finished,
                    Status::Canceled,
                    Status::Canceled,
                    Status::Canceled,
                    Status::Canceled,
                ]
            );
            assert_eq!(task.current_iteration().unwrap(), 1);
        }

        #[test]
        fn test_open_grows_on_demand() {
            let task = Task::iterative_open("iter", two_leaves(), 1);
            task.start().unwrap();
            assert_eq!(task.sub_tasks().len(), 2);

            drive_through(&task, 2);

            // Exhausted the initial iteration; the next call appends one more
            let next = task.next_subtask().unwrap();
            assert_eq!(task.sub_tasks().len(), 4);
            assert_eq!(next.description(), "expand");
            assert_eq!(task.max_iterations().unwrap(), 2);
        }

        #[test]
        fn test_open_volume_unknown_until_finished() {
            let task = Task::iterative_open("iter", two_leaves(), 1);
            task.start().unwrap();
            drive_through(&task, 2);

            assert!(task.progress().has_unknown_volume());
            assert_eq!(task.progress().current(), 20);

            task.finish().unwrap();
            assert_eq!(task.progress(), Progress::new(20, 20));
        }

        #[test]
        fn test_open_rejects_iteration_after_finish() {
            let task = Task::iterative_open("iter", two_leaves(), 0);
            task.start().unwrap();
            task.finish().unwrap();
            assert!(matches!(task.add_iteration(), Err(TaskError::IterationAfterFinish { .. })));
        }

        #[test]
        fn test_open_starting_empty_learns_batch_size() {
            let task = Task::iterative_open("iter", two_leaves(), 0);
            assert_eq!(task.current_iteration().unwrap(), 0);
            task.start().unwrap();

            let sub = task.next_subtask().unwrap();
            sub.start().unwrap();
            sub.finish().unwrap();
            assert_eq!(task.sub_tasks().len(), 2);
            assert_eq!(task.current_iteration().unwrap(), 0);

            let sub = task.next_subtask().unwrap();
            sub.start().unwrap();
            sub.finish().unwrap();
            assert_eq!(task.current_iteration().unwrap(), 1);
        }

        #[test]
        fn test_current_iteration_rejected_for_plain_task() {
            let task = Task::leaf("l");
            assert!(matches!(task.current_iteration(), Err(TaskError::NotIterative { .. })));
        }
    }
}
