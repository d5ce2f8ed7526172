//! Integration tests for TaskTrack
//!
//! These tests drive the tracker facade, the task tree, the batching
//! logger and the registry together, the way algorithm code uses them.

use std::sync::Arc;

use taskregistry::{
    JobId, LocalTaskRegistryFactory, LocalTaskStore, RegistryError, TaskRegistry, TaskRegistryFactory, TaskStore,
    TaskStoreListener, UserTask,
};
use tasktrack::Concurrency;
use tasktrack::logging::MemorySink;
use tasktrack::task::{Status, SubtaskSupplier, Task, UNKNOWN_VOLUME};
use tasktrack::tracker::{EndTask, ProgressTracker, SubTask, TaskProgressTracker};

fn make_store() -> Arc<LocalTaskStore<Arc<Task>>> {
    Arc::new(LocalTaskStore::new())
}

fn make_tracker(base: Arc<Task>, store: Arc<LocalTaskStore<Arc<Task>>>) -> (TaskProgressTracker, MemorySink) {
    let registry = TaskRegistry::new("alice", JobId::from("job-1"), store as Arc<dyn TaskStore<_>>);
    let sink = MemorySink::new();
    let tracker = TaskProgressTracker::with_sink(base, registry, Concurrency::single(), Arc::new(sink.clone()));
    (tracker, sink)
}

// =============================================================================
// Tracker + Registry Tests
// =============================================================================

#[test]
fn test_observers_see_the_run_while_it_is_live() {
    struct Recorder {
        events: std::sync::Mutex<Vec<String>>,
    }

    impl TaskStoreListener<Arc<Task>> for Recorder {
        fn on_task_added(&self, user_task: &UserTask<Arc<Task>>) {
            self.events
                .lock()
                .unwrap()
                .push(format!("added {}", user_task.task().description()));
        }

        fn on_task_removed(&self, username: &str, job_id: &JobId) {
            self.events.lock().unwrap().push(format!("removed {username}/{job_id}"));
        }

        fn on_store_cleared(&self) {
            self.events.lock().unwrap().push("cleared".to_string());
        }
    }

    let store = make_store();
    let recorder = Arc::new(Recorder {
        events: std::sync::Mutex::new(Vec::new()),
    });
    store.add_listener(recorder.clone());

    let base = Task::intermediate("PageRank", vec![Task::leaf_with_volume("iterate", 10)]);
    let (mut tracker, _sink) = make_tracker(base.clone(), store.clone());

    tracker.begin_sub_task(SubTask::next()).unwrap();

    // Observers can reach the live tree through the store
    let observed = store.query("alice", &JobId::from("job-1")).unwrap();
    assert_eq!(observed.task().description(), "PageRank");
    assert_eq!(observed.task().status(), Status::Running);

    tracker.begin_sub_task(SubTask::named("iterate")).unwrap();
    tracker.log_progress(10).unwrap();
    tracker.end_sub_task(EndTask::current()).unwrap();
    tracker.end_sub_task(EndTask::current()).unwrap();

    assert!(store.is_empty());
    assert_eq!(
        *recorder.events.lock().unwrap(),
        vec!["added PageRank", "removed alice/job-1"]
    );
}

#[test]
fn test_duplicate_job_is_rejected_without_corrupting_the_first() {
    let store = make_store();
    let factory = LocalTaskRegistryFactory::new("alice", store.clone() as Arc<dyn TaskStore<_>>);

    let first = factory.new_instance(JobId::from("job-1")).unwrap();
    let base = Task::leaf("Louvain");
    first.register_task(base.clone());

    let err = factory.new_instance(JobId::from("job-1")).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateJob { .. }));
    assert!(first.contains_task(&base));
    assert_eq!(store.task_count(), 1);
}

// =============================================================================
// Failure Propagation Tests
// =============================================================================

#[test]
fn test_failure_at_the_innermost_level_cascades() {
    let write = Task::leaf("write results");
    let compute = Task::intermediate("compute", vec![write.clone()]);
    let base = Task::intermediate("WCC", vec![compute.clone()]);

    let store = make_store();
    let (mut tracker, sink) = make_tracker(base.clone(), store.clone());

    tracker.begin_sub_task(SubTask::next()).unwrap();
    tracker.begin_sub_task(SubTask::named("compute")).unwrap();
    tracker.begin_sub_task(SubTask::named("write results")).unwrap();
    tracker.end_sub_task_with_failure(EndTask::current()).unwrap();

    for task in [&base, &compute, &write] {
        assert_eq!(task.status(), Status::Failed);
    }
    assert!(store.is_empty());

    let failure_lines: Vec<String> = sink
        .messages_at("info")
        .into_iter()
        .filter(|line| line.ends_with(":: Failed"))
        .collect();
    assert_eq!(
        failure_lines,
        vec![
            "WCC :: compute :: write results :: Failed",
            "WCC :: compute :: Failed",
            "WCC :: Failed",
        ]
    );
}

// =============================================================================
// Iterative Task Tests
// =============================================================================

#[test]
fn test_open_iteration_driven_through_the_tracker() {
    let supplier: SubtaskSupplier = Box::new(|| vec![Task::leaf_with_volume("relax edges", 5)]);
    let iterate = Task::iterative_open("iterate", supplier, 1);
    let base = Task::intermediate("Bellman-Ford", vec![iterate.clone()]);

    let store = make_store();
    let (mut tracker, sink) = make_tracker(base.clone(), store);

    tracker.begin_sub_task(SubTask::next()).unwrap();
    tracker.begin_sub_task(SubTask::named("iterate")).unwrap();

    // Two iterations; the second one is appended on demand
    for _ in 0..2 {
        tracker.begin_sub_task(SubTask::named("relax edges")).unwrap();
        tracker.log_progress(5).unwrap();
        tracker.end_sub_task(EndTask::current()).unwrap();
    }
    assert_eq!(iterate.sub_tasks().len(), 2);
    assert_eq!(iterate.max_iterations().unwrap(), 2);
    assert!(iterate.progress().has_unknown_volume());

    tracker.end_sub_task(EndTask::named("iterate")).unwrap();
    assert_eq!(iterate.progress().volume(), 10);
    tracker.end_sub_task(EndTask::current()).unwrap();

    let infos = sink.messages_at("info");
    assert!(infos.contains(&"Bellman-Ford :: iterate :: relax edges 1 :: Start".to_string()));
    assert!(infos.contains(&"Bellman-Ford :: iterate :: relax edges 2 :: Start".to_string()));
}

// =============================================================================
// Logging Tests
// =============================================================================

#[test]
fn test_percentage_output_is_monotonic_end_to_end() {
    let load = Task::leaf_with_volume("load", 1000);
    let base = Task::intermediate("Algo", vec![load]);
    let store = make_store();
    let (mut tracker, sink) = make_tracker(base, store);

    tracker.begin_sub_task(SubTask::next()).unwrap();
    tracker.begin_sub_task(SubTask::named("load")).unwrap();
    for _ in 0..1000 {
        tracker.log_progress(1).unwrap();
    }
    tracker.end_sub_task(EndTask::current()).unwrap();
    tracker.end_sub_task(EndTask::current()).unwrap();

    let percentages: Vec<i64> = sink
        .messages_at("info")
        .iter()
        .filter_map(|line| line.strip_prefix("Algo :: load ")?.strip_suffix('%')?.parse().ok())
        .collect();
    assert!(!percentages.is_empty());
    assert!(percentages.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(percentages.iter().filter(|&&p| p == 100).count(), 1);
}

#[test]
fn test_default_tracing_sink_smoke() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("progress=debug")
        .try_init();

    let store = make_store();
    let registry = TaskRegistry::new("alice", JobId::from("job-2"), store as Arc<dyn TaskStore<_>>);
    let base = Task::leaf_with_volume("Algo", 10);
    let mut tracker = TaskProgressTracker::new(base.clone(), registry, Concurrency::single());

    tracker.begin_sub_task(SubTask::next()).unwrap();
    tracker.log_progress(10).unwrap();
    tracker.end_sub_task(EndTask::current()).unwrap();
    assert_eq!(base.status(), Status::Finished);
}

// =============================================================================
// Tree Observation Tests
// =============================================================================

#[test]
fn test_observed_tree_renders_mid_run() {
    let store = make_store();
    let base = Task::intermediate(
        "Algo",
        vec![Task::leaf_with_volume("load", 10), Task::leaf("compute")],
    );
    let (mut tracker, _sink) = make_tracker(base, store.clone());

    tracker.begin_sub_task(SubTask::next()).unwrap();
    tracker.begin_sub_task(SubTask::named("load")).unwrap();

    let observed = store.query("alice", &JobId::from("job-1")).unwrap();
    assert_eq!(
        observed.task().render(),
        "Algo(running)\n\
         |-- load(running)\n\
         |-- compute(pending)\n"
    );

    // Aggregated volume is known, nothing done yet
    assert_eq!(observed.task().progress().current(), 0);
    assert_eq!(observed.task().progress().volume(), UNKNOWN_VOLUME);
}
