//! Depth-tracked pre-order traversal over the task tree
//!
//! Dispatch is by task kind: the driver calls the kind-specific callback,
//! each of which defaults to the generic [`TaskVisitor::visit`] fallback.
//! Depth is handed to the visitor by the driver, 0 at the root.

use std::sync::Arc;

use super::node::{Task, TaskKind};

/// Visitor over task tree nodes
///
/// Implement only `visit` for uniform handling, or override the
/// kind-specific callbacks where the distinction matters.
pub trait TaskVisitor {
    /// Generic fallback, called when no kind-specific callback is overridden
    fn visit(&mut self, _task: &Arc<Task>, _depth: usize) {}

    fn visit_leaf(&mut self, task: &Arc<Task>, depth: usize) {
        self.visit(task, depth);
    }

    fn visit_intermediate(&mut self, task: &Arc<Task>, depth: usize) {
        self.visit(task, depth);
    }

    fn visit_iterative(&mut self, task: &Arc<Task>, depth: usize) {
        self.visit(task, depth);
    }
}

/// Pre-order walk: parent before children, children in stored order
///
/// Every node is visited exactly once; depth starts at 0 and grows by one
/// per level.
pub fn visit_pre_order_with_depth(root: &Arc<Task>, visitor: &mut dyn TaskVisitor) {
    walk(root, 0, visitor);
}

fn walk(task: &Arc<Task>, depth: usize, visitor: &mut dyn TaskVisitor) {
    match task.kind() {
        TaskKind::Leaf(_) => visitor.visit_leaf(task, depth),
        TaskKind::Intermediate => visitor.visit_intermediate(task, depth),
        TaskKind::Iterative(_) => visitor.visit_iterative(task, depth),
    }
    for child in task.sub_tasks() {
        walk(&child, depth + 1, visitor);
    }
}
