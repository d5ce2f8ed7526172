//! Textual tree dump for debugging and administrative display

use std::sync::Arc;

use super::node::Task;
use super::visitor::{TaskVisitor, visit_pre_order_with_depth};

/// Renders `description(status)` lines, tab-indented with a `|--` marker
struct RenderVisitor {
    out: String,
}

impl TaskVisitor for RenderVisitor {
    fn visit(&mut self, task: &Arc<Task>, depth: usize) {
        if depth > 0 {
            for _ in 0..depth - 1 {
                self.out.push('\t');
            }
            self.out.push_str("|-- ");
        }
        self.out.push_str(task.description());
        self.out.push('(');
        self.out.push_str(&task.status().to_string());
        self.out.push(')');
        self.out.push('\n');
    }
}

impl Task {
    /// Multi-line dump of the whole subtree
    ///
    /// The root has no prefix; a node at depth n gets n-1 tabs followed by
    /// `|-- `. This exact shape is part of the observable contract.
    pub fn render(self: &Arc<Self>) -> String {
        let mut visitor = RenderVisitor { out: String::new() };
        visit_pre_order_with_depth(self, &mut visitor);
        visitor.out
    }
}
