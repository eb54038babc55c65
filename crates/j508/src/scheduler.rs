//! Deferred tasks
//!
//! A virtual clock: tasks become due after a delay and fire when the
//! host advances time. Each task remembers the element that scheduled it
//! (its origin); scheduling again from the same origin replaces the
//! pending task.

use j508_dom::NodeId;

/// Handle to cancel a pending task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// Work a task does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Focus a known element
    Focus(NodeId),
    /// Focus the first link of the first active dropdown menu,
    /// looked up when the task fires
    FocusFirstDropdownLink,
}

#[derive(Debug, Clone)]
struct Scheduled {
    handle: TaskHandle,
    due: u64,
    origin: NodeId,
    task: Task,
}

/// Virtual-clock task queue
#[derive(Debug, Default)]
pub struct Scheduler {
    now: u64,
    next_handle: u64,
    pending: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.iter().any(|t| t.handle == handle)
    }

    /// Schedule `task` after `delay_ms`, replacing any pending task from `origin`
    pub fn schedule(&mut self, delay_ms: u64, origin: NodeId, task: Task) -> TaskHandle {
        let superseded = self.cancel_origin(origin);
        if superseded > 0 {
            tracing::trace!(origin = %origin, superseded, "replacing pending task");
        }

        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.push(Scheduled {
            handle,
            due: self.now.saturating_add(delay_ms),
            origin,
            task,
        });
        handle
    }

    /// Cancel a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.handle != handle);
        self.pending.len() != before
    }

    /// Cancel every pending task scheduled from `origin`
    pub fn cancel_origin(&mut self, origin: NodeId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|t| t.origin != origin);
        before - self.pending.len()
    }

    /// Move the clock (saturating at `u64::MAX`) and take the tasks that
    /// became due, earliest first and in schedule order for equal due times
    pub fn advance(&mut self, ms: u64) -> Vec<(NodeId, Task)> {
        self.now = self.now.saturating_add(ms);
        let now = self.now;

        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|t| t.due <= now);
        self.pending = pending;

        due.sort_by_key(|t| (t.due, t.handle));
        due.into_iter().map(|t| (t.origin, t.task)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_delay() {
        let mut scheduler = Scheduler::new();
        let origin = NodeId::from_index(1);
        let target = NodeId::from_index(2);
        scheduler.schedule(10, origin, Task::Focus(target));

        assert!(scheduler.advance(9).is_empty());
        assert_eq!(scheduler.advance(1), vec![(origin, Task::Focus(target))]);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.now(), 10);
    }

    #[test]
    fn test_same_origin_supersedes() {
        let mut scheduler = Scheduler::new();
        let origin = NodeId::from_index(1);
        let first = scheduler.schedule(10, origin, Task::Focus(NodeId::from_index(2)));
        let second = scheduler.schedule(10, origin, Task::Focus(NodeId::from_index(3)));

        assert!(!scheduler.is_pending(first));
        assert!(scheduler.is_pending(second));
        assert_eq!(scheduler.advance(10), vec![(origin, Task::Focus(NodeId::from_index(3)))]);
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(5, NodeId::from_index(1), Task::FocusFirstDropdownLink);
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert!(scheduler.advance(100).is_empty());
    }

    #[test]
    fn test_due_order() {
        let mut scheduler = Scheduler::new();
        let (a, b, c) = (NodeId::from_index(1), NodeId::from_index(2), NodeId::from_index(3));
        scheduler.schedule(20, a, Task::Focus(a));
        scheduler.schedule(10, b, Task::Focus(b));
        scheduler.schedule(10, c, Task::Focus(c));

        let fired: Vec<_> = scheduler.advance(20).into_iter().map(|(origin, _)| origin).collect();
        assert_eq!(fired, vec![b, c, a]);
    }

    #[test]
    fn test_clock_saturates() {
        let mut scheduler = Scheduler::new();
        let origin = NodeId::from_index(1);
        scheduler.schedule(u64::MAX, origin, Task::Focus(origin));

        assert_eq!(scheduler.advance(u64::MAX).len(), 1);
        assert!(scheduler.advance(1).is_empty());
        assert_eq!(scheduler.now(), u64::MAX);

        // A delay past the end of time still fires once the clock is there
        scheduler.schedule(10, origin, Task::FocusFirstDropdownLink);
        assert_eq!(scheduler.advance(0), vec![(origin, Task::FocusFirstDropdownLink)]);
    }
}
