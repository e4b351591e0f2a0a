//! Fire-and-forget execution of remote writes.
use futures::future::LocalBoxFuture;
use std::cell::RefCell;
use std::rc::Rc;

/// Runs detached futures on the current thread's event loop.
pub trait Spawn {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);
}

/// Spawner that parks tasks until [`TaskQueue::drain`] is awaited.
///
/// Lets tests and the tester CLI observe the "local done, remote still in flight" window.
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Rc<RefCell<Vec<LocalBoxFuture<'static, ()>>>>,
}

impl TaskQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Run queued tasks in spawn order, including any they spawn themselves.
    pub async fn drain(&self) -> usize {
        let mut ran = 0;
        loop {
            let batch = std::mem::take(&mut *self.tasks.borrow_mut());
            if batch.is_empty() {
                return ran;
            }
            for task in batch {
                task.await;
                ran += 1;
            }
        }
    }

    /// Forget queued tasks without running them.
    pub fn discard(&self) -> usize {
        std::mem::take(&mut *self.tasks.borrow_mut()).len()
    }
}

impl Spawn for TaskQueue {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        self.tasks.borrow_mut().push(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use futures::executor::block_on;
    use std::cell::Cell;

    #[test]
    fn drains_in_order_including_nested_spawns() {
        let queue = TaskQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_queue = queue.clone();
        let inner_log = Rc::clone(&log);
        queue.spawn_local(
            async move {
                inner_log.borrow_mut().push("first");
                let nested = Rc::clone(&inner_log);
                inner_queue.spawn_local(async move { nested.borrow_mut().push("nested") }.boxed_local());
            }
            .boxed_local(),
        );
        let second = Rc::clone(&log);
        queue.spawn_local(async move { second.borrow_mut().push("second") }.boxed_local());

        assert_eq!(queue.pending(), 2);
        assert_eq!(block_on(queue.drain()), 3);
        assert_eq!(*log.borrow(), vec!["first", "second", "nested"]);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn discard_drops_without_running() {
        let queue = TaskQueue::new();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        queue.spawn_local(async move { flag.set(true) }.boxed_local());
        assert_eq!(queue.discard(), 1);
        assert!(!ran.get());
    }
}
