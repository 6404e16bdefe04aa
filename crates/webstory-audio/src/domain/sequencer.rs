//! Operation sequencer.
//!
//! A FIFO of operations run against a shared context, one invocation per
//! tick. An operation stays at the head of the queue, and is invoked again on
//! every tick, until its completion predicate holds. Operations are evicted by
//! completion, by [`OperationHandle::cancel`], or by [`Sequencer::clear`]; an
//! evicted operation is never invoked again.
//!
//! Actions receive the context by reference at invocation time. They must not
//! capture parts of it at submission time, since the context may change
//! (a resource renewed, a track switched) while the operation waits its turn.
//!
//! There is no timeout: an operation whose predicate never holds blocks the
//! queue behind it indefinitely.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

type Action<C> = Box<dyn FnMut(&mut C) + Send>;
type Completion<C> = Box<dyn Fn(&C) -> bool + Send>;

/// Cancellation handle for a submitted operation.
#[derive(Debug, Clone)]
pub struct OperationHandle {
    id: u64,
    evicted: Arc<AtomicBool>,
}

impl OperationHandle {
    /// Returns the operation id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Marks the operation evicted. It will be discarded, uninvoked, when it
    /// reaches the head of the queue.
    pub fn cancel(&self) {
        self.evicted.store(true, Ordering::Release);
    }

    /// Returns whether the operation has completed or been cancelled.
    #[must_use]
    pub fn is_evicted(&self) -> bool {
        self.evicted.load(Ordering::Acquire)
    }
}

struct Operation<C> {
    id: u64,
    evicted: Arc<AtomicBool>,
    action: Action<C>,
    is_complete: Option<Completion<C>>,
}

impl<C> Operation<C> {
    fn is_evicted(&self) -> bool {
        self.evicted.load(Ordering::Acquire)
    }

    fn evict(&self) {
        self.evicted.store(true, Ordering::Release);
    }
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No live operation was queued.
    Idle,
    /// The head operation was invoked once.
    Ran {
        /// Id of the invoked operation.
        id: u64,
        /// Whether the operation completed and left the queue.
        completed: bool,
    },
}

/// FIFO operation queue over a context `C`.
pub struct Sequencer<C> {
    queue: VecDeque<Operation<C>>,
    next_id: u64,
}

impl<C> Default for Sequencer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for Sequencer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequencer")
            .field("queued", &self.queue.iter().map(|op| op.id).collect::<Vec<_>>())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl<C> Sequencer<C> {
    /// Creates an empty sequencer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            next_id: 0,
        }
    }

    /// Queues a fire-and-forget operation: it completes after one invocation.
    pub fn submit<A>(&mut self, action: A) -> OperationHandle
    where
        A: FnMut(&mut C) + Send + 'static,
    {
        self.push(Box::new(action), None)
    }

    /// Queues an operation that is re-invoked every tick until `is_complete`
    /// returns true after an invocation.
    pub fn submit_until<A, P>(&mut self, action: A, is_complete: P) -> OperationHandle
    where
        A: FnMut(&mut C) + Send + 'static,
        P: Fn(&C) -> bool + Send + 'static,
    {
        self.push(Box::new(action), Some(Box::new(is_complete)))
    }

    fn push(&mut self, action: Action<C>, is_complete: Option<Completion<C>>) -> OperationHandle {
        let id = self.next_id;
        self.next_id += 1;
        let evicted = Arc::new(AtomicBool::new(false));
        self.queue.push_back(Operation {
            id,
            evicted: Arc::clone(&evicted),
            action,
            is_complete,
        });
        debug!(operation_id = id, queued = self.queue.len(), "operation submitted");
        OperationHandle { id, evicted }
    }

    /// Advances the queue by one tick.
    ///
    /// Evicted operations at the head are discarded without being invoked;
    /// the first live operation is invoked exactly once. If it completes it
    /// leaves the queue and its successor waits for the next tick.
    pub fn tick(&mut self, context: &mut C) -> TickOutcome {
        while self.queue.front().is_some_and(Operation::is_evicted) {
            if let Some(stale) = self.queue.pop_front() {
                debug!(operation_id = stale.id, "discarding evicted operation");
            }
        }

        let Some(head) = self.queue.front_mut() else {
            return TickOutcome::Idle;
        };

        (head.action)(context);
        let completed = head
            .is_complete
            .as_ref()
            .is_none_or(|is_complete| is_complete(context));
        let id = head.id;

        if completed {
            if let Some(done) = self.queue.pop_front() {
                done.evict();
            }
        }

        TickOutcome::Ran { id, completed }
    }

    /// Drops every queued operation without invoking it. Returns how many
    /// live operations were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.len();
        for op in self.queue.drain(..) {
            op.evict();
        }
        if dropped > 0 {
            debug!(dropped, "operation queue cleared");
        }
        dropped
    }

    /// Returns the number of live (not yet evicted) operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.iter().filter(|op| !op.is_evicted()).count()
    }

    /// Returns whether no live operation is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the ids of live operations in execution order.
    #[must_use]
    pub fn pending_ids(&self) -> Vec<u64> {
        self.queue
            .iter()
            .filter(|op| !op.is_evicted())
            .map(|op| op.id)
            .collect()
    }
}
