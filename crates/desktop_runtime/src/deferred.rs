//! Fire-and-forget delayed tasks driven by an explicit clock.
//!
//! The embedding host advances the clock (an interval timer in the browser, direct calls in
//! tests); tasks become due once the accumulated time reaches their deadline. Nothing awaits a
//! task and there is no cancellation.

#[derive(Debug)]
struct Scheduled<T> {
    due_ms: u64,
    seq: u64,
    task: T,
}

#[derive(Debug)]
pub struct DeferredQueue<T> {
    now_ms: u64,
    next_seq: u64,
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            next_seq: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds accumulated through [`DeferredQueue::advance`].
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn schedule(&mut self, delay_ms: u64, task: T) {
        self.next_seq += 1;
        self.pending.push(Scheduled {
            due_ms: self.now_ms.saturating_add(delay_ms),
            seq: self.next_seq,
            task,
        });
    }

    /// Moves the clock forward and returns due tasks ordered by deadline, then schedule order.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<T> {
        self.now_ms = self.now_ms.saturating_add(elapsed_ms);
        let now = self.now_ms;
        let (mut due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|scheduled| scheduled.due_ms <= now);
        self.pending = waiting;
        due.sort_by_key(|scheduled| (scheduled.due_ms, scheduled.seq));
        due.into_iter().map(|scheduled| scheduled.task).collect()
    }

    pub fn pending(&self) -> impl Iterator<Item = &T> {
        self.pending.iter().map(|scheduled| &scheduled.task)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
