//! Single-threaded virtual-time scheduler
//!
//! Holds one-shot and fixed-rate jobs against a millisecond clock that only
//! moves when the owner calls [`Scheduler::pop_due`]. The browser feeds it
//! `Date.now()`, tests feed it whatever they like.

/// Handle returned when scheduling; used to cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Entry<J> {
    handle: TimerHandle,
    /// Tie-break among jobs due at the same instant
    seq: u64,
    due_ms: u64,
    /// `Some` for fixed-rate jobs
    period_ms: Option<u64>,
    job: J,
}

#[derive(Debug, Clone)]
pub struct Scheduler<J> {
    now_ms: u64,
    next_handle: u64,
    next_seq: u64,
    entries: Vec<Entry<J>>,
    shut_down: bool,
}

impl<J: Clone> Scheduler<J> {
    /// Scheduler whose clock starts at `now_ms`
    pub fn new(now_ms: u64) -> Self {
        Self {
            now_ms,
            next_handle: 1,
            next_seq: 0,
            entries: Vec::new(),
            shut_down: false,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Number of armed jobs
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Run `job` once, `delay_ms` from now. `None` after shutdown.
    pub fn schedule_once(&mut self, delay_ms: u64, job: J) -> Option<TimerHandle> {
        self.push(delay_ms, None, job)
    }

    /// Run `job` after `initial_delay_ms`, then every `period_ms`.
    ///
    /// Fixed rate: each run is due one period after the previous due time,
    /// not after it was dispatched. A zero period is treated as 1ms.
    pub fn schedule_at_fixed_rate(
        &mut self,
        initial_delay_ms: u64,
        period_ms: u64,
        job: J,
    ) -> Option<TimerHandle> {
        self.push(initial_delay_ms, Some(period_ms.max(1)), job)
    }

    /// Disarm a job. Returns false if it already ran or was never armed.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Cancel everything and refuse new work. Returns the number cancelled.
    pub fn shutdown(&mut self) -> usize {
        self.shut_down = true;
        let cancelled = self.entries.len();
        self.entries.clear();
        cancelled
    }

    /// Pop the earliest job due at or before `until_ms`.
    ///
    /// Advances the clock to that job's due time. When nothing is due the
    /// clock moves to `until_ms` (never backwards) and `None` is returned.
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<J> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= until_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.seq))
            .map(|(i, _)| i);

        let Some(idx) = idx else {
            self.now_ms = self.now_ms.max(until_ms);
            return None;
        };

        let seq = self.bump_seq();
        let entry = &mut self.entries[idx];
        self.now_ms = self.now_ms.max(entry.due_ms);
        match entry.period_ms {
            Some(period) => {
                entry.due_ms += period;
                // Re-armed runs sort after jobs scheduled in the meantime
                entry.seq = seq;
                Some(entry.job.clone())
            }
            None => Some(self.entries.swap_remove(idx).job),
        }
    }

    fn push(&mut self, delay_ms: u64, period_ms: Option<u64>, job: J) -> Option<TimerHandle> {
        if self.shut_down {
            return None;
        }
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        let seq = self.bump_seq();
        self.entries.push(Entry {
            handle,
            seq,
            due_ms: self.now_ms.saturating_add(delay_ms),
            period_ms,
            job,
        });
        Some(handle)
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}
