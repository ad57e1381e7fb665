#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_seq: u64,
    pending: Vec<(u64, u64, T)>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            next_seq: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn schedule(&mut self, delay_ms: u64, action: T) {
        let due = self.now_ms.saturating_add(delay_ms);
        self.pending.push((due, self.next_seq, action));
        self.next_seq += 1;
    }

    pub fn advance(&mut self, dt_ms: u64) -> Vec<T> {
        self.now_ms = self.now_ms.saturating_add(dt_ms);
        let now = self.now_ms;
        let (mut due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|(at, _, _)| *at <= now);
        self.pending = waiting;
        due.sort_by_key(|(at, seq, _)| (*at, *seq));
        due.into_iter().map(|(_, _, action)| action).collect()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }
}
