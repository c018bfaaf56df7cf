//! Bounded time wheel of charge-change events
//!
//! One fixed-capacity slot per timestep of the horizon, stored flat. Nothing is allocated
//! after construction: a full slot drops further events instead of growing.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ChargeEvent {
    pub neuron_index: u32,
    pub charge_change: f64,
}

#[derive(Clone, Debug)]
pub struct EventRing {
    events: Vec<ChargeEvent>, // slots * capacity
    counts: Vec<usize>,
    capacity: usize,
    cursor: usize,
}

impl EventRing {
    pub fn new(slots: usize, capacity: usize) -> Self {
        assert!(slots > 0, "event ring needs at least one slot");
        Self {
            events: vec![ChargeEvent::default(); slots * capacity],
            counts: vec![0; slots],
            capacity,
            cursor: 0,
        }
    }

    #[inline]
    pub fn slots(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slot holding the events of the upcoming timestep.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn slot_at(&self, offset: usize) -> usize {
        (self.cursor + offset) % self.slots()
    }

    /// Schedule `event` `offset` ticks after the cursor.
    /// Returns false when the target slot is full and the event was dropped.
    pub fn schedule(&mut self, offset: usize, event: ChargeEvent) -> bool {
        let slot = self.slot_at(offset);
        let count = self.counts[slot];
        if count >= self.capacity {
            return false;
        }
        self.events[slot * self.capacity + count] = event;
        self.counts[slot] = count + 1;
        true
    }

    #[inline]
    pub fn len_at(&self, slot: usize) -> usize {
        self.counts[slot]
    }

    pub fn current(&self) -> &[ChargeEvent] {
        let start = self.cursor * self.capacity;
        &self.events[start..start + self.counts[self.cursor]]
    }

    /// Drop the current slot's events and advance one tick.
    pub fn advance(&mut self) {
        self.counts[self.cursor] = 0;
        self.cursor = (self.cursor + 1) % self.slots();
    }

    /// Empty every slot; the cursor keeps its position.
    pub fn clear(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
    }
}
