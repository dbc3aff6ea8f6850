//! Single-entry cache slot invalidated by calendar date.

use chrono::NaiveDate;
use std::sync::Arc;

/// Cached payload with the date it was stored.
#[derive(Debug)]
struct Stamped<T> {
    payload: Arc<T>,
    stamped: NaiveDate,
}

/// One cache slot. Holds at most one payload.
///
/// Payloads are shared as `Arc` and replaced wholesale by [`DaySlot::store`];
/// they are never mutated in place.
#[derive(Debug)]
pub struct DaySlot<T> {
    entry: Option<Stamped<T>>,
}

impl<T> Default for DaySlot<T> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<T> DaySlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The payload if it was stored on `today`.
    pub fn fresh(&self, today: NaiveDate) -> Option<Arc<T>> {
        self.entry
            .as_ref()
            .filter(|e| e.stamped == today)
            .map(|e| Arc::clone(&e.payload))
    }

    /// The last stored payload, whatever its date.
    pub fn peek(&self) -> Option<Arc<T>> {
        self.entry.as_ref().map(|e| Arc::clone(&e.payload))
    }

    /// Date of the stored payload.
    pub fn stamped(&self) -> Option<NaiveDate> {
        self.entry.as_ref().map(|e| e.stamped)
    }

    /// Replace the slot content.
    pub fn store(&mut self, payload: Arc<T>, today: NaiveDate) {
        self.entry = Some(Stamped { payload, stamped: today });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_empty_slot() {
        let slot: DaySlot<String> = DaySlot::new();
        assert!(slot.fresh(day(10)).is_none());
        assert!(slot.peek().is_none());
        assert!(slot.stamped().is_none());
    }

    #[test]
    fn test_fresh_same_day() {
        let mut slot = DaySlot::new();
        let payload = Arc::new("panier".to_string());
        slot.store(Arc::clone(&payload), day(10));

        let cached = slot.fresh(day(10)).unwrap();
        assert!(Arc::ptr_eq(&cached, &payload));
    }

    #[test]
    fn test_stale_after_date_change() {
        let mut slot = DaySlot::new();
        slot.store(Arc::new(1), day(10));

        assert!(slot.fresh(day(11)).is_none());
        assert_eq!(slot.peek().as_deref(), Some(&1));
        assert_eq!(slot.stamped(), Some(day(10)));
    }

    #[test]
    fn test_store_replaces_payload() {
        let mut slot = DaySlot::new();
        slot.store(Arc::new(1), day(10));
        slot.store(Arc::new(2), day(11));

        assert_eq!(slot.fresh(day(11)).as_deref(), Some(&2));
        assert!(slot.fresh(day(10)).is_none());
    }
}
