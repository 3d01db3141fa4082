use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;

/// A thread-safe slot holding an optional shared value.
///
/// Reads never block and never observe a torn value: the slot stores an
/// `Arc<T>` pointer that is swapped atomically. Readers get their own
/// `Arc` and keep it alive even if the slot is overwritten meanwhile.
pub struct ValueCell<T> {
    slot: ArcSwapOption<T>,
}

impl<T> ValueCell<T> {
    /// Creates a cell holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            slot: ArcSwapOption::from_pointee(value),
        }
    }

    /// Creates an empty cell.
    pub fn empty() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
        }
    }

    /// Returns the current value, if any.
    pub fn read(&self) -> Option<Arc<T>> {
        self.slot.load_full()
    }

    /// Stores `value`, dropping this cell's reference to the previous one.
    pub fn write(&self, value: T) {
        self.slot.store(Some(Arc::new(value)));
    }

    /// Stores `value` and returns the previous value.
    pub fn swap(&self, value: T) -> Option<Arc<T>> {
        self.slot.swap(Some(Arc::new(value)))
    }

    /// Empties the cell, returning what it held.
    pub fn take(&self) -> Option<Arc<T>> {
        self.slot.swap(None)
    }

    pub fn is_empty(&self) -> bool {
        self.slot.load().is_none()
    }
}

impl<T> Default for ValueCell<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValueCell").field(&self.read()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::thread;

    #[test]
    fn empty_until_written() {
        let cell = ValueCell::<String>::default();
        assert!(cell.is_empty());
        assert!(cell.read().is_none());

        cell.write("ready".to_string());
        assert_eq!(cell.read().as_deref().map(String::as_str), Some("ready"));
    }

    #[test]
    fn swap_and_take_return_previous() {
        let cell = ValueCell::new(1);

        assert_eq!(cell.swap(2).as_deref(), Some(&1));
        assert_eq!(cell.take().as_deref(), Some(&2));
        assert!(cell.is_empty());
        assert_eq!(cell.take(), None);
    }

    #[test]
    fn readers_keep_old_value_alive() {
        let cell = ValueCell::new(vec![1, 2, 3]);
        let old = cell.read();

        cell.write(vec![4]);

        assert_eq!(old.as_deref(), Some(&vec![1, 2, 3]));
        assert_eq!(cell.read().as_deref(), Some(&vec![4]));
    }

    #[test]
    fn concurrent_writers_leave_one_of_their_values() {
        let cell = Arc::new(ValueCell::empty());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cell = cell.clone();
                thread::spawn(move || cell.write(i))
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let value = *cell.read().unwrap();
        assert!((0..8).contains(&value));
    }
}
