use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};

/// Raw encoding reserved for [`TriState::Unset`].
pub const UNSET_VALUE: i32 = i32::MIN;

/// The three states a [`StateCell`] can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriState {
    /// No value has been set.
    #[default]
    Unset,
    /// Encoded as `0`.
    False,
    /// Encoded as `1`.
    True,
}

impl TriState {
    /// Returns the integer stored for this state.
    pub const fn to_raw(self) -> i32 {
        match self {
            Self::Unset => UNSET_VALUE,
            Self::False => 0,
            Self::True => 1,
        }
    }

    /// Decodes a stored integer. Values outside the three encodings
    /// yield `None`.
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            UNSET_VALUE => Some(Self::Unset),
            0 => Some(Self::False),
            1 => Some(Self::True),
            _ => None,
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}

/// A lock-free tri-state flag (unset / false / true).
///
/// Every access is a single atomic operation on one `i32`, so the cell
/// can be shared between threads without a mutex and readers never see a
/// partially written value. All operations use `SeqCst`: a write
/// happens-before any read that observes it.
///
/// # Examples
///
/// ```
/// use runwait::sync::{StateCell, TriState};
///
/// let cell = StateCell::new();
/// assert!(cell.is_unset());
///
/// cell.set_true();
/// assert_eq!(cell.read(), TriState::True);
/// ```
pub struct StateCell {
    value: AtomicI32,
}

impl StateCell {
    /// Creates a cell in the [`TriState::Unset`] state.
    pub const fn new() -> Self {
        Self::with_state(TriState::Unset)
    }

    /// Creates a cell holding `state`.
    pub const fn with_state(state: TriState) -> Self {
        Self {
            value: AtomicI32::new(state.to_raw()),
        }
    }

    /// Atomically reads the current state.
    pub fn read(&self) -> TriState {
        let raw = self.value.load(Ordering::SeqCst);

        // Only `write` stores into the cell, and it only stores valid
        // encodings.
        TriState::from_raw(raw).unwrap_or(TriState::Unset)
    }

    /// Atomically stores `state`.
    pub fn write(&self, state: TriState) {
        self.replace(state);
    }

    /// Atomically stores `state`, returning the previous state.
    pub fn replace(&self, state: TriState) -> TriState {
        let previous = self.value.swap(state.to_raw(), Ordering::SeqCst);
        TriState::from_raw(previous).unwrap_or(TriState::Unset)
    }

    pub fn is_true(&self) -> bool {
        self.read() == TriState::True
    }

    pub fn is_false(&self) -> bool {
        self.read() == TriState::False
    }

    pub fn is_unset(&self) -> bool {
        self.read() == TriState::Unset
    }

    pub fn set_true(&self) {
        self.write(TriState::True);
    }

    pub fn set_false(&self) {
        self.write(TriState::False);
    }

    /// Returns the cell to [`TriState::Unset`].
    pub fn unset(&self) {
        self.write(TriState::Unset);
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

impl From<TriState> for StateCell {
    fn from(state: TriState) -> Self {
        Self::with_state(state)
    }
}

impl fmt::Debug for StateCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateCell").field(&self.read()).finish()
    }
}
