use thiserror::Error;

/// A broken structural invariant, reported by `check_invariants`.
///
/// None of the public operations can produce one of these on their own; the
/// check exists so embedders (and the test suite) can audit a tree after the
/// fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantError {
    /// The in-order key at `position` does not compare greater than the key before it.
    #[error("keys out of order at in-order position {position}")]
    Unordered { position: usize },
    #[error("cached height {cached} does not match computed height {computed}")]
    HeightMismatch { cached: usize, computed: usize },
    /// `height(right) - height(left)` left the range `-1..=1`.
    #[error("node balance factor {balance} outside -1..=1")]
    Unbalanced { balance: isize },
    #[error("recorded length {recorded} but {counted} keys are reachable")]
    CountMismatch { recorded: usize, counted: usize },
}
