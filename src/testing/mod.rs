//! Testing infrastructure for the launcher pipeline.
//!
//! Provides a scriptable in-memory stand-in for the hypervisor control
//! surface (machines, sessions, progress handles) with failure injection
//! and call counters, plus a simple subsequence ranking that stands in
//! for the host's fuzzy collaborator. Used by the in-module unit tests
//! and the `tests/` directory; no real hypervisor is ever touched.

pub mod control_surface;
pub mod ranking;

pub use control_surface::{Completion, MockHypervisor, MockMachine, MockProgress, MockSession};
pub use ranking::{SubsequenceMatcher, SubsequenceRanking};
