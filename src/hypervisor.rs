//! Consumed hypervisor control-surface contracts.
//!
//! These traits are the boundary to the hypervisor's remote object model:
//! an enumerable collection of machine handles, a session object acting as
//! an exclusive per-machine lock, and a long-running-operation handle for
//! asynchronous process startup. This crate never reimplements any of that
//! behavior, it only consumes the documented contracts, so the production
//! backend can be swapped for the mock surface in [`crate::testing`]
//! without touching the pipeline.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::state::MachineState;

/// Errors surfaced by the hypervisor control API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HypervisorError {
    /// A call into the control surface failed.
    #[error("hypervisor call failed: {message}")]
    Api {
        /// Backend-provided failure description.
        message: String,
    },

    /// Machine metadata cannot currently be read.
    #[error("machine metadata is not accessible")]
    InaccessibleMachine,

    /// A bounded wait elapsed before the operation completed.
    #[error("operation did not complete within {elapsed:?}")]
    Timeout {
        /// How long the wait ran before giving up.
        elapsed: Duration,
    },
}

impl HypervisorError {
    /// Convenience constructor for backend call failures.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }
}

/// COM-style result code reported by a completed operation.
///
/// Zero means success; any other value is a backend-specific failure code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultCode(pub i32);

impl ResultCode {
    pub const SUCCESS: ResultCode = ResultCode(0);

    pub fn is_success(self) -> bool {
        self.0 == 0
    }
}

/// Handle to the hypervisor connection, acquired once at plugin load.
///
/// The connection is a process-wide, read-mostly shared resource; the
/// control surface is assumed to handle its own internal concurrency for
/// concurrent reads from multiple launch attempts.
pub trait Hypervisor: Send + Sync + 'static {
    type Machine: Machine<Session = Self::Session, Progress = Self::Progress>;
    type Session: Session;
    type Progress: Progress;

    /// Enumerate every machine known to the control surface, accessible or
    /// not. Order is whatever the backend provides and is not stable.
    fn machines(&self) -> Result<Vec<Self::Machine>, HypervisorError>;

    /// Create a fresh session object. Each launch attempt acquires its own
    /// session; sessions are never pooled or reused.
    fn create_session(&self) -> Result<Self::Session, HypervisorError>;
}

/// Opaque handle to one machine.
///
/// Metadata reads go to the live control surface on every call; nothing is
/// cached on this side of the boundary.
pub trait Machine: Clone + Send + Sync + 'static {
    type Session: Session;
    type Progress: Progress;

    /// Stable machine identity, used for log correlation.
    fn id(&self) -> Uuid;

    /// Display name shown in search results.
    fn name(&self) -> Result<String, HypervisorError>;

    /// False means name and state cannot be read and the machine must be
    /// excluded from every pipeline stage.
    fn accessible(&self) -> Result<bool, HypervisorError>;

    /// Current runtime state, re-read on every call.
    fn state(&self) -> Result<MachineState, HypervisorError>;

    /// Request asynchronous startup of the machine's process under the
    /// given session lock. Returns quickly with a progress handle; the
    /// machine keeps booting in the background.
    fn launch_process(
        &self,
        session: &Self::Session,
        frontend: &str,
        environment: &str,
    ) -> Result<Self::Progress, HypervisorError>;
}

/// Exclusive lock on one machine for the duration of process startup.
pub trait Session: Send + Sync + 'static {
    /// Release the lock. Must be called at most once per session.
    fn unlock(&self) -> Result<(), HypervisorError>;
}

/// Long-running-operation handle returned by [`Machine::launch_process`].
#[async_trait]
pub trait Progress: Send + Sync + 'static {
    /// Suspend until the operation completes, bounded by `timeout`.
    ///
    /// This is the only suspending call in the crate; everything else is
    /// synchronous with respect to external I/O.
    async fn wait_for_completion(&self, timeout: Duration) -> Result<(), HypervisorError>;

    /// Result code of the completed operation.
    fn result_code(&self) -> ResultCode;
}
