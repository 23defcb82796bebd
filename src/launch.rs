//! Launch orchestration: guard, start, release the lock in the background.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use uuid::Uuid;

use crate::config::LauncherConfig;
use crate::hypervisor::{Hypervisor, HypervisorError, Machine, Progress, Session};

/// Bounded wait applied to process startup before the release task gives up.
pub const LAUNCH_WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Drives the launch lifecycle for one hypervisor connection.
///
/// `launch` is called synchronously from the host's selection action and
/// must return quickly; the only thing allowed to wait on VM startup is
/// the detached release task spawned per attempt.
pub struct Launcher<H: Hypervisor> {
    hypervisor: Arc<H>,
    runtime: Handle,
    frontend: String,
    wait_timeout: Duration,
}

impl<H: Hypervisor> Launcher<H> {
    pub fn new(hypervisor: Arc<H>, runtime: Handle, config: &LauncherConfig) -> Self {
        Self {
            hypervisor,
            runtime,
            frontend: config.frontend.clone(),
            wait_timeout: config.launch_wait_timeout(),
        }
    }

    /// Start the machine's process if it is not already online.
    ///
    /// Returns `Ok(false)` without any side effect when the machine's live
    /// state is in the online range, `Ok(true)` once startup has been
    /// requested and the release task scheduled. Errors from the state
    /// read, session acquisition, or the start request itself propagate to
    /// the caller; the host surfaces them through its generic failure
    /// handling.
    pub fn launch(&self, machine: &H::Machine) -> Result<bool, HypervisorError> {
        // Live state, not the state captured at query time.
        if machine.state()?.is_online() {
            tracing::debug!(machine_id = %machine.id(), "machine already online, not launching");
            return Ok(false);
        }

        let session = self.hypervisor.create_session()?;
        let progress = machine.launch_process(&session, &self.frontend, "")?;

        tracing::info!(
            machine_id = %machine.id(),
            frontend = %self.frontend,
            "machine process start requested"
        );

        self.runtime.spawn(release_session_when_started(
            machine.id(),
            session,
            progress,
            self.wait_timeout,
        ));

        Ok(true)
    }
}

/// Wait for startup to finish, then release the session lock.
///
/// The control API requires the session to be unlocked after the launched
/// process takes over the machine. Runs detached so the host UI never
/// blocks on startup latency; nothing awaits its result and every failure
/// is swallowed after a log line. The session stays locked when the wait
/// fails or the operation reports a failure code.
async fn release_session_when_started<S, P>(
    machine_id: Uuid,
    session: S,
    progress: P,
    wait_timeout: Duration,
) where
    S: Session,
    P: Progress,
{
    if let Err(error) = progress.wait_for_completion(wait_timeout).await {
        tracing::debug!(machine_id = %machine_id, %error, "startup wait did not complete");
        return;
    }

    let code = progress.result_code();
    if !code.is_success() {
        tracing::debug!(
            machine_id = %machine_id,
            result_code = code.0,
            "machine process start failed, leaving session locked"
        );
        return;
    }

    if let Err(error) = session.unlock() {
        tracing::debug!(machine_id = %machine_id, %error, "failed to release launch session");
    }
}
