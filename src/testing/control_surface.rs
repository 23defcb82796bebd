//! Scriptable in-memory hypervisor control surface.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::hypervisor::{
    Hypervisor, HypervisorError, Machine, Progress, ResultCode, Session,
};
use crate::state::MachineState;

/// How a scripted progress handle completes.
#[derive(Debug, Clone, Copy)]
pub enum Completion {
    /// Completes as soon as it is awaited.
    Immediate,
    /// Completes after the given delay, provided the wait bound allows it.
    After(Duration),
    /// Never completes; every bounded wait times out.
    Never,
}

/// In-memory hypervisor connection holding a fixed fleet of machines.
#[derive(Default)]
pub struct MockHypervisor {
    machines: Vec<MockMachine>,
    enumeration_error: bool,
    sessions: Mutex<Vec<MockSession>>,
}

impl MockHypervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_machine(mut self, machine: MockMachine) -> Self {
        self.machines.push(machine);
        self
    }

    /// Make [`Hypervisor::machines`] fail outright.
    pub fn with_enumeration_error(mut self) -> Self {
        self.enumeration_error = true;
        self
    }

    /// Number of sessions handed out so far.
    pub fn sessions_created(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

impl Hypervisor for MockHypervisor {
    type Machine = MockMachine;
    type Session = MockSession;
    type Progress = MockProgress;

    fn machines(&self) -> Result<Vec<MockMachine>, HypervisorError> {
        if self.enumeration_error {
            return Err(HypervisorError::api("machine enumeration failed"));
        }
        Ok(self.machines.clone())
    }

    fn create_session(&self) -> Result<MockSession, HypervisorError> {
        let session = MockSession::new();
        self.sessions.lock().unwrap().push(session.clone());
        Ok(session)
    }
}

/// Scriptable machine handle.
///
/// Clones share state, so counters incremented through a handle held by
/// the pipeline are visible to the test that kept the original.
#[derive(Clone)]
pub struct MockMachine {
    inner: Arc<MachineInner>,
}

struct MachineInner {
    id: Uuid,
    name: String,
    state: Mutex<MachineState>,
    accessible: AtomicBool,
    accessibility_error: AtomicBool,
    name_error: AtomicBool,
    launch_error: AtomicBool,
    result_code: Mutex<ResultCode>,
    completion: Mutex<Completion>,
    launch_calls: AtomicUsize,
    launch_sessions: Mutex<Vec<MockSession>>,
    launch_frontends: Mutex<Vec<String>>,
}

impl MockMachine {
    pub fn new(name: &str, state: MachineState) -> Self {
        Self {
            inner: Arc::new(MachineInner {
                id: Uuid::new_v4(),
                name: name.to_string(),
                state: Mutex::new(state),
                accessible: AtomicBool::new(true),
                accessibility_error: AtomicBool::new(false),
                name_error: AtomicBool::new(false),
                launch_error: AtomicBool::new(false),
                result_code: Mutex::new(ResultCode::SUCCESS),
                completion: Mutex::new(Completion::Immediate),
                launch_calls: AtomicUsize::new(0),
                launch_sessions: Mutex::new(Vec::new()),
                launch_frontends: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Report the machine as inaccessible.
    pub fn inaccessible(self) -> Self {
        self.inner.accessible.store(false, Ordering::SeqCst);
        self
    }

    /// Make the accessibility check itself error.
    pub fn with_accessibility_error(self) -> Self {
        self.inner.accessibility_error.store(true, Ordering::SeqCst);
        self
    }

    /// Make name reads error.
    pub fn with_name_error(self) -> Self {
        self.inner.name_error.store(true, Ordering::SeqCst);
        self
    }

    /// Make the start-process request itself fail.
    pub fn with_launch_error(self) -> Self {
        self.inner.launch_error.store(true, Ordering::SeqCst);
        self
    }

    /// Script the result code the progress handle reports on completion.
    pub fn with_result_code(self, code: ResultCode) -> Self {
        *self.inner.result_code.lock().unwrap() = code;
        self
    }

    /// Script how launch progress completes.
    pub fn with_completion(self, completion: Completion) -> Self {
        *self.inner.completion.lock().unwrap() = completion;
        self
    }

    /// Overwrite the live state, e.g. between query and activation.
    pub fn set_state(&self, state: MachineState) {
        *self.inner.state.lock().unwrap() = state;
    }

    /// How many times `launch_process` has been called.
    pub fn launch_calls(&self) -> usize {
        self.inner.launch_calls.load(Ordering::SeqCst)
    }

    /// Sessions passed to `launch_process`, in call order.
    pub fn launch_sessions(&self) -> Vec<MockSession> {
        self.inner.launch_sessions.lock().unwrap().clone()
    }

    /// Frontend strings passed to `launch_process`, in call order.
    pub fn launch_frontends(&self) -> Vec<String> {
        self.inner.launch_frontends.lock().unwrap().clone()
    }
}

impl Machine for MockMachine {
    type Session = MockSession;
    type Progress = MockProgress;

    fn id(&self) -> Uuid {
        self.inner.id
    }

    fn name(&self) -> Result<String, HypervisorError> {
        if self.inner.name_error.load(Ordering::SeqCst) {
            return Err(HypervisorError::api("name read failed"));
        }
        Ok(self.inner.name.clone())
    }

    fn accessible(&self) -> Result<bool, HypervisorError> {
        if self.inner.accessibility_error.load(Ordering::SeqCst) {
            return Err(HypervisorError::InaccessibleMachine);
        }
        Ok(self.inner.accessible.load(Ordering::SeqCst))
    }

    fn state(&self) -> Result<MachineState, HypervisorError> {
        Ok(*self.inner.state.lock().unwrap())
    }

    fn launch_process(
        &self,
        session: &MockSession,
        frontend: &str,
        _environment: &str,
    ) -> Result<MockProgress, HypervisorError> {
        if self.inner.launch_error.load(Ordering::SeqCst) {
            return Err(HypervisorError::api("launch request rejected"));
        }

        self.inner.launch_calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .launch_sessions
            .lock()
            .unwrap()
            .push(session.clone());
        self.inner
            .launch_frontends
            .lock()
            .unwrap()
            .push(frontend.to_string());

        Ok(MockProgress {
            result_code: *self.inner.result_code.lock().unwrap(),
            completion: *self.inner.completion.lock().unwrap(),
        })
    }
}

/// Session lock with an observable unlock counter.
#[derive(Clone)]
pub struct MockSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    id: Uuid,
    unlocks: AtomicUsize,
}

impl MockSession {
    fn new() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id: Uuid::new_v4(),
                unlocks: AtomicUsize::new(0),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// How many times `unlock` has been called on this session.
    pub fn unlock_count(&self) -> usize {
        self.inner.unlocks.load(Ordering::SeqCst)
    }

    /// Suspend until the session has been unlocked at least once.
    /// Wrap in `tokio::time::timeout` to bound the wait.
    pub async fn unlocked(&self) {
        while self.unlock_count() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl Session for MockSession {
    fn unlock(&self) -> Result<(), HypervisorError> {
        self.inner.unlocks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Progress handle with scripted completion behavior.
#[derive(Clone)]
pub struct MockProgress {
    result_code: ResultCode,
    completion: Completion,
}

#[async_trait]
impl Progress for MockProgress {
    async fn wait_for_completion(&self, timeout: Duration) -> Result<(), HypervisorError> {
        match self.completion {
            Completion::Immediate => Ok(()),
            Completion::After(delay) if delay <= timeout => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Completion::After(_) | Completion::Never => {
                tokio::time::sleep(timeout).await;
                Err(HypervisorError::Timeout { elapsed: timeout })
            }
        }
    }

    fn result_code(&self) -> ResultCode {
        self.result_code
    }
}
