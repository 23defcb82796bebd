//! Host-launcher plugin surface.
//!
//! The host framework constructs the plugin once at load time, calls
//! [`VmLauncherPlugin::query`] per search event, and invokes the bound
//! action on whichever result the user selects. The action's boolean
//! return tells the host whether to close the result list (`true`) or
//! keep it open (`false`, the already-running guard).

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::config::LauncherConfig;
use crate::hypervisor::{Hypervisor, HypervisorError, Machine};
use crate::launch::Launcher;
use crate::rank::{rank, Ranking};
use crate::source::accessible_machines;

/// Zero-argument launch action bound to one search result.
pub type LaunchAction = Box<dyn Fn() -> Result<bool, HypervisorError> + Send + Sync>;

/// One display-ready entry in the host's result list.
pub struct SearchResult {
    /// Machine display name.
    pub title: String,
    /// Human-readable state category.
    pub subtitle: String,
    /// Static icon reference, identical for every result.
    pub icon_path: String,
    /// Relevance score; the host orders the list by it.
    pub score: i64,
    action: LaunchAction,
}

impl SearchResult {
    /// Invoke the bound launch action.
    pub fn activate(&self) -> Result<bool, HypervisorError> {
        (self.action)()
    }
}

impl fmt::Debug for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchResult")
            .field("title", &self.title)
            .field("subtitle", &self.subtitle)
            .field("icon_path", &self.icon_path)
            .field("score", &self.score)
            .finish_non_exhaustive()
    }
}

/// The launcher plugin: discovery, ranking, and launch wiring for one
/// hypervisor connection.
pub struct VmLauncherPlugin<H: Hypervisor, R: Ranking> {
    hypervisor: Arc<H>,
    ranking: R,
    launcher: Arc<Launcher<H>>,
    icon_path: String,
}

impl<H: Hypervisor, R: Ranking> VmLauncherPlugin<H, R> {
    /// Called once at plugin load with the hypervisor connection, the
    /// host's ranking collaborator, and the runtime handle launch tasks
    /// are spawned on.
    pub fn init(hypervisor: H, ranking: R, config: LauncherConfig, runtime: Handle) -> Self {
        let hypervisor = Arc::new(hypervisor);
        let launcher = Arc::new(Launcher::new(Arc::clone(&hypervisor), runtime, &config));

        tracing::info!(frontend = %config.frontend, "vm launcher plugin initialized");

        Self {
            hypervisor,
            ranking,
            launcher,
            icon_path: config.icon_path,
        }
    }

    /// Produce the result list for one query.
    ///
    /// Runs the synchronous pipeline: enumerate accessible machines, rank
    /// their names against the query, and bind a launch action per
    /// survivor. A machine whose state cannot be read at query time is
    /// skipped; a failure of the enumeration itself propagates to the
    /// host. Displayed state may be stale by the time an action fires —
    /// the launch guard re-reads live state at invocation.
    pub fn query(&self, query: &str) -> Result<Vec<SearchResult>, HypervisorError> {
        let machines = accessible_machines(self.hypervisor.as_ref())?;
        let ranked = rank(machines, query, &self.ranking);

        let mut results = Vec::with_capacity(ranked.len());
        for entry in ranked {
            let state = match entry.machine.state() {
                Ok(state) => state,
                Err(error) => {
                    tracing::debug!(
                        machine_id = %entry.machine.id(),
                        %error,
                        "state read failed, dropping result"
                    );
                    continue;
                }
            };

            let launcher = Arc::clone(&self.launcher);
            let machine = entry.machine.clone();
            results.push(SearchResult {
                title: entry.name,
                subtitle: state.category().to_string(),
                icon_path: self.icon_path.clone(),
                score: entry.score,
                action: Box::new(move || launcher.launch(&machine)),
            });
        }

        Ok(results)
    }
}
