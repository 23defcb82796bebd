// Library exports for quickvm
//
// The host launcher framework consumes the plugin surface; everything else
// is exported so alternative hosts can wire the stages up themselves.

pub mod config;
pub mod hypervisor;
pub mod launch;
pub mod plugin;
pub mod rank;
pub mod source;
pub mod state;

// Mock control surface and ranking stand-in (used by the tests/ directory)
pub mod testing;

// Re-export the plugin surface for convenience
pub use config::{ConfigError, LauncherConfig};
pub use hypervisor::{Hypervisor, HypervisorError, Machine, Progress, ResultCode, Session};
pub use launch::{Launcher, LAUNCH_WAIT_TIMEOUT};
pub use plugin::{LaunchAction, SearchResult, VmLauncherPlugin};
pub use rank::{rank, Matcher, RankedMachine, Ranking};
pub use source::accessible_machines;
pub use state::{MachineState, StateCategory};
