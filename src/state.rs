//! Machine state space and display classification.
//!
//! The hypervisor reports machine state as a closed enumeration whose
//! ordinal ordering is meaningful: "online" and "transient" are inclusive
//! ordinal ranges bounded by marker constants, not explicit sets of
//! variants. [`MachineState::category`] performs that range test exactly
//! once and is the single source of truth for both the display subtitle
//! and the launch-eligibility guard, so the two can never disagree about
//! what "online" means.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Runtime state of a machine as reported by the hypervisor.
///
/// The discriminants mirror the control API's scheme: values between
/// [`MachineState::FIRST_ONLINE`] and [`MachineState::LAST_ONLINE`]
/// (inclusive) are active sub-states of a running machine; values between
/// [`MachineState::FIRST_TRANSIENT`] and [`MachineState::LAST_TRANSIENT`]
/// are mid-transition statuses with no individual display name. States
/// outside both ranges display under their own name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum MachineState {
    Null = 0,
    PoweredOff = 1,
    Saved = 2,
    Teleported = 3,
    Aborted = 4,
    Running = 5,
    Paused = 6,
    Stuck = 7,
    LiveSnapshotting = 8,
    OnlineSnapshotting = 9,
    Teleporting = 10,
    Snapshotting = 11,
    SettingUp = 12,
    RestoringSnapshot = 13,
    DeletingSnapshot = 14,
    Starting = 15,
    Stopping = 16,
    Saving = 17,
    Restoring = 18,
}

impl MachineState {
    /// First state of the inclusive online range.
    pub const FIRST_ONLINE: MachineState = MachineState::Running;
    /// Last state of the inclusive online range.
    pub const LAST_ONLINE: MachineState = MachineState::OnlineSnapshotting;
    /// First state of the inclusive transient range.
    pub const FIRST_TRANSIENT: MachineState = MachineState::Teleporting;
    /// Last state of the inclusive transient range.
    pub const LAST_TRANSIENT: MachineState = MachineState::DeletingSnapshot;

    /// Every declared state, in ordinal order. Used by tests to assert
    /// classification is total over the state space.
    pub const ALL: [MachineState; 19] = [
        MachineState::Null,
        MachineState::PoweredOff,
        MachineState::Saved,
        MachineState::Teleported,
        MachineState::Aborted,
        MachineState::Running,
        MachineState::Paused,
        MachineState::Stuck,
        MachineState::LiveSnapshotting,
        MachineState::OnlineSnapshotting,
        MachineState::Teleporting,
        MachineState::Snapshotting,
        MachineState::SettingUp,
        MachineState::RestoringSnapshot,
        MachineState::DeletingSnapshot,
        MachineState::Starting,
        MachineState::Stopping,
        MachineState::Saving,
        MachineState::Restoring,
    ];

    /// Ordinal value within the control API's scheme.
    pub const fn ordinal(self) -> i32 {
        self as i32
    }

    /// Raw PascalCase token for this state, scheme prefix already absent.
    const fn token(self) -> &'static str {
        match self {
            MachineState::Null => "Null",
            MachineState::PoweredOff => "PoweredOff",
            MachineState::Saved => "Saved",
            MachineState::Teleported => "Teleported",
            MachineState::Aborted => "Aborted",
            MachineState::Running => "Running",
            MachineState::Paused => "Paused",
            MachineState::Stuck => "Stuck",
            MachineState::LiveSnapshotting => "LiveSnapshotting",
            MachineState::OnlineSnapshotting => "OnlineSnapshotting",
            MachineState::Teleporting => "Teleporting",
            MachineState::Snapshotting => "Snapshotting",
            MachineState::SettingUp => "SettingUp",
            MachineState::RestoringSnapshot => "RestoringSnapshot",
            MachineState::DeletingSnapshot => "DeletingSnapshot",
            MachineState::Starting => "Starting",
            MachineState::Stopping => "Stopping",
            MachineState::Saving => "Saving",
            MachineState::Restoring => "Restoring",
        }
    }

    /// Classify this state into its display category.
    ///
    /// Pure, total over the declared state space, and deterministic. This
    /// is the only place the ordinal range test appears.
    pub fn category(self) -> StateCategory {
        let ordinal = self.ordinal();
        if (Self::FIRST_ONLINE.ordinal()..=Self::LAST_ONLINE.ordinal()).contains(&ordinal) {
            StateCategory::Online
        } else if (Self::FIRST_TRANSIENT.ordinal()..=Self::LAST_TRANSIENT.ordinal())
            .contains(&ordinal)
        {
            StateCategory::Transient
        } else {
            StateCategory::Concrete(self.token())
        }
    }

    /// Whether the machine is currently running in any of its active
    /// sub-states. Gates launching: an online machine must not be started
    /// a second time.
    pub fn is_online(self) -> bool {
        matches!(self.category(), StateCategory::Online)
    }
}

/// Display category of a machine state.
///
/// A closed set of tags: the two range buckets plus the concrete states
/// that display under their own name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateCategory {
    /// Somewhere in the online range.
    Online,
    /// Somewhere in the transient range.
    Transient,
    /// A concrete state, displayed as its own space-separated name.
    Concrete(&'static str),
}

impl fmt::Display for StateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateCategory::Online => f.write_str("Online"),
            StateCategory::Transient => f.write_str("Transient"),
            StateCategory::Concrete(token) => {
                // "PoweredOff" -> "Powered Off": space before every
                // interior capital, leading capital untouched.
                for (index, ch) in token.char_indices() {
                    if index > 0 && ch.is_ascii_uppercase() {
                        f.write_str(" ")?;
                    }
                    write!(f, "{ch}")?;
                }
                Ok(())
            }
        }
    }
}
