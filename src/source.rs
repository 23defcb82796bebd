//! Machine discovery: enumerate the control surface, keep what is usable.

use crate::hypervisor::{Hypervisor, HypervisorError, Machine};

/// Enumerate all machines and yield only those currently accessible.
///
/// Order is whatever the underlying enumeration provides; downstream
/// stages must not assume it is stable. A machine whose accessibility
/// check errors is treated as inaccessible and skipped, so a single
/// broken entry never prevents listing the others. Failure of the
/// enumeration itself propagates.
pub fn accessible_machines<H: Hypervisor>(
    hypervisor: &H,
) -> Result<Vec<H::Machine>, HypervisorError> {
    let mut accessible = Vec::new();

    for machine in hypervisor.machines()? {
        match machine.accessible() {
            Ok(true) => accessible.push(machine),
            Ok(false) => {
                tracing::debug!(machine_id = %machine.id(), "skipping inaccessible machine");
            }
            Err(error) => {
                tracing::debug!(
                    machine_id = %machine.id(),
                    %error,
                    "accessibility check failed, skipping machine"
                );
            }
        }
    }

    Ok(accessible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MachineState;
    use crate::testing::{MockHypervisor, MockMachine};

    #[test]
    fn filters_out_inaccessible_machines() {
        let hypervisor = MockHypervisor::new()
            .with_machine(MockMachine::new("alpha", MachineState::PoweredOff))
            .with_machine(
                MockMachine::new("broken", MachineState::Running).inaccessible(),
            )
            .with_machine(MockMachine::new("beta", MachineState::Saved));

        let machines = accessible_machines(&hypervisor).unwrap();
        let names: Vec<_> = machines.iter().map(|m| m.name().unwrap()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    fn inaccessible_machines_are_excluded_regardless_of_state() {
        for state in MachineState::ALL {
            let hypervisor = MockHypervisor::new()
                .with_machine(MockMachine::new("hidden", state).inaccessible());
            assert!(accessible_machines(&hypervisor).unwrap().is_empty(), "{state:?}");
        }
    }

    #[test]
    fn accessibility_check_error_skips_machine_without_aborting() {
        let hypervisor = MockHypervisor::new()
            .with_machine(MockMachine::new("alpha", MachineState::PoweredOff))
            .with_machine(
                MockMachine::new("haunted", MachineState::PoweredOff)
                    .with_accessibility_error(),
            )
            .with_machine(MockMachine::new("beta", MachineState::Running));

        let machines = accessible_machines(&hypervisor).unwrap();
        let names: Vec<_> = machines.iter().map(|m| m.name().unwrap()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    fn enumeration_failure_propagates() {
        let hypervisor = MockHypervisor::new().with_enumeration_error();
        assert!(accessible_machines(&hypervisor).is_err());
    }
}
