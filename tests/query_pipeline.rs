//! End-to-end plugin tests: init, query, activate.

use std::time::Duration;

use quickvm::testing::{MockHypervisor, MockMachine, SubsequenceRanking};
use quickvm::{HypervisorError, LauncherConfig, MachineState, VmLauncherPlugin};
use tokio::runtime::Handle;
use tokio::time::timeout;

fn plugin_with(
    hypervisor: MockHypervisor,
) -> VmLauncherPlugin<MockHypervisor, SubsequenceRanking> {
    tracing_subscriber::fmt::try_init().ok();
    VmLauncherPlugin::init(
        hypervisor,
        SubsequenceRanking,
        LauncherConfig::default(),
        Handle::current(),
    )
}

#[tokio::test]
async fn empty_query_lists_every_accessible_machine() -> anyhow::Result<()> {
    let plugin = plugin_with(
        MockHypervisor::new()
            .with_machine(MockMachine::new("Ubuntu Dev Box", MachineState::PoweredOff))
            .with_machine(MockMachine::new("Windows 11", MachineState::Running))
            .with_machine(MockMachine::new("NixOS CI", MachineState::Saving))
            .with_machine(MockMachine::new("broken", MachineState::Aborted).inaccessible()),
    );

    let results = plugin.query("")?;
    let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Ubuntu Dev Box", "Windows 11", "NixOS CI"]);

    let subtitles: Vec<_> = results.iter().map(|r| r.subtitle.as_str()).collect();
    assert_eq!(subtitles, vec!["Powered Off", "Online", "Saving"]);

    assert!(results.iter().all(|r| r.icon_path == "icon.png"));
    Ok(())
}

#[tokio::test]
async fn non_matching_query_filters_results() -> anyhow::Result<()> {
    let plugin = plugin_with(
        MockHypervisor::new()
            .with_machine(MockMachine::new("Ubuntu Dev Box", MachineState::PoweredOff))
            .with_machine(MockMachine::new("Windows 11", MachineState::Running)),
    );

    let results = plugin.query("ubd")?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Ubuntu Dev Box");
    assert!(results[0].score > 0);

    assert!(plugin.query("zzz")?.is_empty());
    Ok(())
}

#[tokio::test]
async fn activating_a_result_launches_and_releases_the_session() -> anyhow::Result<()> {
    let machine = MockMachine::new("Ubuntu Dev Box", MachineState::PoweredOff);
    let plugin = plugin_with(MockHypervisor::new().with_machine(machine.clone()));

    let results = plugin.query("")?;
    assert!(results[0].activate()?);

    assert_eq!(machine.launch_calls(), 1);
    let session = machine.launch_sessions()[0].clone();
    timeout(Duration::from_secs(2), session.unlocked()).await?;
    assert_eq!(session.unlock_count(), 1);
    Ok(())
}

#[tokio::test]
async fn activating_an_online_result_keeps_the_list_open() -> anyhow::Result<()> {
    let machine = MockMachine::new("Windows 11", MachineState::Running);
    let plugin = plugin_with(MockHypervisor::new().with_machine(machine.clone()));

    let results = plugin.query("")?;
    assert_eq!(results[0].activate()?, false);
    assert_eq!(machine.launch_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn launch_guard_reads_live_state_not_query_time_state() -> anyhow::Result<()> {
    let machine = MockMachine::new("Ubuntu Dev Box", MachineState::PoweredOff);
    let plugin = plugin_with(MockHypervisor::new().with_machine(machine.clone()));

    let results = plugin.query("")?;
    assert_eq!(results[0].subtitle, "Powered Off");

    // The machine came online between the query and the activation.
    machine.set_state(MachineState::Running);
    assert_eq!(results[0].activate()?, false);
    assert_eq!(machine.launch_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn repeated_activation_creates_a_session_per_attempt() -> anyhow::Result<()> {
    let machine = MockMachine::new("Ubuntu Dev Box", MachineState::PoweredOff);
    let plugin = plugin_with(MockHypervisor::new().with_machine(machine.clone()));

    let results = plugin.query("")?;
    assert!(results[0].activate()?);
    assert!(results[0].activate()?);

    let sessions = machine.launch_sessions();
    assert_eq!(sessions.len(), 2);
    assert_ne!(sessions[0].id(), sessions[1].id());
    Ok(())
}

#[tokio::test]
async fn enumeration_failure_surfaces_to_the_host() {
    let plugin = plugin_with(MockHypervisor::new().with_enumeration_error());
    assert!(matches!(
        plugin.query(""),
        Err(HypervisorError::Api { .. })
    ));
}
