//! Process lookup

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Resolve the executable name of a running process.
///
/// Returns `None` when the process has exited or is not visible from this
/// process (e.g. it lives in another PID namespace).
pub fn process_name(pid: u32) -> Option<String> {
    let pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing(),
    );

    system
        .process(pid)
        .map(|process| process.name().to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}
