//! Power-aware dispatch.
//!
//! A pure routing decision: on AC power (and when configured to) the runner
//! performs a full sync; on battery it only services due projects. Plugged-in
//! state comes from Linux sysfs; a machine with no battery is "plugged in".

use std::path::Path;

/// Which reconciliation pass the runner should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// Every tracked project, followed by the prune pass.
    Full,
    /// Only projects whose timers have expired.
    Due,
}

/// Route an automatic invocation.
pub fn route(full_sync_on_ac: bool, plugged_in: bool) -> RunKind {
    if full_sync_on_ac && plugged_in {
        RunKind::Full
    } else {
        RunKind::Due
    }
}

/// Read plugged-in state from a sysfs power-supply tree.
///
/// Rules, in order: any mains adapter reporting `online == 1` wins; else any
/// battery reporting `Discharging` means on battery; else plugged in (covers
/// desktops with no battery and unreadable trees).
pub fn plugged_in_at(power_supply_root: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(power_supply_root) else {
        return true;
    };

    let mut saw_discharging_battery = false;
    for entry in entries.filter_map(|e| e.ok()) {
        let dir = entry.path();
        let Ok(kind) = std::fs::read_to_string(dir.join("type")) else {
            continue;
        };
        match kind.trim() {
            "Mains" => {
                if let Ok(online) = std::fs::read_to_string(dir.join("online")) {
                    if online.trim() == "1" {
                        return true;
                    }
                }
            }
            "Battery" => {
                if let Ok(status) = std::fs::read_to_string(dir.join("status")) {
                    if status.trim() == "Discharging" {
                        saw_discharging_battery = true;
                    }
                }
            }
            _ => {}
        }
    }
    !saw_discharging_battery
}

/// Plugged-in state of this machine.
pub fn is_plugged_in() -> bool {
    #[cfg(target_os = "linux")]
    {
        plugged_in_at(Path::new("/sys/class/power_supply"))
    }
    #[cfg(not(target_os = "linux"))]
    {
        true
    }
}
