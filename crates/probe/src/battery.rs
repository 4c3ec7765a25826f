use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use tracing::debug;

use crate::ProbeError;

pub const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

/// Level reported when the platform cannot tell.
pub const NEUTRAL_LEVEL: f32 = 1.0;

/// Reads the first battery under a sysfs power-supply directory as a
/// fraction in [0, 1]. `Ok(None)` means no battery is present.
pub fn read_battery_level(root: &Path) -> Result<Option<f32>, ProbeError> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(ProbeError::Battery(err.to_string())),
    };

    let mut supplies: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .collect();
    supplies.sort();

    for supply in supplies {
        let kind = fs::read_to_string(supply.join("type")).unwrap_or_default();
        if kind.trim() != "Battery" {
            continue;
        }
        let raw = fs::read_to_string(supply.join("capacity"))
            .map_err(|err| ProbeError::Battery(format!("{}: {err}", supply.display())))?;
        let percent: f32 = raw
            .trim()
            .parse()
            .map_err(|_| ProbeError::Battery(format!("unreadable capacity '{}'", raw.trim())))?;
        return Ok(Some((percent / 100.0).clamp(0.0, 1.0)));
    }
    Ok(None)
}

/// Battery level query running off the event loop.
#[derive(Debug)]
pub struct BatteryQuery {
    rx: Receiver<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BatteryPoll {
    Ready(f32),
    Pending,
    Gone,
}

impl BatteryQuery {
    pub fn spawn() -> Self {
        Self::spawn_at(PathBuf::from(POWER_SUPPLY_ROOT))
    }

    pub fn spawn_at(root: PathBuf) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let spawned = thread::Builder::new()
            .name("skyfield-battery".into())
            .spawn(move || {
                let level = match read_battery_level(&root) {
                    Ok(Some(level)) => level,
                    Ok(None) => NEUTRAL_LEVEL,
                    Err(err) => {
                        debug!(error = %err, "battery query failed; assuming full");
                        NEUTRAL_LEVEL
                    }
                };
                let _ = tx.send(level);
            });
        if let Err(err) = spawned {
            debug!(error = %err, "unable to start battery query");
        }
        Self { rx }
    }

    /// Blocks for at most `timeout`.
    pub fn wait(&self, timeout: Duration) -> BatteryPoll {
        match self.rx.recv_timeout(timeout) {
            Ok(level) => BatteryPoll::Ready(level),
            Err(RecvTimeoutError::Timeout) => BatteryPoll::Pending,
            Err(RecvTimeoutError::Disconnected) => BatteryPoll::Gone,
        }
    }

    pub fn poll(&self) -> BatteryPoll {
        match self.rx.try_recv() {
            Ok(level) => BatteryPoll::Ready(level),
            Err(TryRecvError::Empty) => BatteryPoll::Pending,
            Err(TryRecvError::Disconnected) => BatteryPoll::Gone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supply(root: &Path, name: &str, kind: &str, capacity: Option<&str>) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("type"), format!("{kind}\n")).unwrap();
        if let Some(capacity) = capacity {
            fs::write(dir.join("capacity"), format!("{capacity}\n")).unwrap();
        }
    }

    #[test]
    fn reads_first_battery_capacity() {
        let temp = tempfile::tempdir().unwrap();
        supply(temp.path(), "AC", "Mains", None);
        supply(temp.path(), "BAT0", "Battery", Some("42"));
        let level = read_battery_level(temp.path()).unwrap();
        assert_eq!(level, Some(0.42));
    }

    #[test]
    fn missing_root_means_no_battery() {
        let temp = tempfile::tempdir().unwrap();
        let level = read_battery_level(&temp.path().join("absent")).unwrap();
        assert_eq!(level, None);
    }

    #[test]
    fn garbage_capacity_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        supply(temp.path(), "BAT1", "Battery", Some("lots"));
        assert!(matches!(
            read_battery_level(temp.path()),
            Err(ProbeError::Battery(_))
        ));
    }

    #[test]
    fn query_reports_neutral_level_without_battery() {
        let temp = tempfile::tempdir().unwrap();
        let query = BatteryQuery::spawn_at(temp.path().to_path_buf());
        assert_eq!(query.wait(Duration::from_secs(5)), BatteryPoll::Ready(NEUTRAL_LEVEL));
    }

    #[test]
    fn query_delivers_measured_level() {
        let temp = tempfile::tempdir().unwrap();
        supply(temp.path(), "BAT0", "Battery", Some("9"));
        let query = BatteryQuery::spawn_at(temp.path().to_path_buf());
        match query.wait(Duration::from_secs(5)) {
            BatteryPoll::Ready(level) => assert!((level - 0.09).abs() < 1e-6),
            other => panic!("unexpected poll result {other:?}"),
        }
    }
}
