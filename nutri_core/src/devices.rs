//! Wearable device list shown on the diary.
//!
//! Devices move between the connected and available lists; nothing talks to
//! real hardware. Sync times are stamped with the session's simulated clock.

use crate::{Error, Result};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Smartwatch,
    FitnessTracker,
}

/// Battery colour band: above 50% good, above 20% low, else critical
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryLevel {
    Good,
    Low,
    Critical,
}

impl BatteryLevel {
    pub fn classify(percent: u8) -> Self {
        if percent > 50 {
            BatteryLevel::Good
        } else if percent > 20 {
            BatteryLevel::Low
        } else {
            BatteryLevel::Critical
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub kind: DeviceKind,
    pub battery: u8,
    pub connected: bool,
    /// Simulated time of the last sync; `None` means never synced
    pub last_sync_ms: Option<u64>,
}

impl Device {
    pub fn battery_level(&self) -> BatteryLevel {
        BatteryLevel::classify(self.battery)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeviceManager {
    connected: Vec<Device>,
    available: Vec<Device>,
    scanning: bool,
}

impl Default for DeviceManager {
    /// One paired watch and one tracker waiting to be connected
    fn default() -> Self {
        Self {
            connected: vec![Device {
                id: "1".into(),
                name: "Apple Watch Series 9".into(),
                kind: DeviceKind::Smartwatch,
                battery: 78,
                connected: true,
                last_sync_ms: Some(0),
            }],
            available: vec![Device {
                id: "2".into(),
                name: "Fitbit Charge 6".into(),
                kind: DeviceKind::FitnessTracker,
                battery: 85,
                connected: false,
                last_sync_ms: None,
            }],
            scanning: false,
        }
    }
}

impl DeviceManager {
    pub fn connected(&self) -> &[Device] {
        &self.connected
    }

    pub fn available(&self) -> &[Device] {
        &self.available
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    /// Move an available device to the connected list, synced at `now_ms`
    pub fn connect(&mut self, id: &str, now_ms: u64) -> Result<&Device> {
        let pos = self
            .available
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| not_found(id))?;

        let mut device = self.available.remove(pos);
        device.connected = true;
        device.last_sync_ms = Some(now_ms);
        tracing::info!("Connected device '{}'", device.name);

        self.connected.push(device);
        Ok(&self.connected[self.connected.len() - 1])
    }

    /// Move a connected device back to the available list
    pub fn disconnect(&mut self, id: &str) -> Result<&Device> {
        let pos = self
            .connected
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| not_found(id))?;

        let mut device = self.connected.remove(pos);
        device.connected = false;
        device.last_sync_ms = None;
        tracing::info!("Disconnected device '{}'", device.name);

        self.available.push(device);
        Ok(&self.available[self.available.len() - 1])
    }

    /// Enter the scanning state; false if a scan is already running
    pub fn start_scan(&mut self) -> bool {
        if self.scanning {
            return false;
        }
        self.scanning = true;
        true
    }

    pub fn finish_scan(&mut self) {
        self.scanning = false;
    }
}

fn not_found(id: &str) -> Error {
    Error::NotFound {
        kind: "device",
        name: id.to_string(),
    }
}
