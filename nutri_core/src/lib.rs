#![forbid(unsafe_code)]

//! Core engine for the NutriLabz health tracker.
//!
//! This crate provides:
//! - Domain types and the static catalog (foods, meal plans, workouts)
//! - The nutrition ledger and physiology simulator
//! - Workout progress tracking and the custom plan builder
//! - The wearable device list
//! - Food detection with a fallback policy
//! - The screen state machine, a logical-clock scheduler and the session
//!   context tying them together

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod ledger;
pub mod physiology;
pub mod scheduler;
pub mod workout;
pub mod detection;
pub mod plans;
pub mod devices;
pub mod view;
pub mod session;
pub mod script;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, FoodFilter};
pub use config::Config;
pub use devices::{BatteryLevel, Device, DeviceKind, DeviceManager};
pub use detection::{Detection, FoodDetector, ImagePayload, UnavailableDetector};
pub use scheduler::{NoticeChannel, TimerScope};
pub use session::{Session, SessionSnapshot};
pub use script::ScriptStep;
pub use view::{Screen, SignupForm, Tab};
pub use workout::WorkoutPhase;
