//! Configuration file support for NutriLabz.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/nutrilabz/config.toml`.
//! Every value has a default, so a missing file or a partial file is fine.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub physiology: PhysiologyConfig,

    #[serde(default)]
    pub baseline: BaselineConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub workout: WorkoutConfig,

    #[serde(default)]
    pub detection: DetectionConfig,
}

/// Heuristic constants and clamp bounds for the physiology simulator
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysiologyConfig {
    /// Calories per point of glucose rise when food is logged
    pub glucose_calorie_divisor: u32,
    /// Steps credited per calorie burned
    pub steps_per_calorie: u64,

    pub glucose_min: i32,
    pub glucose_max: i32,
    pub heart_rate_drift_min: i32,
    pub heart_rate_drift_max: i32,
    pub heart_rate_workout_ceiling: i32,
    pub heart_rate_workout_boost: i32,
    pub workout_glucose_drop: i32,
    pub meal_plan_glucose_drop: i32,
    pub meal_plan_glucose_floor: i32,

    pub heart_rate_jitter: i32,
    pub max_step_jitter: u64,
    pub glucose_jitter_down: i32,
    pub glucose_jitter_up: i32,

    pub daily_step_goal: u64,
}

impl Default for PhysiologyConfig {
    fn default() -> Self {
        Self {
            glucose_calorie_divisor: 20,
            steps_per_calorie: 15,
            glucose_min: 80,
            glucose_max: 180,
            heart_rate_drift_min: 65,
            heart_rate_drift_max: 100,
            heart_rate_workout_ceiling: 120,
            heart_rate_workout_boost: 10,
            workout_glucose_drop: 5,
            meal_plan_glucose_drop: 10,
            meal_plan_glucose_floor: 90,
            heart_rate_jitter: 3,
            max_step_jitter: 4,
            glucose_jitter_down: 2,
            glucose_jitter_up: 1,
            daily_step_goal: 10_000,
        }
    }
}

/// Physiology values at session start
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BaselineConfig {
    pub heart_rate: i32,
    pub steps: u64,
    pub calories_burned: u64,
    pub glucose: i32,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            heart_rate: 78,
            steps: 9247,
            calories_burned: 485,
            glucose: 142,
        }
    }
}

/// Timer periods and notice lifetimes, in milliseconds of simulated time
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub physiology_tick_ms: u64,
    pub workout_step_ms: u64,
    pub completion_notice_ms: u64,
    pub stop_notice_ms: u64,
    pub meal_plan_notice_ms: u64,
    pub search_notice_ms: u64,
    pub loading_step_ms: u64,
    pub loading_settle_ms: u64,
    /// How long a wearable scan stays in progress
    pub device_scan_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            physiology_tick_ms: 30_000,
            workout_step_ms: 800,
            completion_notice_ms: 5_000,
            stop_notice_ms: 3_000,
            meal_plan_notice_ms: 5_000,
            search_notice_ms: 3_000,
            loading_step_ms: 120,
            loading_settle_ms: 800,
            device_scan_ms: 3_000,
        }
    }
}

/// Workout progression and plan-builder constants
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkoutConfig {
    /// Percentage points added per workout step
    pub progress_increment: u32,
    /// Percentage points added per loading step
    pub loading_increment: u32,
    pub custom_minutes_per_exercise: u32,
    pub custom_calories_per_exercise: u32,
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            progress_increment: 2,
            loading_increment: 8,
            custom_minutes_per_exercise: 5,
            custom_calories_per_exercise: 50,
        }
    }
}

/// Scanner fallback confidence range
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    pub fallback_confidence_min: f64,
    pub fallback_confidence_max: f64,
    /// Minimum score a raw prediction needs to beat the default food
    pub prediction_threshold: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            fallback_confidence_min: 0.75,
            fallback_confidence_max: 0.95,
            prediction_threshold: 0.5,
        }
    }
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("nutrilabz").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let p = &self.physiology;
        let mut errors = Vec::new();

        if p.glucose_calorie_divisor == 0 {
            errors.push("glucose_calorie_divisor must be > 0".to_string());
        }
        if p.glucose_min > p.glucose_max {
            errors.push(format!(
                "glucose_min {} > glucose_max {}",
                p.glucose_min, p.glucose_max
            ));
        }
        if p.heart_rate_drift_min > p.heart_rate_drift_max {
            errors.push(format!(
                "heart_rate_drift_min {} > heart_rate_drift_max {}",
                p.heart_rate_drift_min, p.heart_rate_drift_max
            ));
        }
        if p.heart_rate_jitter < 0 || p.glucose_jitter_down < 0 || p.glucose_jitter_up < 0 {
            errors.push("jitter ranges must be non-negative".to_string());
        }
        if p.daily_step_goal == 0 {
            errors.push("daily_step_goal must be > 0".to_string());
        }

        let t = &self.timing;
        if t.physiology_tick_ms == 0 || t.workout_step_ms == 0 || t.loading_step_ms == 0 {
            errors.push("timer periods must be > 0 ms".to_string());
        }

        let w = &self.workout;
        if w.progress_increment == 0 || w.progress_increment > 100 {
            errors.push(format!(
                "progress_increment {} must be within 1..=100",
                w.progress_increment
            ));
        }
        if w.loading_increment == 0 {
            errors.push("loading_increment must be > 0".to_string());
        }

        let d = &self.detection;
        if !(0.0..=1.0).contains(&d.fallback_confidence_min)
            || !(0.0..=1.0).contains(&d.fallback_confidence_max)
            || d.fallback_confidence_min > d.fallback_confidence_max
        {
            errors.push(format!(
                "fallback confidence range {}..{} must be ordered within 0..=1",
                d.fallback_confidence_min, d.fallback_confidence_max
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(errors.join("; ")))
        }
    }
}
