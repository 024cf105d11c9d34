//! Scripted session steps, as accepted by `nutri run`.
//!
//! ```text
//! eat:Naan            log a catalog food from search
//! eat:Samosa=262      log a manual entry
//! recipe:Chapati      log a food from its recipe card
//! scan                run the scanner
//! workout:hiit        start a workout (built-in or custom-<uuid>)
//! stop                stop the running workout
//! meal:3              start a meal plan
//! wait:40s            advance the clock (ms, s or m; bare numbers are ms)
//! diabetes:on         toggle the diabetes flag
//! devices             scan for wearables
//! connect:2           connect a wearable by id
//! disconnect:1        disconnect a wearable
//! ```

use crate::detection::ImagePayload;
use crate::session::Session;
use crate::{Error, Result};
use rand::Rng;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptStep {
    Eat(String),
    EatManual { name: String, calories: i64 },
    Recipe(String),
    Scan,
    Workout(String),
    Stop,
    Meal(String),
    Wait(u64),
    Diabetes(bool),
    ScanDevices,
    Connect(String),
    Disconnect(String),
}

fn bad(step: &str, reason: impl Into<String>) -> Error {
    Error::Script {
        step: step.to_string(),
        reason: reason.into(),
    }
}

/// Parse `500`, `500ms`, `3s` or `2m` into milliseconds
pub fn parse_duration_ms(s: &str) -> Result<u64> {
    let s = s.trim();
    let (digits, scale) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1_000)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60_000)
    } else {
        (s, 1)
    };

    let value: u64 = digits
        .trim()
        .parse()
        .map_err(|_| bad(s, "expected a duration like 800ms, 5s or 2m"))?;
    value
        .checked_mul(scale)
        .ok_or_else(|| bad(s, "duration too large"))
}

impl FromStr for ScriptStep {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (verb, arg) = match s.split_once(':') {
            Some((v, a)) => (v.trim().to_lowercase(), Some(a.trim())),
            None => (s.to_lowercase(), None),
        };

        let required = |arg: Option<&str>| -> Result<String> {
            match arg {
                Some(a) if !a.is_empty() => Ok(a.to_string()),
                _ => Err(bad(s, format!("'{}' needs an argument", verb))),
            }
        };

        match verb.as_str() {
            "eat" => {
                let arg = required(arg)?;
                match arg.rsplit_once('=') {
                    Some((name, calories)) => {
                        let calories = calories
                            .trim()
                            .parse()
                            .map_err(|_| bad(s, "calories must be a whole number"))?;
                        Ok(ScriptStep::EatManual {
                            name: name.trim().to_string(),
                            calories,
                        })
                    }
                    None => Ok(ScriptStep::Eat(arg)),
                }
            }
            "recipe" => Ok(ScriptStep::Recipe(required(arg)?)),
            "scan" => Ok(ScriptStep::Scan),
            "workout" => Ok(ScriptStep::Workout(required(arg)?)),
            "stop" => Ok(ScriptStep::Stop),
            "meal" => Ok(ScriptStep::Meal(required(arg)?)),
            "wait" => Ok(ScriptStep::Wait(parse_duration_ms(&required(arg)?)?)),
            "diabetes" => match required(arg)?.to_lowercase().as_str() {
                "on" | "true" | "yes" => Ok(ScriptStep::Diabetes(true)),
                "off" | "false" | "no" => Ok(ScriptStep::Diabetes(false)),
                _ => Err(bad(s, "expected on or off")),
            },
            "devices" => Ok(ScriptStep::ScanDevices),
            "connect" => Ok(ScriptStep::Connect(required(arg)?)),
            "disconnect" => Ok(ScriptStep::Disconnect(required(arg)?)),
            _ => Err(bad(s, format!("unknown step '{}'", verb))),
        }
    }
}

impl ScriptStep {
    /// Apply this step to `session`
    pub fn apply<R: Rng>(&self, session: &mut Session<R>) -> Result<()> {
        match self {
            ScriptStep::Eat(name) => {
                session.add_food_from_search(name)?;
            }
            ScriptStep::EatManual { name, calories } => {
                session.add_food(name, *calories)?;
            }
            ScriptStep::Recipe(name) => {
                session.add_food_from_recipe(name)?;
            }
            ScriptStep::Scan => {
                // Any non-empty frame; the stub detector never looks at it.
                let detection = session.scan_food(&ImagePayload::new(vec![0u8; 16]))?;
                tracing::info!(
                    "Scanned {} ({:.0}% confidence)",
                    detection.food_name,
                    detection.confidence * 100.0
                );
            }
            ScriptStep::Workout(id) => session.start_workout(id)?,
            ScriptStep::Stop => {
                session.stop_workout();
            }
            ScriptStep::Meal(id) => {
                session.start_meal_plan(id)?;
            }
            ScriptStep::Wait(ms) => session.advance(*ms),
            ScriptStep::Diabetes(on) => session.set_diabetes(*on, None),
            ScriptStep::ScanDevices => {
                session.scan_devices();
            }
            ScriptStep::Connect(id) => {
                session.connect_device(id)?;
            }
            ScriptStep::Disconnect(id) => {
                session.disconnect_device(id)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    #[test]
    fn test_parse_durations() {
        assert_eq!(parse_duration_ms("800").unwrap(), 800);
        assert_eq!(parse_duration_ms("800ms").unwrap(), 800);
        assert_eq!(parse_duration_ms("5s").unwrap(), 5_000);
        assert_eq!(parse_duration_ms("2m").unwrap(), 120_000);
        assert!(parse_duration_ms("soon").is_err());
        assert!(parse_duration_ms("-3s").is_err());
    }

    #[test]
    fn test_parse_steps() {
        assert_eq!(
            "eat:Naan".parse::<ScriptStep>().unwrap(),
            ScriptStep::Eat("Naan".into())
        );
        assert_eq!(
            "eat:Dal (Lentils)".parse::<ScriptStep>().unwrap(),
            ScriptStep::Eat("Dal (Lentils)".into())
        );
        assert_eq!(
            "eat: Samosa = 262".parse::<ScriptStep>().unwrap(),
            ScriptStep::EatManual {
                name: "Samosa".into(),
                calories: 262
            }
        );
        assert_eq!("SCAN".parse::<ScriptStep>().unwrap(), ScriptStep::Scan);
        assert_eq!(
            "wait:40s".parse::<ScriptStep>().unwrap(),
            ScriptStep::Wait(40_000)
        );
        assert_eq!(
            "diabetes:off".parse::<ScriptStep>().unwrap(),
            ScriptStep::Diabetes(false)
        );
        assert_eq!(
            "connect:2".parse::<ScriptStep>().unwrap(),
            ScriptStep::Connect("2".into())
        );
        assert_eq!(
            "devices".parse::<ScriptStep>().unwrap(),
            ScriptStep::ScanDevices
        );
    }

    #[test]
    fn test_reject_bad_steps() {
        for bad in ["dance", "eat", "eat:", "workout:", "eat:Naan=lots", "diabetes:maybe", "connect:"] {
            let err = bad.parse::<ScriptStep>().unwrap_err();
            assert!(matches!(err, Error::Script { .. }), "{}: {:?}", bad, err);
        }
    }

    #[test]
    fn test_device_steps_move_wearables() {
        let mut session = Session::with_seed(Config::default(), 3).unwrap();
        for step in ["devices", "connect:2", "disconnect:1", "wait:3s"] {
            step.parse::<ScriptStep>().unwrap().apply(&mut session).unwrap();
        }

        let devices = session.devices();
        assert!(!devices.is_scanning());
        assert_eq!(devices.connected()[0].id, "2");
        assert_eq!(devices.available()[0].id, "1");

        let err = "connect:1".parse::<ScriptStep>().unwrap().apply(&mut session);
        assert!(err.is_err());
    }

    #[test]
    fn test_apply_script_to_session() {
        let mut session = Session::with_seed(Config::default(), 11).unwrap();
        session.advance(5_000);
        session.login().unwrap();

        let steps = ["eat:Chapati", "eat:Samosa=262", "workout:hiit", "wait:40s", "meal:8"];
        for step in steps {
            step.parse::<ScriptStep>().unwrap().apply(&mut session).unwrap();
        }

        let snap = session.snapshot();
        assert_eq!(snap.nutrition.total_calories, 104 + 262);
        assert_eq!(snap.active_meal_plans, vec!["8"]);
        assert!(matches!(
            snap.workout,
            crate::workout::WorkoutPhase::Completed { .. }
        ));
    }
}
