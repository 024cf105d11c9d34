//! Custom workout plan builder.

use crate::config::WorkoutConfig;
use crate::{Catalog, CustomWorkoutPlan, Error, Result};
use uuid::Uuid;

/// Exercise selection in progress on the fitness page
#[derive(Clone, Debug, Default)]
pub struct PlanBuilder {
    selected: Vec<String>,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected exercises, in the order they were picked
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, exercise: &str) -> bool {
        self.selected.iter().any(|e| e == exercise)
    }

    /// Add or remove an exercise; returns whether it is now selected
    pub fn toggle(&mut self, exercise: &str, catalog: &Catalog) -> Result<bool> {
        let Some(canonical) = catalog
            .exercises
            .iter()
            .find(|e| e.eq_ignore_ascii_case(exercise))
        else {
            return Err(Error::NotFound {
                kind: "exercise",
                name: exercise.to_string(),
            });
        };

        if let Some(pos) = self.selected.iter().position(|e| e == canonical) {
            self.selected.remove(pos);
            Ok(false)
        } else {
            self.selected.push(canonical.clone());
            Ok(true)
        }
    }

    /// Turn the selection into a plan and clear it
    ///
    /// `existing_plans` numbers the default name ("Custom Plan N").
    pub fn build(
        &mut self,
        config: &WorkoutConfig,
        existing_plans: usize,
    ) -> Result<CustomWorkoutPlan> {
        if self.selected.is_empty() {
            return Err(Error::Validation(
                "Select at least one exercise to create a plan".into(),
            ));
        }

        let exercises = std::mem::take(&mut self.selected);
        let count = exercises.len() as u32;
        let plan = CustomWorkoutPlan {
            id: Uuid::new_v4(),
            name: format!("Custom Plan {}", existing_plans + 1),
            duration_minutes: count.saturating_mul(config.custom_minutes_per_exercise),
            calorie_estimate: count.saturating_mul(config.custom_calories_per_exercise),
            exercises,
        };

        tracing::info!(
            "Created '{}' with {} exercises ({} min, {} kcal)",
            plan.name,
            count,
            plan.duration_minutes,
            plan.calorie_estimate
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;

    #[test]
    fn test_toggle_adds_then_removes() {
        let catalog = build_default_catalog();
        let mut builder = PlanBuilder::new();

        assert!(builder.toggle("Squats", &catalog).unwrap());
        assert!(builder.toggle("planks", &catalog).unwrap());
        assert_eq!(builder.selected(), &["Squats".to_string(), "Planks".to_string()]);

        assert!(!builder.toggle("Squats", &catalog).unwrap());
        assert_eq!(builder.selected(), &["Planks".to_string()]);
    }

    #[test]
    fn test_toggle_rejects_unknown_exercise() {
        let catalog = build_default_catalog();
        let mut builder = PlanBuilder::new();
        let err = builder.toggle("Juggling", &catalog).unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "exercise", .. }));
        assert!(builder.selected().is_empty());
    }

    #[test]
    fn test_build_requires_selection() {
        let mut builder = PlanBuilder::new();
        let err = builder.build(&WorkoutConfig::default(), 0).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_build_estimates_and_clears() {
        let catalog = build_default_catalog();
        let mut builder = PlanBuilder::new();
        for exercise in ["Push-ups", "Squats", "Lunges"] {
            builder.toggle(exercise, &catalog).unwrap();
        }

        let plan = builder.build(&WorkoutConfig::default(), 1).unwrap();
        assert_eq!(plan.name, "Custom Plan 2");
        assert_eq!(plan.duration_minutes, 15);
        assert_eq!(plan.calorie_estimate, 150);
        assert_eq!(plan.exercises, vec!["Push-ups", "Squats", "Lunges"]);
        assert!(builder.selected().is_empty());

        builder.toggle("Dips", &catalog).unwrap();
        let other = builder.build(&WorkoutConfig::default(), 2).unwrap();
        assert_ne!(plan.id, other.id);
    }
}
