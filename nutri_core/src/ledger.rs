//! Append-only nutrition ledger.

use crate::{FoodEntry, FoodSource, NutritionState};

/// Logged food for one session
#[derive(Clone, Debug, Default)]
pub struct NutritionLedger {
    state: NutritionState,
}

impl NutritionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a food and bump the running total
    ///
    /// Negative calories are clamped to 0 so the total stays well-defined.
    pub fn add_food(&mut self, name: &str, calories: i64, source: FoodSource) -> &NutritionState {
        let clamped = calories.clamp(0, i64::from(u32::MAX)) as u32;
        if i64::from(clamped) != calories {
            tracing::warn!(
                "Clamped calories for '{}' from {} to {}",
                name,
                calories,
                clamped
            );
        }

        self.state.logged_foods.push(FoodEntry {
            name: name.to_string(),
            calories: clamped,
            source,
        });
        self.state.total_calories += u64::from(clamped);

        tracing::debug!(
            "Logged {} ({} kcal), total now {}",
            name,
            clamped,
            self.state.total_calories
        );
        &self.state
    }

    pub fn state(&self) -> &NutritionState {
        &self.state
    }

    pub fn entries(&self) -> &[FoodEntry] {
        &self.state.logged_foods
    }

    pub fn total_calories(&self) -> u64 {
        self.state.total_calories
    }

    pub fn len(&self) -> usize {
        self.state.logged_foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.logged_foods.is_empty()
    }
}
