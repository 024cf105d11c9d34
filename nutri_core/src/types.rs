//! Core domain types for the NutriLabz session engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Logged food and the nutrition ledger state
//! - Simulated physiology
//! - Catalog entries (foods, scanner foods, meal plans, workouts)
//! - Workout runs and custom plans

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Nutrition Types
// ============================================================================

/// Where a logged food came from
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FoodSource {
    Search,
    Recipe,
    Scanner,
    Manual,
}

/// One logged food. Immutable once appended to the ledger.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FoodEntry {
    pub name: String,
    pub calories: u32,
    pub source: FoodSource,
}

/// Running calorie total plus the append-only food log
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct NutritionState {
    pub total_calories: u64,
    pub logged_foods: Vec<FoodEntry>,
}

/// Macronutrients in grams
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Macros {
    pub protein: f32,
    pub carbs: f32,
    pub fat: f32,
}

// ============================================================================
// Physiology Types
// ============================================================================

/// Simulated health metrics
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhysiologyState {
    pub heart_rate: i32,
    pub steps: u64,
    pub calories_burned: u64,
    pub glucose: i32,
}

/// Glucose band shown on the diary (mg/dL)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GlucoseStatus {
    Normal,
    Elevated,
    High,
}

impl GlucoseStatus {
    pub fn classify(glucose: i32) -> Self {
        if glucose < 100 {
            GlucoseStatus::Normal
        } else if glucose < 140 {
            GlucoseStatus::Elevated
        } else {
            GlucoseStatus::High
        }
    }
}

/// Heart-rate derived activity label
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Resting,
    Active,
}

impl ActivityLevel {
    pub fn classify(heart_rate: i32) -> Self {
        if heart_rate > 85 {
            ActivityLevel::Active
        } else {
            ActivityLevel::Resting
        }
    }
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Cuisine filter shared by foods and meal plans
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Cuisine {
    SouthAsian,
    EastAsian,
    Caribbean,
    Mediterranean,
    LatinAmerican,
    MiddleEastern,
}

impl Cuisine {
    pub const ALL: [Cuisine; 6] = [
        Cuisine::SouthAsian,
        Cuisine::EastAsian,
        Cuisine::Caribbean,
        Cuisine::Mediterranean,
        Cuisine::LatinAmerican,
        Cuisine::MiddleEastern,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Cuisine::SouthAsian => "South Asian",
            Cuisine::EastAsian => "East Asian",
            Cuisine::Caribbean => "Caribbean",
            Cuisine::Mediterranean => "Mediterranean",
            Cuisine::LatinAmerican => "Latin American",
            Cuisine::MiddleEastern => "Middle Eastern",
        }
    }
}

/// Food type category used by the search filter
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Grains,
    MeatAndFish,
    Fruits,
    Vegetables,
}

impl FoodCategory {
    pub const ALL: [FoodCategory; 4] = [
        FoodCategory::Grains,
        FoodCategory::MeatAndFish,
        FoodCategory::Fruits,
        FoodCategory::Vegetables,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FoodCategory::Grains => "Grains",
            FoodCategory::MeatAndFish => "Meat & Fish",
            FoodCategory::Fruits => "Fruits",
            FoodCategory::Vegetables => "Vegetables",
        }
    }
}

/// Meal plan goal
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MealPlanCategory {
    Normal,
    WeightLoss,
    WeightGain,
}

impl MealPlanCategory {
    pub const ALL: [MealPlanCategory; 3] = [
        MealPlanCategory::Normal,
        MealPlanCategory::WeightLoss,
        MealPlanCategory::WeightGain,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MealPlanCategory::Normal => "Normal",
            MealPlanCategory::WeightLoss => "Weight Loss",
            MealPlanCategory::WeightGain => "Weight Gain",
        }
    }
}

/// Lowercase and drop separators so "Meat & Fish", "meat_and_fish" and
/// "meatandfish" all compare equal.
fn normalize_label(s: &str) -> String {
    s.to_lowercase()
        .replace('&', "and")
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

macro_rules! impl_label_parse {
    ($ty:ident, $kind:literal) => {
        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = normalize_label(s);
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| normalize_label(v.label()) == wanted)
                    .ok_or_else(|| Error::NotFound {
                        kind: $kind,
                        name: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

impl_label_parse!(Cuisine, "cuisine");
impl_label_parse!(FoodCategory, "food category");
impl_label_parse!(MealPlanCategory, "meal plan category");

/// Recipe attached to some searchable foods
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Recipe {
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time: String,
    pub cook_time: String,
}

/// A searchable food
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub serving: String,
    pub calories: u32,
    pub category: FoodCategory,
    pub cuisine: Cuisine,
    pub halal: bool,
    pub recipe: Option<Recipe>,
}

/// A food the scanner can report, with macros
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScannerFood {
    pub name: String,
    pub calories: u32,
    pub macros: Macros,
}

/// Meal plan difficulty
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Simple,
    Easy,
    Medium,
}

/// A multi-day meal plan
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: String,
    pub title: String,
    pub description: String,
    pub daily_calories: u32,
    pub duration_days: u32,
    pub difficulty: Difficulty,
    pub diabetic_friendly: bool,
    pub category: MealPlanCategory,
    pub cuisine: Cuisine,
    pub halal: bool,
    pub foods: Vec<String>,
}

/// A workout that can be started, built in or custom
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: String,
    pub title: String,
    pub description: String,
    pub duration_minutes: u32,
    pub calories: u32,
    pub exercises: Vec<String>,
    pub custom: bool,
}

/// The complete set of static tables
#[derive(Clone, Debug)]
pub struct Catalog {
    pub foods: Vec<FoodItem>,
    pub scanner_foods: Vec<ScannerFood>,
    pub meal_plans: Vec<MealPlan>,
    pub workouts: Vec<WorkoutPlan>,
    pub exercises: Vec<String>,
}

// ============================================================================
// Workout Types
// ============================================================================

/// Progress of the single active workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutRun {
    pub workout_id: String,
    pub title: String,
    pub progress_percent: u32,
    /// Highest decile (0, 10, .. 100) already credited to the simulator
    pub last_milestone_step: u32,
    pub exercise_index: usize,
    pub exercises: Vec<String>,
    pub calories: u32,
}

impl WorkoutRun {
    pub fn new(plan: &WorkoutPlan) -> Self {
        Self {
            workout_id: plan.id.clone(),
            title: plan.title.clone(),
            progress_percent: 0,
            last_milestone_step: 0,
            exercise_index: 0,
            exercises: plan.exercises.clone(),
            calories: plan.calories,
        }
    }

    /// Exercise currently being performed, if the workout has any
    pub fn current_exercise(&self) -> Option<&str> {
        self.exercises.get(self.exercise_index).map(String::as_str)
    }
}

/// A workout assembled by the user from the exercise list
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomWorkoutPlan {
    pub id: Uuid,
    pub name: String,
    pub exercises: Vec<String>,
    pub duration_minutes: u32,
    pub calorie_estimate: u32,
}

impl CustomWorkoutPlan {
    /// Id under which the plan is started, e.g. `custom-6f1c...`
    pub fn workout_id(&self) -> String {
        format!("custom-{}", self.id)
    }
}

impl From<&CustomWorkoutPlan> for WorkoutPlan {
    fn from(plan: &CustomWorkoutPlan) -> Self {
        WorkoutPlan {
            id: plan.workout_id(),
            title: plan.name.clone(),
            description: "Custom workout plan".into(),
            duration_minutes: plan.duration_minutes,
            calories: plan.calorie_estimate,
            exercises: plan.exercises.clone(),
            custom: true,
        }
    }
}

// ============================================================================
// Profile Types
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiabetesType {
    Type1,
    #[default]
    Type2,
}

/// Health settings that change how meal plans are ordered
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Profile {
    pub has_diabetes: bool,
    pub diabetes_type: DiabetesType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glucose_status_bands() {
        assert_eq!(GlucoseStatus::classify(99), GlucoseStatus::Normal);
        assert_eq!(GlucoseStatus::classify(100), GlucoseStatus::Elevated);
        assert_eq!(GlucoseStatus::classify(139), GlucoseStatus::Elevated);
        assert_eq!(GlucoseStatus::classify(142), GlucoseStatus::High);
    }

    #[test]
    fn test_activity_level() {
        assert_eq!(ActivityLevel::classify(78), ActivityLevel::Resting);
        assert_eq!(ActivityLevel::classify(85), ActivityLevel::Resting);
        assert_eq!(ActivityLevel::classify(88), ActivityLevel::Active);
    }

    #[test]
    fn test_label_parsing_is_forgiving() {
        assert_eq!("South Asian".parse::<Cuisine>().unwrap(), Cuisine::SouthAsian);
        assert_eq!("south_asian".parse::<Cuisine>().unwrap(), Cuisine::SouthAsian);
        assert_eq!(
            "meat & fish".parse::<FoodCategory>().unwrap(),
            FoodCategory::MeatAndFish
        );
        assert_eq!(
            "weight-loss".parse::<MealPlanCategory>().unwrap(),
            MealPlanCategory::WeightLoss
        );
        assert!(matches!(
            "martian".parse::<Cuisine>(),
            Err(Error::NotFound { kind: "cuisine", .. })
        ));
    }

    #[test]
    fn test_custom_plan_converts_to_workout() {
        let custom = CustomWorkoutPlan {
            id: Uuid::new_v4(),
            name: "Custom Plan 1".into(),
            exercises: vec!["Squats".into(), "Planks".into()],
            duration_minutes: 10,
            calorie_estimate: 100,
        };
        let plan = WorkoutPlan::from(&custom);
        assert!(plan.custom);
        assert!(plan.id.starts_with("custom-"));
        assert_eq!(plan.calories, 100);
        assert_eq!(plan.exercises.len(), 2);
    }
}
