//! Default catalog of foods, meal plans and workouts.
//!
//! The tables are static; the session only ever reads them.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Search-page filter: everything, one cuisine, or one food category
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FoodFilter {
    All,
    Cuisine(Cuisine),
    Category(FoodCategory),
}

impl std::str::FromStr for FoodFilter {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(FoodFilter::All);
        }
        if let Ok(cuisine) = s.parse::<Cuisine>() {
            return Ok(FoodFilter::Cuisine(cuisine));
        }
        s.parse::<FoodCategory>()
            .map(FoodFilter::Category)
            .map_err(|_| crate::Error::NotFound {
                kind: "food filter",
                name: s.to_string(),
            })
    }
}

fn food(
    name: &str,
    serving: &str,
    calories: u32,
    category: FoodCategory,
    cuisine: Cuisine,
) -> FoodItem {
    FoodItem {
        name: name.into(),
        serving: serving.into(),
        calories,
        category,
        cuisine,
        halal: true,
        recipe: None,
    }
}

fn recipe(ingredients: &[&str], instructions: &[&str], prep: &str, cook: &str) -> Option<Recipe> {
    Some(Recipe {
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        instructions: instructions.iter().map(|s| s.to_string()).collect(),
        prep_time: prep.into(),
        cook_time: cook.into(),
    })
}

fn scanner(name: &str, calories: u32, protein: f32, carbs: f32, fat: f32) -> ScannerFood {
    ScannerFood {
        name: name.into(),
        calories,
        macros: Macros {
            protein,
            carbs,
            fat,
        },
    }
}

#[allow(clippy::too_many_arguments)]
fn meal_plan(
    id: &str,
    title: &str,
    description: &str,
    daily_calories: u32,
    duration_days: u32,
    difficulty: Difficulty,
    diabetic_friendly: bool,
    category: MealPlanCategory,
    cuisine: Cuisine,
    halal: bool,
    foods: &[&str],
) -> MealPlan {
    MealPlan {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        daily_calories,
        duration_days,
        difficulty,
        diabetic_friendly,
        category,
        cuisine,
        halal,
        foods: foods.iter().map(|s| s.to_string()).collect(),
    }
}

fn workout(
    id: &str,
    title: &str,
    description: &str,
    duration_minutes: u32,
    calories: u32,
    exercises: &[&str],
) -> WorkoutPlan {
    WorkoutPlan {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        duration_minutes,
        calories,
        exercises: exercises.iter().map(|s| s.to_string()).collect(),
        custom: false,
    }
}

/// Builds the default catalog
///
/// **Note**: prefer `get_default_catalog()` outside of tests.
pub fn build_default_catalog() -> Catalog {
    use Cuisine::*;
    use FoodCategory::*;

    // ========================================================================
    // Searchable foods
    // ========================================================================

    let foods = vec![
        FoodItem {
            recipe: recipe(
                &["1 cup basmati rice", "2 cups water", "1 tsp salt", "1 tbsp ghee"],
                &[
                    "Rinse rice until water runs clear",
                    "Boil water with salt and ghee",
                    "Add rice and cook for 18-20 minutes",
                    "Let it rest for 5 minutes before serving",
                ],
                "5 min",
                "25 min",
            ),
            ..food("Basmati Rice", "1 cup cooked", 210, Grains, SouthAsian)
        },
        FoodItem {
            recipe: recipe(
                &["2 cups whole wheat flour", "3/4 cup water", "1/2 tsp salt", "1 tbsp oil"],
                &[
                    "Mix flour and salt",
                    "Add water gradually to form dough",
                    "Knead for 5 minutes",
                    "Roll into circles and cook on hot griddle",
                ],
                "15 min",
                "20 min",
            ),
            ..food("Chapati", "1 medium", 104, Grains, SouthAsian)
        },
        food("Naan", "1 piece", 262, Grains, SouthAsian),
        FoodItem {
            recipe: recipe(
                &["1 cup brown rice", "2.5 cups water", "1 tsp salt", "1 tbsp oil"],
                &[
                    "Rinse brown rice until water runs clear",
                    "Bring water to boil with salt and oil",
                    "Add rice and reduce heat to low",
                    "Cover and cook for 45-50 minutes",
                    "Let stand 10 minutes before fluffing",
                ],
                "5 min",
                "55 min",
            ),
            ..food("Brown Rice", "1 cup cooked", 216, Grains, SouthAsian)
        },
        food("Quinoa", "1 cup cooked", 222, Grains, Mediterranean),
        FoodItem {
            recipe: recipe(
                &[
                    "500g chicken",
                    "2 onions",
                    "3 tomatoes",
                    "2 tbsp curry powder",
                    "1 cup coconut milk",
                    "Ginger-garlic paste",
                ],
                &[
                    "Sauté onions until golden",
                    "Add ginger-garlic paste and spices",
                    "Add chicken and cook until sealed",
                    "Add tomatoes and coconut milk",
                    "Simmer for 25-30 minutes",
                ],
                "15 min",
                "45 min",
            ),
            ..food("Chicken Curry", "1 cup", 285, MeatAndFish, SouthAsian)
        },
        FoodItem {
            recipe: recipe(
                &[
                    "500g chicken",
                    "2 tbsp jerk seasoning",
                    "2 tbsp soy sauce",
                    "1 tbsp brown sugar",
                    "2 limes",
                    "Scotch bonnet pepper",
                ],
                &[
                    "Mix all marinade ingredients",
                    "Marinate chicken for 2+ hours",
                    "Grill on medium-high heat",
                    "Cook 6-8 minutes per side",
                    "Rest for 5 minutes before serving",
                ],
                "10 min + 2h marinating",
                "20 min",
            ),
            ..food("Jerk Chicken", "100g", 180, MeatAndFish, Caribbean)
        },
        food("Tandoori Chicken", "100g", 150, MeatAndFish, SouthAsian),
        FoodItem {
            halal: false,
            ..food("Sushi (Salmon)", "6 pieces", 250, MeatAndFish, EastAsian)
        },
        food("Mango", "1 cup sliced", 107, Fruits, SouthAsian),
        food("Banana", "1 medium", 105, Fruits, SouthAsian),
        food("Papaya", "1 cup cubed", 55, Fruits, SouthAsian),
        food("Apple", "1 medium", 95, Fruits, Mediterranean),
        food("Plantain", "1 medium", 218, Fruits, Caribbean),
        FoodItem {
            recipe: recipe(
                &[
                    "1 cup lentils (dal)",
                    "3 cups water",
                    "1 tsp turmeric",
                    "1 tsp cumin seeds",
                    "2 cloves garlic",
                    "1 onion",
                    "2 tomatoes",
                    "2 tbsp oil",
                ],
                &[
                    "Wash and boil lentils with turmeric until soft",
                    "Heat oil and add cumin seeds",
                    "Add garlic and onions, sauté until golden",
                    "Add tomatoes and cook until soft",
                    "Mix with cooked dal and simmer for 10 minutes",
                ],
                "10 min",
                "30 min",
            ),
            ..food("Dal (Lentils)", "1 cup cooked", 230, Vegetables, SouthAsian)
        },
        food("Palak (Spinach)", "1 cup cooked", 41, Vegetables, SouthAsian),
        food("Aloo (Potato)", "1 medium boiled", 161, Vegetables, SouthAsian),
        food("Greek Salad", "1 cup", 85, Vegetables, Mediterranean),
        food("Hummus", "2 tbsp", 70, Vegetables, Mediterranean),
        food("Black Beans", "1/2 cup", 115, Vegetables, LatinAmerican),
    ];

    // ========================================================================
    // Scanner foods (with macros)
    // ========================================================================

    let scanner_foods = vec![
        scanner("Chicken Curry", 285, 25.0, 8.0, 18.0),
        scanner("Basmati Rice", 205, 4.0, 45.0, 0.5),
        scanner("Dal (Lentils)", 230, 18.0, 40.0, 0.8),
        scanner("Chapati", 104, 3.0, 18.0, 2.5),
        scanner("Tandoori Chicken", 260, 45.0, 5.0, 10.0),
        scanner("Mutton Curry", 310, 28.0, 6.0, 20.0),
        scanner("Palak Paneer", 270, 14.0, 10.0, 20.0),
        scanner("Biryani", 290, 8.0, 45.0, 10.0),
        scanner("Samosa", 262, 6.0, 24.0, 17.0),
        scanner("Naan", 262, 9.0, 45.0, 5.0),
        scanner("Aloo Gobi", 150, 4.0, 25.0, 5.0),
        scanner("Bhindi (Okra)", 33, 2.0, 7.0, 0.2),
        scanner("Karahi Chicken", 275, 30.0, 8.0, 14.0),
        scanner("Seekh Kebab", 280, 20.0, 5.0, 20.0),
        scanner("Raita", 60, 3.0, 8.0, 2.0),
        scanner("Mango", 60, 0.8, 15.0, 0.4),
        scanner("Banana", 89, 1.1, 23.0, 0.3),
        scanner("Guava", 68, 2.6, 14.0, 1.0),
        scanner("Papaya", 43, 0.5, 11.0, 0.3),
        scanner("Apple", 52, 0.3, 14.0, 0.2),
        scanner("Sushi (Salmon)", 250, 24.0, 37.0, 4.0),
        scanner("Greek Salad", 150, 4.0, 9.0, 12.0),
        scanner("Hummus", 166, 8.0, 14.0, 10.0),
        scanner("Quinoa Bowl", 220, 8.0, 39.0, 4.0),
        scanner("Avocado Toast", 195, 6.0, 16.0, 13.0),
    ];

    // ========================================================================
    // Meal plans
    // ========================================================================

    let meal_plans = vec![
        meal_plan(
            "1",
            "South Asian Weight Loss",
            "Traditional recipes with portion control.",
            1400,
            7,
            Difficulty::Easy,
            false,
            MealPlanCategory::WeightLoss,
            SouthAsian,
            true,
            &["Dal", "Grilled Chicken", "Brown Rice", "Vegetables", "Chapati", "Yogurt"],
        ),
        meal_plan(
            "2",
            "Desi Muscle Building",
            "High-protein South Asian meals.",
            2100,
            14,
            Difficulty::Medium,
            false,
            MealPlanCategory::WeightGain,
            SouthAsian,
            true,
            &["Chicken Tikka", "Paneer Curry", "Basmati Rice", "Dal Makhani", "Almonds"],
        ),
        meal_plan(
            "3",
            "Diabetic-Friendly Desi",
            "Low-glycemic South Asian meals.",
            1600,
            10,
            Difficulty::Easy,
            true,
            MealPlanCategory::Normal,
            SouthAsian,
            true,
            &["Brown Rice", "Spinach", "Grilled Fish", "Cauliflower", "Green Beans"],
        ),
        meal_plan(
            "4",
            "Pure Vegetarian",
            "Complete vegetarian nutrition.",
            1800,
            7,
            Difficulty::Simple,
            false,
            MealPlanCategory::Normal,
            SouthAsian,
            true,
            &["Kidney Beans", "Paneer", "Quinoa", "Mixed Dal", "Vegetables"],
        ),
        meal_plan(
            "5",
            "Low Carb Desi",
            "Reduced carbohydrate meals.",
            1700,
            14,
            Difficulty::Medium,
            true,
            MealPlanCategory::WeightLoss,
            SouthAsian,
            true,
            &["Tandoori Chicken", "Cauliflower Rice", "Egg Curry", "Salad", "Paneer"],
        ),
        meal_plan(
            "6",
            "Japanese Wellness",
            "Traditional Japanese meals.",
            1500,
            7,
            Difficulty::Simple,
            true,
            MealPlanCategory::Normal,
            EastAsian,
            false,
            &["Sushi", "Miso Soup", "Vegetables", "Green Tea", "Salmon", "Brown Rice"],
        ),
        meal_plan(
            "7",
            "Caribbean Spice",
            "Flavorful Caribbean dishes.",
            1600,
            7,
            Difficulty::Easy,
            false,
            MealPlanCategory::Normal,
            Caribbean,
            true,
            &["Jerk Chicken", "Rice and Peas", "Plantain", "Callaloo", "Mango"],
        ),
        meal_plan(
            "8",
            "Mediterranean Diet",
            "Heart-healthy Mediterranean meals.",
            1700,
            14,
            Difficulty::Easy,
            true,
            MealPlanCategory::Normal,
            Mediterranean,
            true,
            &["Grilled Fish", "Olive Oil", "Greek Salad", "Hummus", "Quinoa"],
        ),
    ];

    // ========================================================================
    // Workouts
    // ========================================================================

    let workouts = vec![
        workout(
            "morning_cardio",
            "Morning Cardio",
            "Start your day with energizing cardio exercises to boost metabolism.",
            20,
            200,
            &["Jumping Jacks", "High Knees", "Butt Kicks", "Mountain Climbers", "Burpees"],
        ),
        workout(
            "strength_training",
            "Strength Training",
            "Build muscle strength with bodyweight exercises.",
            30,
            300,
            &["Push-ups", "Squats", "Lunges", "Planks", "Pull-ups", "Dips"],
        ),
        workout(
            "hiit",
            "HIIT Workout",
            "High-intensity interval training for maximum calorie burn.",
            15,
            250,
            &["Burpees", "Jump Squats", "High Knees", "Push-ups", "Mountain Climbers"],
        ),
    ];

    let exercises = [
        "Jumping Jacks",
        "High Knees",
        "Crunches",
        "Leg Raises",
        "Pull-ups",
        "Dips",
        "Push-ups",
        "Squats",
        "Lunges",
        "Planks",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    Catalog {
        foods,
        scanner_foods,
        meal_plans,
        workouts,
        exercises,
    }
}

impl Catalog {
    /// Case-insensitive exact lookup of a searchable food
    pub fn food(&self, name: &str) -> Option<&FoodItem> {
        self.foods.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn scanner_food(&self, name: &str) -> Option<&ScannerFood> {
        self.scanner_foods
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn meal_plan(&self, id: &str) -> Option<&MealPlan> {
        self.meal_plans.iter().find(|p| p.id == id)
    }

    pub fn workout(&self, id: &str) -> Option<&WorkoutPlan> {
        self.workouts.iter().find(|w| w.id == id)
    }

    /// Foods matching the search page state
    ///
    /// A non-empty query is a case-insensitive substring match over every
    /// food and ignores the filter and halal flag.
    pub fn search_foods(&self, query: &str, filter: FoodFilter, halal_only: bool) -> Vec<&FoodItem> {
        let query = query.trim();
        if !query.is_empty() {
            let needle = query.to_lowercase();
            return self
                .foods
                .iter()
                .filter(|f| f.name.to_lowercase().contains(&needle))
                .collect();
        }

        self.foods
            .iter()
            .filter(|f| !halal_only || f.halal)
            .filter(|f| match filter {
                FoodFilter::All => true,
                FoodFilter::Cuisine(c) => f.cuisine == c,
                FoodFilter::Category(c) => f.category == c,
            })
            .collect()
    }

    /// Meal plans for a category and cuisine
    ///
    /// Diabetic users see diabetic-friendly plans first; order is otherwise
    /// the catalog order.
    pub fn filter_meal_plans(
        &self,
        category: MealPlanCategory,
        cuisine: Cuisine,
        halal_only: bool,
        diabetic_first: bool,
    ) -> Vec<&MealPlan> {
        let mut plans: Vec<_> = self
            .meal_plans
            .iter()
            .filter(|p| p.category == category && p.cuisine == cuisine)
            .filter(|p| !halal_only || p.halal)
            .collect();

        if diabetic_first {
            // stable sort keeps catalog order within each group
            plans.sort_by_key(|p| !p.diabetic_friendly);
        }
        plans
    }

    /// Validate the catalog and return all problems found
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut seen = HashSet::new();
        for f in &self.foods {
            if f.name.trim().is_empty() {
                errors.push("Food with empty name".to_string());
            }
            if !seen.insert(f.name.to_lowercase()) {
                errors.push(format!("Duplicate food '{}'", f.name));
            }
        }

        let mut seen = HashSet::new();
        for f in &self.scanner_foods {
            if !seen.insert(f.name.to_lowercase()) {
                errors.push(format!("Duplicate scanner food '{}'", f.name));
            }
        }
        if self.scanner_foods.is_empty() {
            errors.push("Catalog has no scanner foods".to_string());
        }

        let mut seen = HashSet::new();
        for p in &self.meal_plans {
            if !seen.insert(p.id.as_str()) {
                errors.push(format!("Duplicate meal plan id '{}'", p.id));
            }
            if p.foods.is_empty() {
                errors.push(format!("Meal plan '{}' lists no foods", p.id));
            }
        }

        let mut seen = HashSet::new();
        for w in &self.workouts {
            if !seen.insert(w.id.as_str()) {
                errors.push(format!("Duplicate workout id '{}'", w.id));
            }
            if w.exercises.is_empty() {
                errors.push(format!("Workout '{}' has no exercises", w.id));
            }
        }

        if self.exercises.is_empty() {
            errors.push("Catalog has no exercises for the plan builder".to_string());
        }

        errors
    }
}
