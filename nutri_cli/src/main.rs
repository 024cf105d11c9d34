use clap::{Parser, Subcommand};
use nutri_core::detection::detect_or_fallback;
use nutri_core::plans::PlanBuilder;
use nutri_core::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nutri")]
#[command(about = "NutriLabz nutrition and fitness session simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the food catalog
    Foods {
        /// Case-insensitive name search (ignores --filter and --halal)
        #[arg(long)]
        query: Option<String>,

        /// "all", a cuisine or a food category
        #[arg(long, default_value = "all")]
        filter: String,

        /// Halal foods only
        #[arg(long)]
        halal: bool,
    },

    /// List meal plans for a goal and cuisine
    Meals {
        /// normal, weight-loss or weight-gain
        #[arg(long, default_value = "normal")]
        category: String,

        #[arg(long, default_value = "south asian")]
        cuisine: String,

        #[arg(long)]
        halal: bool,

        /// Show diabetic-friendly plans first
        #[arg(long)]
        diabetic: bool,
    },

    /// Build a custom workout plan from exercises
    Plan {
        #[arg(required = true)]
        exercises: Vec<String>,
    },

    /// Scan a meal (no model is bundled; the fallback picks a catalog food)
    Scan {
        /// Seed for a reproducible result
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run a scripted session and print its final state
    Run {
        #[arg(long)]
        seed: Option<u64>,

        /// Steps such as eat:Naan, eat:Samosa=262, recipe:Chapati, scan,
        /// workout:hiit, stop, meal:3, wait:40s, diabetes:on, devices,
        /// connect:2, disconnect:1
        steps: Vec<String>,
    },
}

fn main() -> Result<()> {
    nutri_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    tracing::debug!("Using config: {:?}", config);

    match cli.command {
        Commands::Foods {
            query,
            filter,
            halal,
        } => cmd_foods(query.as_deref().unwrap_or(""), &filter, halal, cli.json),
        Commands::Meals {
            category,
            cuisine,
            halal,
            diabetic,
        } => cmd_meals(&category, &cuisine, halal, diabetic, cli.json),
        Commands::Plan { exercises } => cmd_plan(&exercises, &config, cli.json),
        Commands::Scan { seed } => cmd_scan(seed, &config, cli.json),
        Commands::Run { seed, steps } => cmd_run(seed, &steps, config, cli.json),
    }
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn cmd_foods(query: &str, filter: &str, halal: bool, json: bool) -> Result<()> {
    let filter: FoodFilter = filter.parse()?;
    let foods = get_default_catalog().search_foods(query, filter, halal);

    if json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
        return Ok(());
    }

    if foods.is_empty() {
        println!("No foods found.");
        return Ok(());
    }
    for food in foods {
        let marks = match (&food.recipe, food.halal) {
            (Some(_), true) => "  [recipe] [halal]",
            (Some(_), false) => "  [recipe]",
            (None, true) => "  [halal]",
            (None, false) => "",
        };
        println!(
            "  {:<18} {:>4} kcal  {:<14} {}{}",
            food.name,
            food.calories,
            food.serving,
            food.cuisine.label(),
            marks
        );
    }
    Ok(())
}

fn cmd_meals(category: &str, cuisine: &str, halal: bool, diabetic: bool, json: bool) -> Result<()> {
    let category: MealPlanCategory = category.parse()?;
    let cuisine: Cuisine = cuisine.parse()?;
    let plans = get_default_catalog().filter_meal_plans(category, cuisine, halal, diabetic);

    if json {
        println!("{}", serde_json::to_string_pretty(&plans)?);
        return Ok(());
    }

    if plans.is_empty() {
        println!("No meal plans for {} / {}.", category, cuisine);
        return Ok(());
    }
    for plan in plans {
        println!("\n  [{}] {}", plan.id, plan.title);
        println!(
            "      {} kcal/day, {} days, {:?}{}",
            plan.daily_calories,
            plan.duration_days,
            plan.difficulty,
            if plan.diabetic_friendly {
                ", diabetic-friendly"
            } else {
                ""
            }
        );
        println!("      {}", plan.foods.join(", "));
    }
    println!();
    Ok(())
}

fn cmd_plan(exercises: &[String], config: &Config, json: bool) -> Result<()> {
    let catalog = get_default_catalog();
    let mut builder = PlanBuilder::new();
    for exercise in exercises {
        builder.toggle(exercise, catalog)?;
    }
    let plan = builder.build(&config.workout, 0)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", plan.name.to_uppercase());
    println!("╰─────────────────────────────────────────╯");
    println!();
    for exercise in &plan.exercises {
        println!("  → {}", exercise);
    }
    println!();
    println!(
        "  Duration: {} min, ~{} kcal",
        plan.duration_minutes, plan.calorie_estimate
    );
    println!("  Id: {}", plan.workout_id());
    println!();
    Ok(())
}

fn cmd_scan(seed: Option<u64>, config: &Config, json: bool) -> Result<()> {
    let mut rng = rng_for(seed);
    let detection = detect_or_fallback(
        &UnavailableDetector,
        &ImagePayload::new(vec![0u8; 16]),
        get_default_catalog(),
        &config.detection,
        &mut rng,
    )
    .ok_or_else(|| Error::Detection("scanner catalog is empty".into()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detection)?);
    } else {
        display_detection(&detection);
    }
    Ok(())
}

fn cmd_run(seed: Option<u64>, steps: &[String], config: Config, json: bool) -> Result<()> {
    // Parse everything up front so a typo does not leave a half-run session.
    let steps = steps
        .iter()
        .map(|s| s.parse::<ScriptStep>())
        .collect::<Result<Vec<_>>>()?;

    tracing::info!("Running {} scripted steps", steps.len());

    let loading_step_ms = config.timing.loading_step_ms.max(1);
    let mut session = Session::with_rng(config, rng_for(seed))?;

    let mut guard = 0;
    while matches!(session.screen(), Screen::Loading { .. }) && guard < 10_000 {
        session.advance(loading_step_ms);
        guard += 1;
    }
    session.login()?;

    for step in &steps {
        step.apply(&mut session)?;
    }

    let snapshot = session.end();
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        display_snapshot(&snapshot);
    }
    Ok(())
}

fn display_detection(detection: &Detection) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  SCAN RESULT");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", detection.food_name);
    println!(
        "  {} kcal, {:.0}% confidence",
        detection.calories,
        detection.confidence * 100.0
    );
    println!(
        "  Protein {:.1}g  Carbs {:.1}g  Fat {:.1}g",
        detection.nutrition.protein, detection.nutrition.carbs, detection.nutrition.fat
    );
    if detection.fallback {
        println!();
        println!("  ℹ No detection model available; showing a sample food");
    }
    println!();
}

fn display_snapshot(snapshot: &SessionSnapshot) {
    let p = &snapshot.physiology;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  SESSION SUMMARY");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Simulated time: {:.1} s", snapshot.elapsed_ms as f64 / 1000.0);
    println!();

    println!("  Diary");
    if snapshot.nutrition.logged_foods.is_empty() {
        println!("    (nothing logged)");
    }
    for entry in &snapshot.nutrition.logged_foods {
        println!("    {:<20} {:>5} kcal", entry.name, entry.calories);
    }
    println!("    Consumed: {} kcal", snapshot.nutrition.total_calories);
    println!("    Net:      {} kcal", snapshot.net_calories);
    println!();

    println!("  Health");
    println!("    Heart rate: {} bpm ({:?})", p.heart_rate, snapshot.activity_level);
    println!("    Steps:      {} ({}% of goal)", p.steps, snapshot.steps_goal_percent);
    println!("    Burned:     {} kcal", p.calories_burned);
    println!("    Glucose:    {} mg/dL ({:?})", p.glucose, snapshot.glucose_status);
    println!();

    match &snapshot.workout {
        WorkoutPhase::Idle => {}
        WorkoutPhase::Running(run) => {
            println!("  Workout: {} at {}%", run.title, run.progress_percent);
        }
        WorkoutPhase::Completed { title, .. } => println!("  Workout: {} completed ✓", title),
        WorkoutPhase::Stopped { title, .. } => println!("  Workout: {} stopped", title),
    }
    let devices = &snapshot.devices;
    if !devices.connected().is_empty() {
        let names: Vec<_> = devices
            .connected()
            .iter()
            .map(|d| format!("{} ({}%, {:?})", d.name, d.battery, d.battery_level()))
            .collect();
        println!("  Devices: {}", names.join(", "));
    }
    if !snapshot.active_meal_plans.is_empty() {
        println!("  Meal plans: {}", snapshot.active_meal_plans.join(", "));
    }
    println!();
}
