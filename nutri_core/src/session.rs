//! Session context.
//!
//! A [`Session`] owns every piece of mutable state for one user run: the
//! nutrition ledger, the physiology simulator, the workout tracker, the
//! wearable list, the view and the scheduler driving all of them. Nothing is global; callers create a
//! session, mutate it through its operations, advance its clock and finally
//! [`end`](Session::end) it.

use crate::catalog::get_default_catalog;
use crate::detection::{detect_or_fallback, FoodDetector, ImagePayload, UnavailableDetector};
use crate::devices::{Device, DeviceManager};
use crate::ledger::NutritionLedger;
use crate::physiology::PhysiologySimulator;
use crate::plans::PlanBuilder;
use crate::scheduler::{NoticeChannel, Scheduler, TimerId, TimerScope};
use crate::view::{Screen, SignupForm, ViewState};
use crate::workout::{StepOutcome, WorkoutPhase, WorkoutTracker};
use crate::{
    ActivityLevel, Catalog, Config, CustomWorkoutPlan, Cuisine, Detection, DiabetesType, Error,
    FoodSource, GlucoseStatus, MealPlan, MealPlanCategory, NutritionState, PhysiologyState,
    Profile, Result, WorkoutPlan,
};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Timer payloads handled by [`Session::advance`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    LoadingStep,
    LoadingSettled,
    PhysiologyTick,
    WorkoutStep,
    DeviceScanFinished,
    NoticeExpired(NoticeChannel),
}

#[derive(Clone, Debug)]
struct Notice {
    message: String,
    timer: TimerId,
}

/// A status line currently shown on a page
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct NoticeView {
    pub channel: NoticeChannel,
    pub message: String,
}

/// Read-only picture of a session, for display and `--json` output
#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub screen: Screen,
    pub nutrition: NutritionState,
    pub physiology: PhysiologyState,
    pub glucose_status: GlucoseStatus,
    pub activity_level: ActivityLevel,
    pub steps_goal_percent: u64,
    /// Consumed minus burned
    pub net_calories: i64,
    pub workout: WorkoutPhase,
    pub active_meal_plans: Vec<String>,
    pub custom_plans: Vec<CustomWorkoutPlan>,
    pub profile: Profile,
    pub devices: DeviceManager,
    pub notices: Vec<NoticeView>,
    pub pending_timers: usize,
}

const NOTICE_ORDER: [NoticeChannel; 3] = [
    NoticeChannel::Search,
    NoticeChannel::Fitness,
    NoticeChannel::MealPlans,
];

pub struct Session<R = StdRng> {
    id: Uuid,
    started_at: DateTime<Utc>,
    config: Config,
    catalog: &'static Catalog,
    ledger: NutritionLedger,
    sim: PhysiologySimulator,
    tracker: WorkoutTracker,
    builder: PlanBuilder,
    custom_plans: Vec<CustomWorkoutPlan>,
    active_meal_plans: Vec<String>,
    profile: Profile,
    devices: DeviceManager,
    notices: HashMap<NoticeChannel, Notice>,
    view: ViewState,
    scheduler: Scheduler<SessionEvent>,
    detector: Box<dyn FoodDetector>,
    rng: R,
}

impl Session<StdRng> {
    /// Session seeded from OS entropy
    pub fn new(config: Config) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Session whose jitter and fallback detections replay exactly
    pub fn with_seed(config: Config, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Session<R> {
    /// Create a session on the loading screen
    ///
    /// Fails if the configuration or the default catalog does not validate.
    pub fn with_rng(config: Config, rng: R) -> Result<Self> {
        config.validate()?;

        let catalog = get_default_catalog();
        let problems = catalog.validate();
        if !problems.is_empty() {
            return Err(Error::CatalogValidation(problems.join("; ")));
        }

        let mut scheduler = Scheduler::new();
        scheduler.schedule_every(
            config.timing.loading_step_ms,
            TimerScope::Loading,
            SessionEvent::LoadingStep,
        );

        let id = Uuid::new_v4();
        tracing::info!("Session {} started", id);

        Ok(Self {
            id,
            started_at: Utc::now(),
            ledger: NutritionLedger::new(),
            sim: PhysiologySimulator::new(config.physiology.clone(), &config.baseline),
            tracker: WorkoutTracker::new(config.workout.progress_increment),
            builder: PlanBuilder::new(),
            custom_plans: Vec::new(),
            active_meal_plans: Vec::new(),
            profile: Profile::default(),
            devices: DeviceManager::default(),
            notices: HashMap::new(),
            view: ViewState::new(),
            scheduler,
            detector: Box::new(UnavailableDetector),
            catalog,
            config,
            rng,
        })
    }

    /// Replace the food detector used by [`scan_food`](Self::scan_food)
    pub fn with_detector(mut self, detector: Box<dyn FoodDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    pub fn nutrition(&self) -> &NutritionState {
        self.ledger.state()
    }

    pub fn physiology(&self) -> &PhysiologyState {
        self.sim.state()
    }

    pub fn workout(&self) -> &WorkoutPhase {
        self.tracker.phase()
    }

    pub fn screen(&self) -> &Screen {
        self.view.screen()
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn custom_plans(&self) -> &[CustomWorkoutPlan] {
        &self.custom_plans
    }

    pub fn devices(&self) -> &DeviceManager {
        &self.devices
    }

    pub fn selected_exercises(&self) -> &[String] {
        self.builder.selected()
    }

    pub fn notice(&self, channel: NoticeChannel) -> Option<&str> {
        self.notices.get(&channel).map(|n| n.message.as_str())
    }

    /// Simulated milliseconds since the session started
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn pending_timers(&self, scope: TimerScope) -> usize {
        self.scheduler.count_scope(scope)
    }

    // ------------------------------------------------------------------
    // Food
    // ------------------------------------------------------------------

    /// Log a catalog food picked from search results
    pub fn add_food_from_search(&mut self, name: &str) -> Result<&NutritionState> {
        let catalog = self.catalog;
        let food = catalog.food(name).ok_or_else(|| Error::NotFound {
            kind: "food",
            name: name.to_string(),
        })?;
        self.log_food(&food.name, i64::from(food.calories), FoodSource::Search);
        Ok(self.ledger.state())
    }

    /// Log a catalog food from its recipe card
    pub fn add_food_from_recipe(&mut self, name: &str) -> Result<&NutritionState> {
        let catalog = self.catalog;
        let food = catalog
            .food(name)
            .filter(|f| f.recipe.is_some())
            .ok_or_else(|| Error::NotFound {
                kind: "recipe",
                name: name.to_string(),
            })?;
        self.log_food(&food.name, i64::from(food.calories), FoodSource::Recipe);
        Ok(self.ledger.state())
    }

    /// Log a food that is not in the catalog
    pub fn add_food(&mut self, name: &str, calories: i64) -> Result<&NutritionState> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Food name cannot be empty".into()));
        }
        self.log_food(name, calories, FoodSource::Manual);
        Ok(self.ledger.state())
    }

    /// Run the detector on `image` and log whatever it reports
    ///
    /// Detector failures fall back to a random catalog food.
    pub fn scan_food(&mut self, image: &ImagePayload) -> Result<Detection> {
        let detection = detect_or_fallback(
            self.detector.as_ref(),
            image,
            self.catalog,
            &self.config.detection,
            &mut self.rng,
        )
        .ok_or_else(|| Error::Detection("scanner catalog is empty".into()))?;

        self.log_food(
            &detection.food_name,
            i64::from(detection.calories),
            FoodSource::Scanner,
        );
        Ok(detection)
    }

    fn log_food(&mut self, name: &str, calories: i64, source: FoodSource) {
        self.ledger.add_food(name, calories, source);
        let logged = self.ledger.entries().last().map_or(0, |e| e.calories);
        self.sim.on_food_added(logged);

        if source == FoodSource::Search {
            let message = format!("{} added to diary!", name);
            self.post_notice(
                NoticeChannel::Search,
                message,
                self.config.timing.search_notice_ms,
            );
        }
    }

    // ------------------------------------------------------------------
    // Workouts
    // ------------------------------------------------------------------

    fn find_workout(&self, id: &str) -> Option<WorkoutPlan> {
        self.catalog.workout(id).cloned().or_else(|| {
            self.custom_plans
                .iter()
                .find(|p| p.workout_id() == id)
                .map(WorkoutPlan::from)
        })
    }

    /// Start a built-in or custom workout, replacing any running one
    pub fn start_workout(&mut self, id: &str) -> Result<()> {
        let plan = self.find_workout(id).ok_or_else(|| Error::NotFound {
            kind: "workout",
            name: id.to_string(),
        })?;

        self.scheduler.cancel_scope(TimerScope::Workout);
        self.tracker.start(&plan);
        self.clear_notice(NoticeChannel::Fitness);
        self.scheduler.schedule_every(
            self.config.timing.workout_step_ms,
            TimerScope::Workout,
            SessionEvent::WorkoutStep,
        );
        Ok(())
    }

    /// Abandon the running workout; false when nothing was running
    pub fn stop_workout(&mut self) -> bool {
        if self.tracker.stop().is_none() {
            tracing::debug!("Stop requested with no workout running");
            return false;
        }
        self.scheduler.cancel_scope(TimerScope::Workout);
        self.post_notice(
            NoticeChannel::Fitness,
            "Workout stopped. You can restart anytime!".into(),
            self.config.timing.stop_notice_ms,
        );
        true
    }

    pub fn toggle_exercise(&mut self, exercise: &str) -> Result<bool> {
        self.builder.toggle(exercise, self.catalog)
    }

    /// Turn the current exercise selection into a startable plan
    pub fn create_custom_plan(&mut self) -> Result<&CustomWorkoutPlan> {
        let plan = self
            .builder
            .build(&self.config.workout, self.custom_plans.len())?;
        self.custom_plans.push(plan);
        Ok(&self.custom_plans[self.custom_plans.len() - 1])
    }

    // ------------------------------------------------------------------
    // Meal plans and profile
    // ------------------------------------------------------------------

    /// Start a meal plan; false if it was already active
    pub fn start_meal_plan(&mut self, id: &str) -> Result<bool> {
        let catalog = self.catalog;
        let plan = catalog.meal_plan(id).ok_or_else(|| Error::NotFound {
            kind: "meal plan",
            name: id.to_string(),
        })?;

        if self.active_meal_plans.iter().any(|p| p == &plan.id) {
            tracing::debug!("Meal plan '{}' already active", plan.id);
            return Ok(false);
        }

        self.active_meal_plans.push(plan.id.clone());
        self.sim.on_meal_plan_started();
        self.post_notice(
            NoticeChannel::MealPlans,
            format!("{} started!", plan.title),
            self.config.timing.meal_plan_notice_ms,
        );
        tracing::info!("Started meal plan '{}'", plan.title);
        Ok(true)
    }

    pub fn active_meal_plans(&self) -> &[String] {
        &self.active_meal_plans
    }

    /// Meal plans for the current profile; diabetic users see
    /// diabetic-friendly plans first
    pub fn meal_plans(
        &self,
        category: MealPlanCategory,
        cuisine: Cuisine,
        halal_only: bool,
    ) -> Vec<&'static MealPlan> {
        self.catalog
            .filter_meal_plans(category, cuisine, halal_only, self.profile.has_diabetes)
    }

    pub fn set_diabetes(&mut self, has_diabetes: bool, diabetes_type: Option<DiabetesType>) {
        self.profile.has_diabetes = has_diabetes;
        if let Some(t) = diabetes_type {
            self.profile.diabetes_type = t;
        }
    }

    // ------------------------------------------------------------------
    // Wearables
    // ------------------------------------------------------------------

    pub fn connect_device(&mut self, id: &str) -> Result<&Device> {
        let now = self.scheduler.now();
        self.devices.connect(id, now)
    }

    pub fn disconnect_device(&mut self, id: &str) -> Result<&Device> {
        self.devices.disconnect(id)
    }

    /// Start a wearable scan that ends after `timing.device_scan_ms`;
    /// false if one is already running
    pub fn scan_devices(&mut self) -> bool {
        if !self.devices.start_scan() {
            tracing::debug!("Device scan already in progress");
            return false;
        }
        self.scheduler.schedule_once(
            self.config.timing.device_scan_ms,
            TimerScope::DeviceScan,
            SessionEvent::DeviceScanFinished,
        );
        tracing::info!("Scanning for devices");
        true
    }

    // ------------------------------------------------------------------
    // View transitions
    // ------------------------------------------------------------------

    pub fn show_signup(&mut self) -> Result<()> {
        self.view.show_signup()
    }

    pub fn show_login(&mut self) -> Result<()> {
        self.view.show_login()
    }

    pub fn login(&mut self) -> Result<()> {
        self.view.login()?;
        self.enter_main();
        Ok(())
    }

    pub fn signup(&mut self, form: &SignupForm) -> Result<()> {
        self.view.signup(form)?;
        self.enter_main();
        Ok(())
    }

    pub fn select_tab(&mut self, name: &str) -> Result<()> {
        self.view.select_tab(name)
    }

    pub fn open_profile(&mut self) -> Result<()> {
        self.view.open_profile()
    }

    pub fn close_overlay(&mut self) -> Result<()> {
        self.view.close_overlay()
    }

    /// Back to login; the running workout and every main-screen timer go away
    pub fn sign_out(&mut self) -> Result<()> {
        self.view.sign_out()?;
        self.tracker.stop();
        self.tracker.settle();
        self.scheduler.cancel_scope(TimerScope::Main);
        self.scheduler.cancel_scope(TimerScope::Workout);
        self.scheduler.cancel_scope(TimerScope::DeviceScan);
        self.devices.finish_scan();
        for channel in NOTICE_ORDER {
            self.clear_notice(channel);
        }
        tracing::info!("Signed out of session {}", self.id);
        Ok(())
    }

    fn enter_main(&mut self) {
        self.scheduler.cancel_scope(TimerScope::Loading);
        self.scheduler.cancel_scope(TimerScope::Main);
        self.scheduler.schedule_every(
            self.config.timing.physiology_tick_ms,
            TimerScope::Main,
            SessionEvent::PhysiologyTick,
        );
    }

    // ------------------------------------------------------------------
    // Clock
    // ------------------------------------------------------------------

    /// Run the clock forward `ms`, firing every timer that falls due
    pub fn advance(&mut self, ms: u64) {
        let target = self.scheduler.now().saturating_add(ms);
        while let Some((_, event)) = self.scheduler.next_due(target) {
            self.handle(event);
        }
        self.scheduler.advance_to(target);
    }

    fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::LoadingStep => {
                match self.view.loading_step(self.config.workout.loading_increment) {
                    Ok(true) => {
                        self.scheduler.cancel_scope(TimerScope::Loading);
                        self.scheduler.schedule_once(
                            self.config.timing.loading_settle_ms,
                            TimerScope::Loading,
                            SessionEvent::LoadingSettled,
                        );
                    }
                    Ok(false) => {}
                    Err(e) => tracing::debug!("Ignoring loading step: {}", e),
                }
            }
            SessionEvent::LoadingSettled => {
                if let Err(e) = self.view.finish_loading() {
                    tracing::debug!("Ignoring loading settle: {}", e);
                }
            }
            SessionEvent::PhysiologyTick => self.sim.tick(&mut self.rng),
            SessionEvent::WorkoutStep => {
                if let StepOutcome::Completed { title, .. } = self.tracker.advance(&mut self.sim) {
                    self.scheduler.cancel_scope(TimerScope::Workout);
                    self.post_notice(
                        NoticeChannel::Fitness,
                        format!("Great job! You completed {}!", title),
                        self.config.timing.completion_notice_ms,
                    );
                }
            }
            SessionEvent::DeviceScanFinished => {
                self.devices.finish_scan();
                tracing::debug!("Device scan finished");
            }
            SessionEvent::NoticeExpired(channel) => {
                self.notices.remove(&channel);
                if channel == NoticeChannel::Fitness {
                    self.tracker.settle();
                }
            }
        }
    }

    fn post_notice(&mut self, channel: NoticeChannel, message: String, duration_ms: u64) {
        self.clear_notice(channel);
        let timer = self.scheduler.schedule_once(
            duration_ms,
            TimerScope::Notice(channel),
            SessionEvent::NoticeExpired(channel),
        );
        tracing::debug!("Notice [{:?}] {}", channel, message);
        self.notices.insert(channel, Notice { message, timer });
    }

    fn clear_notice(&mut self, channel: NoticeChannel) {
        if let Some(old) = self.notices.remove(&channel) {
            self.scheduler.cancel(old.timer);
        }
    }

    // ------------------------------------------------------------------
    // Read-out and teardown
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> SessionSnapshot {
        let nutrition = self.ledger.state().clone();
        let physiology = self.sim.state().clone();
        let consumed = i64::try_from(nutrition.total_calories).unwrap_or(i64::MAX);
        let burned = i64::try_from(physiology.calories_burned).unwrap_or(i64::MAX);

        SessionSnapshot {
            session_id: self.id,
            started_at: self.started_at,
            elapsed_ms: self.scheduler.now(),
            screen: self.view.screen().clone(),
            glucose_status: self.sim.glucose_status(),
            activity_level: self.sim.activity_level(),
            steps_goal_percent: self.sim.steps_goal_percent(),
            net_calories: consumed - burned,
            nutrition,
            physiology,
            workout: self.tracker.phase().clone(),
            active_meal_plans: self.active_meal_plans.clone(),
            custom_plans: self.custom_plans.clone(),
            profile: self.profile.clone(),
            devices: self.devices.clone(),
            notices: NOTICE_ORDER
                .iter()
                .filter_map(|ch| {
                    self.notices.get(ch).map(|n| NoticeView {
                        channel: *ch,
                        message: n.message.clone(),
                    })
                })
                .collect(),
            pending_timers: self.scheduler.len(),
        }
    }

    /// Tear down every timer and return the final state
    pub fn end(mut self) -> SessionSnapshot {
        self.scheduler.clear();
        self.notices.clear();
        self.devices.finish_scan();
        tracing::info!(
            "Session {} ended after {} ms with {} foods logged",
            self.id,
            self.scheduler.now(),
            self.ledger.len()
        );
        self.snapshot()
    }
}
