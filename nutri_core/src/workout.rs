//! Workout progress tracker.
//!
//! One workout at a time moves through `Idle -> Running -> {Completed,
//! Stopped}`. Each step adds a fixed number of percentage points; the tracker
//! does not know about time, the session's scheduler calls [`advance`] on a
//! fixed cadence.
//!
//! [`advance`]: WorkoutTracker::advance

use crate::physiology::PhysiologySimulator;
use crate::{WorkoutPlan, WorkoutRun};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum WorkoutPhase {
    Idle,
    Running(WorkoutRun),
    Completed { workout_id: String, title: String },
    Stopped { workout_id: String, title: String },
}

/// What one call to [`WorkoutTracker::advance`] did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing is running
    Idle,
    Progressed {
        progress_percent: u32,
        exercise_index: usize,
        milestone: bool,
    },
    Completed {
        workout_id: String,
        title: String,
        calories: u32,
    },
}

#[derive(Clone, Debug)]
pub struct WorkoutTracker {
    phase: WorkoutPhase,
    progress_increment: u32,
}

/// Index of the exercise being performed at `progress_percent`
pub fn exercise_index_for(progress_percent: u32, exercise_count: usize) -> usize {
    if exercise_count == 0 {
        return 0;
    }
    let idx = (progress_percent.min(100) as usize * exercise_count) / 100;
    idx.min(exercise_count - 1)
}

impl WorkoutTracker {
    pub fn new(progress_increment: u32) -> Self {
        Self {
            phase: WorkoutPhase::Idle,
            progress_increment: progress_increment.clamp(1, 100),
        }
    }

    pub fn phase(&self) -> &WorkoutPhase {
        &self.phase
    }

    pub fn active(&self) -> Option<&WorkoutRun> {
        match &self.phase {
            WorkoutPhase::Running(run) => Some(run),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active().is_some()
    }

    /// Begin `plan` from 0%
    ///
    /// A workout that is still running is discarded without credit and
    /// returned.
    pub fn start(&mut self, plan: &WorkoutPlan) -> Option<WorkoutRun> {
        let fresh = WorkoutPhase::Running(WorkoutRun::new(plan));
        let previous = match std::mem::replace(&mut self.phase, fresh) {
            WorkoutPhase::Running(run) => {
                tracing::info!(
                    "Discarding '{}' at {}% to start '{}'",
                    run.workout_id,
                    run.progress_percent,
                    plan.id
                );
                Some(run)
            }
            _ => None,
        };
        tracing::info!("Started workout '{}'", plan.id);
        previous
    }

    /// Move the running workout forward one step
    ///
    /// Milestones are credited to `sim` as deciles are crossed; reaching 100%
    /// completes the workout and credits the full calorie estimate.
    pub fn advance(&mut self, sim: &mut PhysiologySimulator) -> StepOutcome {
        let WorkoutPhase::Running(run) = &mut self.phase else {
            return StepOutcome::Idle;
        };

        run.progress_percent = (run.progress_percent + self.progress_increment).min(100);
        run.exercise_index = exercise_index_for(run.progress_percent, run.exercises.len());
        let milestone = sim.on_workout_progress_step(
            &mut run.last_milestone_step,
            run.calories,
            run.progress_percent,
        );

        if run.progress_percent < 100 {
            return StepOutcome::Progressed {
                progress_percent: run.progress_percent,
                exercise_index: run.exercise_index,
                milestone,
            };
        }

        let workout_id = run.workout_id.clone();
        let title = run.title.clone();
        let calories = run.calories;
        sim.on_workout_completed(calories);
        self.phase = WorkoutPhase::Completed {
            workout_id: workout_id.clone(),
            title: title.clone(),
        };

        StepOutcome::Completed {
            workout_id,
            title,
            calories,
        }
    }

    /// Abandon the running workout, discarding its progress
    ///
    /// Returns `None` when nothing was running; the phase is then unchanged.
    pub fn stop(&mut self) -> Option<WorkoutRun> {
        match std::mem::replace(&mut self.phase, WorkoutPhase::Idle) {
            WorkoutPhase::Running(run) => {
                tracing::info!("Stopped '{}' at {}%", run.workout_id, run.progress_percent);
                self.phase = WorkoutPhase::Stopped {
                    workout_id: run.workout_id.clone(),
                    title: run.title.clone(),
                };
                Some(run)
            }
            other => {
                self.phase = other;
                None
            }
        }
    }

    /// Clear a finished Completed/Stopped phase back to Idle
    pub fn settle(&mut self) {
        if matches!(
            self.phase,
            WorkoutPhase::Completed { .. } | WorkoutPhase::Stopped { .. }
        ) {
            self.phase = WorkoutPhase::Idle;
        }
    }
}
