//! A single particle: position, preference-score velocity, personal best.

use super::cost::cost;
use super::types::{Assignment, Instance};
use rand::Rng;

/// Per-task preference scores over all services.
///
/// Stored row-major: row `t` holds the scores of task `t` for every
/// service in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceMatrix {
    scores: Vec<f64>,
    num_services: usize,
}

impl PreferenceMatrix {
    fn random<R: Rng>(num_tasks: usize, num_services: usize, rng: &mut R) -> Self {
        let scores = (0..num_tasks * num_services)
            .map(|_| rng.random::<f64>())
            .collect();
        Self {
            scores,
            num_services,
        }
    }

    /// Scores of the task at position `task`.
    pub fn row(&self, task: usize) -> &[f64] {
        let start = task * self.num_services;
        &self.scores[start..start + self.num_services]
    }

    fn row_mut(&mut self, task: usize) -> &mut [f64] {
        let start = task * self.num_services;
        &mut self.scores[start..start + self.num_services]
    }

    /// Index of the highest score in `row(task)`, earliest on ties.
    fn arg_max(&self, task: usize) -> usize {
        let row = self.row(task);
        let mut best = 0;
        for (s, &score) in row.iter().enumerate().skip(1) {
            if score > row[best] {
                best = s;
            }
        }
        best
    }
}

/// One candidate assignment plus its search state.
///
/// The particle only ever writes its own state; the global best is
/// passed in read-only.
#[derive(Debug, Clone)]
pub struct Particle {
    position: Assignment,
    velocity: PreferenceMatrix,
    best_position: Assignment,
    best_cost: f64,
}

impl Particle {
    /// Creates a particle with a uniformly random position and scores.
    ///
    /// Draw order: one service per task (task order), then one score per
    /// (task, service) pair, task-major.
    pub fn new<R: Rng>(instance: &Instance, rng: &mut R) -> Self {
        let n = instance.num_services();
        let position = Assignment::from_indices(
            (0..instance.num_tasks())
                .map(|_| rng.random_range(0..n))
                .collect(),
        );
        let velocity = PreferenceMatrix::random(instance.num_tasks(), n, rng);
        Self {
            best_position: position.clone(),
            position,
            velocity,
            best_cost: f64::INFINITY,
        }
    }

    /// Pulls every score toward the personal and global best services.
    ///
    /// ```text
    /// score = w * score
    ///       + c1 * r1 * (id(best[t]) - id(s))
    ///       + c2 * r2 * (id(global[t]) - id(s))
    /// ```
    ///
    /// Service ids serve as coordinates on a line. `r1` then `r2` are drawn
    /// fresh for every (task, service) pair.
    pub fn update_velocity<R: Rng>(
        &mut self,
        instance: &Instance,
        global_best: &Assignment,
        w: f64,
        c1: f64,
        c2: f64,
        rng: &mut R,
    ) {
        let services = instance.services();
        for t in 0..instance.num_tasks() {
            let personal = services[self.best_position.service_of(t)].id as f64;
            let social = services[global_best.service_of(t)].id as f64;
            for (score, service) in self.velocity.row_mut(t).iter_mut().zip(services) {
                let r1: f64 = rng.random();
                let r2: f64 = rng.random();
                let id = service.id as f64;
                *score = w * *score + c1 * r1 * (personal - id) + c2 * r2 * (social - id);
            }
        }
    }

    /// Moves every task to its highest-scoring service.
    pub fn update_position(&mut self) {
        for t in 0..self.position.len() {
            let s = self.velocity.arg_max(t);
            self.position.set(t, s);
        }
    }

    /// Costs the current position and records it as the personal best on
    /// strict improvement.
    pub fn evaluate(&mut self, instance: &Instance) -> f64 {
        let current = cost(instance, &self.position);
        if current < self.best_cost {
            self.best_cost = current;
            self.best_position.clone_from(&self.position);
        }
        current
    }

    pub fn position(&self) -> &Assignment {
        &self.position
    }

    pub fn velocity(&self) -> &PreferenceMatrix {
        &self.velocity
    }

    pub fn best_position(&self) -> &Assignment {
        &self.best_position
    }

    pub fn best_cost(&self) -> f64 {
        self.best_cost
    }
}
