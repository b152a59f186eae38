//! Swarm execution loop.
//!
//! [`PsoRunner`] orchestrates the search:
//! init particles → seed global best → (velocity → position → evaluate) × iterations.

use super::config::{PsoConfig, UpdateMode};
use super::cost::{breakdown, cost, CostBreakdown};
use super::error::PsoError;
use super::particle::Particle;
use super::types::{Assignment, Instance, Placement};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use tracing::{debug, info, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Result of an RD-PSO run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PsoResult {
    /// The lowest-cost assignment found.
    pub best: Assignment,

    /// Cost of `best`.
    pub best_cost: f64,

    /// `best` as `(task_id, service_id)` pairs in task order.
    pub placements: Vec<Placement>,

    /// `best_cost` split into execution and transfer.
    pub breakdown: CostBreakdown,

    /// Iterations performed (always `max_iters`).
    pub iterations: usize,

    /// How many times the global best was replaced.
    pub improvements: usize,

    /// Global best cost after init and after each iteration.
    pub cost_history: Vec<f64>,
}

impl fmt::Display for PsoResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in &self.placements {
            writeln!(f, "Task {} -> Service {}", p.task_id, p.service_id)?;
        }
        write!(f, "Best Cost: {}", self.best_cost)
    }
}

/// Executes the RD-PSO search.
///
/// # Usage
///
/// ```
/// use u_rdpso::pso::{Instance, PsoConfig, PsoRunner, ServiceInstance, Task};
///
/// let instance = Instance::new(
///     vec![Task::new(1, 3.0, 100.0), Task::new(2, 2.0, 150.0).with_dependencies(vec![1])],
///     vec![ServiceInstance::new(1, 0.20, 0.05), ServiceInstance::new(2, 0.15, 0.03)],
/// )
/// .unwrap();
///
/// let result = PsoRunner::run(&instance, &PsoConfig::default().with_seed(42)).unwrap();
/// assert_eq!(result.placements.len(), 2);
/// assert!(result.best_cost <= result.cost_history[0]);
/// ```
pub struct PsoRunner;

impl PsoRunner {
    /// Runs the search with a generator seeded from `config.seed`.
    pub fn run(instance: &Instance, config: &PsoConfig) -> Result<PsoResult, PsoError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        Self::run_with_rng(instance, config, &mut rng)
    }

    /// Runs the search drawing every random number from `rng`.
    ///
    /// `config.seed` is ignored.
    pub fn run_with_rng<R: Rng>(
        instance: &Instance,
        config: &PsoConfig,
        rng: &mut R,
    ) -> Result<PsoResult, PsoError> {
        config.validate()?;

        info!(
            tasks = instance.num_tasks(),
            services = instance.num_services(),
            particles = config.num_particles,
            iterations = config.max_iters,
            mode = ?config.update_mode,
            "starting rd-pso run"
        );

        let mut particles: Vec<Particle> = (0..config.num_particles)
            .map(|_| Particle::new(instance, &mut *rng))
            .collect();

        // Seeded from the first particle without touching its personal best.
        let mut swarm = SwarmBest {
            position: particles[0].position().clone(),
            cost: cost(instance, particles[0].position()),
            improvements: 0,
        };

        let mut cost_history = Vec::with_capacity(config.max_iters + 1);
        cost_history.push(swarm.cost);

        match config.update_mode {
            UpdateMode::Asynchronous => {
                for iter in 0..config.max_iters {
                    for (i, particle) in particles.iter_mut().enumerate() {
                        let current = step(particle, instance, &swarm.position, config, rng);
                        swarm.offer(particle, current, iter, i);
                    }
                    trace!(iter, best_cost = swarm.cost, "iteration done");
                    cost_history.push(swarm.cost);
                }
            }
            UpdateMode::Synchronous => {
                let mut streams: Vec<StdRng> = (0..config.num_particles)
                    .map(|_| StdRng::from_rng(&mut *rng))
                    .collect();
                for iter in 0..config.max_iters {
                    let costs =
                        step_all(&mut particles, &mut streams, instance, &swarm.position, config);
                    for (i, (particle, current)) in particles.iter().zip(costs).enumerate() {
                        swarm.offer(particle, current, iter, i);
                    }
                    trace!(iter, best_cost = swarm.cost, "iteration done");
                    cost_history.push(swarm.cost);
                }
            }
        }

        info!(
            best_cost = swarm.cost,
            improvements = swarm.improvements,
            "rd-pso run finished"
        );

        Ok(PsoResult {
            placements: swarm.position.placements(instance),
            breakdown: breakdown(instance, &swarm.position),
            best: swarm.position,
            best_cost: swarm.cost,
            iterations: config.max_iters,
            improvements: swarm.improvements,
            cost_history,
        })
    }
}

/// The shared incumbent.
struct SwarmBest {
    position: Assignment,
    cost: f64,
    improvements: usize,
}

impl SwarmBest {
    /// Takes the particle's position if `current` is strictly lower.
    fn offer(&mut self, particle: &Particle, current: f64, iter: usize, index: usize) {
        if current < self.cost {
            debug!(
                iter,
                particle = index,
                old = self.cost,
                new = current,
                "global best improved"
            );
            self.position.clone_from(particle.position());
            self.cost = current;
            self.improvements += 1;
        }
    }
}

/// One particle move: velocity, position, evaluation.
fn step<R: Rng>(
    particle: &mut Particle,
    instance: &Instance,
    global_best: &Assignment,
    config: &PsoConfig,
    rng: &mut R,
) -> f64 {
    particle.update_velocity(instance, global_best, config.w, config.c1, config.c2, rng);
    particle.update_position();
    particle.evaluate(instance)
}

/// Moves every particle against the same global best snapshot.
fn step_all(
    particles: &mut [Particle],
    streams: &mut [StdRng],
    instance: &Instance,
    global_best: &Assignment,
    config: &PsoConfig,
) -> Vec<f64> {
    #[cfg(feature = "parallel")]
    if config.parallel {
        return particles
            .par_iter_mut()
            .zip(streams.par_iter_mut())
            .map(|(p, rng)| step(p, instance, global_best, config, rng))
            .collect();
    }

    particles
        .iter_mut()
        .zip(streams.iter_mut())
        .map(|(p, rng)| step(p, instance, global_best, config, rng))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pso::{ServiceInstance, Task};
    use proptest::prelude::*;
    use rand::Rng;

    fn chain_instance() -> Instance {
        Instance::new(
            vec![
                Task::new(1, 3.0, 100.0),
                Task::new(2, 2.0, 150.0).with_dependencies(vec![1]),
                Task::new(3, 1.0, 200.0).with_dependencies(vec![1, 2]),
                Task::new(4, 4.0, 100.0).with_dependencies(vec![2]),
                Task::new(5, 2.0, 300.0).with_dependencies(vec![3, 4]),
            ],
            vec![
                ServiceInstance::new(1, 0.20, 0.05),
                ServiceInstance::new(2, 0.15, 0.03),
                ServiceInstance::new(3, 0.25, 0.02),
            ],
        )
        .unwrap()
    }

    /// Exhaustive minimum over all 3^5 assignments.
    fn brute_force_minimum(instance: &Instance) -> f64 {
        let n = instance.num_services();
        let mut best = f64::INFINITY;
        for code in 0..n.pow(instance.num_tasks() as u32) {
            let mut rest = code;
            let raw: Vec<usize> = (0..instance.num_tasks())
                .map(|_| {
                    let s = rest % n;
                    rest /= n;
                    s
                })
                .collect();
            let a = Assignment::new(instance, raw).unwrap();
            best = best.min(cost(instance, &a));
        }
        best
    }

    #[test]
    fn test_single_step_matches_manual_trace() {
        let instance = chain_instance();
        let config = PsoConfig::default().with_num_particles(1).with_max_iters(1);

        let mut rng = StdRng::seed_from_u64(2024);
        let result = PsoRunner::run_with_rng(&instance, &config, &mut rng).unwrap();

        // Replay the same draws by hand.
        let (nt, ns) = (5, 3);
        let mut replay = StdRng::seed_from_u64(2024);
        let start: Vec<usize> = (0..nt).map(|_| replay.random_range(0..ns)).collect();
        let mut scores: Vec<f64> = (0..nt * ns).map(|_| replay.random::<f64>()).collect();
        let ids = [1.0, 2.0, 3.0];

        let mut moved = Vec::with_capacity(nt);
        for t in 0..nt {
            let target = ids[start[t]];
            for s in 0..ns {
                let r1: f64 = replay.random();
                let r2: f64 = replay.random();
                let v = &mut scores[t * ns + s];
                *v = 0.5 * *v + r1 * (target - ids[s]) + r2 * (target - ids[s]);
            }
            let row = &scores[t * ns..(t + 1) * ns];
            let mut arg = 0;
            for s in 1..ns {
                if row[s] > row[arg] {
                    arg = s;
                }
            }
            moved.push(arg);
        }

        let start = Assignment::new(&instance, start).unwrap();
        let moved = Assignment::new(&instance, moved).unwrap();
        let (start_cost, moved_cost) = (cost(&instance, &start), cost(&instance, &moved));
        let (expected, expected_cost) = if moved_cost < start_cost {
            (moved, moved_cost)
        } else {
            (start, start_cost)
        };

        assert_eq!(result.best, expected);
        assert_eq!(result.best_cost, expected_cost);
        assert_eq!(result.cost_history, vec![start_cost, expected_cost]);
    }

    #[test]
    fn test_single_service_instance() {
        let instance = Instance::new(
            vec![
                Task::new(1, 3.0, 100.0),
                Task::new(2, 2.0, 150.0).with_dependencies(vec![1]),
            ],
            vec![ServiceInstance::new(1, 0.20, 0.05)],
        )
        .unwrap();
        let result =
            PsoRunner::run(&instance, &PsoConfig::default().with_seed(1)).unwrap();

        assert!((result.best_cost - 1.0).abs() < 1e-9);
        assert_eq!(result.breakdown.transfer, 0.0);
        assert_eq!(result.improvements, 0);
        assert!(result
            .placements
            .iter()
            .all(|p| p.service_id == 1));
    }

    #[test]
    fn test_same_seed_same_result() {
        let instance = chain_instance();
        let config = PsoConfig::default().with_seed(42);
        let a = PsoRunner::run(&instance, &config).unwrap();
        let b = PsoRunner::run(&instance, &config).unwrap();
        assert_eq!(a.best, b.best);
        assert_eq!(a.cost_history, b.cost_history);
    }

    #[test]
    fn test_result_is_consistent() {
        let instance = chain_instance();
        let result = PsoRunner::run(&instance, &PsoConfig::default().with_seed(7)).unwrap();

        assert_eq!(result.iterations, 100);
        assert_eq!(result.cost_history.len(), 101);
        assert!((cost(&instance, &result.best) - result.best_cost).abs() < 1e-12);
        assert!((result.breakdown.total() - result.best_cost).abs() < 1e-9);
        assert_eq!(result.best.placements(&instance), result.placements);
        assert!(result.best_cost >= brute_force_minimum(&instance) - 1e-9);
        assert_eq!(result.cost_history.last().copied(), Some(result.best_cost));
    }

    #[test]
    fn test_synchronous_mode_runs() {
        let instance = chain_instance();
        let config = PsoConfig::default()
            .with_update_mode(UpdateMode::Synchronous)
            .with_seed(42);
        let result = PsoRunner::run(&instance, &config).unwrap();

        assert_eq!(result.cost_history.len(), 101);
        assert!(result.best_cost <= result.cost_history[0]);
        assert!(result.best_cost >= brute_force_minimum(&instance) - 1e-9);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential_synchronous() {
        let instance = chain_instance();
        let config = PsoConfig::default()
            .with_num_particles(16)
            .with_update_mode(UpdateMode::Synchronous)
            .with_seed(3);

        let sequential = PsoRunner::run(&instance, &config).unwrap();
        let parallel = PsoRunner::run(&instance, &config.clone().with_parallel(true)).unwrap();

        assert_eq!(sequential.best, parallel.best);
        assert_eq!(sequential.cost_history, parallel.cost_history);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let instance = chain_instance();
        let config = PsoConfig::default().with_num_particles(0);
        assert!(matches!(
            PsoRunner::run(&instance, &config),
            Err(PsoError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_display_report() {
        let instance = Instance::new(
            vec![Task::new(4, 1.0, 1.0)],
            vec![ServiceInstance::new(9, 2.0, 0.0)],
        )
        .unwrap();
        let result = PsoRunner::run(
            &instance,
            &PsoConfig::default().with_max_iters(1).with_seed(0),
        )
        .unwrap();
        assert_eq!(result.to_string(), "Task 4 -> Service 9\nBest Cost: 2");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_global_best_never_increases(seed in any::<u64>(), sync in any::<bool>()) {
            let instance = chain_instance();
            let mode = if sync { UpdateMode::Synchronous } else { UpdateMode::Asynchronous };
            let config = PsoConfig::default()
                .with_num_particles(5)
                .with_max_iters(20)
                .with_update_mode(mode)
                .with_seed(seed);
            let result = PsoRunner::run(&instance, &config).unwrap();

            for window in result.cost_history.windows(2) {
                prop_assert!(window[1] <= window[0]);
            }
            prop_assert_eq!(result.best.len(), instance.num_tasks());
            prop_assert!(result.best.as_slice().iter().all(|&s| s < instance.num_services()));
        }

        #[test]
        fn prop_particles_stay_total(seed in any::<u64>()) {
            let instance = chain_instance();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut particles: Vec<Particle> =
                (0..4).map(|_| Particle::new(&instance, &mut rng)).collect();
            let global = particles[0].position().clone();

            for _ in 0..10 {
                for p in particles.iter_mut() {
                    let c = step(p, &instance, &global, &PsoConfig::default(), &mut rng);
                    prop_assert_eq!(p.position().len(), instance.num_tasks());
                    prop_assert!(p.position().as_slice().iter().all(|&s| s < 3));
                    prop_assert!(p.best_cost() <= c);
                }
            }
        }
    }
}
