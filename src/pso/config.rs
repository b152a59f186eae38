//! RD-PSO configuration.

use super::error::PsoError;

/// When the shared global best is written during an iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UpdateMode {
    /// Particles run one at a time in order; an improvement is visible to
    /// every particle processed after it in the same iteration.
    #[default]
    Asynchronous,

    /// All particles of an iteration see the global best from the start of
    /// that iteration; it is updated once they have all moved.
    ///
    /// Each particle draws from its own generator, so this mode may run
    /// particles in parallel (see [`PsoConfig::parallel`]) without changing
    /// the result. Trajectories differ from [`UpdateMode::Asynchronous`].
    Synchronous,
}

/// Configuration for the RD-PSO search.
///
/// # Examples
///
/// ```
/// use u_rdpso::pso::{PsoConfig, UpdateMode};
///
/// let config = PsoConfig::default()
///     .with_num_particles(30)
///     .with_max_iters(250)
///     .with_inertia(0.7)
///     .with_update_mode(UpdateMode::Synchronous)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PsoConfig {
    /// Number of particles in the swarm.
    pub num_particles: usize,

    /// Number of iterations. The run always performs all of them.
    pub max_iters: usize,

    /// Inertia weight `w`: how much of the previous score survives.
    pub w: f64,

    /// Cognitive coefficient `c1`: pull toward the particle's own best.
    pub c1: f64,

    /// Social coefficient `c2`: pull toward the global best.
    pub c2: f64,

    /// Global best update discipline.
    pub update_mode: UpdateMode,

    /// Run synchronous iterations on the rayon pool.
    ///
    /// Only honored with the `parallel` feature and
    /// [`UpdateMode::Synchronous`].
    pub parallel: bool,

    /// Random seed for reproducibility. `None` picks one at random.
    pub seed: Option<u64>,
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            num_particles: 10,
            max_iters: 100,
            w: 0.5,
            c1: 1.0,
            c2: 1.0,
            update_mode: UpdateMode::Asynchronous,
            parallel: false,
            seed: None,
        }
    }
}

impl PsoConfig {
    pub fn with_num_particles(mut self, n: usize) -> Self {
        self.num_particles = n;
        self
    }

    pub fn with_max_iters(mut self, n: usize) -> Self {
        self.max_iters = n;
        self
    }

    pub fn with_inertia(mut self, w: f64) -> Self {
        self.w = w;
        self
    }

    pub fn with_cognitive(mut self, c1: f64) -> Self {
        self.c1 = c1;
        self
    }

    pub fn with_social(mut self, c2: f64) -> Self {
        self.c2 = c2;
        self
    }

    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), PsoError> {
        if self.num_particles == 0 {
            return Err(PsoError::InvalidConfig(
                "num_particles must be at least 1".into(),
            ));
        }
        if self.max_iters == 0 {
            return Err(PsoError::InvalidConfig("max_iters must be at least 1".into()));
        }
        for (name, value) in [("w", self.w), ("c1", self.c1), ("c2", self.c2)] {
            if !value.is_finite() {
                return Err(PsoError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}
