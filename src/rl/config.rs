//! Q-learning hyperparameter configuration

use serde::{Deserialize, Serialize};

/// Configuration for the tabular Q-learning policy
///
/// # Example
///
/// ```rust
/// use escape_bunny::rl::QLearningConfig;
///
/// // Deploy a trained policy without exploration
/// let config = QLearningConfig {
///     epsilon: 0.0,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Learning rate (alpha)
    ///
    /// Weight of the new estimate when blending it into a stored utility.
    ///
    /// Default: 0.1
    pub alpha: f64,

    /// Discount factor for future rewards (gamma)
    ///
    /// Default: 0.9
    pub gamma: f64,

    /// Exploration rate (epsilon)
    ///
    /// Probability of picking a uniformly random action instead of the greedy one.
    ///
    /// Default: 0.1
    pub epsilon: f64,
}

impl QLearningConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration parameters
    ///
    /// # Returns
    ///
    /// `Ok(())` if all parameters are valid, `Err(String)` with an error message otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(format!("alpha must be in (0, 1], got {}", self.alpha));
        }

        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }

        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(format!("epsilon must be in [0, 1], got {}", self.epsilon));
        }

        Ok(())
    }
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            epsilon: 0.1,
        }
    }
}
