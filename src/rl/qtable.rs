//! Tabular Q-learning
//!
//! `Q(s, a) += alpha * (reward + gamma * max_a' Q(s', a') - Q(s, a))`
//!
//! The table is sparse: unseen pairs read as 0.0, and the first update of a
//! pair stores the observed reward directly instead of blending it in.

use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;

use super::config::QLearningConfig;
use super::observation::State;
use crate::world::Direction;

/// State-action utility table with epsilon-greedy action selection
#[derive(Debug, Clone)]
pub struct QLearner {
    q: HashMap<(State, Direction), f64>,
    actions: Vec<Direction>,
    config: QLearningConfig,
}

impl QLearner {
    /// Empty table over the four cardinal moves
    pub fn new(config: QLearningConfig) -> Self {
        Self::with_actions(config, Direction::CARDINAL.to_vec())
    }

    pub fn with_actions(config: QLearningConfig, actions: Vec<Direction>) -> Self {
        Self {
            q: HashMap::new(),
            actions,
            config,
        }
    }

    pub fn actions(&self) -> &[Direction] {
        &self.actions
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn epsilon(&self) -> f64 {
        self.config.epsilon
    }

    /// Override exploration, e.g. 0.0 to evaluate a trained policy greedily
    ///
    /// Values are clamped to [0, 1]; NaN leaves the current rate unchanged.
    pub fn set_epsilon(&mut self, epsilon: f64) {
        if epsilon.is_nan() {
            return;
        }
        self.config.epsilon = epsilon.clamp(0.0, 1.0);
    }

    /// Number of stored (state, action) pairs
    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    /// Stored utility, or 0.0 for a pair never updated
    pub fn get_utility(&self, state: &State, action: Direction) -> f64 {
        self.q.get(&(*state, action)).copied().unwrap_or(0.0)
    }

    pub fn set_utility(&mut self, state: State, action: Direction, utility: f64) {
        self.q.insert((state, action), utility);
    }

    /// Iterate over every stored entry
    pub fn entries(&self) -> impl Iterator<Item = (&State, Direction, f64)> {
        self.q.iter().map(|((s, a), u)| (s, *a, *u))
    }

    /// Highest utility available from `state`
    pub fn max_utility(&self, state: &State) -> f64 {
        self.actions
            .iter()
            .map(|a| self.get_utility(state, *a))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Epsilon-greedy choice
    ///
    /// Greedy ties are broken uniformly among every maximal action.
    pub fn choose_action<R: Rng + ?Sized>(&self, state: &State, rng: &mut R) -> Direction {
        if rng.gen_bool(self.config.epsilon) {
            return *self
                .actions
                .choose(rng)
                .unwrap_or(&Direction::CARDINAL[0]);
        }

        let utilities: Vec<f64> = self
            .actions
            .iter()
            .map(|a| self.get_utility(state, *a))
            .collect();
        let best = utilities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let best_actions: Vec<Direction> = self
            .actions
            .iter()
            .zip(&utilities)
            .filter(|(_, u)| **u == best)
            .map(|(a, _)| *a)
            .collect();

        *best_actions
            .choose(rng)
            .unwrap_or(&Direction::CARDINAL[0])
    }

    /// Bellman update for the transition `state --action--> next_state`
    pub fn learn(&mut self, state: State, action: Direction, next_state: &State, reward: f64) {
        let updated = match self.q.get(&(state, action)) {
            None => reward,
            Some(&old) => {
                let next_max = self.max_utility(next_state);
                old + self.config.alpha * (reward + self.config.gamma * next_max - old)
            }
        };
        self.q.insert((state, action), updated);
    }
}
