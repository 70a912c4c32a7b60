//! Rolling training statistics for console progress
//!
//! Tracks how the learner is doing over the most recent lives: how often a
//! life ends in a meal rather than a death, the total reward of recent
//! episodes, and how many ticks each meal took.

use std::collections::VecDeque;

/// Training statistics tracker with rolling averages
///
/// # Example
///
/// ```rust
/// use escape_bunny::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(50);
/// stats.record_consumption(12);
/// stats.record_death(-63.0);
///
/// assert_eq!(stats.total_lives(), 2);
/// assert!((stats.success_rate() - 0.5).abs() < 1e-9);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// 1 for a meal, 0 for a death (rolling window)
    outcomes: VecDeque<u8>,

    /// Total reward of death-terminated episodes (rolling window)
    episode_rewards: VecDeque<f64>,

    /// Ticks taken per meal (rolling window)
    steps_to_target: VecDeque<u64>,

    total_consumed: usize,

    total_deaths: usize,

    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a new tracker keeping the last `window_size` values of each series
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            outcomes: VecDeque::with_capacity(window_size),
            episode_rewards: VecDeque::with_capacity(window_size),
            steps_to_target: VecDeque::with_capacity(window_size),
            total_consumed: 0,
            total_deaths: 0,
            window_size,
        }
    }

    /// Record a life segment that ended with the target eaten
    pub fn record_consumption(&mut self, steps: u64) {
        Self::push_deque(&mut self.outcomes, 1, self.window_size);
        Self::push_deque(&mut self.steps_to_target, steps, self.window_size);
        self.total_consumed += 1;
    }

    /// Record an episode that ended with the learner caught
    pub fn record_death(&mut self, episode_reward: f64) {
        Self::push_deque(&mut self.outcomes, 0, self.window_size);
        Self::push_deque(&mut self.episode_rewards, episode_reward, self.window_size);
        self.total_deaths += 1;
    }

    /// Fraction of recent lives that ended in a meal
    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            0.0
        } else {
            let sum: u32 = self.outcomes.iter().map(|o| u32::from(*o)).sum();
            sum as f64 / self.outcomes.len() as f64
        }
    }

    /// Mean total reward of recent episodes, or 0.0 if none ended yet
    pub fn mean_episode_reward(&self) -> f64 {
        if self.episode_rewards.is_empty() {
            0.0
        } else {
            self.episode_rewards.iter().sum::<f64>() / self.episode_rewards.len() as f64
        }
    }

    /// Mean ticks per meal over the rolling window
    pub fn mean_steps_to_target(&self) -> f64 {
        if self.steps_to_target.is_empty() {
            0.0
        } else {
            self.steps_to_target.iter().sum::<u64>() as f64 / self.steps_to_target.len() as f64
        }
    }

    pub fn total_consumed(&self) -> usize {
        self.total_consumed
    }

    pub fn total_deaths(&self) -> usize {
        self.total_deaths
    }

    pub fn total_lives(&self) -> usize {
        self.total_consumed + self.total_deaths
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// One-line summary of the current statistics
    ///
    /// ```text
    /// Lives: 2 | Meals: 1 | Deaths: 1 | Success: 0.50 | Reward: -63.00 | Steps/Meal: 12.0
    /// ```
    pub fn format_summary(&self) -> String {
        format!(
            "Lives: {} | Meals: {} | Deaths: {} | Success: {:.2} | Reward: {:.2} | Steps/Meal: {:.1}",
            self.total_lives(),
            self.total_consumed,
            self.total_deaths,
            self.success_rate(),
            self.mean_episode_reward(),
            self.mean_steps_to_target(),
        )
    }

    /// Helper function to push to a deque with size limit
    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}

impl Default for TrainingStats {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let stats = TrainingStats::new(100);
        assert_eq!(stats.window_size(), 100);
        assert_eq!(stats.total_lives(), 0);
        assert_eq!(TrainingStats::new(0).window_size(), 1);
    }

    #[test]
    fn test_empty_stats() {
        let stats = TrainingStats::default();
        assert_eq!(stats.success_rate(), 0.0);
        assert_eq!(stats.mean_episode_reward(), 0.0);
        assert_eq!(stats.mean_steps_to_target(), 0.0);
    }

    #[test]
    fn test_rolling_success_rate() {
        let mut stats = TrainingStats::new(3);
        stats.record_death(-100.0);
        stats.record_death(-100.0);
        stats.record_consumption(4);
        assert!((stats.success_rate() - 1.0 / 3.0).abs() < 1e-9);

        // evicts the first death
        stats.record_consumption(6);
        assert!((stats.success_rate() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.total_lives(), 4);
        assert!((stats.mean_steps_to_target() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_rolling_episode_reward() {
        let mut stats = TrainingStats::new(2);
        stats.record_death(-10.0);
        stats.record_death(-20.0);
        stats.record_death(-40.0);
        assert!((stats.mean_episode_reward() + 30.0).abs() < 1e-9);
        assert_eq!(stats.total_deaths(), 3);
    }

    #[test]
    fn test_format_summary() {
        let mut stats = TrainingStats::new(50);
        stats.record_consumption(12);
        stats.record_death(-63.0);

        let summary = stats.format_summary();
        assert!(summary.contains("Lives: 2"));
        assert!(summary.contains("Meals: 1"));
        assert!(summary.contains("Deaths: 1"));
        assert!(summary.contains("Success: 0.50"));
        assert!(summary.contains("Reward: -63.00"));
        assert!(summary.contains("Steps/Meal: 12.0"));
    }
}
