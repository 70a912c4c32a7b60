use rand::Rng;

use super::{AgentId, AgentKind, Event, TickContext};
use crate::metrics::Outcome;
use crate::rl::{QLearner, State, observe};
use crate::world::{Direction, WorldError};

/// The prey: a Q-learning agent looking for the target while avoiding pursuers
///
/// Each turn it perceives, checks whether it was caught or found food, learns
/// from the previous transition, then picks and takes a move. The catch check
/// runs again after the move, so both "pursuer stepped onto me" and "I stepped
/// onto the pursuer" end the episode on the same tick.
#[derive(Debug, Clone)]
pub struct Learner {
    brain: QLearner,
    last: Option<(State, Direction)>,
    skip_turn: bool,
    meals: usize,
    deaths: usize,
}

impl Learner {
    pub fn new(brain: QLearner) -> Self {
        Self {
            brain,
            last: None,
            skip_turn: false,
            meals: 0,
            deaths: 0,
        }
    }

    pub fn brain(&self) -> &QLearner {
        &self.brain
    }

    pub fn brain_mut(&mut self) -> &mut QLearner {
        &mut self.brain
    }

    /// Targets eaten so far
    pub fn meals(&self) -> usize {
        self.meals
    }

    /// Times caught so far
    pub fn deaths(&self) -> usize {
        self.deaths
    }

    /// (state, action) taken on the previous acting tick of this episode
    pub fn last_transition(&self) -> Option<(State, Direction)> {
        self.last
    }

    /// Whether the next turn is skipped (set right after a respawn)
    pub fn is_skipping(&self) -> bool {
        self.skip_turn
    }

    /// Play one turn
    pub fn update<R: Rng>(
        &mut self,
        me: AgentId,
        ctx: &mut TickContext<'_, R>,
    ) -> Result<(), WorldError> {
        if self.skip_turn {
            self.skip_turn = false;
            return Ok(());
        }

        let here = ctx.world.position_of(me).ok_or(WorldError::UnknownAgent(me))?;
        let state = observe(ctx.world, here);
        let mut reward = ctx.rewards.move_reward;

        if self.check_caught(me, &state, ctx)? {
            return Ok(());
        }

        if let Some(&target) = ctx.world.occupants_of_kind(here, AgentKind::Target).first() {
            self.meals += 1;
            reward += ctx.rewards.consume_reward;
            let spot = ctx.world.pick_random_location(ctx.rng)?;
            ctx.world.relocate(target, spot)?;

            ctx.metrics.update_step(reward);
            ctx.metrics.record_outcome(Outcome::Consumed);
            ctx.events.push(Event::Consumed {
                learner: me,
                target,
            });
        } else {
            ctx.metrics.update_step(reward);
        }

        if let Some((last_state, last_action)) = self.last {
            self.brain.learn(last_state, last_action, &state, reward);
        }

        let action = self.brain.choose_action(&state, ctx.rng);
        if ctx.world.is_in_bounds(here.moved_in_direction(action)) {
            ctx.world.step_agent(me, action)?;
        }
        self.last = Some((state, action));

        self.check_caught(me, &state, ctx)?;
        Ok(())
    }

    /// End the episode if a pursuer shares the learner's cell
    ///
    /// Applies the caught reward to the previous transition, respawns the
    /// learner and then the pursuer on free cells, and skips the next turn.
    fn check_caught<R: Rng>(
        &mut self,
        me: AgentId,
        state: &State,
        ctx: &mut TickContext<'_, R>,
    ) -> Result<bool, WorldError> {
        let here = ctx.world.position_of(me).ok_or(WorldError::UnknownAgent(me))?;
        let Some(&pursuer) = ctx.world.occupants_of_kind(here, AgentKind::Pursuer).first() else {
            return Ok(false);
        };

        self.deaths += 1;
        let reward = ctx.rewards.caught_reward;
        if let Some((last_state, last_action)) = self.last {
            self.brain.learn(last_state, last_action, state, reward);
        }
        ctx.metrics.update_step(reward);
        ctx.metrics.record_outcome(Outcome::Died);
        self.last = None;

        let spot = ctx.world.pick_random_location(ctx.rng)?;
        ctx.world.relocate(me, spot)?;
        let spot = ctx.world.pick_random_location(ctx.rng)?;
        ctx.world.relocate(pursuer, spot)?;

        self.skip_turn = true;
        ctx.events.push(Event::Caught {
            learner: me,
            pursuer,
        });
        Ok(true)
    }
}
