use crate::agents::Event;
use crate::world::GridWorld;

/// Win counters shown by front-ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scoreboard {
    /// Targets eaten by learners
    pub learner_wins: usize,
    /// Times a learner was caught
    pub pursuer_wins: usize,
}

/// What happened during one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Tick that was just played (before the counter advanced)
    pub tick: u64,
    pub events: Vec<Event>,
    pub scoreboard: Scoreboard,
}

impl TickReport {
    pub fn deaths(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Caught { .. }))
            .count()
    }

    pub fn meals(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Consumed { .. }))
            .count()
    }
}

/// External collaborator notified after every tick (display, recorder, ...)
pub trait StepObserver {
    fn on_tick(&mut self, world: &GridWorld, report: &TickReport);
}
