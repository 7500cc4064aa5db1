//! A running game: the world plus the rules engine that changes it.
//!
//! The session is the only place that both resolves intents and applies
//! their effects, and it is what turns due timers into combat rounds and
//! recovery ticks.

use crate::commands;
use crate::rules::{apply_effects, Intent, Resolution, RulesEngine, RulesError};
use crate::scheduler::TimerKind;
use crate::world::{ActorId, World};
use tracing::{debug, warn};

pub struct GameSession {
    pub world: World,
    pub engine: RulesEngine,
}

impl GameSession {
    pub fn new(world: World, engine: RulesEngine) -> Self {
        Self { world, engine }
    }

    /// Resolve an intent and, if it is accepted, apply its effects.
    pub fn execute(&mut self, intent: Intent) -> Result<Resolution, RulesError> {
        let resolution = self.engine.resolve(&self.world, intent)?;
        apply_effects(&mut self.world, &resolution.effects);
        Ok(resolution)
    }

    /// Run one line of player input for `actor`. Failures come back as a
    /// message to the actor rather than an error.
    pub fn handle_line(&mut self, actor: ActorId, line: &str) -> Resolution {
        commands::run(self, actor, line)
    }

    /// Current time in abstract units.
    pub fn now(&self) -> u64 {
        self.world.timers.now()
    }

    /// When the next timer fires, if any.
    pub fn next_due(&mut self) -> Option<u64> {
        self.world.timers.next_due()
    }

    /// Move time forward by `elapsed` units, firing every timer that comes due
    /// along the way at its own due time. Timers scheduled while this runs
    /// fire too if they fall inside the window.
    pub fn advance(&mut self, elapsed: u64) -> Vec<Resolution> {
        let target = self.now().saturating_add(elapsed);
        let mut resolutions = Vec::new();

        while let Some(due) = self.world.timers.next_due().filter(|due| *due <= target) {
            let now = self.now();
            self.world.timers.advance(due.saturating_sub(now));
            while let Some(timer) = self.world.timers.pop_due() {
                let intent = match timer.kind {
                    TimerKind::Combat => Intent::CombatRound { actor_id: timer.actor },
                    TimerKind::Recovery => Intent::RecoveryTick { actor_id: timer.actor },
                };
                debug!(actor = %timer.actor, kind = ?timer.kind, due = timer.due, "timer fired");
                match self.execute(intent) {
                    Ok(resolution) => resolutions.push(resolution),
                    Err(error) => {
                        warn!(actor = %timer.actor, kind = ?timer.kind, %error, "timer resolution dropped")
                    }
                }
            }
        }

        let now = self.now();
        self.world.timers.advance(target.saturating_sub(now));
        resolutions
    }
}
