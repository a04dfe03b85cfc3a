use crate::events::{CombatEvent, EventBus};
use crate::rng::RngOracle;
use crate::state::{Character, CharacterId, Roster};

/// Everything a move action may touch while it runs.
///
/// Pipeline functions take the context instead of individual borrows so that
/// custom actions can compose them freely.
pub struct ActionContext<'a> {
    pub attacker: CharacterId,
    pub roster: &'a mut Roster,
    pub rng: &'a mut dyn RngOracle,
    pub events: &'a mut EventBus,
}

impl<'a> ActionContext<'a> {
    pub fn new(
        attacker: CharacterId,
        roster: &'a mut Roster,
        rng: &'a mut dyn RngOracle,
        events: &'a mut EventBus,
    ) -> Self {
        Self {
            attacker,
            roster,
            rng,
            events,
        }
    }

    pub fn attacker(&self) -> Option<&Character> {
        self.roster.get(self.attacker)
    }

    pub fn emit(&mut self, event: CombatEvent) {
        self.events.emit(event);
    }
}
