//! Notification registry for combat events.
//!
//! Listeners subscribe to one [`EventKind`] or to every event and are invoked
//! synchronously, in registration order, each time the engine emits. With no
//! listeners registered, emitting is a no-op.

use std::fmt;

use tracing::trace;

use crate::state::{CharacterId, MoveId, Point};
use crate::stats::DamageType;

/// Which motion opportunity of a turn produced a movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum MotionStage {
    PreMove,
    PostMove,
}

/// Everything the engine announces while resolving a session.
#[derive(Clone, Debug, PartialEq, strum::EnumDiscriminants)]
#[strum_discriminants(name(EventKind))]
#[strum_discriminants(derive(Hash, strum::Display, strum::EnumIter))]
#[strum_discriminants(strum(serialize_all = "snake_case"))]
pub enum CombatEvent {
    RoundStarted {
        round: u32,
    },
    RoundEnded {
        round: u32,
    },
    TurnStarted {
        round: u32,
        actor: CharacterId,
    },
    TurnEnded {
        round: u32,
        actor: CharacterId,
    },
    MoveSelected {
        actor: CharacterId,
        move_id: MoveId,
    },
    TargetSelected {
        actor: CharacterId,
        move_id: MoveId,
        target: CharacterId,
    },
    /// Targets lost when re-targeting after pre-move motion.
    TargetsDropped {
        actor: CharacterId,
        move_id: MoveId,
        dropped: Vec<CharacterId>,
    },
    MotionSelected {
        actor: CharacterId,
        stage: MotionStage,
        destination: Point,
    },
    Moved {
        actor: CharacterId,
        stage: MotionStage,
        from: Point,
        to: Point,
    },
    BeforeMove {
        actor: CharacterId,
        moves: Vec<MoveId>,
    },
    AfterMove {
        actor: CharacterId,
        moves: Vec<MoveId>,
    },
    CharacterAdded {
        id: CharacterId,
    },
    CharacterRemoved {
        id: CharacterId,
    },
    Crit {
        attacker: CharacterId,
        slot: usize,
        kind: DamageType,
        amount: f64,
    },
    Dodged {
        attacker: CharacterId,
        target: CharacterId,
    },
    /// `target` is `None` when the attacker's own hit roll failed.
    Missed {
        attacker: CharacterId,
        target: Option<CharacterId>,
    },
    BeforeDealDamage {
        attacker: CharacterId,
        target: CharacterId,
        amounts: Vec<f64>,
    },
    BeforeReceiveDamage {
        attacker: CharacterId,
        target: CharacterId,
        amounts: Vec<f64>,
    },
    AfterDealDamage {
        attacker: CharacterId,
        target: CharacterId,
        total: i64,
    },
    Knockback {
        attacker: CharacterId,
        target: CharacterId,
        amount: i64,
    },
    RecoilSent {
        attacker: CharacterId,
        target: CharacterId,
        magnitude: f64,
    },
    RecoilReceived {
        attacker: CharacterId,
        target: CharacterId,
        from: Point,
        to: Point,
    },
}

impl CombatEvent {
    pub fn kind(&self) -> EventKind {
        EventKind::from(self)
    }
}

/// Handle returned by subscription, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&CombatEvent) + Send>;

struct Registration {
    id: ListenerId,
    kind: Option<EventKind>,
    listener: Listener,
}

/// Registry of event listeners.
#[derive(Default)]
pub struct EventBus {
    registrations: Vec<Registration>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for events of `kind`.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&CombatEvent) + Send + 'static,
    ) -> ListenerId {
        self.register(Some(kind), Box::new(listener))
    }

    /// Registers `listener` for every event.
    pub fn subscribe_all(
        &mut self,
        listener: impl FnMut(&CombatEvent) + Send + 'static,
    ) -> ListenerId {
        self.register(None, Box::new(listener))
    }

    /// Removes a listener. Returns `true` if it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|registration| registration.id != id);
        before != self.registrations.len()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Delivers `event` to every matching listener in registration order.
    pub fn emit(&mut self, event: CombatEvent) {
        if self.registrations.is_empty() {
            return;
        }
        let kind = event.kind();
        trace!(target: "combat::events", %kind, "emit");
        for registration in &mut self.registrations {
            if registration.kind.is_none_or(|wanted| wanted == kind) {
                (registration.listener)(&event);
            }
        }
    }

    fn register(&mut self, kind: Option<EventKind>, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.registrations.push(Registration { id, kind, listener });
        id
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.registrations.len())
            .finish()
    }
}
