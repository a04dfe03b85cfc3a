use std::collections::BTreeSet;

use super::character::Character;
use super::types::{CharacterId, Point, TeamId};
use crate::error::{CombatError, ErrorContext, ErrorSeverity};

/// Arena of characters keyed by [`CharacterId`], in insertion order.
///
/// Insertion order is the tie-break for equal turn-order keys, so it is
/// preserved across removals.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    characters: Vec<Character>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, character: Character) -> Result<CharacterId, RosterError> {
        let id = character.id;
        if self.contains(id) {
            return Err(RosterError::duplicate(id));
        }
        self.characters.push(character);
        Ok(id)
    }

    pub fn remove(&mut self, id: CharacterId) -> Option<Character> {
        let index = self.index_of(id)?;
        Some(self.characters.remove(index))
    }

    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    pub fn contains(&self, id: CharacterId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: CharacterId) -> Option<usize> {
        self.characters.iter().position(|c| c.id == id)
    }

    pub fn ids(&self) -> Vec<CharacterId> {
        self.characters.iter().map(|c| c.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Character> {
        self.characters.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn location(&self, id: CharacterId) -> Option<Point> {
        self.get(id).map(Character::location)
    }

    /// Distinct teams with at least one character present.
    pub fn teams(&self) -> BTreeSet<TeamId> {
        self.characters.iter().map(|c| c.team).collect()
    }

    /// Characters on a different team than `id`.
    pub fn enemies_of(&self, id: CharacterId) -> impl Iterator<Item = &Character> {
        let team = self.get(id).map(|c| c.team);
        self.characters
            .iter()
            .filter(move |c| c.id != id && Some(c.team) != team)
    }

    /// Deep copy of every character with hook-free stat cells.
    pub fn snapshot(&self) -> Roster {
        Roster {
            characters: self.characters.iter().map(Character::snapshot).collect(),
        }
    }

    /// Deep-copies `source` into a new arena slot under `new_id`.
    pub fn duplicate(
        &mut self,
        source: CharacterId,
        new_id: CharacterId,
    ) -> Result<CharacterId, RosterError> {
        let copy = self
            .get(source)
            .ok_or_else(|| RosterError::unknown(source))?
            .duplicate(new_id);
        self.insert(copy)
    }
}

/// Errors raised by arena operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("character {id} is already in the roster")]
    DuplicateCharacter { id: CharacterId, context: ErrorContext },

    #[error("character {id} is not in the roster")]
    UnknownCharacter { id: CharacterId, context: ErrorContext },
}

impl RosterError {
    pub fn duplicate(id: CharacterId) -> Self {
        Self::DuplicateCharacter {
            id,
            context: ErrorContext::default()
                .with_actor(id)
                .with_message("character id already present"),
        }
    }

    pub fn unknown(id: CharacterId) -> Self {
        Self::UnknownCharacter {
            id,
            context: ErrorContext::default()
                .with_actor(id)
                .with_message("character id not present"),
        }
    }
}

impl CombatError for RosterError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::DuplicateCharacter { context, .. } | Self::UnknownCharacter { context, .. } => {
                Some(context)
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateCharacter { .. } => "ROSTER_DUPLICATE_CHARACTER",
            Self::UnknownCharacter { .. } => "ROSTER_UNKNOWN_CHARACTER",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_rejects_duplicate_ids() {
        let mut roster = Roster::new();
        roster
            .insert(Character::new(CharacterId(1), TeamId(0)))
            .unwrap();

        let err = roster
            .insert(Character::new(CharacterId(1), TeamId(1)))
            .unwrap_err();
        assert_eq!(err.error_code(), "ROSTER_DUPLICATE_CHARACTER");
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn duplicate_creates_independent_storage() {
        let mut roster = Roster::new();
        roster
            .insert(Character::new(CharacterId(1), TeamId(0)).with_health(10))
            .unwrap();
        roster.duplicate(CharacterId(1), CharacterId(2)).unwrap();

        roster.get_mut(CharacterId(2)).unwrap().health.set(3);

        assert_eq!(*roster.get(CharacterId(1)).unwrap().health.raw(), 10);
        assert_eq!(*roster.get(CharacterId(2)).unwrap().health.raw(), 3);
    }

    #[test]
    fn enemies_exclude_allies_and_self() {
        let mut roster = Roster::new();
        for (id, team) in [(1, 0), (2, 0), (3, 1)] {
            roster
                .insert(Character::new(CharacterId(id), TeamId(team)))
                .unwrap();
        }

        let enemies: Vec<_> = roster.enemies_of(CharacterId(1)).map(|c| c.id).collect();
        assert_eq!(enemies, vec![CharacterId(3)]);
        assert_eq!(roster.teams().len(), 2);
    }
}
