/// Session configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Number of completed rounds kept as snapshots behind the current round.
    pub round_history_limit: usize,

    /// Propagates each character's speed delay relative to the slowest
    /// character into the next round's base delay.
    pub speed_carries_over: bool,

    /// Lets characters sharing a speed value act before any of them are
    /// removed from the roster.
    pub simultaneous_turns: bool,

    /// Seed for the default session generator.
    pub rng_seed: u64,
}

impl CombatConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ROUND_HISTORY_LIMIT: usize = 10;
    pub const DEFAULT_RNG_SEED: u64 = 0;

    pub fn new() -> Self {
        Self {
            round_history_limit: Self::DEFAULT_ROUND_HISTORY_LIMIT,
            speed_carries_over: false,
            simultaneous_turns: false,
            rng_seed: Self::DEFAULT_RNG_SEED,
        }
    }

    pub fn with_round_history_limit(mut self, limit: usize) -> Self {
        self.round_history_limit = limit;
        self
    }

    pub fn with_speed_carryover(mut self, enabled: bool) -> Self {
        self.speed_carries_over = enabled;
        self
    }

    pub fn with_simultaneous_turns(mut self, enabled: bool) -> Self {
        self.simultaneous_turns = enabled;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = CombatConfig::new()
            .with_round_history_limit(3)
            .with_speed_carryover(true)
            .with_simultaneous_turns(true)
            .with_rng_seed(42);

        assert_eq!(config.round_history_limit, 3);
        assert!(config.speed_carries_over);
        assert!(config.simultaneous_turns);
        assert_eq!(config.rng_seed, 42);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: CombatConfig =
            serde_json::from_str(r#"{ "simultaneous_turns": true }"#).unwrap();

        assert!(config.simultaneous_turns);
        assert_eq!(
            config.round_history_limit,
            CombatConfig::DEFAULT_ROUND_HISTORY_LIMIT
        );
        assert!(!config.speed_carries_over);
    }
}
