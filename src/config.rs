/// How a [`Player`](crate::Player) presents conversations.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct PlayerConfig {
    /// Title shown while options are up
    pub main_character_name: String,
    /// Reveal segments unit by unit instead of all at once
    pub typewriter: bool,
    /// Number of on-screen portrait slots
    pub portrait_slots: usize,
    /// Number of selectable option slots (at least 1)
    pub option_slots: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            main_character_name: String::new(),
            typewriter: false,
            portrait_slots: 2,
            option_slots: 4,
        }
    }
}

impl PlayerConfig {
    #[must_use]
    pub fn with_main_character_name(mut self, name: impl Into<String>) -> Self {
        self.main_character_name = name.into();
        self
    }

    #[must_use]
    pub fn with_typewriter(mut self, typewriter: bool) -> Self {
        self.typewriter = typewriter;
        self
    }

    #[must_use]
    pub fn with_portrait_slots(mut self, slots: usize) -> Self {
        self.portrait_slots = slots;
        self
    }

    /// Clamped to at least 1
    #[must_use]
    pub fn with_option_slots(mut self, slots: usize) -> Self {
        self.option_slots = slots.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::PlayerConfig;

    #[test]
    fn defaults() {
        let config = PlayerConfig::default();
        assert!(config.main_character_name.is_empty());
        assert!(!config.typewriter);
        assert_eq!(config.portrait_slots, 2);
        assert_eq!(config.option_slots, 4);
    }

    #[test]
    fn builder() {
        let config = PlayerConfig::default()
            .with_main_character_name("Ada")
            .with_typewriter(true)
            .with_portrait_slots(3)
            .with_option_slots(0);
        assert_eq!(config.main_character_name, "Ada");
        assert!(config.typewriter);
        assert_eq!(config.portrait_slots, 3);
        assert_eq!(config.option_slots, 1);
    }
}
