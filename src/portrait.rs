use std::collections::HashMap;

const CHARACTER_SEPARATOR: char = '_';

/// How a portrait slot changes between two segments.
///
/// Only names the change; moving and fading the images is up to whoever displays them.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
pub enum Transition {
    /// Slot keeps what it shows
    #[default]
    Stay,
    /// Empty slot receives a portrait
    Enter,
    /// Shown portrait leaves, slot becomes empty
    Exit,
    /// Another character replaces the shown one
    SwitchCharacter,
    /// Same character, different expression
    ChangeExpression,
}

/// Character part of a portrait name, i.e. `hero` of `hero_angry`
#[must_use]
pub fn character(name: &str) -> &str {
    name.split(CHARACTER_SEPARATOR).next().unwrap_or(name)
}

/// Picks the transition that takes a slot from `current` to `requested`
#[must_use]
pub fn resolve(requested: Option<&str>, current: Option<&str>) -> Transition {
    match (requested, current) {
        (None, None) => Transition::Stay,
        (Some(_), None) => Transition::Enter,
        (None, Some(_)) => Transition::Exit,
        (Some(requested), Some(current)) if requested == current => Transition::Stay,
        (Some(requested), Some(current)) if character(requested) != character(current) => {
            Transition::SwitchCharacter
        }
        (Some(_), Some(_)) => Transition::ChangeExpression,
    }
}

/// Decided change of one portrait slot
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Cue<H> {
    pub slot: usize,
    pub transition: Transition,
    /// Name now shown in the slot, `None` if it's empty
    pub name: Option<String>,
    /// Handle of the portrait being replaced
    pub from: Option<H>,
    /// Handle of the portrait being shown
    pub to: Option<H>,
}

/// Portrait name → image handle
#[derive(Clone, Debug)]
pub struct Portraits<H> {
    handles: HashMap<String, H>,
}

impl<H> Default for Portraits<H> {
    fn default() -> Self {
        Self {
            handles: HashMap::new(),
        }
    }
}

impl<H> Portraits<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a portrait, replacing an earlier one with the same name
    pub fn insert(&mut self, name: impl Into<String>, handle: H) {
        let name = name.into();
        if self.handles.contains_key(&name) {
            log::warn!("portrait `{name}` registered twice, keeping the latest");
        }
        self.handles.insert(name, handle);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&H> {
        self.handles.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl<H: Clone> Portraits<H> {
    /// Decides how `slot` goes from showing `current` to showing `requested`.
    ///
    /// A requested name missing from the catalog counts as no portrait at all.
    #[must_use]
    pub fn cue(&self, slot: usize, requested: Option<&str>, current: Option<&str>) -> Cue<H> {
        let requested = requested.filter(|name| {
            let known = self.handles.contains_key(*name);
            if !known {
                log::warn!("unknown portrait `{name}`, treating slot {slot} as empty");
            }
            known
        });
        Cue {
            slot,
            transition: resolve(requested, current),
            name: requested.map(str::to_owned),
            from: current.and_then(|name| self.get(name)).cloned(),
            to: requested.and_then(|name| self.get(name)).cloned(),
        }
    }
}

impl<H, S: Into<String>> FromIterator<(S, H)> for Portraits<H> {
    fn from_iter<I: IntoIterator<Item = (S, H)>>(iter: I) -> Self {
        let mut portraits = Self::new();
        portraits.extend(iter);
        portraits
    }
}

impl<H, S: Into<String>> Extend<(S, H)> for Portraits<H> {
    fn extend<I: IntoIterator<Item = (S, H)>>(&mut self, iter: I) {
        for (name, handle) in iter {
            self.insert(name, handle);
        }
    }
}
