use crate::{
    compile::{compile, Branch, Segment},
    config::PlayerConfig,
    error::{Error, Result},
    portrait::{Cue, Portraits, Transition},
    script::Script,
    typewriter::{self, Typewriter},
};
use bitflags::bitflags;
use std::collections::VecDeque;

const VARIABLE_PREFIX: char = '#';

/// Whether `key` has to be resolved before it can be looked up
#[must_use]
pub fn is_variable(key: &str) -> bool {
    key.starts_with(VARIABLE_PREFIX)
}

bitflags! {
    /// Parts of the dialogue box currently shown
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Surface: u8 {
        const CONTENT = 0b01;
        const OPTIONS = 0b10;
    }
}

/// Instruction for whatever displays the conversation
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Directive<H> {
    /// Conversation starts, play an opening animation if there is one
    Open,
    /// Conversation ended
    Close,
    SetTitle(String),
    /// Replace the body text
    SetBodyText(String),
    /// Append a revealed unit to the body text
    AppendBodyText(String),
    /// Move a portrait slot to its new portrait
    SetPortraitSlot(Cue<H>),
    SetContentVisible(bool),
    SetOptionsVisible(bool),
    /// Show `label` in option slot `slot`
    SetOption { slot: usize, label: String },
    HideOptionSlot(usize),
}

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Default)]
pub enum State {
    #[default]
    Idle,
    ShowingSegment,
    ShowingOptions,
}

/// Position inside the active conversation
#[derive(Clone, Debug)]
pub struct Cursor {
    key: String,
    segments: VecDeque<Segment>,
    options: Vec<Branch>,
    shown: Vec<Branch>,
    reveal: Option<Typewriter>,
    state: State,
}

impl Cursor {
    /// Key of the conversation being shown, after variable resolution
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Segments not shown yet
    pub fn remaining(&self) -> impl ExactSizeIterator<Item = &Segment> {
        self.segments.iter()
    }

    #[must_use]
    pub fn options(&self) -> &[Branch] {
        &self.options
    }

    /// Branches currently in option slots, by slot
    #[must_use]
    pub fn shown(&self) -> &[Branch] {
        &self.shown
    }

    #[must_use]
    pub fn is_revealing(&self) -> bool {
        self.reveal.is_some()
    }
}

type Observer<'a> = Box<dyn FnMut(&str) + 'a>;
type Resolver<'a> = Box<dyn FnMut(&str) -> String + 'a>;

/// Walks a [`Script`] one input at a time.
///
/// Every input returns the [`Directive`]s the display has to carry out, in order. When an input
/// fails, its directives are dropped.
pub struct Player<'a, H> {
    script: &'a Script,
    portraits: &'a Portraits<H>,
    config: PlayerConfig,
    observers: Vec<Observer<'a>>,
    resolver: Option<Resolver<'a>>,
    cursor: Option<Cursor>,
    slots: Vec<Option<String>>,
    surface: Surface,
    title: String,
}

impl<'a, H: Clone> Player<'a, H> {
    #[must_use]
    pub fn new(script: &'a Script, portraits: &'a Portraits<H>, config: PlayerConfig) -> Self {
        Self {
            script,
            portraits,
            slots: vec![None; config.portrait_slots],
            config,
            observers: Vec::new(),
            resolver: None,
            cursor: None,
            surface: Surface::empty(),
            title: String::new(),
        }
    }

    /// Calls `observer` with every key traversed, before it is resolved or looked up
    pub fn on_key_reached(&mut self, observer: impl FnMut(&str) + 'a) {
        self.observers.push(Box::new(observer));
    }

    /// Sets the function that maps `#`-prefixed keys to script keys, replacing the previous one
    pub fn set_resolver(&mut self, resolver: impl FnMut(&str) -> String + 'a) {
        self.resolver = Some(Box::new(resolver));
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: impl FnMut(&str) -> String + 'a) -> Self {
        self.set_resolver(resolver);
        self
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.cursor.as_ref().map_or(State::Idle, |cursor| cursor.state)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.cursor.is_some()
    }

    #[must_use]
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    #[must_use]
    pub fn surface(&self) -> Surface {
        self.surface
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Portrait name shown in each slot
    #[must_use]
    pub fn slots(&self) -> &[Option<String>] {
        &self.slots
    }

    #[must_use]
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Starts a conversation at `key` and shows its first segment.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownKey`] if `key` isn't in the script, see also [`Player::goto`]
    pub fn enter(&mut self, key: &str) -> Result<Vec<Directive<H>>> {
        if !key.is_empty() && !is_variable(key) && !self.script.contains(key) {
            return Err(Error::UnknownKey(key.to_owned()));
        }
        log::debug!("entering conversation at `{key}`");
        let mut out = vec![Directive::Open];
        self.goto_into(key, &mut out)?;
        Ok(out)
    }

    /// Finishes the running reveal, or shows the next segment, or moves on to the options.
    ///
    /// Does nothing while idle.
    ///
    /// # Errors
    ///
    /// [`Error::Markup`] if the next segment can't be revealed, leaving it in place. Errors of
    /// [`Player::goto`] when an option is followed on its own.
    pub fn advance(&mut self) -> Result<Vec<Directive<H>>> {
        let mut out = Vec::new();
        self.advance_into(&mut out)?;
        Ok(out)
    }

    /// Follows the option shown in `slot`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidChoice`] unless options are shown and `slot` holds one, errors of
    /// [`Player::goto`] otherwise
    pub fn choose(&mut self, slot: usize) -> Result<Vec<Directive<H>>> {
        let target = self
            .cursor
            .as_ref()
            .filter(|cursor| cursor.state == State::ShowingOptions)
            .and_then(|cursor| cursor.shown.get(slot))
            .map(|branch| branch.target.clone())
            .ok_or(Error::InvalidChoice(slot))?;
        log::debug!("option {slot} chosen, going to `{target}`");
        let mut out = Vec::new();
        self.goto_into(&target, &mut out)?;
        Ok(out)
    }

    /// Jumps to `key`: empty exits, `#`-prefixed goes through the resolver first.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownKey`] if `key`, or the key it resolves to, isn't in the script, and
    /// [`Error::Markup`] if the first segment can't be revealed. Both leave the conversation as
    /// it was. [`Error::UnresolvedVariableKey`] if no resolver is set, which closes it.
    pub fn goto(&mut self, key: &str) -> Result<Vec<Directive<H>>> {
        let mut out = Vec::new();
        self.goto_into(key, &mut out)?;
        Ok(out)
    }

    /// Ends the conversation. Calling it again emits the same directives and changes nothing.
    pub fn exit(&mut self) -> Vec<Directive<H>> {
        let mut out = Vec::new();
        self.exit_into(&mut out);
        out
    }

    /// Reveals one more unit of the running reveal
    pub fn tick(&mut self) -> Vec<Directive<H>> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Vec::new();
        };
        let Some(typewriter) = cursor.reveal.as_mut() else {
            return Vec::new();
        };
        let out = typewriter
            .tick()
            .map(|unit| Directive::AppendBodyText(unit.to_owned()))
            .into_iter()
            .collect();
        if typewriter.is_done() {
            cursor.reveal = None;
        }
        out
    }

    fn goto_into(&mut self, key: &str, out: &mut Vec<Directive<H>>) -> Result<()> {
        for observer in &mut self.observers {
            observer(key);
        }
        if key.is_empty() {
            self.exit_into(out);
            return Ok(());
        }
        let key = if is_variable(key) {
            let Some(resolver) = self.resolver.as_mut() else {
                self.exit_into(out);
                return Err(Error::UnresolvedVariableKey(key.to_owned()));
            };
            let resolved = resolver(key);
            log::debug!("variable key `{key}` resolved to `{resolved}`");
            if resolved.is_empty() {
                self.exit_into(out);
                return Ok(());
            }
            resolved
        } else {
            key.to_owned()
        };
        let body = self
            .script
            .get(&key)
            .ok_or_else(|| Error::UnknownKey(key.clone()))?;
        let conversation = compile(body);
        if self.config.typewriter {
            if let Some(first) = conversation.segments.first() {
                typewriter::validate(&first.text)?;
            }
        }
        log::debug!(
            "going to `{key}`: {} segments, {} options",
            conversation.segments.len(),
            conversation.options.len()
        );
        self.cursor = Some(Cursor {
            key,
            segments: conversation.segments.into(),
            options: conversation.options,
            shown: Vec::new(),
            reveal: None,
            state: State::ShowingSegment,
        });
        self.show(Surface::CONTENT, out);
        self.set_title(String::new(), out);
        self.advance_into(out)
    }

    fn advance_into(&mut self, out: &mut Vec<Directive<H>>) -> Result<()> {
        let Some(cursor) = self.cursor.as_mut() else {
            log::trace!("advance while idle");
            return Ok(());
        };
        if let Some(mut typewriter) = cursor.reveal.take() {
            typewriter.skip();
            out.push(Directive::SetBodyText(typewriter.text().to_owned()));
            return Ok(());
        }
        let Some(segment) = cursor.segments.pop_front() else {
            return self.show_options(out);
        };
        let reveal = match self
            .config
            .typewriter
            .then(|| Typewriter::new(segment.text.as_str()))
            .transpose()
        {
            Ok(reveal) => reveal,
            Err(err) => {
                cursor.segments.push_front(segment);
                return Err(err.into());
            }
        };
        cursor.state = State::ShowingSegment;
        cursor.reveal = reveal.filter(|typewriter| !typewriter.is_done());
        let body = if self.config.typewriter {
            String::new()
        } else {
            segment.text
        };
        if let Some(title) = segment.title {
            self.set_title(title, out);
        }
        if let Some(cue) = &segment.cue {
            self.apply_cue(cue, out);
        }
        out.push(Directive::SetBodyText(body));
        Ok(())
    }

    fn show_options(&mut self, out: &mut Vec<Directive<H>>) -> Result<()> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(());
        };
        if cursor.options.is_empty() {
            log::debug!("`{}` has no options, exiting", cursor.key);
            self.exit_into(out);
            return Ok(());
        }
        if let [branch] = cursor.options.as_slice() {
            if branch.is_auto() {
                let target = branch.target.clone();
                log::debug!("following `{}` on to `{target}`", cursor.key);
                return self.goto_into(&target, out);
            }
        }
        let mut shown: Vec<_> = cursor
            .options
            .iter()
            .filter(|branch| !branch.is_auto())
            .cloned()
            .collect();
        if shown.is_empty() {
            log::warn!("`{}` has only unlabeled options, none can be chosen", cursor.key);
        }
        if shown.len() > self.config.option_slots {
            log::warn!(
                "`{}` has {} options but only {} slots, dropping the rest",
                cursor.key,
                shown.len(),
                self.config.option_slots
            );
            shown.truncate(self.config.option_slots);
        }
        let slots: Vec<_> = (0..self.config.option_slots)
            .map(|slot| match shown.get(slot) {
                Some(branch) => Directive::SetOption {
                    slot,
                    label: branch.label.clone(),
                },
                None => Directive::HideOptionSlot(slot),
            })
            .collect();
        cursor.shown = shown;
        cursor.state = State::ShowingOptions;
        self.show(Surface::OPTIONS, out);
        self.set_title(self.config.main_character_name.clone(), out);
        out.extend(slots);
        Ok(())
    }

    fn apply_cue(&mut self, cue: &[Option<String>], out: &mut Vec<Directive<H>>) {
        if cue.len() > self.slots.len() {
            log::debug!(
                "{} portraits cued for {} slots, ignoring the rest",
                cue.len(),
                self.slots.len()
            );
        }
        for (slot, requested) in cue.iter().take(self.slots.len()).enumerate() {
            let change = self
                .portraits
                .cue(slot, requested.as_deref(), self.slots[slot].as_deref());
            if change.transition == Transition::Stay {
                continue;
            }
            self.slots[slot] = change.name.clone();
            out.push(Directive::SetPortraitSlot(change));
        }
    }

    fn exit_into(&mut self, out: &mut Vec<Directive<H>>) {
        if self.cursor.take().is_some() {
            log::debug!("conversation closed");
        }
        self.surface.remove(Surface::OPTIONS);
        out.push(Directive::SetOptionsVisible(false));
        out.push(Directive::Close);
    }

    fn show(&mut self, surface: Surface, out: &mut Vec<Directive<H>>) {
        self.surface = surface;
        out.push(Directive::SetContentVisible(surface.contains(Surface::CONTENT)));
        out.push(Directive::SetOptionsVisible(surface.contains(Surface::OPTIONS)));
    }

    fn set_title(&mut self, title: String, out: &mut Vec<Directive<H>>) {
        self.title.clone_from(&title);
        out.push(Directive::SetTitle(title));
    }
}
