//! # Syntax
//!
//! A script is plain text. Every non-blank line is an entry `key | body`, unless it starts
//! with `#`, which makes it a comment. Keys are unique across all loaded scripts.
//!
//! ```text
//! # the innkeeper
//! greet | Innkeeper\Welcome! [keeper_happy]`Staying the night?(room)Yes please|(bye)No
//! room  | A room it is.(bye)
//! bye   | Safe travels.
//! ```
//!
//! A body is split by these characters, in this order:
//!
//! | Char | Splits                                                         |
//! | ---- | -------------------------------------------------------------- |
//! | `(`  | main text from options, each `(` starts one option             |
//! | `` ` `` | main text into segments, shown one per input              |
//! | `[`  | segment text from its portrait cue `[name, name, ..]`          |
//! | `\`  | segment title from segment text                                |
//! | `)`  | option target key from option label                            |
//!
//! ### Branching
//!
//! After its last segment a conversation shows its labeled options. A single option without a
//! label is followed right away, an option with an empty key exits, and a conversation without
//! options exits too. Keys starting with `#` are variable: the [`Player`] asks its resolver for
//! the key to continue from.
//!
//! ### Portraits
//!
//! Cue names fill portrait slots from the left; an empty name clears its slot. Portrait names
//! are `character_expression`, so `hero_sad` after `hero_angry` is an expression change rather
//! than a new character entering.
//!
//! ### Markup
//!
//! Text may carry `<tag>` markup. The [`Typewriter`] never reveals half a tag.

mod compile;
mod config;
mod error;
mod lines;
mod player;
mod portrait;
mod script;

pub mod graph;
pub mod typewriter;

pub use petgraph;

pub use compile::{compile, Branch, Conversation, Segment};
pub use config::PlayerConfig;
pub use error::{Error, LoadError, MalformedMarkup, Result};
pub use graph::{read, Guide, Story};
pub use player::{is_variable, Cursor, Directive, Player, State, Surface};
pub use portrait::{character, resolve, Cue, Portraits, Transition};
pub use script::Script;
pub use typewriter::Typewriter;
