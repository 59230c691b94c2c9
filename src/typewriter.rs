//! Step-by-step reveal of display text.
//!
//! Plain characters are revealed one at a time. A markup run is revealed at once: it starts at
//! `<`, every `/` inside it lowers a depth counter that starts at one, and it ends at the first
//! `>` read once the counter has hit zero. So `<b/>` and `<b>bold</b>` are single units, while
//! nesting inside a run isn't checked at all.

use crate::error::MalformedMarkup;
use ::core::iter::FusedIterator;

const TAG_OPEN: char = '<';
const TAG_CLOSE: char = '>';
const TAG_SLASH: char = '/';

/// Byte length of the atomic unit at the start of `rest`, which begins at `offset` of the full
/// text. `rest` must not be empty.
fn unit_len(rest: &str, offset: usize) -> Result<usize, MalformedMarkup> {
    let mut chars = rest.char_indices();
    let Some((_, first)) = chars.next() else {
        return Ok(0);
    };
    if first != TAG_OPEN {
        return Ok(first.len_utf8());
    }
    let mut depth = 1usize;
    let mut last = first;
    let mut end = first.len_utf8();
    while depth > 0 || last != TAG_CLOSE {
        let (index, ch) = chars.next().ok_or(MalformedMarkup { offset })?;
        if ch == TAG_SLASH {
            depth = depth.saturating_sub(1);
        }
        last = ch;
        end = index + ch.len_utf8();
    }
    Ok(end)
}

/// Atomic reveal units of a text, in order
#[derive(Clone, Debug)]
pub struct Units<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Units<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self { text, offset: 0 }
    }
}

impl<'a> Iterator for Units<'a> {
    type Item = Result<&'a str, MalformedMarkup>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.offset..];
        if rest.is_empty() {
            return None;
        }
        Some(match unit_len(rest, self.offset) {
            Ok(len) => {
                self.offset += len;
                Ok(&rest[..len])
            }
            Err(err) => {
                self.offset = self.text.len();
                Err(err)
            }
        })
    }
}

impl<'a> FusedIterator for Units<'a> {}

/// Checks that every markup run of `text` is terminated
///
/// # Errors
///
/// The first unterminated run
pub fn validate(text: &str) -> Result<(), MalformedMarkup> {
    Units::new(text).try_for_each(|unit| unit.map(drop))
}

/// Reveal task over one display text.
///
/// Each [`Typewriter::tick`] reveals one more unit; [`Typewriter::skip`] reveals the rest.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Typewriter {
    text: String,
    revealed: usize,
}

impl Typewriter {
    /// # Errors
    ///
    /// If `text` contains an unterminated markup run
    pub fn new(text: impl Into<String>) -> Result<Self, MalformedMarkup> {
        let text = text.into();
        validate(&text)?;
        Ok(Self { text, revealed: 0 })
    }

    /// Reveals the next unit and returns it, or `None` once everything is shown
    pub fn tick(&mut self) -> Option<&str> {
        let rest = &self.text[self.revealed..];
        if rest.is_empty() {
            return None;
        }
        // validated on construction
        let len = unit_len(rest, self.revealed).unwrap_or(rest.len());
        let start = self.revealed;
        self.revealed += len;
        Some(&self.text[start..self.revealed])
    }

    /// Reveals everything left at once and returns it, or `None` if nothing was left
    pub fn skip(&mut self) -> Option<&str> {
        if self.is_done() {
            return None;
        }
        let start = ::core::mem::replace(&mut self.revealed, self.text.len());
        Some(&self.text[start..])
    }

    /// Text revealed so far
    #[must_use]
    pub fn revealed(&self) -> &str {
        &self.text[..self.revealed]
    }

    /// Text being revealed
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.revealed == self.text.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{validate, Typewriter, Units};
    use crate::error::MalformedMarkup;
    use proptest::prelude::*;

    fn states(text: &str) -> Vec<String> {
        let mut typewriter = Typewriter::new(text).expect("valid markup");
        let mut states = Vec::new();
        while typewriter.tick().is_some() {
            states.push(typewriter.revealed().to_owned());
        }
        states
    }

    #[test]
    fn self_closing_tag() {
        assert_eq!(states("a<b/>c"), ["a", "a<b/>", "a<b/>c"]);
    }

    #[test]
    fn paired_tag_is_one_unit() {
        let units: Vec<_> = Units::new("x<b>hi</b>!").collect::<Result<_, _>>().unwrap();
        assert_eq!(units, ["x", "<b>hi</b>", "!"]);
    }

    #[test]
    fn nested_tags_split_at_first_slash() {
        let units: Vec<_> = Units::new("<a><b>x</b></a>").collect::<Result<_, _>>().unwrap();
        assert_eq!(units, ["<a><b>x</b>", "</a>"]);
    }

    #[test]
    fn multibyte_chars() {
        assert_eq!(states("héé"), ["h", "hé", "héé"]);
    }

    #[test]
    fn unterminated_tag() {
        const SAMPLE: &str = "ok <b>never closed";
        assert_eq!(validate(SAMPLE), Err(MalformedMarkup { offset: 3 }));
        assert!(Typewriter::new(SAMPLE).is_err());
        let mut units = Units::new(SAMPLE);
        assert_eq!(units.next(), Some(Ok("o")));
        assert_eq!(units.nth(1), Some(Ok(" ")));
        assert_eq!(units.next(), Some(Err(MalformedMarkup { offset: 3 })));
        assert_eq!(units.next(), None);
    }

    #[test]
    fn slash_without_close() {
        assert!(validate("<b/").is_err());
        assert!(validate("<>").is_err());
    }

    #[test]
    fn skip_mid_reveal() {
        let mut typewriter = Typewriter::new("ab<i>c</i>d").unwrap();
        assert_eq!(typewriter.tick(), Some("a"));
        assert_eq!(typewriter.skip(), Some("b<i>c</i>d"));
        assert!(typewriter.is_done());
        assert_eq!(typewriter.revealed(), "ab<i>c</i>d");
        assert_eq!(typewriter.tick(), None);
        assert_eq!(typewriter.skip(), None);
    }

    #[test]
    fn empty_text_is_done() {
        let mut typewriter = Typewriter::new("").unwrap();
        assert!(typewriter.is_done());
        assert_eq!(typewriter.tick(), None);
    }

    proptest! {
        #[test]
        fn plain_text_reveals_per_char(text in "[^<]{0,32}") {
            let states = states(&text);
            prop_assert_eq!(states.len(), text.chars().count());
            prop_assert_eq!(states.last().map(String::as_str).unwrap_or(""), text.as_str());
        }

        #[test]
        fn ticks_rebuild_text(text in "([a-z ]|<i>[a-z]{0,3}</i>|<br/>){0,12}") {
            let mut typewriter = Typewriter::new(text.clone()).unwrap();
            let mut rebuilt = String::new();
            while let Some(unit) = typewriter.tick() {
                rebuilt.push_str(unit);
            }
            prop_assert_eq!(rebuilt, text);
        }
    }
}
