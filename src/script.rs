use crate::{error::LoadError, lines};
use std::collections::{hash_map, HashMap};

const COMMENT_CHAR: char = '#';
const KEY_SEPARATOR: char = '|';

/// Every `key | body` entry of a script set.
///
/// Filled once by [`Script::load`]; a later load is a no-op.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Script {
    entries: HashMap<String, String>,
    loaded: bool,
}

impl Script {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads all blobs into one key → body mapping.
    ///
    /// Stops at the first malformed or duplicate line. Entries read before that line stay in
    /// the mapping, the colliding key keeps its first body, and the script stays unloaded.
    ///
    /// # Errors
    ///
    /// [`LoadError::Malformed`] for a non-comment line without `|` or with an empty key,
    /// [`LoadError::DuplicateKey`] for a key seen before.
    pub fn load<'b, I: IntoIterator<Item = &'b str>>(&mut self, blobs: I) -> Result<(), LoadError> {
        if self.loaded {
            log::debug!("script already loaded, skipping");
            return Ok(());
        }
        for blob in blobs {
            self.load_blob(blob)?;
        }
        self.loaded = true;
        log::debug!("loaded {} conversation entries", self.entries.len());
        Ok(())
    }

    fn load_blob(&mut self, blob: &str) -> Result<(), LoadError> {
        for (line, text) in lines::Iter::new(blob) {
            if text.starts_with(COMMENT_CHAR) {
                log::trace!("line {line}: comment");
                continue;
            }
            let malformed = || LoadError::Malformed {
                line,
                text: text.to_owned(),
            };
            let (key, body) = text.split_once(KEY_SEPARATOR).ok_or_else(malformed)?;
            let key = key.trim();
            if key.is_empty() {
                return Err(malformed());
            }
            match self.entries.entry(key.to_owned()) {
                hash_map::Entry::Occupied(_) => {
                    return Err(LoadError::DuplicateKey {
                        key: key.to_owned(),
                        line,
                    })
                }
                hash_map::Entry::Vacant(entry) => {
                    entry.insert(body.trim().to_owned());
                }
            }
        }
        Ok(())
    }

    /// Raw body of `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, body)| (key.as_str(), body.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a [`Script::load`] call has completed successfully
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

#[cfg(test)]
mod tests {
    use super::Script;
    use crate::error::LoadError;
    use proptest::prelude::*;

    const SAMPLE: &str = "# greeting line\r\ngreet | Hello!`How are you?(fine)Fine|(bye)Bye\r\n\r\nfine|Glad to hear.\nbye |  Farewell.  ";

    #[test]
    fn entries() {
        let mut script = Script::new();
        script.load([SAMPLE]).expect("load");
        assert!(script.is_loaded());
        assert_eq!(script.len(), 3);
        assert_eq!(
            script.get("greet"),
            Some("Hello!`How are you?(fine)Fine|(bye)Bye")
        );
        assert_eq!(script.get("fine"), Some("Glad to hear."));
        assert_eq!(script.get("bye"), Some("Farewell."));
        assert!(!script.contains("# greeting line"));
    }

    #[test]
    fn several_blobs() {
        let mut script = Script::new();
        script.load(["a | one", "b | two\nc | three"]).expect("load");
        let mut keys: Vec<_> = script.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[test]
    fn second_load_is_noop() {
        let mut script = Script::new();
        script.load([SAMPLE]).expect("first load");
        let first = script.clone();
        script.load(["other | never read"]).expect("second load");
        assert_eq!(script, first);
        assert!(!script.contains("other"));
    }

    #[test]
    fn duplicate_key() {
        const SAMPLE: &str = "a | first\nb | second\na | third\nc | fourth";
        let mut script = Script::new();
        let err = script.load([SAMPLE]).unwrap_err();
        assert_eq!(
            err,
            LoadError::DuplicateKey {
                key: "a".to_owned(),
                line: 3
            }
        );
        assert!(!script.is_loaded());
        assert_eq!(script.get("a"), Some("first"));
        assert_eq!(script.get("b"), Some("second"));
        assert!(!script.contains("c"));
    }

    #[test]
    fn duplicate_across_blobs() {
        let mut script = Script::new();
        let err = script.load(["a | first", "\na | again"]).unwrap_err();
        assert!(
            matches!(err, LoadError::DuplicateKey { ref key, line: 2 } if key == "a"),
            "{err:?}"
        );
        assert_eq!(script.get("a"), Some("first"));
    }

    #[test]
    fn missing_separator() {
        let mut script = Script::new();
        let err = script.load(["a | fine\njust text"]).unwrap_err();
        assert_eq!(
            err,
            LoadError::Malformed {
                line: 2,
                text: "just text".to_owned()
            }
        );
    }

    #[test]
    fn empty_key() {
        let mut script = Script::new();
        let err = script.load(["  | body"]).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { line: 1, .. }), "{err:?}");
    }

    #[test]
    fn only_first_char_marks_comment() {
        let mut script = Script::new();
        script.load(["#skipped | never\n  #mood | indented key"]).expect("load");
        assert_eq!(script.len(), 1);
        assert!(!script.contains("#skipped"));
        assert_eq!(script.get("#mood"), Some("indented key"));
    }

    #[test]
    fn body_keeps_later_separators() {
        let mut script = Script::new();
        script.load(["k | a | b"]).expect("load");
        assert_eq!(script.get("k"), Some("a | b"));
    }

    proptest! {
        #[test]
        fn load_twice_is_idempotent(
            entries in proptest::collection::hash_map("[a-z]{1,8}", "[A-Za-z ,.!?]{0,24}", 0..16)
        ) {
            let blob: String = entries
                .iter()
                .map(|(key, body)| format!("{key} | {body}\n"))
                .collect();
            let mut script = Script::new();
            script.load([blob.as_str()]).expect("first load");
            let first = script.clone();
            script.load([blob.as_str()]).expect("second load");
            prop_assert_eq!(&script, &first);
            prop_assert_eq!(script.len(), entries.len());
            for (key, body) in &entries {
                prop_assert_eq!(script.get(key), Some(body.trim()));
            }
        }
    }
}
