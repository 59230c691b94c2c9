use thiserror::Error;

/// Result of any playback input
pub type Result<T> = ::core::result::Result<T, Error>;

/// Fatal problems found while loading script blobs.
///
/// Line numbers are 1-based and count every line of the blob, blank and comment lines included.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Error)]
pub enum LoadError {
    /// Line has no `|` separator or its key is empty
    #[error("line {line} is not a `key | body` entry: `{text}`")]
    Malformed { line: usize, text: String },
    /// Key was already defined by this or an earlier blob
    #[error("line {line} redefines key `{key}`")]
    DuplicateKey { key: String, line: usize },
}

/// Tag run that never reaches its closing `>`
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Error)]
#[error("unterminated markup tag starting at byte {offset}")]
pub struct MalformedMarkup {
    /// Byte index of the opening `<`
    pub offset: usize,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),
    /// Branch or entry target that no loaded entry defines
    #[error("unknown conversation key `{0}`")]
    UnknownKey(String),
    /// Variable key traversed while no resolver is registered
    #[error("no resolver registered for variable key `{0}`")]
    UnresolvedVariableKey(String),
    /// Option slot that isn't currently showing an option
    #[error("option slot {0} is not selectable")]
    InvalidChoice(usize),
    #[error(transparent)]
    Markup(#[from] MalformedMarkup),
}
