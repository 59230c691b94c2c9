const OPTION_OPEN: char = '(';
const OPTION_CLOSE: char = ')';
const OPTION_SEPARATOR: char = '|';
const SEGMENT_SEPARATOR: char = '`';
const CUE_OPEN: char = '[';
const CUE_CLOSE: char = ']';
const CUE_SEPARATOR: char = ',';
const TITLE_SEPARATOR: char = '\\';

/// One independently revealed chunk of main text
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Segment {
    /// Replaces the displayed title when present
    pub title: Option<String>,
    /// Portrait names by slot, starting at slot 0. `None` entries clear their slot.
    /// Slots past the end of the list are left as they are.
    pub cue: Option<Vec<Option<String>>>,
    /// Display text, markup included
    pub text: String,
}

/// Branch out of a conversation
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Branch {
    /// Key to continue from. Empty exits, `#`-prefixed goes through the resolver.
    pub target: String,
    /// Text shown to the user. Empty for branches followed without asking.
    pub label: String,
}

impl Branch {
    /// Whether this branch is never shown and gets followed on its own
    #[must_use]
    pub fn is_auto(&self) -> bool {
        self.label.is_empty()
    }
}

/// Segments and branches of one entry body
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Conversation {
    pub segments: Vec<Segment>,
    pub options: Vec<Branch>,
}

fn option(block: &str) -> Branch {
    let (target, label) = block.split_once(OPTION_CLOSE).unwrap_or((block, ""));
    Branch {
        target: target.trim().to_owned(),
        label: label
            .trim()
            .trim_end_matches(OPTION_SEPARATOR)
            .trim_end()
            .to_owned(),
    }
}

fn cue(names: &str) -> Vec<Option<String>> {
    names
        .split(CUE_SEPARATOR)
        .map(|name| Some(name.trim()).filter(|name| !name.is_empty()).map(str::to_owned))
        .collect()
}

fn segment(raw: &str) -> Segment {
    let mut text = raw.trim().to_owned();
    let mut portraits = None;
    if let Some((before, rest)) = text.split_once(CUE_OPEN) {
        let (names, after) = rest.split_once(CUE_CLOSE).unwrap_or((rest, ""));
        portraits = Some(cue(names));
        text = format!("{}{}", before.trim_end(), after).trim().to_owned();
    }
    let (title, text) = match text.split_once(TITLE_SEPARATOR) {
        Some((title, text)) => (Some(title.trim().to_owned()), text.trim().to_owned()),
        None => (None, text),
    };
    Segment {
        title,
        cue: portraits,
        text,
    }
}

/// Splits an entry body into its segments and branches.
///
/// Every body has at least one segment, possibly empty.
#[must_use]
pub fn compile(body: &str) -> Conversation {
    let mut blocks = body.split(OPTION_OPEN);
    let main = blocks.next().unwrap_or_default().trim();
    Conversation {
        segments: main.split(SEGMENT_SEPARATOR).map(segment).collect(),
        options: blocks.map(option).collect(),
    }
}
