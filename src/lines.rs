use ::core::iter::FusedIterator;

/// Non-blank lines of a blob together with their 1-based line numbers.
///
/// `\r\n`, `\r` and `\n` all end a line.
#[derive(Clone, Debug)]
pub(crate) struct Iter<'a> {
    rest: &'a str,
    number: usize,
}

impl<'a> Iter<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            rest: text,
            number: 0,
        }
    }

    fn next_any(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        self.number += 1;
        let Some(end) = self.rest.find(|ch: char| ch == '\r' || ch == '\n') else {
            return Some(::core::mem::take(&mut self.rest));
        };
        let line = &self.rest[..end];
        // `\r\n` is one terminator
        let skip = if self.rest[end..].starts_with("\r\n") {
            2
        } else {
            1
        };
        self.rest = &self.rest[end + skip..];
        Some(line)
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.next_any()?;
            if !line.trim().is_empty() {
                return Some((self.number, line));
            }
        }
    }
}

impl<'a> FusedIterator for Iter<'a> {}
