#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A dialect classifier reported a zero-length match, which would stall
    /// the scan cursor. This is a classifier bug, not malformed SQL; the
    /// built-in SQLite rules never produce it.
    #[error("classifier reported a zero-length match at offset {offset}")]
    InvalidAdvance { offset: usize },

    /// A pattern string tokenized to no statements, so there is nothing to
    /// match against.
    #[error("pattern {0:?} contains no statement")]
    EmptyPattern(String),
}

pub type Result<T = ()> = std::result::Result<T, Error>;
