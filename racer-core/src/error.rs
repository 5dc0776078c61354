use std::fmt;

/// Structural problems found while loading a track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackError {
    Parse { message: String },
    RowCountMismatch { expected: usize, actual: usize },
    ColumnCountMismatch { row: usize, expected: usize, actual: usize },
    BadCell { row: usize, column: usize, cell: String },
    StartCount { found: usize },
    FinishCount { found: usize },
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { message } => write!(f, "malformed track file: {message}"),
            Self::RowCountMismatch { expected, actual } => {
                write!(f, "tile rows must match height: expected {expected}, got {actual}")
            }
            Self::ColumnCountMismatch {
                row,
                expected,
                actual,
            } => write!(
                f,
                "tile columns must match width: row {row} has {actual}, expected {expected}"
            ),
            Self::BadCell { row, column, cell } => write!(
                f,
                "tile cell at row {row}, column {column} must be one character, got {cell:?}"
            ),
            Self::StartCount { found } => {
                write!(f, "track needs exactly one start tile, found {found}")
            }
            Self::FinishCount { found } => {
                write!(f, "track needs exactly one finish tile, found {found}")
            }
        }
    }
}

impl std::error::Error for TrackError {}

/// Editor draft rejections. `Display` is the status line shown to the author.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DraftError {
    MissingStart,
    MissingStartOrFinish,
    Invalid(TrackError),
}

impl fmt::Display for DraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingStart => write!(f, "Place a start tile before rotating"),
            Self::MissingStartOrFinish => write!(f, "Add a start and a finish tile before saving"),
            Self::Invalid(err) => write!(f, "Invalid map layout: {err}"),
        }
    }
}

impl std::error::Error for DraftError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplayError {
    Parse { message: String },
    Encode { message: String },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { message } => write!(f, "malformed replay: {message}"),
            Self::Encode { message } => write!(f, "failed to encode replay: {message}"),
        }
    }
}

impl std::error::Error for ReplayError {}

#[derive(Clone, Debug, PartialEq)]
pub enum VerifyError {
    EmptyReplay,
    MissingMeta,
    MetaMismatch { field: &'static str },
    TooManyTicks { ticks: usize, max_ticks: u32 },
    NeverFinished { ticks: u32 },
    FinishedEarly { finish_tick: u32, ticks: u32 },
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyReplay => write!(f, "replay has no inputs"),
            Self::MissingMeta => write!(f, "replay has no physics metadata (legacy format)"),
            Self::MetaMismatch { field } => {
                write!(f, "replay metadata does not match current constants: {field}")
            }
            Self::TooManyTicks { ticks, max_ticks } => {
                write!(f, "replay too long: {ticks} ticks (allowed 1..={max_ticks})")
            }
            Self::NeverFinished { ticks } => {
                write!(f, "replay never completed the track in {ticks} ticks")
            }
            Self::FinishedEarly { finish_tick, ticks } => write!(
                f,
                "replay completed the track at tick {finish_tick} but carries {ticks} ticks"
            ),
        }
    }
}

impl std::error::Error for VerifyError {}

/// Failure reported by a ledger or artifact store implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for StoreError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StoreError {}
