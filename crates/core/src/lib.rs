#![forbid(unsafe_code)]

/// Index of one of the three statements presented in a round.
///
/// Constructed only through [`StatementIndex::try_new`], so a value outside
/// {0, 1, 2} cannot reach the storage layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StatementIndex(u8);

impl StatementIndex {
    pub const ALL: [StatementIndex; 3] = [
        StatementIndex(0),
        StatementIndex(1),
        StatementIndex(2),
    ];

    pub fn try_new(value: i64) -> Result<Self, StatementIndexError> {
        if (0..=2).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(StatementIndexError::OutOfRange { value })
        }
    }

    pub fn as_i64(self) -> i64 {
        i64::from(self.0)
    }

    pub fn as_usize(self) -> usize {
        usize::from(self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatementIndexError {
    OutOfRange { value: i64 },
}

impl StatementIndexError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::OutOfRange { .. } => "statement index must be 0, 1, or 2",
        }
    }
}

/// One round of play: a category, a question, and three candidate statements,
/// exactly one of which is the fabricated twist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Round {
    pub id: i64,
    pub category: String,
    pub question: String,
    pub trivia_1: String,
    pub trivia_2: String,
    pub trivia_3: String,
    pub created_at: String,
}

/// A player's single submission against a round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Guess {
    pub id: i64,
    pub round_id: i64,
    pub guess_index: StatementIndex,
    pub submitted_at: String,
}

/// The reveal for a round: which statement was fabricated, plus one
/// explanation per statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Twist {
    pub id: i64,
    pub round_id: i64,
    pub twist_index: StatementIndex,
    pub explanation_1: String,
    pub explanation_2: String,
    pub explanation_3: String,
    pub revealed_at: String,
}

/// Running score. A round counts for the player when the guess matched the
/// revealed twist, and for the game master when it did not. Rounds with only
/// a guess or only a twist count for neither side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Score {
    pub player: u64,
    pub game_master: u64,
}

/// How often each statement slot has held the twist, across all revealed
/// rounds. All three slots are always present, so a slot with zero reveals
/// still reports a count (and a 0% share).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TwistIndexStats {
    counts: [u64; 3],
}

impl TwistIndexStats {
    pub fn from_counts(counts: [u64; 3]) -> Self {
        Self { counts }
    }

    pub fn count(&self, index: StatementIndex) -> u64 {
        self.counts[index.as_usize()]
    }

    /// Share of `total_rounds` held by `index`, in percent. Defined as 0.0
    /// when there are no rounds yet.
    pub fn percentage(&self, index: StatementIndex, total_rounds: u64) -> f64 {
        if total_rounds == 0 {
            return 0.0;
        }
        self.count(index) as f64 * 100.0 / total_rounds as f64
    }
}
