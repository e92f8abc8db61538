//! Default budgets and labels for conversation memory.

/// Title every conversation starts with. Title generation only runs while a
/// conversation still carries this title.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Word ceiling shown in the memory usage indicator.
pub const DISPLAY_WORD_CEILING: u64 = 262_144;

/// Word count above which the current conversation is compacted.
/// Must stay strictly below [`DISPLAY_WORD_CEILING`].
pub const COMPACTION_THRESHOLD: u64 = 200_000;

/// Number of most recent messages kept verbatim by compaction.
pub const RECENCY_WINDOW: usize = 10;

/// Seconds before a remote generation call is abandoned.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Words kept by the deterministic title fallback.
pub const FALLBACK_TITLE_WORDS: usize = 6;
/// Character cap of the deterministic title fallback.
pub const FALLBACK_TITLE_CHARS: usize = 50;
/// Character cap of a model generated title.
pub const MAX_TITLE_CHARS: usize = 60;
