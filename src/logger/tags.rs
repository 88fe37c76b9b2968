/// Log tags identify which part of the fetcher produced a message.
///
/// Each tag maps to a `--debug-<key>` flag that unlocks its debug output.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Api,
    Ranks,
    Pairs,
    Candles,
    Snapshot,
}

impl LogTag {
    /// Key used in `--debug-<key>` / `--verbose-<key>` flags
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system",
            LogTag::Config => "config",
            LogTag::Api => "api",
            LogTag::Ranks => "ranks",
            LogTag::Pairs => "pairs",
            LogTag::Candles => "candles",
            LogTag::Snapshot => "snapshot",
        }
        .to_string()
    }

    /// Uncolored label used in the log file
    pub fn to_plain_string(&self) -> String {
        self.to_debug_key().to_uppercase()
    }

    pub fn all() -> Vec<LogTag> {
        vec![
            LogTag::System,
            LogTag::Config,
            LogTag::Api,
            LogTag::Ranks,
            LogTag::Pairs,
            LogTag::Candles,
            LogTag::Snapshot,
        ]
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
