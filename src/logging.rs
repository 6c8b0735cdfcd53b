use tracing::Level;

/// Subscriber settings, supplied by whoever hosts the simulator. The library
/// never installs a subscriber by itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: Level,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json: false,
        }
    }
}

impl LoggingConfig {
    pub fn new(level: Level, json: bool) -> Self {
        Self { level, json }
    }

    /// Installs the global subscriber. Returns `false` if one was already set.
    pub fn init(&self) -> bool {
        let builder = tracing_subscriber::fmt()
            .with_max_level(self.level)
            .with_writer(std::io::stderr);

        let res = if self.json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };

        res.is_ok()
    }
}
