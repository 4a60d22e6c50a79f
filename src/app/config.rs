//! Application configuration
//!
//! Process-level options resolved from the command line.

/// Application configuration structure
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Log filter overriding the verbosity mapping
    pub log_filter: Option<String>,
}

impl AppConfig {
    /// Create a new application configuration
    pub fn new(verbose: u8) -> Self {
        Self {
            verbose,
            log_filter: None,
        }
    }

    pub fn with_log_filter(mut self, filter: Option<String>) -> Self {
        self.log_filter = filter;
        self
    }

    /// Get the log level string based on verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            2 => "trace",
            _ => "trace,hyper=debug,reqwest=debug",
        }
    }

    /// Filter handed to the subscriber: the explicit filter when set
    pub fn env_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or_else(|| self.log_level())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(0)
    }
}
