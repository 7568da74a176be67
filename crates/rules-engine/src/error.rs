use rules_engine_config::ConfigError;
use rules_engine_source::SourceError;
use thiserror::Error;

/// Failures turning a config into running sources.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to open source: {0}")]
    Source(#[from] SourceError),
}
