use std::path::PathBuf;

/// Failure while moving a [`Config`](crate::Config) between memory and its
/// `config.ron` file. Every variant names the file involved.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid globe config", path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("cannot encode config for {}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: ron::Error,
    },
}
