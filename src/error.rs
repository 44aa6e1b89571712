use std::path::PathBuf;

/// Failure to load a JSON input (metamodel document or generator config).
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {} at JSON path {json_path} → {message}", path.display())]
    Parse {
        path: PathBuf,
        json_path: String,
        message: String,
    },
}
