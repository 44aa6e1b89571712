use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::LoadError;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, (String, String)> {
    let de = &mut serde_json::Deserializer::from_str(src);
    match serde_path_to_error::deserialize::<_, T>(de) {
        Ok(v) => Ok(v),
        Err(err) => {
            let path = err.path().to_string();
            Err((path, err.into_inner().to_string()))
        }
    }
}

/// Read and deserialize a JSON file, keeping the failing JSON path on error.
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let source = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    from_str_with_path(&source).map_err(|(json_path, message)| LoadError::Parse {
        path: path.to_path_buf(),
        json_path,
        message,
    })
}
