use serde::de::DeserializeOwned;

use crate::error::{KeyPathError, Result};

/// Deserialize with JSON-path context in error messages.
pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        KeyPathError::Metadata(format!("at JSON path {path} → {}", err.into_inner()))
    })
}
