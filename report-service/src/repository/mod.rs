use std::{marker::PhantomData, path::Path, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::ProcessError;
use crate::validate::Validator;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>";

/// Generic load/save of one XML document type, with an optional validator
/// run after deserialization and before serialization.
///
/// Holds no mutable state, so one instance can serve any number of calls;
/// cross-file exclusion is the monitor's concern, not the repository's.
pub struct XmlRepository<T> {
    validator: Option<Arc<dyn Validator<T>>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> XmlRepository<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            validator: None,
            _marker: PhantomData,
        }
    }

    pub fn with_validator(validator: Arc<dyn Validator<T>>) -> Self {
        Self {
            validator: Some(validator),
            _marker: PhantomData,
        }
    }

    /// Reads and deserializes the document at `path`, then runs the
    /// validator if one was supplied. Validation failure aborts the load.
    pub async fn load(&self, path: &Path) -> Result<T, ProcessError> {
        let type_name = short_type_name::<T>();
        tracing::debug!(%type_name, path = %path.display(), "loading document");

        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ProcessError::io(path, e))?;

        let data: T =
            quick_xml::de::from_str(&contents).map_err(|e| ProcessError::Deserialization {
                type_name,
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if let Some(validator) = &self.validator {
            validator.validate(&data).await?;
        }

        tracing::info!(%type_name, path = %path.display(), "loaded document");
        Ok(data)
    }

    /// Validates (fail-fast, nothing is written for invalid data), then
    /// serializes `data` to `path`, creating the parent directory if missing
    /// and overwriting any existing file.
    pub async fn save(&self, data: &T, path: &Path) -> Result<(), ProcessError> {
        let type_name = short_type_name::<T>();
        tracing::debug!(%type_name, path = %path.display(), "saving document");

        if let Some(validator) = &self.validator {
            validator.validate(data).await?;
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ProcessError::io(parent, e))?;
            }
        }

        let mut body = String::new();
        let mut ser = quick_xml::se::Serializer::new(&mut body);
        ser.indent(' ', 2);
        data.serialize(ser)
            .map_err(|e| ProcessError::Serialization {
                type_name,
                reason: e.to_string(),
            })?;

        let document = format!("{XML_DECLARATION}\n{body}\n");
        tokio::fs::write(path, document)
            .await
            .map_err(|e| ProcessError::io(path, e))?;

        tracing::info!(%type_name, path = %path.display(), "saved document");
        Ok(())
    }
}

impl<T> Default for XmlRepository<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
