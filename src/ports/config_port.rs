//! Run-configuration access port.

use crate::domain::error::PapertraderError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Parse a numeric key. A present but unparseable value is an error
    /// rather than a silent default.
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, PapertraderError> {
        let Some(raw) = self.get_string(section, key) else {
            return Ok(None);
        };
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| PapertraderError::ConfigInvalid {
                section: section.into(),
                key: key.into(),
                reason: format!("expected a number, got {:?}", raw),
            })
    }

    fn require_string(&self, section: &str, key: &str) -> Result<String, PapertraderError> {
        self.get_string(section, key)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| PapertraderError::ConfigMissing {
                section: section.into(),
                key: key.into(),
            })
    }
}
