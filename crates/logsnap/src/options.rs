use crate::error::{Error, Result};

/// Environment variable consulted by [`Options::from_env`].
pub const MAX_FIELDS_ENV: &str = "LOGSNAP_MAX_FIELDS";

/// Field ceiling used when nothing else is configured.
pub const DEFAULT_MAX_FIELDS: usize = 50;

#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum number of leaf fields a snapshot may carry before it is
    /// collapsed into the `{"invalid": true, "message": ...}` fallback.
    pub max_fields: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_fields: DEFAULT_MAX_FIELDS,
        }
    }
}

impl Options {
    /// Defaults, with `max_fields` taken from `LOGSNAP_MAX_FIELDS` when set.
    pub fn from_env() -> Result<Self> {
        match std::env::var(MAX_FIELDS_ENV) {
            Ok(raw) => Ok(Self {
                max_fields: parse_max_fields(&raw)?,
            }),
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(e) => Err(Error::Config(format!("{MAX_FIELDS_ENV}: {e}"))),
        }
    }
}

pub(crate) fn parse_max_fields(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(Error::Config(format!(
            "{MAX_FIELDS_ENV} must be a positive integer"
        ))),
        Ok(n) => Ok(n),
        Err(e) => Err(Error::Config(format!("{MAX_FIELDS_ENV}={raw:?}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_ceiling() {
        assert_eq!(parse_max_fields("75").unwrap(), 75);
        assert_eq!(parse_max_fields(" 3 ").unwrap(), 3);
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert!(matches!(parse_max_fields("0"), Err(Error::Config(_))));
        assert!(matches!(parse_max_fields("many"), Err(Error::Config(_))));
        assert!(matches!(parse_max_fields("-4"), Err(Error::Config(_))));
    }
}
