//! Terminal redirect targets

use serde::Deserialize;

use super::error::{parse_url, ValidationError};
use crate::domain::checkout::{RedirectEnvironment, RedirectResolver, RedirectTargets};

/// Success/failure base URLs per environment. Missing entries are allowed;
/// a session that needs one reports a configuration error to the payer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedirectsConfig {
    /// `production`/`prod` selects production targets; anything else staging.
    #[serde(default)]
    pub environment: RedirectEnvironment,

    pub success_staging: Option<String>,
    pub failure_staging: Option<String>,
    pub success_production: Option<String>,
    pub failure_production: Option<String>,
}

impl RedirectsConfig {
    pub fn targets(&self) -> Result<RedirectTargets, ValidationError> {
        Ok(RedirectTargets {
            success_staging: parse_url(
                "redirects.success_staging",
                self.success_staging.as_deref(),
            )?,
            failure_staging: parse_url(
                "redirects.failure_staging",
                self.failure_staging.as_deref(),
            )?,
            success_production: parse_url(
                "redirects.success_production",
                self.success_production.as_deref(),
            )?,
            failure_production: parse_url(
                "redirects.failure_production",
                self.failure_production.as_deref(),
            )?,
        })
    }

    pub fn resolver(&self) -> Result<RedirectResolver, ValidationError> {
        Ok(RedirectResolver::new(self.environment, self.targets()?))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.targets().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_targets_are_absent() {
        let config = RedirectsConfig {
            success_staging: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.targets().unwrap(), RedirectTargets::default());
        assert_eq!(config.environment, RedirectEnvironment::Staging);
    }

    #[test]
    fn parses_targets() {
        let config = RedirectsConfig {
            environment: RedirectEnvironment::Production,
            success_production: Some("https://shop.example.com/done".to_string()),
            ..Default::default()
        };
        let resolver = config.resolver().unwrap();
        assert_eq!(resolver.environment(), RedirectEnvironment::Production);
    }

    #[test]
    fn rejects_malformed_target() {
        let config = RedirectsConfig {
            failure_production: Some("/relative/path".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidUrl {
                field: "redirects.failure_production",
                value: "/relative/path".to_string()
            })
        );
    }
}
