//! Gate that must be open before anything is sent to the backend.

use std::path::PathBuf;

use crate::config::Config;

pub trait ConsentGate {
    fn is_granted(&self) -> bool;
    /// A submit was refused; the host should ask the user.
    fn request_consent(&mut self);
    fn grant(&mut self);
}

/// Consent flag persisted in the settings file, so it outlives the session.
pub struct StoredConsent {
    config: Config,
    path: Option<PathBuf>,
}

impl StoredConsent {
    /// Persists to the default config location.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            path: None,
        }
    }

    pub fn at(config: Config, path: PathBuf) -> Self {
        Self {
            config,
            path: Some(path),
        }
    }
}

impl ConsentGate for StoredConsent {
    fn is_granted(&self) -> bool {
        !self.config.require_consent || self.config.consent_given
    }

    fn request_consent(&mut self) {
        tracing::info!("consent requested");
    }

    fn grant(&mut self) {
        self.config.consent_given = true;

        let saved = match &self.path {
            Some(path) => self.config.save_to(path),
            None => self.config.save(),
        };
        if let Err(e) = saved {
            // Consent still holds for this session.
            tracing::warn!(error = %e, "failed to persist consent");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut gate = StoredConsent::at(Config::new(), path.clone());
        assert!(!gate.is_granted());
        gate.request_consent();
        assert!(!gate.is_granted());

        gate.grant();
        assert!(gate.is_granted());
        assert!(Config::load_from(&path).unwrap().consent_given);
    }

    #[test]
    fn test_not_required_means_granted() {
        let mut config = Config::new();
        config.require_consent = false;
        let gate = StoredConsent::new(config);
        assert!(gate.is_granted());
    }
}
