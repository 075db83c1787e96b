//! Start-up configuration loaded from YAML.
//!
//! Every section is optional; anything left out keeps its default.
//!
//! ```yaml
//! timescale: 6.7e-5       # time dilation applied to each frame's step
//! defaults:               # values behind Reset and the parse fallback
//!   charge: 1.602176e-19
//!   mass: 1.67262e-27
//!   field: 1.0e-3         # B (T)
//!   amplitude: 10.0       # E (V/m)
//!   gap: 0.02
//!   dee_radius: 0.45
//!   scale: 1000.0         # px/m
//!   fps: 100.0
//! canvas:
//!   width: 1000.0
//!   height: 1000.0
//!   trail_limit: 4000
//!   particle_radius: 3.0
//! integrator:
//!   method: dopri5        # or "rk4" with `substeps`
//!   rtol: 1.0e-8
//!   atol: 1.0e-12
//!   max_steps: 20000
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::sim::params::FieldError;
use crate::sim::{ControllerOptions, Setup, Solver};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("default {field}: {source}")]
    Default {
        field: &'static str,
        #[source]
        source: FieldError,
    },
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    pub trail_limit: usize,
    pub particle_radius: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
            trail_limit: 4000,
            particle_radius: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub timescale: f64,
    pub defaults: Setup,
    pub canvas: CanvasConfig,
    pub integrator: Solver,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timescale: 6.7e-5,
            defaults: Setup::default(),
            canvas: CanvasConfig::default(),
            integrator: Solver::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.defaults.validate().map_err(|(field, source)| ConfigError::Default {
            field: field.label(),
            source,
        })?;
        if !(self.timescale.is_finite() && self.timescale > 0.0) {
            return Err(ConfigError::Invalid("timescale must be positive".into()));
        }
        let CanvasConfig { width, height, particle_radius, .. } = self.canvas;
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(ConfigError::Invalid("canvas size must be positive".into()));
        }
        if !(particle_radius.is_finite() && particle_radius >= 0.0) {
            return Err(ConfigError::Invalid("particle radius must be non-negative".into()));
        }
        match self.integrator {
            Solver::Rk4 { substeps: 0 } => {
                Err(ConfigError::Invalid("rk4 needs at least one substep".into()))
            }
            Solver::Dopri5 { rtol, atol, max_steps } if !(rtol > 0.0 && atol > 0.0 && max_steps > 0) => {
                Err(ConfigError::Invalid("dopri5 needs positive rtol, atol and max_steps".into()))
            }
            _ => Ok(()),
        }
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            timescale: self.timescale,
            solver: self.integrator,
            particle_radius: self.canvas.particle_radius,
            trail_limit: self.canvas.trail_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = Config::from_yaml(
            "timescale: 1.0e-4\n\
             defaults:\n  vx0: 250.0\n  field: 2.0e-3\n\
             canvas:\n  trail_limit: 10\n\
             integrator:\n  method: rk4\n",
        )
        .unwrap();
        assert_eq!(config.timescale, 1e-4);
        assert_eq!(config.defaults.vx0, 250.0);
        assert_eq!(config.defaults.field, 2e-3);
        assert_eq!(config.defaults.mass, Setup::default().mass);
        assert_eq!(config.canvas.trail_limit, 10);
        assert_eq!(config.canvas.width, 1000.0);
        assert_eq!(config.integrator, Solver::Rk4 { substeps: 8 });

        let options = config.controller_options();
        assert_eq!(options.trail_limit, 10);
        assert_eq!(options.timescale, 1e-4);
    }

    #[test]
    fn invalid_defaults_are_rejected() {
        let err = Config::from_yaml("defaults:\n  mass: 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Default { field: "m", .. }), "{err}");
        let err = Config::from_yaml("timescale: -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = Config::from_yaml("integrator:\n  method: rk4\n  substeps: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_keys_are_reported() {
        let err = Config::from_yaml("defaults:\n  speed: 3.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = Config::load(Path::new("/nonexistent/cyclotron.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cyclotron.yaml"));
    }
}
