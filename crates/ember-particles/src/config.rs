//! Pool configuration (defaults, TOML overlay, validation)

use ember_core::{EmberError, Result};
use serde::Serialize;
use std::path::Path;

/// Upper bound on pool size accepted from configuration
pub const MAX_PARTICLES: usize = 100_000;

/// Twelve evenly spaced pastel hues
pub const DEFAULT_PALETTE: [[f32; 3]; 12] = [
    [1.0, 0.5, 0.5],
    [1.0, 0.75, 0.5],
    [1.0, 1.0, 0.5],
    [0.75, 1.0, 0.5],
    [0.5, 1.0, 0.5],
    [0.5, 1.0, 0.75],
    [0.5, 1.0, 1.0],
    [0.5, 0.75, 1.0],
    [0.5, 0.5, 1.0],
    [0.75, 0.5, 1.0],
    [1.0, 0.5, 1.0],
    [1.0, 0.5, 0.75],
];

/// Everything the pool reads while simulating. Immutable after startup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleConfig {
    /// Number of slots in the pool
    pub count: usize,
    /// Downward acceleration applied on the Y axis (units/sec²)
    pub gravity: f32,
    /// Fraction of vertical speed kept when bouncing off the floor
    pub restitution: f32,
    /// Respawn position
    pub emitter_origin: [f32; 3],
    /// Horizontal velocity components are sampled from [-jitter, jitter)
    pub horizontal_jitter: f32,
    pub vertical_speed_min: f32,
    pub vertical_speed_max: f32,
    /// Life lost per update; sampled from [min, max)
    pub fade_rate_min: f32,
    pub fade_rate_max: f32,
    pub palette: Vec<[f32; 3]>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 300,
            gravity: 9.8,
            restitution: 0.75,
            emitter_origin: [0.0; 3],
            horizontal_jitter: 2.5,
            vertical_speed_min: 1.0,
            vertical_speed_max: 15.0,
            fade_rate_min: 0.003,
            fade_rate_max: 0.103,
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }
}

impl ParticleConfig {
    /// Overlay keys from a TOML table onto the defaults.
    /// Keys with the wrong type are logged and keep their default.
    pub fn from_toml(table: &toml::value::Table) -> Self {
        let mut config = Self::default();

        if let Some(v) = table.get("count") {
            match v.as_integer() {
                Some(n) => {
                    let n = n.max(0) as usize;
                    if n > MAX_PARTICLES {
                        log::warn!("[particles] count {n} exceeds {MAX_PARTICLES}, clamping");
                    }
                    config.count = n.min(MAX_PARTICLES);
                }
                None => ignore_key("count", v),
            }
        }
        overlay_f32(table, "gravity", &mut config.gravity);
        overlay_f32(table, "restitution", &mut config.restitution);
        overlay_f32(table, "horizontal_jitter", &mut config.horizontal_jitter);
        overlay_f32(table, "vertical_speed_min", &mut config.vertical_speed_min);
        overlay_f32(table, "vertical_speed_max", &mut config.vertical_speed_max);
        overlay_f32(table, "fade_rate_min", &mut config.fade_rate_min);
        overlay_f32(table, "fade_rate_max", &mut config.fade_rate_max);
        if let Some(v) = table.get("emitter_origin") {
            match toml_vec3(v) {
                Some(origin) => config.emitter_origin = origin,
                None => ignore_key("emitter_origin", v),
            }
        }
        if let Some(v) = table.get("palette") {
            match v.as_array() {
                Some(entries) => {
                    config.palette = entries
                        .iter()
                        .filter_map(|entry| {
                            let color = toml_vec3(entry);
                            if color.is_none() {
                                ignore_key("palette entry", entry);
                            }
                            color
                        })
                        .collect();
                }
                None => ignore_key("palette", v),
            }
        }

        config
    }

    /// Read, overlay and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let table: toml::value::Table = toml::from_str(&text)?;
        let config = Self::from_toml(&table);
        config.validate()?;
        log::info!(
            "[particles] Loaded config from {} ({} particles)",
            path.display(),
            config.count
        );
        Ok(config)
    }

    /// Render as TOML (the format `from_toml` reads back)
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        // Non-finite values slip through every ordered comparison below
        for (field, value) in [
            ("gravity", self.gravity),
            ("restitution", self.restitution),
            ("horizontal_jitter", self.horizontal_jitter),
            ("vertical_speed_min", self.vertical_speed_min),
            ("vertical_speed_max", self.vertical_speed_max),
            ("fade_rate_min", self.fade_rate_min),
            ("fade_rate_max", self.fade_rate_max),
        ] {
            check_finite(field, value)?;
        }
        for &c in &self.emitter_origin {
            check_finite("emitter_origin", c)?;
        }

        if self.count == 0 || self.count > MAX_PARTICLES {
            return Err(EmberError::ValidationError(format!(
                "count must be between 1 and {MAX_PARTICLES}, got {}",
                self.count
            )));
        }
        if self.palette.is_empty() {
            return Err(EmberError::ValidationError(
                "palette must contain at least one colour".to_string(),
            ));
        }
        for color in &self.palette {
            for &c in color {
                check_range("palette", c, 0.0, 1.0)?;
            }
        }
        if !(0.0..1.0).contains(&self.restitution) {
            return Err(out_of_range("restitution", self.restitution, 0.0, 1.0));
        }
        if self.fade_rate_min <= 0.0 {
            return Err(out_of_range("fade_rate_min", self.fade_rate_min, 0.0, 1.0));
        }
        if self.fade_rate_max <= self.fade_rate_min {
            return Err(EmberError::ValidationError(format!(
                "fade_rate_max ({}) must be greater than fade_rate_min ({})",
                self.fade_rate_max, self.fade_rate_min
            )));
        }
        if self.vertical_speed_min < 0.0 {
            return Err(EmberError::ValidationError(
                "vertical_speed_min must not be negative".to_string(),
            ));
        }
        if self.vertical_speed_max < self.vertical_speed_min {
            return Err(EmberError::ValidationError(format!(
                "vertical_speed_max ({}) is below vertical_speed_min ({})",
                self.vertical_speed_max, self.vertical_speed_min
            )));
        }
        if self.horizontal_jitter < 0.0 {
            return Err(EmberError::ValidationError(
                "horizontal_jitter must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_finite(field: &str, value: f32) -> Result<()> {
    if !value.is_finite() {
        return Err(EmberError::ValidationError(format!(
            "{field} must be a finite number, got {value}"
        )));
    }
    Ok(())
}

fn check_range(field: &str, value: f32, min: f32, max: f32) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(out_of_range(field, value, min, max));
    }
    Ok(())
}

fn out_of_range(field: &str, value: f32, min: f32, max: f32) -> EmberError {
    EmberError::ValueOutOfRange {
        field: field.to_string(),
        min: min as f64,
        max: max as f64,
        value: value as f64,
    }
}

// ── TOML helpers (handle integer/float coercion) ──

fn ignore_key(key: &str, v: &toml::Value) {
    log::warn!(
        "[particles] ignoring {key} = {v} (unexpected {}), keeping default",
        v.type_str()
    );
}

fn overlay_f32(table: &toml::value::Table, key: &str, field: &mut f32) {
    if let Some(v) = table.get(key) {
        match toml_f32(v) {
            Some(f) => *field = f,
            None => ignore_key(key, v),
        }
    }
}

fn toml_f32(v: &toml::Value) -> Option<f32> {
    v.as_float()
        .map(|f| f as f32)
        .or_else(|| v.as_integer().map(|i| i as f32))
}

fn toml_vec3(v: &toml::Value) -> Option<[f32; 3]> {
    match v.as_array()?.as_slice() {
        [x, y, z, ..] => Some([toml_f32(x)?, toml_f32(y)?, toml_f32(z)?]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let config = ParticleConfig::default();
        assert_eq!(config.count, 300);
        assert_eq!(config.palette.len(), 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_from_toml() {
        let toml_str = r#"
count = 50
gravity = 0
restitution = 0.5
emitter_origin = [1, 2.5, 0]
palette = [[1.0, 0.0, 0.0], [0, 0, 1]]
"#;
        let table: toml::value::Table = toml::from_str(toml_str).unwrap();
        let config = ParticleConfig::from_toml(&table);
        assert_eq!(config.count, 50);
        assert!(config.gravity.abs() < 1e-6);
        assert!((config.restitution - 0.5).abs() < 1e-6);
        assert_eq!(config.emitter_origin, [1.0, 2.5, 0.0]);
        assert_eq!(config.palette, vec![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        // Untouched keys keep their defaults
        assert!((config.fade_rate_max - 0.103).abs() < 1e-6);
    }

    #[test]
    fn count_is_clamped() {
        let table: toml::value::Table = toml::from_str("count = 5000000").unwrap();
        let config = ParticleConfig::from_toml(&table);
        assert_eq!(config.count, MAX_PARTICLES);
    }

    #[test]
    fn validate_rejects_bad_restitution() {
        let config = ParticleConfig {
            restitution: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EmberError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn validate_rejects_inverted_fade_range() {
        let config = ParticleConfig {
            fade_rate_min: 0.2,
            fade_rate_max: 0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_pool_and_palette() {
        let empty_pool = ParticleConfig {
            count: 0,
            ..Default::default()
        };
        assert!(empty_pool.validate().is_err());

        let empty_palette = ParticleConfig {
            palette: Vec::new(),
            ..Default::default()
        };
        assert!(empty_palette.validate().is_err());
    }

    #[test]
    fn validate_rejects_downward_emission() {
        let config = ParticleConfig {
            vertical_speed_min: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_output_reads_back() {
        let config = ParticleConfig {
            count: 42,
            gravity: 3.5,
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        let table: toml::value::Table = toml::from_str(&text).unwrap();
        assert_eq!(ParticleConfig::from_toml(&table), config);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = ParticleConfig::load("does/not/exist.toml").unwrap_err();
        assert!(matches!(err, EmberError::IoError(_)));
    }

    #[test]
    fn validate_rejects_non_finite_values() {
        let table: toml::value::Table =
            toml::from_str("fade_rate_min = nan\ngravity = inf").unwrap();
        assert!(ParticleConfig::from_toml(&table).validate().is_err());

        for text in [
            "fade_rate_min = nan",
            "vertical_speed_min = nan",
            "vertical_speed_max = inf",
            "gravity = -inf",
            "horizontal_jitter = nan",
            "restitution = nan",
            "emitter_origin = [0, nan, 0]",
            "palette = [[1.0, nan, 0.5]]",
        ] {
            let table: toml::value::Table = toml::from_str(text).unwrap();
            let config = ParticleConfig::from_toml(&table);
            assert!(config.validate().is_err(), "accepted `{text}`");
        }
    }

    #[test]
    fn wrongly_typed_keys_keep_defaults() {
        let toml_str = r#"
count = 3.5
gravity = "x"
emitter_origin = [1, "y", 0]
palette = [[1, 0, 0], "blue", [0, 0]]
"#;
        let table: toml::value::Table = toml::from_str(toml_str).unwrap();
        let config = ParticleConfig::from_toml(&table);
        assert_eq!(config.count, 300);
        assert!((config.gravity - 9.8).abs() < 1e-6);
        assert_eq!(config.emitter_origin, [0.0; 3]);
        assert_eq!(config.palette, vec![[1.0, 0.0, 0.0]]);
        assert!(config.validate().is_ok());
    }
}
