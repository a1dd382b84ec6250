use serde::Deserialize;

use crate::language::Language;
use crate::logging::LogLevel;
use crate::theme::Theme;

pub const CONFIG_ELEMENT_ID: &str = "portfolio-config";

const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;
const DEFAULT_NARROW_BREAKPOINT: f64 = 768.0;

const GLOW_SMOOTHING_BOUNDS: (f64, f64) = (0.001, 1.0);
const GLOW_IDLE_SPEED_BOUNDS: (f64, f64) = (0.0, 0.5);
const GLOW_IDLE_TIMEOUT_MS_BOUNDS: (u32, u32) = (100, 60_000);
const GLOW_IDLE_RADIUS_BOUNDS: (f64, f64) = (0.0, 2_000.0);
const PARTICLE_COUNT_BOUNDS: (usize, usize) = (0, 400);
const PARTICLE_POINTER_RADIUS_BOUNDS: (f64, f64) = (0.0, 1_000.0);
const CONNECTION_DISTANCE_BOUNDS: (f64, f64) = (0.0, 1_000.0);
const REVEAL_THRESHOLD_BOUNDS: (f64, f64) = (0.0, 1.0);
const TYPEWRITER_MS_BOUNDS: (u32, u32) = (0, 30_000);
const TILT_MAX_DEGREES_BOUNDS: (f64, f64) = (0.0, 45.0);
const NAV_HIDE_THRESHOLD_BOUNDS: (f64, f64) = (0.0, 10_000.0);
const RIPPLE_LIFETIME_MS_BOUNDS: (u32, u32) = (50, 10_000);
const SUBMIT_DELAY_MS_BOUNDS: (u32, u32) = (0, 30_000);
const NARROW_BREAKPOINT_BOUNDS: (f64, f64) = (0.0, 4_096.0);

#[derive(Clone, Debug, PartialEq)]
pub struct ThemeConfig {
    pub storage_key: &'static str,
    pub default: Theme,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LanguageConfig {
    pub storage_key: &'static str,
    pub default: Language,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GlowConfig {
    pub smoothing: f64,
    pub idle_speed: f64,
    pub idle_timeout_ms: u32,
    pub idle_radius: f64,
    pub idle_vertical_factor: f64,
    pub radius_factor: f64,
    pub secondary_radius_factor: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleConfig {
    pub count: usize,
    pub count_narrow: usize,
    pub pointer_radius: f64,
    pub push_strength: f64,
    pub connection_distance: f64,
    pub connection_distance_narrow: f64,
    pub link_opacity: f64,
    pub link_width: f64,
    pub min_radius: f64,
    pub radius_spread: f64,
    pub speed_spread: f64,
    pub canvas_opacity: f64,
}

impl ParticleConfig {
    pub fn count_for(&self, narrow: bool) -> usize {
        if narrow {
            self.count_narrow
        } else {
            self.count
        }
    }

    pub fn connection_distance_for(&self, narrow: bool) -> f64 {
        if narrow {
            self.connection_distance_narrow
        } else {
            self.connection_distance
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RevealConfig {
    pub threshold: f64,
    pub root_margin: String,
    pub duration_ms: u32,
    pub offset_px: f64,
    pub hero_delay_ms: u32,
    pub hero_duration_ms: u32,
    pub hero_offset_px: f64,
    pub typewriter_delay_ms: u32,
    pub typewriter_duration_ms: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TiltConfig {
    pub max_degrees: f64,
    pub ease_back: f64,
    pub perspective_px: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NavigationConfig {
    pub hide_threshold: f64,
    pub hidden_offset_px: f64,
    pub transition_ms: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InteractionConfig {
    pub ripple_lifetime_ms: u32,
    pub hover_scale: f64,
    pub hover_duration_ms: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FormConfig {
    pub submit_delay_ms: u32,
    pub press_duration_ms: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeviceConfig {
    pub narrow_breakpoint: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub theme: ThemeConfig,
    pub language: LanguageConfig,
    pub glow: GlowConfig,
    pub particles: ParticleConfig,
    pub reveal: RevealConfig,
    pub tilt: TiltConfig,
    pub navigation: NavigationConfig,
    pub interaction: InteractionConfig,
    pub form: FormConfig,
    pub device: DeviceConfig,
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: ThemeConfig {
                storage_key: "darkMode",
                default: Theme::Light,
            },
            language: LanguageConfig {
                storage_key: "language",
                default: Language::German,
            },
            glow: GlowConfig {
                smoothing: 0.03,
                idle_speed: 0.008,
                idle_timeout_ms: 2_000,
                idle_radius: 120.0,
                idle_vertical_factor: 0.8,
                radius_factor: 0.28,
                secondary_radius_factor: 0.8,
            },
            particles: ParticleConfig {
                count: 60,
                count_narrow: 30,
                pointer_radius: 100.0,
                push_strength: 2.0,
                connection_distance: 120.0,
                connection_distance_narrow: 80.0,
                link_opacity: 0.3,
                link_width: 0.5,
                min_radius: 1.0,
                radius_spread: 3.0,
                speed_spread: 0.5,
                canvas_opacity: 0.6,
            },
            reveal: RevealConfig {
                threshold: 0.1,
                root_margin: "0px 0px -50px 0px".to_string(),
                duration_ms: 600,
                offset_px: 30.0,
                hero_delay_ms: 500,
                hero_duration_ms: 1_000,
                hero_offset_px: 50.0,
                typewriter_delay_ms: 1_500,
                typewriter_duration_ms: 3_000,
            },
            tilt: TiltConfig {
                max_degrees: 10.0,
                ease_back: 0.1,
                perspective_px: 1_000.0,
            },
            navigation: NavigationConfig {
                hide_threshold: 100.0,
                hidden_offset_px: 100.0,
                transition_ms: 300,
            },
            interaction: InteractionConfig {
                ripple_lifetime_ms: 600,
                hover_scale: 1.05,
                hover_duration_ms: 200,
            },
            form: FormConfig {
                submit_delay_ms: 1_500,
                press_duration_ms: 600,
            },
            device: DeviceConfig {
                narrow_breakpoint: DEFAULT_NARROW_BREAKPOINT,
            },
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

/// Page-supplied tuning. Every field is optional and falls back to the
/// default when missing or outside its bounds.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ConfigOverrides {
    log_level: Option<String>,
    glow_smoothing: Option<f64>,
    glow_idle_speed: Option<f64>,
    glow_idle_timeout_ms: Option<u32>,
    glow_idle_radius: Option<f64>,
    particle_count: Option<usize>,
    particle_count_narrow: Option<usize>,
    particle_pointer_radius: Option<f64>,
    connection_distance: Option<f64>,
    connection_distance_narrow: Option<f64>,
    reveal_threshold: Option<f64>,
    reveal_margin: Option<String>,
    typewriter_delay_ms: Option<u32>,
    typewriter_duration_ms: Option<u32>,
    tilt_max_degrees: Option<f64>,
    nav_hide_threshold: Option<f64>,
    ripple_lifetime_ms: Option<u32>,
    submit_delay_ms: Option<u32>,
    narrow_breakpoint: Option<f64>,
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let overrides: ConfigOverrides = serde_json::from_str(raw)?;
        Ok(Self::default().with_overrides(overrides))
    }

    fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.log_level = overrides
            .log_level
            .as_deref()
            .and_then(LogLevel::parse)
            .unwrap_or(self.log_level);

        let glow = &mut self.glow;
        glow.smoothing = within(overrides.glow_smoothing, glow.smoothing, GLOW_SMOOTHING_BOUNDS);
        glow.idle_speed = within(overrides.glow_idle_speed, glow.idle_speed, GLOW_IDLE_SPEED_BOUNDS);
        glow.idle_timeout_ms = within(
            overrides.glow_idle_timeout_ms,
            glow.idle_timeout_ms,
            GLOW_IDLE_TIMEOUT_MS_BOUNDS,
        );
        glow.idle_radius = within(overrides.glow_idle_radius, glow.idle_radius, GLOW_IDLE_RADIUS_BOUNDS);

        let particles = &mut self.particles;
        particles.count = within(overrides.particle_count, particles.count, PARTICLE_COUNT_BOUNDS);
        particles.count_narrow = within(
            overrides.particle_count_narrow,
            particles.count_narrow,
            PARTICLE_COUNT_BOUNDS,
        );
        particles.pointer_radius = within(
            overrides.particle_pointer_radius,
            particles.pointer_radius,
            PARTICLE_POINTER_RADIUS_BOUNDS,
        );
        particles.connection_distance = within(
            overrides.connection_distance,
            particles.connection_distance,
            CONNECTION_DISTANCE_BOUNDS,
        );
        particles.connection_distance_narrow = within(
            overrides.connection_distance_narrow,
            particles.connection_distance_narrow,
            CONNECTION_DISTANCE_BOUNDS,
        );

        self.reveal.threshold = within(
            overrides.reveal_threshold,
            self.reveal.threshold,
            REVEAL_THRESHOLD_BOUNDS,
        );
        if let Some(margin) = overrides
            .reveal_margin
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
        {
            self.reveal.root_margin = margin;
        }
        self.reveal.typewriter_delay_ms = within(
            overrides.typewriter_delay_ms,
            self.reveal.typewriter_delay_ms,
            TYPEWRITER_MS_BOUNDS,
        );
        self.reveal.typewriter_duration_ms = within(
            overrides.typewriter_duration_ms,
            self.reveal.typewriter_duration_ms,
            TYPEWRITER_MS_BOUNDS,
        );

        self.tilt.max_degrees = within(
            overrides.tilt_max_degrees,
            self.tilt.max_degrees,
            TILT_MAX_DEGREES_BOUNDS,
        );
        self.navigation.hide_threshold = within(
            overrides.nav_hide_threshold,
            self.navigation.hide_threshold,
            NAV_HIDE_THRESHOLD_BOUNDS,
        );
        self.interaction.ripple_lifetime_ms = within(
            overrides.ripple_lifetime_ms,
            self.interaction.ripple_lifetime_ms,
            RIPPLE_LIFETIME_MS_BOUNDS,
        );
        self.form.submit_delay_ms = within(
            overrides.submit_delay_ms,
            self.form.submit_delay_ms,
            SUBMIT_DELAY_MS_BOUNDS,
        );
        self.device.narrow_breakpoint = within(
            overrides.narrow_breakpoint,
            self.device.narrow_breakpoint,
            NARROW_BREAKPOINT_BOUNDS,
        );

        self
    }
}

fn within<T: PartialOrd + Copy>(value: Option<T>, default: T, bounds: (T, T)) -> T {
    value
        .filter(|value| bounds.0 <= *value && *value <= bounds.1)
        .unwrap_or(default)
}

#[cfg(target_arch = "wasm32")]
pub fn load() -> AppConfig {
    use crate::logging::log_event;
    use serde_json::json;

    let raw = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|element| element.text_content())
        .filter(|text| !text.trim().is_empty());

    let Some(raw) = raw else {
        return AppConfig::default();
    };

    match AppConfig::from_json(&raw) {
        Ok(config) => config,
        Err(err) => {
            log_event(
                LogLevel::Warn,
                "config_parse_failed",
                json!({ "error": err.to_string() }),
            );
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_keeps_defaults() {
        let config = AppConfig::from_json("{}").expect("empty object parses");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn in_range_overrides_are_applied() {
        let config = AppConfig::from_json(
            r#"{"particleCount": 12, "submitDelayMs": 20, "logLevel": "debug", "revealMargin": " 0px ", "typewriterDelayMs": 10}"#,
        )
        .expect("valid overrides parse");

        assert_eq!(config.particles.count, 12);
        assert_eq!(config.form.submit_delay_ms, 20);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.reveal.root_margin, "0px");
        assert_eq!(config.reveal.typewriter_delay_ms, 10);
        assert_eq!(config.reveal.typewriter_duration_ms, 3_000);
    }

    #[test]
    fn out_of_range_overrides_fall_back_to_defaults() {
        let config = AppConfig::from_json(
            r#"{"glowSmoothing": 4.5, "particleCount": 100000, "tiltMaxDegrees": -3, "logLevel": "verbose"}"#,
        )
        .expect("overrides parse");
        let defaults = AppConfig::default();

        assert_eq!(config.glow.smoothing, defaults.glow.smoothing);
        assert_eq!(config.particles.count, defaults.particles.count);
        assert_eq!(config.tilt.max_degrees, defaults.tilt.max_degrees);
        assert_eq!(config.log_level, defaults.log_level);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(AppConfig::from_json("{ not json").is_err());
        assert!(AppConfig::from_json(r#"{"particleCount": "many"}"#).is_err());
    }

    #[test]
    fn narrow_devices_get_smaller_particle_budget() {
        let particles = AppConfig::default().particles;

        assert_eq!(particles.count_for(true), 30);
        assert_eq!(particles.count_for(false), 60);
        assert_eq!(particles.connection_distance_for(true), 80.0);
        assert_eq!(particles.connection_distance_for(false), 120.0);
    }
}
