//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults
//! reproduce the shipped portfolio; a user file overrides any
//! subset of them.
//!
//! ## Config File Location
//!
//! Place `config.toml` in the site root (the directory passed as `--root`):
//!
//! ```text
//! site/
//! ├── config.toml     # Overrides stock defaults
//! ├── index.html
//! └── assets/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [contact]
//! messaging_name = "WhatsApp"
//! messaging_host = "wa.me"
//! recipient = "916207806187"  # Messaging recipient id
//! email = "ayush@artist.com"
//! signature = "Ayush Artist Portfolio"
//!
//! [carousel]
//! transition_ms = 1000        # Transition lock window
//! autoplay_ms = 5000          # Autoplay period
//! swipe_threshold_px = 50.0   # Minimum horizontal swipe
//!
//! [navigation]
//! throttle_ms = 100
//! look_ahead_px = 150.0       # Added to scrollY for active-link detection
//! noise_px = 10.0             # Navbar ignores smaller scroll deltas
//! hide_after_px = 100.0       # Navbar only hides below this offset
//! back_to_top_px = 300.0
//!
//! [notifications]
//! dismiss_ms = 5000
//! exit_ms = 300
//!
//! [loader]
//! hide_after_ms = 1500
//! fade_ms = 500
//! title = "Loading Ayush's Portfolio"
//! subtitle = "Preparing beautiful art for you..."
//!
//! [modals]
//! focus_delay_ms = 100
//!
//! [reveal]
//! threshold = 0.1
//! bottom_margin_px = 50
//! lazy_margin_px = 50
//!
//! [perf]
//! long_task_ms = 50.0
//! memory_check_ms = 30000
//! memory_warn_mb = 50
//!
//! [service_worker]
//! enabled = true
//! path = "/sw.js"
//!
//! [assets]
//! preload = ["https://images.unsplash.com/..."]
//!
//! [[gallery]]
//! key = "abstract"
//! title = "Abstract Acrylic"
//! images = ["./assets/Abstract-Acrylic.jpg"]
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [contact]
//! email = "studio@example.com"
//! ```
//!
//! Arrays (including the `[[gallery]]` catalog) replace the default wholesale.
//! Unknown keys are rejected to catch typos early.

use crate::gallery::{GalleryCategory, stock_catalog};
use crate::types::Millis;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults matching the stock portfolio. User config files
/// need only specify the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Deep-link recipients and message signature.
    pub contact: ContactConfig,
    /// Slide timing and swipe sensitivity.
    pub carousel: CarouselConfig,
    /// Scroll look-ahead, navbar hysteresis, back-to-top threshold.
    pub navigation: NavigationConfig,
    /// Toast lifetimes.
    pub notifications: NotificationConfig,
    /// Loading screen copy and timing.
    pub loader: LoaderConfig,
    /// Modal focus timing.
    pub modals: ModalConfig,
    /// Intersection thresholds for reveal animations and lazy images.
    pub reveal: RevealConfig,
    /// Diagnostic thresholds.
    pub perf: PerfConfig,
    /// Offline worker registration.
    pub service_worker: ServiceWorkerConfig,
    /// Images to warm up at startup.
    pub assets: AssetsConfig,
    /// Artwork catalog, in display order.
    pub gallery: Vec<GalleryCategory>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            contact: ContactConfig::default(),
            carousel: CarouselConfig::default(),
            navigation: NavigationConfig::default(),
            notifications: NotificationConfig::default(),
            loader: LoaderConfig::default(),
            modals: ModalConfig::default(),
            reveal: RevealConfig::default(),
            perf: PerfConfig::default(),
            service_worker: ServiceWorkerConfig::default(),
            assets: AssetsConfig::default(),
            gallery: stock_catalog(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.contact.messaging_host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "contact.messaging_host must not be empty".into(),
            ));
        }
        if self.contact.recipient.is_empty()
            || !self.contact.recipient.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ConfigError::Validation(
                "contact.recipient must be a non-empty string of digits".into(),
            ));
        }
        if !self.contact.email.contains('@') {
            return Err(ConfigError::Validation(
                "contact.email must be an email address".into(),
            ));
        }
        if self.carousel.transition_ms == 0 || self.carousel.autoplay_ms == 0 {
            return Err(ConfigError::Validation(
                "carousel.transition_ms and carousel.autoplay_ms must be non-zero".into(),
            ));
        }
        if self.perf.memory_check_ms == 0 {
            return Err(ConfigError::Validation(
                "perf.memory_check_ms must be non-zero".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.reveal.threshold) {
            return Err(ConfigError::Validation(
                "reveal.threshold must be between 0.0 and 1.0".into(),
            ));
        }
        let mut keys = HashSet::new();
        for category in &self.gallery {
            if category.key.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "gallery category key must not be empty".into(),
                ));
            }
            if !keys.insert(category.key.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate gallery category key '{}'",
                    category.key
                )));
            }
        }
        Ok(())
    }
}

/// Deep-link targets. The messaging link is
/// `https://{messaging_host}/{recipient}?text=...`, the mail link
/// `mailto:{email}?subject=...&body=...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContactConfig {
    /// Display name of the messaging app used in notifications and the choice modal.
    pub messaging_name: String,
    pub messaging_host: String,
    pub recipient: String,
    pub email: String,
    /// Appended to every message as `Sent from {signature}`.
    pub signature: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            messaging_name: "WhatsApp".to_string(),
            messaging_host: "wa.me".to_string(),
            recipient: "916207806187".to_string(),
            email: "ayush@artist.com".to_string(),
            signature: "Ayush Artist Portfolio".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselConfig {
    /// How long the transition lock holds after a slide change.
    pub transition_ms: Millis,
    /// Autoplay period.
    pub autoplay_ms: Millis,
    /// Minimum horizontal displacement for a swipe to navigate.
    pub swipe_threshold_px: f64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            transition_ms: 1000,
            autoplay_ms: 5000,
            swipe_threshold_px: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationConfig {
    /// Throttle window for all scroll handlers.
    pub throttle_ms: Millis,
    /// Added to the scroll offset when deciding which section is current.
    pub look_ahead_px: f64,
    /// Scroll deltas at or below this are ignored by the navbar.
    pub noise_px: f64,
    /// The navbar never hides above this offset.
    pub hide_after_px: f64,
    /// The back-to-top control shows below this offset.
    pub back_to_top_px: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 100,
            look_ahead_px: 150.0,
            noise_px: 10.0,
            hide_after_px: 100.0,
            back_to_top_px: 300.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationConfig {
    /// Time before a toast starts leaving on its own.
    pub dismiss_ms: Millis,
    /// Exit animation length before removal.
    pub exit_ms: Millis,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            dismiss_ms: 5000,
            exit_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Delay after initialization before the loading screen fades.
    pub hide_after_ms: Millis,
    /// Fade length before removal.
    pub fade_ms: Millis,
    pub title: String,
    pub subtitle: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            hide_after_ms: 1500,
            fade_ms: 500,
            title: "Loading Ayush's Portfolio".to_string(),
            subtitle: "Preparing beautiful art for you...".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModalConfig {
    /// Delay before moving focus into a freshly opened modal.
    pub focus_delay_ms: Millis,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            focus_delay_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    /// Fraction of an element that must be visible to trigger its reveal.
    pub threshold: f64,
    /// The viewport's bottom edge is pulled up by this much for reveals.
    pub bottom_margin_px: u32,
    /// Deferred images load this far before entering the viewport.
    pub lazy_margin_px: u32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            bottom_margin_px: 50,
            lazy_margin_px: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PerfConfig {
    /// Long tasks above this duration are logged.
    pub long_task_ms: f64,
    /// Memory sampling period.
    pub memory_check_ms: Millis,
    /// Heap usage above this many MiB is logged.
    pub memory_warn_mb: u64,
}

impl Default for PerfConfig {
    fn default() -> Self {
        Self {
            long_task_ms: 50.0,
            memory_check_ms: 30_000,
            memory_warn_mb: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceWorkerConfig {
    pub enabled: bool,
    /// Script path registered on window load.
    pub path: String,
}

impl Default for ServiceWorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/sw.js".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Hero images fetched at startup so the first slides appear instantly.
    pub preload: Vec<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            preload: vec![
                "https://images.unsplash.com/photo-1541961017774-22349e4a1262?w=1920&h=1080&fit=crop"
                    .to_string(),
                "https://images.unsplash.com/photo-1578662996442-48f60103fc96?w=1920&h=1080&fit=crop"
                    .to_string(),
                "https://images.unsplash.com/photo-1547891654-e66ed7ebb968?w=1920&h=1080&fit=crop"
                    .to_string(),
            ],
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# artfolio configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Contact channels used by the commission form
# ---------------------------------------------------------------------------
[contact]
# Name shown in notifications and on the submission choice button.
messaging_name = "WhatsApp"
# Requests open https://<messaging_host>/<recipient>?text=<message>
messaging_host = "wa.me"
recipient = "916207806187"
# Requests with a photo may go to mailto:<email> instead.
email = "ayush@artist.com"
# Last line of every message: "Sent from <signature>".
signature = "Ayush Artist Portfolio"

# ---------------------------------------------------------------------------
# Hero carousel
# ---------------------------------------------------------------------------
[carousel]
# Slide changes are locked out for this long after each change (ms).
transition_ms = 1000
# Autoplay period (ms). Paused on hover, focus, or hidden tab.
autoplay_ms = 5000
# Minimum horizontal swipe distance (px).
swipe_threshold_px = 50.0

# ---------------------------------------------------------------------------
# Section navigation
# ---------------------------------------------------------------------------
[navigation]
# Scroll handlers run at most once per window (ms).
throttle_ms = 100
# Added to scrollY when picking the active section (px).
look_ahead_px = 150.0
# Navbar ignores scroll movements this small or smaller (px).
noise_px = 10.0
# Navbar only hides when scrolled past this offset (px).
hide_after_px = 100.0
# Back-to-top button shows past this offset (px).
back_to_top_px = 300.0

# ---------------------------------------------------------------------------
# Notifications
# ---------------------------------------------------------------------------
[notifications]
dismiss_ms = 5000
exit_ms = 300

# ---------------------------------------------------------------------------
# Loading screen
# ---------------------------------------------------------------------------
[loader]
hide_after_ms = 1500
fade_ms = 500
title = "Loading Ayush's Portfolio"
subtitle = "Preparing beautiful art for you..."

# ---------------------------------------------------------------------------
# Modals
# ---------------------------------------------------------------------------
[modals]
# Delay before focus moves into a newly opened modal (ms).
focus_delay_ms = 100

# ---------------------------------------------------------------------------
# Scroll reveal and lazy images
# ---------------------------------------------------------------------------
[reveal]
# Visible fraction that triggers a reveal (0.0 - 1.0).
threshold = 0.1
# Reveals wait until elements are this far above the viewport bottom (px).
bottom_margin_px = 50
# Deferred images start loading this far outside the viewport (px).
lazy_margin_px = 50

# ---------------------------------------------------------------------------
# Diagnostics
# ---------------------------------------------------------------------------
[perf]
long_task_ms = 50.0
memory_check_ms = 30000
memory_warn_mb = 50

# ---------------------------------------------------------------------------
# Offline worker
# ---------------------------------------------------------------------------
[service_worker]
enabled = true
path = "/sw.js"

# ---------------------------------------------------------------------------
# Startup preloads
# ---------------------------------------------------------------------------
[assets]
preload = [
    "https://images.unsplash.com/photo-1541961017774-22349e4a1262?w=1920&h=1080&fit=crop",
    "https://images.unsplash.com/photo-1578662996442-48f60103fc96?w=1920&h=1080&fit=crop",
    "https://images.unsplash.com/photo-1547891654-e66ed7ebb968?w=1920&h=1080&fit=crop",
]

# ---------------------------------------------------------------------------
# Artwork catalog. One entry per category button (data-category = key).
# Declaring any [[gallery]] entry replaces the whole default catalog.
# ---------------------------------------------------------------------------
[[gallery]]
key = "abstract"
title = "Abstract Acrylic"
images = [
    "./assets/Abstract-Acrylic.jpg",
    "./assets/Abstract-Acrylic-2.jpg",
    "./assets/Abstract-Acrylic-3.jpg",
    "./assets/Abstract-Acrylic-4.jpg",
    "./assets/Abstract-Acrylic-5.jpg",
]

[[gallery]]
key = "bw-portrait"
title = "Black and White Portrait"
images = [
    "./assets/Black & White potrait.jpg",
    "./assets/Black & White potrait-2.jpg",
    "./assets/Black & White potrait-3.png",
]

[[gallery]]
key = "color-portrait"
title = "Colour Portrait"
images = ["/assets/coloyr-portrait.jpg"]

[[gallery]]
key = "watercolor"
title = "Water Colour"
images = [
    "./assets/Water-Colour.jpg",
    "./assets/Water-Colour-2.jpg",
    "./assets/Water-Colour-3.jpg",
]
"##
}
