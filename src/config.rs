//! Server configuration.
//!
//! Uses `heapless` strings and vectors so the structs stay fixed-size, with
//! the same builder style for every section.
//!
//! # Example
//!
//! ```rust
//! use ir_trainz::config::{Config, IrConfig, WebConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.web.port, 8080);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_ir(IrConfig::default().with_remote("LEGO_Combo_PWM"))
//!     .with_web(WebConfig::default().with_port(3000));
//! ```
//!
//! # Environment
//!
//! [`Config::from_env`] overlays these variables on the defaults:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `PORT` | `web.port` |
//! | `CORS_PERMISSIVE` | `web.cors_permissive` |
//! | `IRSEND_PROGRAM` | `ir.program` |
//! | `IR_REMOTE` | `ir.remote` |
//! | `GPIO_ENABLED` | `gpio.enabled` |
//! | `GPIO_PINS` | `gpio.pins` (comma separated) |
//! | `DELIVERY_HISTORY` | `deliveries.history` |

use core::fmt;
use core::str::FromStr;

use heapless::String as HString;
use heapless::Vec as HVec;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

/// Maximum length for short config strings (names)
pub const MAX_SHORT_STRING: usize = 64;

/// Maximum length for longer config strings (paths)
pub const MAX_LONG_STRING: usize = 128;

/// Maximum number of monitored input pins
pub const MAX_PINS: usize = 8;

/// Largest accepted delivery history
pub const MAX_HISTORY: usize = 4096;

/// Bounds for the per-pin poll timeout, in milliseconds
pub const POLL_TIMEOUT_RANGE_MS: core::ops::RangeInclusive<u32> = 1..=10_000;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for longer config strings
pub type LongString = HString<MAX_LONG_STRING>;

/// Type alias for the monitored pin list
pub type PinList = HVec<u64, MAX_PINS>;

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

fn truncated<const N: usize>(s: &str) -> HString<N> {
    let mut hs = HString::new();
    // Stop at the last char boundary that still fits
    let valid_end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|end| *end <= N)
        .last()
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    truncated(s)
}

/// Create a LongString from a &str, truncating if too long
pub fn long_string(s: &str) -> LongString {
    truncated(s)
}

// ============================================================================
// Errors
// ============================================================================

/// An environment variable held a value that could not be used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigError {
    /// Variable name.
    pub key: &'static str,
    /// Offending value.
    pub value: ShortString,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value for {}: {:?}", self.key, self.value.as_str())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError {
        key,
        value: short_string(raw),
    })
}

fn parse_bounded<const N: usize>(key: &'static str, raw: &str) -> Result<HString<N>, ConfigError> {
    let value = raw.trim();
    if value.len() > N {
        return Err(ConfigError {
            key,
            value: short_string(value),
        });
    }
    Ok(truncated(value))
}

fn parse_history(key: &'static str, raw: &str) -> Result<usize, ConfigError> {
    let history: usize = parse_value(key, raw)?;
    if history > MAX_HISTORY {
        return Err(ConfigError {
            key,
            value: short_string(raw),
        });
    }
    Ok(history)
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    let value = raw.trim();
    let is_any = |words: &[&str]| words.iter().any(|w| value.eq_ignore_ascii_case(w));

    if is_any(&["1", "true", "yes", "on"]) {
        Ok(true)
    } else if is_any(&["0", "false", "no", "off"]) {
        Ok(false)
    } else {
        Err(ConfigError {
            key,
            value: short_string(raw),
        })
    }
}

fn parse_pins(key: &'static str, raw: &str) -> Result<PinList, ConfigError> {
    let mut pins = PinList::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let pin = parse_value(key, part)?;
        pins.push(pin).map_err(|_| ConfigError {
            key,
            value: short_string(raw),
        })?;
    }
    Ok(pins)
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Web server configuration
    pub web: WebConfig,
    /// IR transmitter configuration
    pub ir: IrConfig,
    /// GPIO input monitoring configuration
    pub gpio: GpioConfig,
    /// Delivery status history configuration
    pub deliveries: DeliveryConfig,
}

impl Config {
    /// Set web configuration
    pub fn with_web(mut self, web: WebConfig) -> Self {
        self.web = web;
        self
    }

    /// Set IR configuration
    pub fn with_ir(mut self, ir: IrConfig) -> Self {
        self.ir = ir;
        self
    }

    /// Set GPIO configuration
    pub fn with_gpio(mut self, gpio: GpioConfig) -> Self {
        self.gpio = gpio;
        self
    }

    /// Set delivery history configuration
    pub fn with_deliveries(mut self, deliveries: DeliveryConfig) -> Self {
        self.deliveries = deliveries;
        self
    }

    /// Defaults overlaid with the process environment.
    #[cfg(feature = "std")]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    ///
    /// Empty values are treated as unset. Strings longer than their field
    /// and histories above [`MAX_HISTORY`] are rejected, not truncated.
    pub fn from_lookup<F, S>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<S>,
        S: AsRef<str>,
    {
        let get = |key| lookup(key).filter(|v| !v.as_ref().trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = get("PORT") {
            config.web.port = parse_value("PORT", v.as_ref())?;
        }
        if let Some(v) = get("CORS_PERMISSIVE") {
            config.web.cors_permissive = parse_bool("CORS_PERMISSIVE", v.as_ref())?;
        }
        if let Some(v) = get("IRSEND_PROGRAM") {
            config.ir.program = parse_bounded("IRSEND_PROGRAM", v.as_ref())?;
        }
        if let Some(v) = get("IR_REMOTE") {
            config.ir.remote = parse_bounded("IR_REMOTE", v.as_ref())?;
        }
        if let Some(v) = get("GPIO_ENABLED") {
            config.gpio.enabled = parse_bool("GPIO_ENABLED", v.as_ref())?;
        }
        if let Some(v) = get("GPIO_PINS") {
            config.gpio.pins = parse_pins("GPIO_PINS", v.as_ref())?;
        }
        if let Some(v) = get("DELIVERY_HISTORY") {
            config.deliveries.history = parse_history("DELIVERY_HISTORY", v.as_ref())?;
        }

        Ok(config)
    }
}

// ============================================================================
// Web Config
// ============================================================================

/// Web server configuration
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WebConfig {
    /// Port to listen on
    pub port: u16,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cors_permissive: true,
        }
    }
}

impl WebConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS mode
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }
}

// ============================================================================
// IR Config
// ============================================================================

/// IR transmitter configuration
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IrConfig {
    /// LIRC client program (name on PATH or absolute path)
    pub program: LongString,
    /// Remote definition name in the LIRC config
    pub remote: ShortString,
}

impl Default for IrConfig {
    fn default() -> Self {
        Self {
            program: long_string("irsend"),
            remote: short_string("LEGO_Single_Output"),
        }
    }
}

impl IrConfig {
    /// Set the program
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = long_string(program);
        self
    }

    /// Set the remote name
    pub fn with_remote(mut self, remote: &str) -> Self {
        self.remote = short_string(remote);
        self
    }
}

// ============================================================================
// GPIO Config
// ============================================================================

/// GPIO input monitoring configuration
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpioConfig {
    /// Kernel GPIO numbers to watch
    pub pins: PinList,
    /// Per-pin poll timeout in milliseconds
    pub poll_timeout_ms: u32,
    /// Whether monitoring is enabled
    pub enabled: bool,
}

impl Default for GpioConfig {
    fn default() -> Self {
        let mut pins = PinList::new();
        // Header pins 38 and 40
        let _ = pins.push(20);
        let _ = pins.push(21);
        Self {
            pins,
            poll_timeout_ms: 100,
            enabled: true,
        }
    }
}

impl GpioConfig {
    /// Replace the pin list. Pins beyond [`MAX_PINS`] are ignored.
    pub fn with_pins(mut self, pins: &[u64]) -> Self {
        self.pins = pins.iter().copied().take(MAX_PINS).collect();
        self
    }

    /// Set the poll timeout
    pub fn with_poll_timeout_ms(mut self, ms: u32) -> Self {
        self.poll_timeout_ms = ms;
        self
    }

    /// Poll timeout clamped to [`POLL_TIMEOUT_RANGE_MS`].
    ///
    /// Zero would spin and very large values would never yield to the next
    /// pin or the stop flag.
    pub fn effective_poll_timeout_ms(&self) -> u32 {
        self.poll_timeout_ms
            .clamp(*POLL_TIMEOUT_RANGE_MS.start(), *POLL_TIMEOUT_RANGE_MS.end())
    }

    /// Enable or disable monitoring
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

// ============================================================================
// Delivery Config
// ============================================================================

/// Delivery status history configuration
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeliveryConfig {
    /// Number of recent transmissions kept for `/api/deliveries`
    pub history: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self { history: 64 }
    }
}

impl DeliveryConfig {
    /// Set the history length, capped at [`MAX_HISTORY`]
    pub fn with_history(mut self, history: usize) -> Self {
        self.history = history.min(MAX_HISTORY);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(&'static str, &'a str)]) -> impl Fn(&'static str) -> Option<&'a str> {
        move |key| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.web.port, 8080);
        assert!(config.web.cors_permissive);
        assert_eq!(config.ir.program.as_str(), "irsend");
        assert_eq!(config.ir.remote.as_str(), "LEGO_Single_Output");
        assert_eq!(config.gpio.pins.as_slice(), &[20, 21]);
        assert!(config.gpio.enabled);
        assert_eq!(config.deliveries.history, 64);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::default()
            .with_web(WebConfig::default().with_port(3000).with_cors(false))
            .with_ir(IrConfig::default().with_program("/opt/lirc/irsend"))
            .with_gpio(GpioConfig::default().with_pins(&[5, 6, 13]).with_enabled(false))
            .with_deliveries(DeliveryConfig::default().with_history(8));

        assert_eq!(config.web.port, 3000);
        assert!(!config.web.cors_permissive);
        assert_eq!(config.ir.program.as_str(), "/opt/lirc/irsend");
        assert_eq!(config.gpio.pins.as_slice(), &[5, 6, 13]);
        assert!(!config.gpio.enabled);
        assert_eq!(config.deliveries.history, 8);
    }

    #[test]
    fn with_pins_caps_length() {
        let many: [u64; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        let gpio = GpioConfig::default().with_pins(&many);
        assert_eq!(gpio.pins.len(), MAX_PINS);
    }

    #[test]
    fn from_lookup_empty_is_default() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn from_lookup_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("CORS_PERMISSIVE", "off"),
            ("IRSEND_PROGRAM", "/usr/bin/irsend"),
            ("IR_REMOTE", "LEGO_Combo_Direct"),
            ("GPIO_ENABLED", "false"),
            ("GPIO_PINS", "17, 27"),
            ("DELIVERY_HISTORY", "16"),
        ]))
        .unwrap();

        assert_eq!(config.web.port, 9000);
        assert!(!config.web.cors_permissive);
        assert_eq!(config.ir.program.as_str(), "/usr/bin/irsend");
        assert_eq!(config.ir.remote.as_str(), "LEGO_Combo_Direct");
        assert!(!config.gpio.enabled);
        assert_eq!(config.gpio.pins.as_slice(), &[17, 27]);
        assert_eq!(config.deliveries.history, 16);
    }

    #[test]
    fn from_lookup_blank_value_ignored() {
        let config = Config::from_lookup(lookup(&[("PORT", "  ")])).unwrap();
        assert_eq!(config.web.port, 8080);
    }

    #[test]
    fn from_lookup_bad_port() {
        let err = Config::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert_eq!(err.key, "PORT");
        assert_eq!(err.value.as_str(), "http");
    }

    #[test]
    fn from_lookup_bad_pins() {
        let err = Config::from_lookup(lookup(&[("GPIO_PINS", "20,x")])).unwrap_err();
        assert_eq!(err.key, "GPIO_PINS");

        let err = Config::from_lookup(lookup(&[("GPIO_PINS", "1,2,3,4,5,6,7,8,9")])).unwrap_err();
        assert_eq!(err.key, "GPIO_PINS");
    }

    #[test]
    fn from_lookup_rejects_overlong_program() {
        let program = format!("/opt/{}/irsend", "lirc".repeat(34));
        assert!(program.len() > MAX_LONG_STRING);

        let err = Config::from_lookup(lookup(&[("IRSEND_PROGRAM", program.as_str())])).unwrap_err();
        assert_eq!(err.key, "IRSEND_PROGRAM");
    }

    #[test]
    fn from_lookup_rejects_overlong_remote() {
        let remote = "R".repeat(MAX_SHORT_STRING + 1);
        let err = Config::from_lookup(lookup(&[("IR_REMOTE", remote.as_str())])).unwrap_err();
        assert_eq!(err.key, "IR_REMOTE");

        let remote = "R".repeat(MAX_SHORT_STRING);
        let config = Config::from_lookup(lookup(&[("IR_REMOTE", remote.as_str())])).unwrap();
        assert_eq!(config.ir.remote.as_str(), remote);
    }

    #[test]
    fn from_lookup_history_bound() {
        let max = MAX_HISTORY.to_string();
        let config = Config::from_lookup(lookup(&[("DELIVERY_HISTORY", max.as_str())])).unwrap();
        assert_eq!(config.deliveries.history, MAX_HISTORY);

        let over = (MAX_HISTORY + 1).to_string();
        let err = Config::from_lookup(lookup(&[("DELIVERY_HISTORY", over.as_str())])).unwrap_err();
        assert_eq!(err.key, "DELIVERY_HISTORY");

        let err = Config::from_lookup(lookup(&[("DELIVERY_HISTORY", "18446744073709551615")]))
            .unwrap_err();
        assert_eq!(err.key, "DELIVERY_HISTORY");
    }

    #[test]
    fn with_history_caps_length() {
        let deliveries = DeliveryConfig::default().with_history(usize::MAX);
        assert_eq!(deliveries.history, MAX_HISTORY);
    }

    #[test]
    fn poll_timeout_is_clamped() {
        let gpio = GpioConfig::default();
        assert_eq!(gpio.effective_poll_timeout_ms(), 100);
        assert_eq!(gpio.clone().with_poll_timeout_ms(0).effective_poll_timeout_ms(), 1);
        assert_eq!(
            gpio.with_poll_timeout_ms(u32::MAX).effective_poll_timeout_ms(),
            *POLL_TIMEOUT_RANGE_MS.end()
        );
    }

    #[test]
    fn from_lookup_bad_bool() {
        let err = Config::from_lookup(lookup(&[("GPIO_ENABLED", "maybe")])).unwrap_err();
        assert_eq!(err.key, "GPIO_ENABLED");
    }

    #[test]
    fn short_string_truncation() {
        let long_input = "a".repeat(100);
        let s = short_string(&long_input);
        assert_eq!(s.len(), MAX_SHORT_STRING);
    }

    #[test]
    fn long_string_truncation() {
        let long_input = "b".repeat(200);
        let s = long_string(&long_input);
        assert_eq!(s.len(), MAX_LONG_STRING);
    }

    #[test]
    fn string_helpers_utf8_boundary() {
        // 4-byte chars: 17 of them is 68 bytes, only 16 fit
        let input = "\u{1F682}".repeat(17);
        let s = short_string(&input);
        assert_eq!(s.len(), 64);
        assert!(core::str::from_utf8(s.as_bytes()).is_ok());
    }
}
