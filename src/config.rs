use std::time::Duration;

/// Substring that the APC mini mk2's control port carries in its name on every platform
pub const DEFAULT_DEVICE_KEYWORD: &str = "APC mini mk2 Contr";

/// Settings for connecting to and driving the device.
///
/// ```
/// # use apc_mini::Config;
/// let config = Config::default()
///     .with_client_name("soundboard")
///     .with_blackout_on_drop(false);
/// assert_eq!(config.device_keyword, "APC mini mk2 Contr");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// An endpoint belongs to the device if its name contains this string
    pub device_keyword: String,
    /// Name of the MIDI client, as shown by the host
    pub client_name: String,
    /// Name of the connection to the device's input port, as shown by the host
    pub input_connection_name: String,
    /// Name of the connection to the device's output port
    pub output_connection_name: String,
    /// Push the complete display state right after connecting
    pub paint_on_connect: bool,
    /// Turn every LED off when the adapter is dropped
    pub blackout_on_drop: bool,
    /// How often [`ConnectionMonitor::spawn`](crate::ConnectionMonitor::spawn) checks whether the
    /// device is still there
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_keyword: DEFAULT_DEVICE_KEYWORD.to_owned(),
            client_name: crate::APPLICATION_NAME.to_owned(),
            input_connection_name: format!("{} input", crate::APPLICATION_NAME),
            output_connection_name: format!("{} output", crate::APPLICATION_NAME),
            paint_on_connect: true,
            blackout_on_drop: true,
            poll_interval: Duration::from_secs(2),
        }
    }
}

impl Config {
    pub fn with_device_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.device_keyword = keyword.into();
        self
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    pub fn with_input_connection_name(mut self, name: impl Into<String>) -> Self {
        self.input_connection_name = name.into();
        self
    }

    pub fn with_output_connection_name(mut self, name: impl Into<String>) -> Self {
        self.output_connection_name = name.into();
        self
    }

    pub fn with_paint_on_connect(mut self, paint: bool) -> Self {
        self.paint_on_connect = paint;
        self
    }

    pub fn with_blackout_on_drop(mut self, blackout: bool) -> Self {
        self.blackout_on_drop = blackout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
