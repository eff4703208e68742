//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Billing cycle configuration.
    #[serde(default)]
    pub billing: BillingConfig,
    /// Metrics push configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// SMTP configuration.
    #[serde(default)]
    pub email: EmailConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Billing cycle configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Default maximum call duration in seconds.
    ///
    /// Doubles as the grace period added to `next_*_invoice_at` before an
    /// account is considered ready for invoicing; accounts may override it.
    #[serde(default = "default_max_call_duration")]
    pub max_call_duration: i64,
    /// Interval between invoice generation sweeps, in seconds.
    #[serde(default = "default_generation_interval")]
    pub generation_interval_secs: u64,
    /// Interval between balance threshold sweeps, in seconds.
    #[serde(default = "default_notification_interval")]
    pub notification_interval_secs: u64,
    /// Interval between invoice delivery sweeps, in seconds.
    #[serde(default = "default_delivery_interval")]
    pub delivery_interval_secs: u64,
    /// Maximum delivery attempts for a queued invoice notification.
    #[serde(default = "default_max_delivery_attempts")]
    pub max_delivery_attempts: i32,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            max_call_duration: default_max_call_duration(),
            generation_interval_secs: default_generation_interval(),
            notification_interval_secs: default_notification_interval(),
            delivery_interval_secs: default_delivery_interval(),
            max_delivery_attempts: default_max_delivery_attempts(),
        }
    }
}

fn default_max_call_duration() -> i64 {
    7200
}

fn default_generation_interval() -> u64 {
    300
}

fn default_notification_interval() -> u64 {
    60
}

fn default_delivery_interval() -> u64 {
    60
}

fn default_max_delivery_attempts() -> i32 {
    5
}

/// Metrics push configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Collector endpoint accepting JSON samples.
    #[serde(default = "default_collector_url")]
    pub collector_url: String,
    /// Interval between stats export ticks, in seconds.
    #[serde(default = "default_export_interval")]
    pub export_interval_secs: u64,
    /// Whether the stats export job runs at all.
    #[serde(default = "default_export_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            collector_url: default_collector_url(),
            export_interval_secs: default_export_interval(),
            enabled: default_export_enabled(),
        }
    }
}

fn default_collector_url() -> String {
    "http://localhost:9394/send-metrics".to_string()
}

fn default_export_interval() -> u64 {
    30
}

fn default_export_enabled() -> bool {
    true
}

/// SMTP configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: String,
    /// From address for outgoing mail.
    #[serde(default = "default_from_email")]
    pub from_email: String,
    /// Display name for outgoing mail.
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: default_from_email(),
            from_name: default_from_name(),
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    1025
}

fn default_from_email() -> String {
    "billing@switchbill.local".to_string()
}

fn default_from_name() -> String {
    "Switchbill".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SWITCHBILL").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billing_defaults() {
        let billing = BillingConfig::default();
        assert_eq!(billing.max_call_duration, 7200);
        assert_eq!(billing.generation_interval_secs, 300);
        assert_eq!(billing.max_delivery_attempts, 5);
    }

    #[test]
    fn test_metrics_defaults() {
        let metrics = MetricsConfig::default();
        assert_eq!(metrics.export_interval_secs, 30);
        assert!(metrics.enabled);
    }

    #[test]
    fn test_email_defaults() {
        let email = EmailConfig::default();
        assert_eq!(email.smtp_host, "localhost");
        assert_eq!(email.smtp_port, 1025);
    }
}
