//! Configuration for cqlpipe
//!
//! Centralized configuration with sensible defaults.

use serde::{Deserialize, Serialize};

use crate::error::{CqlPipeError, Result};

/// Write strategy for an entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineMode {
    /// Plain inserts (the store overwrites rows with the same `Id`)
    #[default]
    Insert,

    /// Update of declared columns only; forced by `TableInfo::update_columns`
    Update,

    /// Insert new rows and reconcile existing ones (not available on this store)
    InsertAndUpdate,
}

/// Where and how to reach the store
///
/// Parsing connection strings is the driver's business; this is the
/// already-parsed form handed to a `Connector`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSetting {
    /// Cluster contact points (host names or IPs)
    pub contact_points: Vec<String>,

    /// Native protocol port
    pub port: u16,

    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for ConnectionSetting {
    fn default() -> Self {
        Self {
            contact_points: vec!["127.0.0.1".to_string()],
            port: 9042,
            username: None,
            password: None,
        }
    }
}

/// Main configuration for a pipeline instance
#[derive(Debug, Clone, Default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Connection Configuration
    // -------------------------------------------------------------------------
    pub connection: ConnectionSetting,

    // -------------------------------------------------------------------------
    // Write Configuration
    // -------------------------------------------------------------------------
    /// Mode given to entities that do not declare update columns.
    /// Must not be `Update`.
    pub default_mode: PipelineMode,

    /// When set, every batch is executed on the named write channel instead
    /// of the calling thread
    pub write_channel: Option<String>,
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the settings that cannot be expressed in the types
    pub fn validate(&self) -> Result<()> {
        check_default_mode(self.default_mode)?;

        if self.connection.contact_points.is_empty() {
            return Err(CqlPipeError::configuration(
                "at least one contact point is required",
            ));
        }

        if let Some(channel) = &self.write_channel {
            if channel.trim().is_empty() {
                return Err(CqlPipeError::configuration(
                    "write channel name must not be empty",
                ));
            }
        }

        Ok(())
    }
}

/// `Update` needs a selective update statement, which this store never gets
pub(crate) fn check_default_mode(mode: PipelineMode) -> Result<()> {
    if mode == PipelineMode::Update {
        return Err(CqlPipeError::configuration(
            "can not set default pipeline mode to Update",
        ));
    }
    Ok(())
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Replace the whole connection setting
    pub fn connection(mut self, connection: ConnectionSetting) -> Self {
        self.config.connection = connection;
        self
    }

    /// Set the cluster contact points
    pub fn contact_points<I, S>(mut self, points: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.connection.contact_points = points.into_iter().map(Into::into).collect();
        self
    }

    /// Set the native protocol port
    pub fn port(mut self, port: u16) -> Self {
        self.config.connection.port = port;
        self
    }

    /// Set credentials for password authentication
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.connection.username = Some(username.into());
        self.config.connection.password = Some(password.into());
        self
    }

    /// Set the default pipeline mode
    pub fn default_mode(mut self, mode: PipelineMode) -> Self {
        self.config.default_mode = mode;
        self
    }

    /// Route batch execution through the named write channel
    pub fn write_channel(mut self, name: impl Into<String>) -> Self {
        self.config.write_channel = Some(name.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
