//! Application configuration module
//!
//! Server and CORS settings come from environment variables (with `.env`
//! support). The governance section (owner, roster, token allocations) is
//! read from an optional `governance.toml` overlaid by `DAO_*` variables.

use crate::governance::{GovernanceError, MemberId, Membership};
use crate::token::{VotingPowerLedger, WeightMode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load governance configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Missing required configuration value: {0}")]
    MissingVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<GovernanceError> for ConfigError {
    fn from(err: GovernanceError) -> Self {
        ConfigError::InvalidValue(err.to_string())
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0),
            port: 3000,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3001".to_string()],
        }
    }
}

fn default_token_name() -> String {
    "Governance Token".to_string()
}

fn default_token_symbol() -> String {
    "GOV".to_string()
}

/// Governance configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GovernanceConfig {
    /// Sole account allowed to execute proposals
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub weight_mode: WeightMode,
    #[serde(default = "default_token_name")]
    pub token_name: String,
    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,
    /// Token balances, only read in weighted mode
    #[serde(default)]
    pub allocations: BTreeMap<String, u64>,
}

impl GovernanceConfig {
    /// Load from `governance.toml` (optional) and `DAO_*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let source = config::Config::builder()
            .add_source(config::File::with_name("governance").required(false))
            .add_source(
                config::Environment::with_prefix("DAO")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("members"),
            )
            .build()?;

        Ok(source.try_deserialize()?)
    }

    pub fn owner(&self) -> Result<MemberId, ConfigError> {
        if self.owner.trim().is_empty() {
            return Err(ConfigError::MissingVar("DAO_OWNER".to_string()));
        }
        Ok(MemberId::parse(&self.owner)?)
    }

    pub fn membership(&self) -> Result<Membership, ConfigError> {
        let members = self
            .members
            .iter()
            .map(|m| MemberId::parse(m))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Membership::new(self.owner()?, members))
    }

    /// Build the voting power ledger for the configured mode
    pub fn ledger(&self, membership: &Membership) -> Result<VotingPowerLedger, ConfigError> {
        match self.weight_mode {
            WeightMode::Simple => Ok(VotingPowerLedger::simple(
                &self.token_name,
                &self.token_symbol,
                membership.members().cloned(),
            )),
            WeightMode::Weighted => {
                if self.allocations.is_empty() {
                    return Err(ConfigError::InvalidValue(
                        "Weighted mode requires at least one allocation".to_string(),
                    ));
                }
                let mut allocations = BTreeMap::new();
                for (raw, balance) in &self.allocations {
                    let member = MemberId::parse(raw)?;
                    if !membership.is_member(&member) {
                        return Err(ConfigError::InvalidValue(format!(
                            "Allocation for {} who is not a member",
                            member
                        )));
                    }
                    *allocations.entry(member).or_insert(0u64) += *balance;
                }
                Ok(VotingPowerLedger::weighted(
                    &self.token_name,
                    &self.token_symbol,
                    allocations,
                ))
            }
        }
    }
}

/// Complete application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub governance: GovernanceConfig,
}

impl Settings {
    /// Load settings from environment variables and the governance file
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();

        let server = ServerConfig {
            host: std::env::var("HOST")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(|| ServerConfig::default().port),
        };

        let cors = CorsConfig {
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|| CorsConfig::default().allowed_origins),
        };

        let governance = GovernanceConfig::load()?;
        // Fail at startup rather than on the first request
        let membership = governance.membership()?;
        governance.ledger(&membership)?;

        Ok(Self {
            server,
            cors,
            governance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> GovernanceConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_governance_defaults() {
        let config = from_toml(r#"owner = "0xOwner""#);
        assert_eq!(config.weight_mode, WeightMode::Simple);
        assert_eq!(config.token_name, "Governance Token");
        assert_eq!(config.token_symbol, "GOV");
        assert!(config.members.is_empty());
    }

    #[test]
    fn test_missing_owner_is_rejected() {
        let config = from_toml(r#"members = ["alice"]"#);
        assert!(matches!(config.membership(), Err(ConfigError::MissingVar(_))));
    }

    #[test]
    fn test_simple_mode_gives_every_member_one_vote() {
        let config = from_toml(
            r#"
            owner = "0xOwner"
            members = ["alice", "bob"]
            "#,
        );
        let membership = config.membership().unwrap();
        let ledger = config.ledger(&membership).unwrap();

        assert_eq!(membership.len(), 3);
        assert_eq!(ledger.total_supply(), 3);
        assert_eq!(ledger.current_weight(&MemberId::parse("0xowner").unwrap()), Ok(1));
    }

    #[test]
    fn test_weighted_mode_reads_allocations() {
        let config = from_toml(
            r#"
            owner = "owner"
            members = ["alice", "bob"]
            weight_mode = "weighted"
            token_symbol = "VOTE"

            [allocations]
            alice = 60
            bob = 40
            "#,
        );
        let membership = config.membership().unwrap();
        let ledger = config.ledger(&membership).unwrap();

        assert_eq!(ledger.symbol(), "VOTE");
        assert_eq!(ledger.total_supply(), 100);
        assert_eq!(ledger.current_weight(&MemberId::parse("owner").unwrap()), Ok(0));
    }

    #[test]
    fn test_weighted_mode_rejects_bad_allocations() {
        let empty = from_toml(
            r#"
            owner = "owner"
            weight_mode = "weighted"
            "#,
        );
        let membership = empty.membership().unwrap();
        assert!(matches!(empty.ledger(&membership), Err(ConfigError::InvalidValue(_))));

        let outsider = from_toml(
            r#"
            owner = "owner"
            weight_mode = "weighted"

            [allocations]
            mallory = 5
            "#,
        );
        let membership = outsider.membership().unwrap();
        assert!(matches!(outsider.ledger(&membership), Err(ConfigError::InvalidValue(_))));
    }
}
