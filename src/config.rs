//! Startup configuration for the adapter
//!
//! Loaded once, before the server is built. A missing credential is
//! reported as an error here rather than exiting, the binary decides
//! what to do with it.
//!
//! Values come from the process environment first, then from a `.env`
//! file if one is found.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use log::{debug, info};

use crate::error::Error;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const API_BASE_VAR: &str = "OPENAI_API_BASE";
pub const TIMEOUT_VAR: &str = "OPENAI_TIMEOUT_SECS";

pub const DEFAULT_API_BASE: &str
  = "https://api.openai.com/v1";

/// Adapter configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AdapterConfig
{   /// Bearer credential for the remote API
    pub api_key: String
  , /// API base URL (if custom)
    pub api_base: Option<String>
  , /// Request timeout in seconds, transport default when unset
    pub timeout_secs: Option<u64>
}

// Keeps the key out of logs.
impl std::fmt::Debug for AdapterConfig
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   f.debug_struct("AdapterConfig")
          .field("api_key", &"<redacted>")
          .field("api_base", &self.api_base)
          .field("timeout_secs", &self.timeout_secs)
          .finish()
    }
}

impl AdapterConfig
{   /// Create a config with only a credential
    pub fn new(api_key: impl Into<String>) -> Self
    {   AdapterConfig
        {   api_key: api_key.into()
          , api_base: None
          , timeout_secs: None
        }
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, Error>
    {   Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Process environment, falling back to the nearest `.env` file
    pub fn load() -> Result<Self, Error>
    {   let file_vars = match dotenvy::dotenv_iter()
        {   Ok(iter) => {
              info!("Reading .env file");
              collect_dotenv(iter)?
            }
          , Err(e) if e.not_found() => {
              debug!("No .env file found");
              HashMap::new()
            }
          , Err(e) => return Err(dotenv_error(e))
        };
        Self::layered(file_vars, |key| std::env::var(key).ok())
    }

    /// `lookup` first, then the variables of the given `.env` file
    pub fn from_env_file<P, F>(path: P, lookup: F) -> Result<Self, Error>
    where
      P: AsRef<Path>
    , F: Fn(&str) -> Option<String>
    {   let iter = dotenvy::from_path_iter(path.as_ref())
          .map_err(dotenv_error)?;
        Self::layered(collect_dotenv(iter)?, lookup)
    }

    fn layered<F>(file_vars: HashMap<String, String>, lookup: F)
      -> Result<Self, Error>
    where
      F: Fn(&str) -> Option<String>
    {   Self::from_lookup(|key| {
          lookup(key).or_else(|| file_vars.get(key).cloned())
        })
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
      F: Fn(&str) -> Option<String>
    {   let api_key = lookup(API_KEY_VAR)
          .map(|k| k.trim().to_string())
          .filter(|k| !k.is_empty())
          .ok_or_else(|| {
            Error::MissingApiKey(API_KEY_VAR.to_string())
          })?;

        let api_base = lookup(API_BASE_VAR)
          .map(|b| b.trim().trim_end_matches('/').to_string())
          .filter(|b| !b.is_empty());

        let timeout_secs = match lookup(TIMEOUT_VAR)
        {   Some(raw) => Some(
              raw.trim().parse::<u64>().map_err(|_| {
                Error::InvalidConfiguration(format!(
                  "{} must be a whole number of seconds, got {:?}",
                  TIMEOUT_VAR, raw
                ))
              })?
            )
          , None => None
        };

        let config = AdapterConfig
        {   api_key
          , api_base
          , timeout_secs
        };
        debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    /// Effective API base URL
    pub fn api_base(&self) -> &str
    {   self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    /// Full chat-completion endpoint
    pub fn completions_url(&self) -> String
    {   format!("{}/chat/completions", self.api_base())
    }
}

fn collect_dotenv<I>(iter: I) -> Result<HashMap<String, String>, Error>
where
  I: Iterator<Item = Result<(String, String), dotenvy::Error>>
{   iter.map(|item| item.map_err(dotenv_error)).collect()
}

fn dotenv_error(e: dotenvy::Error) -> Error
{   Error::InvalidConfiguration(format!(".env file: {}", e))
}
