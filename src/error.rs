use std::fmt;

/// Error type for the GPT-5 adapter
///
/// Every variant except the startup ones is rendered in-band as
/// tool output, so `Display` is the text the host ends up seeing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Tool arguments missing or malformed
    Validation(String)
  , /// Remote API answered with a non-success status
    RemoteApi
    {   status: u16
      , body: String
    }
  , /// Request did not complete or the body was unreadable
    Transport(String)
  , /// Tool name outside the registered set
    UnknownOperation(String)
  , /// Required credential absent at startup
    MissingApiKey(String)
  , /// Startup configuration value could not be used
    InvalidConfiguration(String)
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::Validation(msg) => {
              write!(f, "{}", msg)
            }
          , Error::RemoteApi { status, body } => {
              write!(f, "GPT-5 API error ({}): {}", status, body)
            }
          , Error::Transport(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::UnknownOperation(name) => {
              write!(f, "Unknown tool: {}", name)
            }
          , Error::MissingApiKey(var) => {
              write!(f,
                "{} environment variable is required",
                var
              )
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   Error::Transport(e.to_string())
    }
}
