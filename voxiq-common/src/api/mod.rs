//! API module for shared HTTP API types
//!
//! Request/response types for every backend endpoint, plus the sort keys
//! accepted by the list queries. The HTTP client itself lives in
//! voxiq-client; these types are pure data.

pub mod types;

pub use types::*;

/// Sort keys for the interviews list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterviewSort {
    #[default]
    Recent,
    Name,
    Status,
}

impl InterviewSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewSort::Recent => "recent",
            InterviewSort::Name => "name",
            InterviewSort::Status => "status",
        }
    }
}

impl std::fmt::Display for InterviewSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InterviewSort {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent" => Ok(InterviewSort::Recent),
            "name" => Ok(InterviewSort::Name),
            "status" => Ok(InterviewSort::Status),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown interview sort '{}' (expected recent, name, or status)",
                other
            ))),
        }
    }
}

/// Sort keys for the themes list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeSort {
    #[default]
    Urgency,
    Mentions,
    Recency,
}

impl ThemeSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeSort::Urgency => "urgency",
            ThemeSort::Mentions => "mentions",
            ThemeSort::Recency => "recency",
        }
    }
}

impl std::fmt::Display for ThemeSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ThemeSort {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "urgency" => Ok(ThemeSort::Urgency),
            "mentions" => Ok(ThemeSort::Mentions),
            "recency" => Ok(ThemeSort::Recency),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown theme sort '{}' (expected urgency, mentions, or recency)",
                other
            ))),
        }
    }
}
