//! Section validation in fixed order

use crate::config::settings::Sections;
use crate::error::Result;
use tracing::{error, info};

/// Validate trading, then backend, then API.
///
/// Stops at the first failure; later sections are not checked.
pub fn validate_all(sections: &Sections) -> Result<()> {
    let result = sections
        .trading
        .validate()
        .and_then(|_| sections.backend.validate())
        .and_then(|_| sections.api.validate());

    match &result {
        Ok(()) => info!("All configurations validated successfully"),
        Err(e) => error!("Configuration validation failed: {}", e),
    }

    result
}
