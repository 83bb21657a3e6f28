use log::debug;
use polodb_core::bson::oid::ObjectId;

use crate::services::errors::repository_error::RepositoryError;

/**
 * Convert raw string into store native identifier
 *
 * Only 24 characters long hex strings are accepted, anything else fails
 */
pub fn to_identifier(raw: &str) -> Result<ObjectId, RepositoryError> {
    ObjectId::parse_str(raw).map_err(|_| {
        debug!("Could not parse identifier {}", raw);

        RepositoryError::InvalidIdentifier {
            raw: raw.to_string(),
        }
    })
}
