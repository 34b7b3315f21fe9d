//! Sample newsletters used to seed an empty store.

use crate::errors::AppError;
use crate::models::Newsletter;

const SAMPLE_NEWSLETTERS: &str = include_str!("../fixtures/sample_newsletters.json");

pub fn sample_newsletters() -> Result<Vec<Newsletter>, AppError> {
    Ok(serde_json::from_str(SAMPLE_NEWSLETTERS)?)
}
