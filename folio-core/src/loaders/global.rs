//! Singleton loader for site-wide settings

use crate::content::{ContentClient, ContentError, Query};
use crate::model::{GlobalData, GlobalSettings};

/// Read the `global` singleton.
///
/// The singleton always exists, so there is no not-found case: any failure
/// is handed back to the caller untouched.
pub async fn load_global(client: &ContentClient) -> Result<GlobalData, ContentError> {
    let global: GlobalSettings = client.read_singleton("global", &Query::new()).await?;
    Ok(GlobalData { global })
}
