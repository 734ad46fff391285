// # Transport Trait
//
// Defines how the adapter reaches the appliance's REST gateway.
//
// ## Implementations
//
// - reqwest-based: `sds-client` crate (`SolidServer`)
// - In-memory fakes in tests
//
// ## Contract
//
// One call, one HTTP request. Implementations do not retry, cache, or
// interpret the body: non-2xx statuses are returned as a `RawResponse`,
// only failures of the HTTP exchange itself become `Error::Transport`.

use async_trait::async_trait;

use crate::error::Result;
use crate::http::{Method, RawResponse};
use crate::params::Parameters;

/// Executes REST calls against a SOLIDserver appliance
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue `method` on `path` (e.g. `rest/dns_zone_add`) with `params`
    ///
    /// # Returns
    ///
    /// - `Ok(RawResponse)`: The appliance answered (any status)
    /// - `Err(Error::Transport)`: The HTTP exchange failed
    async fn request(&self, method: Method, path: &str, params: &Parameters)
    -> Result<RawResponse>;

    /// Appliance version as an integer (`7.1.0` → 710), 0 when unknown
    fn version(&self) -> u32;
}
