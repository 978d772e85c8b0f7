/*! Integration tests for sarsync.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - session: SessionStore expiry, merge and redirect behavior
 * - store: InMemory persistence and the pending-mutation queue
 * - sync: SyncManager and BackgroundSync against test remotes
 * - remote: HttpRemote against a local test server
 * - binding: OfflineBinding load/update/sync flows
 * - indicator: ConnectivityIndicator polling and badges
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sarsync=info")),
        )
        .with_test_writer()
        .try_init();
}

mod helpers;
mod remote;
mod session;
mod store;
mod sync;
