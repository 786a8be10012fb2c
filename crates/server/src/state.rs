use service::auth::AuthService;
use service::settings::SettingsService;
use service::uploads::UploadStore;
use tokio_util::sync::CancellationToken;

/// Shared handler state. Every field is a cheap clone over shared handles.
#[derive(Clone)]
pub struct ServerState {
    pub settings: SettingsService,
    pub auth: AuthService,
    pub uploads: UploadStore,
    /// Cancelled when the server begins shutting down.
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// Token for one request's store calls; cancelled on shutdown.
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}
