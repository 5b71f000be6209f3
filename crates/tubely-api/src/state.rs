//! Application state shared by every handler.

use crate::auth::JwtService;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::{IngestionOrchestrator, SignedAccessIssuer};
use tubely_storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub repository: Arc<dyn VideoRepository>,
    pub storage: Arc<dyn Storage>,
    pub orchestrator: IngestionOrchestrator,
    pub access: SignedAccessIssuer,
    pub jwt: JwtService,
}
