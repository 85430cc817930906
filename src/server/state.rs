use std::path::PathBuf;
use std::sync::Arc;

use crate::pipeline::Orchestrator;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    /// Caption language used when a request does not name one
    pub default_lang: String,
    pub frontend_dir: PathBuf,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>, default_lang: impl Into<String>, frontend_dir: PathBuf) -> Self {
        Self {
            orchestrator,
            default_lang: default_lang.into(),
            frontend_dir,
        }
    }
}
