use std::sync::Arc;

use crate::classify::ZeroShotClassifier;
use crate::generate::TextGenerator;
use crate::knowledge::KnowledgeBase;

/// Shared handler state.
///
/// Everything here is read-only after startup, so handlers share it through
/// plain `Arc`s with no locking.
#[derive(Clone)]
pub struct AppState {
    pub kb: Arc<KnowledgeBase>,
    pub classifier: Arc<ZeroShotClassifier>,
    pub generator: Arc<TextGenerator>,
}

impl AppState {
    pub fn new(
        kb: Arc<KnowledgeBase>,
        classifier: Arc<ZeroShotClassifier>,
        generator: Arc<TextGenerator>,
    ) -> Self {
        Self {
            kb,
            classifier,
            generator,
        }
    }
}
