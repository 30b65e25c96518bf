//! Translator selection by runtime target.

use std::sync::Arc;

use agentregistry_core::{PathError, RuntimeSettings, RuntimeTarget, RuntimeTranslator};

use crate::local::LocalTranslator;

/// Build the translator for `target` from `settings`.
///
/// New runtime targets plug in here with their own compiler pair; the
/// resource model and name validation are shared.
pub fn translator_for(
    target: RuntimeTarget,
    settings: &RuntimeSettings,
) -> Result<Arc<dyn RuntimeTranslator>, PathError> {
    match target {
        RuntimeTarget::Local => Ok(Arc::new(LocalTranslator::from_settings(settings)?)),
    }
}
