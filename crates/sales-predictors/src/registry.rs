use std::collections::HashMap;
use std::sync::Arc;

use crate::conversion::ConversionPredictor;
use crate::nba::NextBestActionPredictor;
use crate::needs::NeedsPredictor;
use crate::objection::ObjectionPredictor;
use crate::traits::Predictor;

/// Dispatches by `model_id` rather than by concrete type — the orchestrator
/// never matches on which predictor it got back, only on the `model_id` it
/// asked for.
pub struct PredictorRegistry {
    predictors: HashMap<String, Arc<dyn Predictor>>,
}

impl PredictorRegistry {
    pub fn new() -> Self {
        let mut predictors: HashMap<String, Arc<dyn Predictor>> = HashMap::new();
        let objection: Arc<dyn Predictor> = Arc::new(ObjectionPredictor::new());
        let needs: Arc<dyn Predictor> = Arc::new(NeedsPredictor::new());
        let conversion: Arc<dyn Predictor> = Arc::new(ConversionPredictor::new());
        let nba: Arc<dyn Predictor> = Arc::new(NextBestActionPredictor::new());
        predictors.insert(objection.model_id().to_string(), objection);
        predictors.insert(needs.model_id().to_string(), needs);
        predictors.insert(conversion.model_id().to_string(), conversion);
        predictors.insert(nba.model_id().to_string(), nba);
        Self { predictors }
    }

    pub fn get(&self, model_id: &str) -> Option<Arc<dyn Predictor>> {
        self.predictors.get(model_id).cloned()
    }

    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn Predictor>> {
        self.predictors.values()
    }
}

impl Default for PredictorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_all_four_predictors() {
        let registry = PredictorRegistry::new();
        assert!(registry.get("objection-v1").is_some());
        assert!(registry.get("needs-v1").is_some());
        assert!(registry.get("conversion-v1").is_some());
        assert!(registry.get("nba-v1").is_some());
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn all_iterates_exactly_four() {
        let registry = PredictorRegistry::new();
        assert_eq!(registry.all().count(), 4);
    }
}
