//! Per-modality classifiers
//!
//! Every modality shares one invocation path: `Classifier::classify` takes
//! the preprocessed (1,128,128,3) tensor and returns P(disease) in [0,1].
//! Production models are ONNX artifacts executed with `tract-onnx`.

use crate::config::ModelPaths;
use crate::preprocess::{ImageTensor, INPUT_SHAPE};
use pdscan_common::{Confidence, Error, Modality, Result};
use std::path::Path;
use std::sync::Arc;
use tract_onnx::prelude::*;
use tracing::{debug, info};

/// Binary image classifier for one modality
pub trait Classifier: Send + Sync {
    /// Classifier name for logging
    fn name(&self) -> &str;

    /// Run inference on one preprocessed image
    fn classify(&self, input: &ImageTensor) -> Result<Confidence>;
}

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX-backed classifier emitting a (1,1) sigmoid output
pub struct OnnxClassifier {
    name: String,
    plan: OnnxPlan,
}

impl OnnxClassifier {
    /// Load and optimize a model with its input fixed to f32 (1,128,128,3)
    pub fn load(name: impl Into<String>, path: &Path) -> Result<Self> {
        let name = name.into();
        if !path.exists() {
            return Err(Error::Model(format!(
                "{} artifact not found: {}",
                name,
                path.display()
            )));
        }

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact(INPUT_SHAPE).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| Error::Model(format!("Failed to load {}: {}", name, e)))?;

        info!("Loaded {} from {}", name, path.display());

        Ok(Self { name, plan })
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, input: &ImageTensor) -> Result<Confidence> {
        let tensor = Tensor::from_shape::<f32>(&input.shape(), input.data())
            .map_err(|e| Error::Model(format!("{}: bad input tensor: {}", self.name, e)))?;

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| Error::Model(format!("{}: inference failed: {}", self.name, e)))?;

        let output = outputs
            .first()
            .ok_or_else(|| Error::Model(format!("{}: model produced no output", self.name)))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| Error::Model(format!("{}: unexpected output type: {}", self.name, e)))?;
        let raw = view
            .iter()
            .next()
            .copied()
            .ok_or_else(|| Error::Model(format!("{}: empty output tensor", self.name)))?;

        debug!("{} raw output {:.6}", self.name, raw);

        Confidence::new(f64::from(raw))
            .map_err(|e| Error::Model(format!("{}: {}", self.name, e)))
    }
}

/// One classifier per modality
#[derive(Clone)]
pub struct ClassifierSet {
    spiral: Arc<dyn Classifier>,
    mri: Arc<dyn Classifier>,
    wave: Arc<dyn Classifier>,
}

impl ClassifierSet {
    pub fn new(
        spiral: Arc<dyn Classifier>,
        mri: Arc<dyn Classifier>,
        wave: Arc<dyn Classifier>,
    ) -> Self {
        Self { spiral, mri, wave }
    }

    /// Load all three ONNX models; any missing artifact fails the whole set
    pub fn load_onnx(paths: &ModelPaths) -> Result<Self> {
        let load = |modality: Modality| -> Result<Arc<dyn Classifier>> {
            let classifier =
                OnnxClassifier::load(modality.model_name(), paths.for_modality(modality))?;
            Ok(Arc::new(classifier))
        };

        Ok(Self::new(
            load(Modality::Spiral)?,
            load(Modality::Mri)?,
            load(Modality::Wave)?,
        ))
    }

    pub fn for_modality(&self, modality: Modality) -> &dyn Classifier {
        match modality {
            Modality::Spiral => self.spiral.as_ref(),
            Modality::Mri => self.mri.as_ref(),
            Modality::Wave => self.wave.as_ref(),
        }
    }

    pub fn classify(&self, modality: Modality, input: &ImageTensor) -> Result<Confidence> {
        let classifier = self.for_modality(modality);
        debug!("Analyzing image for {}", classifier.name());
        classifier.classify(input)
    }
}
