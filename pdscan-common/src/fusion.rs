// Score Fusion - three independent modality confidences to one verdict
//
// Each classifier emits P(disease) for its own modality. A confident verdict
// requires unanimity at the 0.5 threshold; disagreement reports 0.00.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-modality decision threshold. A confidence must be strictly greater
/// than this to count as a disease prediction.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Classifier output for one modality, interpreted as P(disease) in [0,1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Validate a raw classifier output
    ///
    /// # Errors
    /// `InvalidInput` when the value is NaN or outside [0,1]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidInput(format!(
                "Confidence must be within [0, 1], got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// True when this confidence leans toward the disease class
    ///
    /// Exactly 0.5 is on the healthy side.
    pub fn is_positive(self) -> bool {
        self.0 > DECISION_THRESHOLD
    }
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Confidence::new(value).map_err(serde::de::Error::custom)
    }
}

/// Image acquisition method used as an independent evidence source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Spiral,
    Mri,
    Wave,
}

impl Modality {
    /// All modalities in display order
    pub const ALL: [Modality; 3] = [Modality::Spiral, Modality::Mri, Modality::Wave];

    /// Identifier used in URLs and configuration keys
    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Spiral => "spiral",
            Modality::Mri => "mri",
            Modality::Wave => "wave",
        }
    }

    /// Name of the classifier shown to the user
    pub fn model_name(self) -> &'static str {
        match self {
            Modality::Spiral => "Spiral Model",
            Modality::Mri => "MRI Model",
            Modality::Wave => "Wave Model",
        }
    }

    /// Short label used on charts
    pub fn short_label(self) -> &'static str {
        match self {
            Modality::Spiral => "Spiral",
            Modality::Mri => "MRI",
            Modality::Wave => "Wave",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "spiral" => Ok(Modality::Spiral),
            "mri" => Ok(Modality::Mri),
            "wave" => Ok(Modality::Wave),
            other => Err(Error::InvalidInput(format!(
                "Unknown modality '{}' (expected spiral, mri or wave)",
                other
            ))),
        }
    }
}

/// Classification result for one uploaded image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModalityResult {
    pub modality: Modality,
    pub confidence: Confidence,
}

/// Class a single modality leans toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leaning {
    Disease,
    Healthy,
}

impl Leaning {
    pub fn label(self) -> &'static str {
        match self {
            Leaning::Disease => "Parkinson's Disease",
            Leaning::Healthy => "Healthy",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Leaning::Disease => "red",
            Leaning::Healthy => "green",
        }
    }
}

/// Immediate feedback for one modality, shown before fusion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalityAssessment {
    pub modality: Modality,
    pub confidence: Confidence,
    pub leaning: Leaning,
    /// Confidence in favor of the leaning class, as a percentage
    pub display_confidence: f64,
}

impl ModalityAssessment {
    /// e.g. "Spiral Model predicts Healthy with 80.00% confidence."
    pub fn message(&self) -> String {
        format!(
            "{} predicts {} with {:.2}% confidence.",
            self.modality.model_name(),
            self.leaning.label(),
            self.display_confidence
        )
    }
}

/// Apply the per-modality display rule
///
/// Always reports confidence in favor of whichever class the model leans
/// toward: `c * 100` when `c > 0.5`, otherwise `(1 - c) * 100`.
pub fn assess(result: ModalityResult) -> ModalityAssessment {
    let c = result.confidence.value();
    let (leaning, display_confidence) = if result.confidence.is_positive() {
        (Leaning::Disease, c * 100.0)
    } else {
        (Leaning::Healthy, (1.0 - c) * 100.0)
    };

    ModalityAssessment {
        modality: result.modality,
        confidence: result.confidence,
        leaning,
        display_confidence,
    }
}

/// Final categorical output of score fusion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Healthy,
    ParkinsonsDisease,
    LikelyParkinsonsDisease,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Healthy => "Healthy",
            Verdict::ParkinsonsDisease => "Parkinson's Disease",
            Verdict::LikelyParkinsonsDisease => "Likely Parkinson's Disease",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Verdict::Healthy => "green",
            Verdict::ParkinsonsDisease => "red",
            Verdict::LikelyParkinsonsDisease => "yellow",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Verdict plus aggregate confidence percentage
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FusionOutcome {
    pub verdict: Verdict,
    /// Percentage in [0,100]; exactly 0.0 when modalities disagree
    pub aggregate_confidence: f64,
}

impl FusionOutcome {
    pub fn headline(&self) -> String {
        format!(
            "Model predicts {}, need to consult doctor.",
            self.verdict.label()
        )
    }
}

/// Combine the three modality confidences into one verdict
///
/// - all ≤ 0.5: Healthy at `(1 - mean) * 100`
/// - all > 0.5: Parkinson's Disease at `mean * 100`
/// - otherwise: Likely Parkinson's Disease at 0.00
pub fn fuse(spiral: Confidence, mri: Confidence, wave: Confidence) -> FusionOutcome {
    let scores = [spiral, mri, wave];
    let mean = scores.iter().map(|c| c.value()).sum::<f64>() / scores.len() as f64;

    if scores.iter().all(|c| !c.is_positive()) {
        FusionOutcome {
            verdict: Verdict::Healthy,
            aggregate_confidence: (1.0 - mean) * 100.0,
        }
    } else if scores.iter().all(|c| c.is_positive()) {
        FusionOutcome {
            verdict: Verdict::ParkinsonsDisease,
            aggregate_confidence: mean * 100.0,
        }
    } else {
        FusionOutcome {
            verdict: Verdict::LikelyParkinsonsDisease,
            aggregate_confidence: 0.0,
        }
    }
}

/// At most one result per modality, collected over a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModalitySet {
    spiral: Option<Confidence>,
    mri: Option<Confidence>,
    wave: Option<Confidence>,
}

impl ModalitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a classification, replacing any earlier one for the modality
    pub fn record(&mut self, result: ModalityResult) {
        *self.slot_mut(result.modality) = Some(result.confidence);
    }

    pub fn get(&self, modality: Modality) -> Option<Confidence> {
        match modality {
            Modality::Spiral => self.spiral,
            Modality::Mri => self.mri,
            Modality::Wave => self.wave,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.spiral.is_some() && self.mri.is_some() && self.wave.is_some()
    }

    /// Present results in display order
    pub fn results(&self) -> Vec<ModalityResult> {
        Modality::ALL
            .iter()
            .filter_map(|&modality| {
                self.get(modality)
                    .map(|confidence| ModalityResult { modality, confidence })
            })
            .collect()
    }

    /// Per-modality display feedback for every present result
    pub fn assessments(&self) -> Vec<ModalityAssessment> {
        self.results().into_iter().map(assess).collect()
    }

    /// Fused outcome, or `None` until all three modalities are present
    pub fn fuse(&self) -> Option<FusionOutcome> {
        match (self.spiral, self.mri, self.wave) {
            (Some(spiral), Some(mri), Some(wave)) => Some(fuse(spiral, mri, wave)),
            _ => None,
        }
    }

    fn slot_mut(&mut self, modality: Modality) -> &mut Option<Confidence> {
        match modality {
            Modality::Spiral => &mut self.spiral,
            Modality::Mri => &mut self.mri,
            Modality::Wave => &mut self.wave,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(value: f64) -> Confidence {
        Confidence::new(value).unwrap()
    }

    fn fuse3(a: f64, b: f64, d: f64) -> FusionOutcome {
        fuse(c(a), c(b), c(d))
    }

    #[test]
    fn test_confidence_rejects_out_of_range() {
        assert!(Confidence::new(-0.01).is_err());
        assert!(Confidence::new(1.01).is_err());
        assert!(Confidence::new(f64::NAN).is_err());
        assert!(Confidence::new(0.0).is_ok());
        assert!(Confidence::new(1.0).is_ok());
    }

    #[test]
    fn test_confidence_deserialize_validates() {
        assert!(serde_json::from_str::<Confidence>("0.25").is_ok());
        assert!(serde_json::from_str::<Confidence>("1.5").is_err());
    }

    #[test]
    fn test_assess_disease_leaning() {
        let a = assess(ModalityResult {
            modality: Modality::Spiral,
            confidence: c(0.9),
        });
        assert_eq!(a.leaning, Leaning::Disease);
        assert!((a.display_confidence - 90.0).abs() < 1e-9);
        assert_eq!(
            a.message(),
            "Spiral Model predicts Parkinson's Disease with 90.00% confidence."
        );
    }

    #[test]
    fn test_assess_healthy_leaning() {
        let a = assess(ModalityResult {
            modality: Modality::Mri,
            confidence: c(0.2),
        });
        assert_eq!(a.leaning, Leaning::Healthy);
        assert!((a.display_confidence - 80.0).abs() < 1e-9);
        assert_eq!(a.message(), "MRI Model predicts Healthy with 80.00% confidence.");
    }

    #[test]
    fn test_assess_tie_goes_to_healthy() {
        let a = assess(ModalityResult {
            modality: Modality::Wave,
            confidence: c(0.5),
        });
        assert_eq!(a.leaning, Leaning::Healthy);
        assert!((a.display_confidence - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_assess_display_always_in_percent_range() {
        for step in 0..=100 {
            let a = assess(ModalityResult {
                modality: Modality::Spiral,
                confidence: c(step as f64 / 100.0),
            });
            assert!((0.0..=100.0).contains(&a.display_confidence));
            assert!(a.display_confidence >= 50.0);
        }
    }

    #[test]
    fn test_fuse_unanimous_healthy() {
        let outcome = fuse3(0.2, 0.3, 0.1);
        assert_eq!(outcome.verdict, Verdict::Healthy);
        assert!((outcome.aggregate_confidence - 80.0).abs() < 1e-9);
        assert_eq!(format!("{:.2}", outcome.aggregate_confidence), "80.00");
    }

    #[test]
    fn test_fuse_unanimous_disease() {
        let outcome = fuse3(0.9, 0.8, 0.95);
        assert_eq!(outcome.verdict, Verdict::ParkinsonsDisease);
        assert_eq!(format!("{:.2}", outcome.aggregate_confidence), "88.33");
    }

    #[test]
    fn test_fuse_mixed_reports_zero() {
        let outcome = fuse3(0.9, 0.2, 0.6);
        assert_eq!(outcome.verdict, Verdict::LikelyParkinsonsDisease);
        assert_eq!(outcome.aggregate_confidence, 0.0);
    }

    #[test]
    fn test_fuse_all_half_is_healthy() {
        let outcome = fuse3(0.5, 0.5, 0.5);
        assert_eq!(outcome.verdict, Verdict::Healthy);
        assert!((outcome.aggregate_confidence - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_fuse_just_above_threshold() {
        let outcome = fuse3(0.50001, 0.6, 0.9);
        assert_eq!(outcome.verdict, Verdict::ParkinsonsDisease);
        let expected = (0.50001 + 0.6 + 0.9) / 3.0 * 100.0;
        assert!((outcome.aggregate_confidence - expected).abs() < 1e-9);
    }

    #[test]
    fn test_fuse_single_half_among_positives_is_mixed() {
        let outcome = fuse3(0.5, 0.9, 0.9);
        assert_eq!(outcome.verdict, Verdict::LikelyParkinsonsDisease);
        assert_eq!(outcome.aggregate_confidence, 0.0);
    }

    #[test]
    fn test_fuse_grid_matches_rule() {
        let grid = [0.0, 0.1, 0.49, 0.5, 0.51, 0.75, 1.0];
        for &a in &grid {
            for &b in &grid {
                for &d in &grid {
                    let outcome = fuse3(a, b, d);
                    let mean = (a + b + d) / 3.0;
                    if a <= 0.5 && b <= 0.5 && d <= 0.5 {
                        assert_eq!(outcome.verdict, Verdict::Healthy);
                        assert!((outcome.aggregate_confidence - (1.0 - mean) * 100.0).abs() < 1e-9);
                    } else if a > 0.5 && b > 0.5 && d > 0.5 {
                        assert_eq!(outcome.verdict, Verdict::ParkinsonsDisease);
                        assert!((outcome.aggregate_confidence - mean * 100.0).abs() < 1e-9);
                    } else {
                        assert_eq!(outcome.verdict, Verdict::LikelyParkinsonsDisease);
                        assert_eq!(outcome.aggregate_confidence, 0.0);
                    }
                    assert!((0.0..=100.0).contains(&outcome.aggregate_confidence));
                }
            }
        }
    }

    #[test]
    fn test_modality_set_requires_all_three() {
        let mut set = ModalitySet::new();
        assert!(set.fuse().is_none());

        set.record(ModalityResult { modality: Modality::Spiral, confidence: c(0.9) });
        assert!(set.fuse().is_none());

        set.record(ModalityResult { modality: Modality::Wave, confidence: c(0.95) });
        assert!(set.fuse().is_none());
        assert!(!set.is_complete());

        set.record(ModalityResult { modality: Modality::Mri, confidence: c(0.8) });
        assert!(set.is_complete());
        let outcome = set.fuse().unwrap();
        assert_eq!(outcome.verdict, Verdict::ParkinsonsDisease);
    }

    #[test]
    fn test_modality_set_record_replaces() {
        let mut set = ModalitySet::new();
        set.record(ModalityResult { modality: Modality::Mri, confidence: c(0.9) });
        set.record(ModalityResult { modality: Modality::Mri, confidence: c(0.1) });
        assert_eq!(set.get(Modality::Mri), Some(c(0.1)));
        assert_eq!(set.results().len(), 1);
    }

    #[test]
    fn test_modality_set_results_in_display_order() {
        let mut set = ModalitySet::new();
        set.record(ModalityResult { modality: Modality::Wave, confidence: c(0.3) });
        set.record(ModalityResult { modality: Modality::Spiral, confidence: c(0.7) });
        let order: Vec<Modality> = set.results().iter().map(|r| r.modality).collect();
        assert_eq!(order, vec![Modality::Spiral, Modality::Wave]);
    }

    #[test]
    fn test_modality_parse() {
        assert_eq!("spiral".parse::<Modality>().unwrap(), Modality::Spiral);
        assert_eq!("MRI".parse::<Modality>().unwrap(), Modality::Mri);
        assert_eq!("wave".parse::<Modality>().unwrap(), Modality::Wave);
        assert!("xray".parse::<Modality>().is_err());
    }

    #[test]
    fn test_verdict_presentation() {
        assert_eq!(Verdict::ParkinsonsDisease.color(), "red");
        assert_eq!(Verdict::Healthy.color(), "green");
        assert_eq!(Verdict::LikelyParkinsonsDisease.color(), "yellow");
        let outcome = fuse3(0.9, 0.2, 0.6);
        assert_eq!(
            outcome.headline(),
            "Model predicts Likely Parkinson's Disease, need to consult doctor."
        );
    }
}
