use crate::annotations::bounding_box::BoundingBox;
use crate::annotations::detection::Detection;
use crate::compliance::containment::containment_ratio;
use itertools::{Either, Itertools};
use std::fmt;

pub const DEFAULT_CONTAINMENT_THRESHOLD: f32 = 0.5;

/// The per-image outcome of matching persons against vests.
///
/// Every input person box ends up in exactly one of the two person lists, in input order. The
/// vest detections are passed through untouched so that overlays can show their confidence.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComplianceResult {
    pub compliant_persons: Vec<BoundingBox>,
    pub non_compliant_persons: Vec<BoundingBox>,
    pub vest_detections: Vec<Detection>,
}

impl ComplianceResult {
    pub fn compliant_count(&self) -> usize {
        self.compliant_persons.len()
    }

    pub fn non_compliant_count(&self) -> usize {
        self.non_compliant_persons.len()
    }

    pub fn person_count(&self) -> usize {
        self.compliant_count() + self.non_compliant_count()
    }

    pub fn vest_count(&self) -> usize {
        self.vest_detections.len()
    }

    /// True when nobody in the image is missing a vest. An image with no persons is compliant.
    pub fn is_fully_compliant(&self) -> bool {
        self.non_compliant_persons.is_empty()
    }
}

impl fmt::Display for ComplianceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Compliant: {} | Non-compliant: {}",
            self.compliant_count(),
            self.non_compliant_count()
        )
    }
}

/// Decides which persons are wearing a vest.
///
/// A person is compliant as soon as one equipment box, scanned in the given order, has a
/// containment ratio strictly above the threshold. The scan stops at that box; it is a
/// first-sufficient-match rule, not a best-match search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComplianceMatcher {
    containment_threshold: f32,
}

impl Default for ComplianceMatcher {
    fn default() -> Self {
        ComplianceMatcher::new(DEFAULT_CONTAINMENT_THRESHOLD)
    }
}

impl ComplianceMatcher {
    /// `containment_threshold` is expected in `(0, 1)`; the configuration layer validates it.
    pub fn new(containment_threshold: f32) -> Self {
        ComplianceMatcher {
            containment_threshold,
        }
    }

    pub fn containment_threshold(&self) -> f32 {
        self.containment_threshold
    }

    /// Index of the first equipment box that counts as worn by `person`, if any.
    pub fn first_match(&self, person: &BoundingBox, equipment: &[BoundingBox]) -> Option<usize> {
        equipment
            .iter()
            .position(|item| containment_ratio(person, item) > self.containment_threshold)
    }

    pub fn is_compliant(&self, person: &BoundingBox, equipment: &[BoundingBox]) -> bool {
        self.first_match(person, equipment).is_some()
    }

    /// Splits `persons` into `(compliant, non_compliant)`, preserving input order in both.
    pub fn partition(
        &self,
        persons: &[BoundingBox],
        equipment: &[BoundingBox],
    ) -> (Vec<BoundingBox>, Vec<BoundingBox>) {
        persons.iter().partition_map(|person| {
            if self.is_compliant(person, equipment) {
                Either::Left(*person)
            } else {
                Either::Right(*person)
            }
        })
    }

    /// Builds the full result for one image from its person and vest detections.
    pub fn evaluate(&self, persons: &[Detection], vests: &[Detection]) -> ComplianceResult {
        let person_boxes: Vec<BoundingBox> = persons.iter().map(|d| d.annotation).collect();
        let vest_boxes: Vec<BoundingBox> = vests.iter().map(|d| d.annotation).collect();
        let (compliant_persons, non_compliant_persons) = self.partition(&person_boxes, &vest_boxes);
        ComplianceResult {
            compliant_persons,
            non_compliant_persons,
            vest_detections: vests.to_vec(),
        }
    }
}
