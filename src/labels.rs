//! Declarative label tables that reduce detector output to one scene class.
//!
//! The detector speaks an open vocabulary ("Person", "Car", "Traffic light",
//! "Stop sign", ...). Each [`LabelCategory`] owns the labels it accepts, and
//! [`classify_traffic`] breaks sign detections down further.

use crate::error::{Result, VerdictError};
use crate::types::DetectedObject;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a keyword is compared against a lowercased label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeywordMatch {
    /// Label must equal a keyword.
    Exact,
    /// Label must contain a keyword.
    Contains,
    /// Label must classify as a stoplight or a sign.
    Traffic,
}

/// Scene class a test suite counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelCategory {
    People,
    Vehicles,
    Signs,
}

impl LabelCategory {
    pub const ALL: [LabelCategory; 3] = [
        LabelCategory::People,
        LabelCategory::Vehicles,
        LabelCategory::Signs,
    ];

    /// Keywords accepted for this category.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            LabelCategory::People => &["person", "people", "pedestrian"],
            LabelCategory::Vehicles => &["car", "truck", "vehicle", "bus"],
            LabelCategory::Signs => &["traffic light", "stoplight", "traffic signal", "sign"],
        }
    }

    fn match_mode(&self) -> KeywordMatch {
        match self {
            LabelCategory::People => KeywordMatch::Exact,
            LabelCategory::Vehicles => KeywordMatch::Contains,
            LabelCategory::Signs => KeywordMatch::Traffic,
        }
    }

    /// Check a detector label against this category (case-insensitive).
    ///
    /// Signs accept exactly the labels [`classify_traffic`] places, so a
    /// bare "Bus stop" is not counted.
    pub fn accepts(&self, label: &str) -> bool {
        let mode = self.match_mode();
        if mode == KeywordMatch::Traffic {
            return classify_traffic(label).is_some();
        }
        let label = label.trim().to_lowercase();
        self.keywords().iter().any(|kw| match mode {
            KeywordMatch::Exact => label == *kw,
            KeywordMatch::Contains | KeywordMatch::Traffic => label.contains(kw),
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LabelCategory::People => "people",
            LabelCategory::Vehicles => "vehicles",
            LabelCategory::Signs => "signs",
        }
    }
}

impl fmt::Display for LabelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelCategory {
    type Err = VerdictError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| VerdictError::InvalidInput(format!("unrecognized label category '{}'", s)))
    }
}

/// Keep the detections relevant to `category`, in input order.
///
/// # Example
///
/// ```
/// use detection_verdict::labels::{filter_objects, LabelCategory};
/// use detection_verdict::types::{BoundingBox, DetectedObject, NormalizedQuad};
///
/// let quad = NormalizedQuad::from_bbox(&BoundingBox::new(0.1, 0.1, 0.3, 0.6));
/// let objects = vec![
///     DetectedObject::new("Person", 0.92, quad).unwrap(),
///     DetectedObject::new("Bicycle", 0.81, quad).unwrap(),
/// ];
/// let people = filter_objects(&objects, LabelCategory::People);
/// assert_eq!(people.len(), 1);
/// ```
pub fn filter_objects(objects: &[DetectedObject], category: LabelCategory) -> Vec<DetectedObject> {
    let kept: Vec<DetectedObject> = objects
        .iter()
        .filter(|obj| category.accepts(&obj.label))
        .cloned()
        .collect();

    log::debug!(
        "label filter {}: kept {} of {} detections",
        category,
        kept.len(),
        objects.len()
    );

    kept
}

/// Fine-grained class of a traffic-related detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficClass {
    Stoplight,
    StopSign,
    RegulatorySign,
    StreetSign,
    WarningSign,
    SpeedLimitSign,
    /// A sign the table could not place.
    OtherSign,
}

impl TrafficClass {
    pub fn is_sign(&self) -> bool {
        !matches!(self, TrafficClass::Stoplight)
    }
}

const STOPLIGHT_KEYWORDS: &[&str] = &["traffic light", "stoplight", "traffic signal"];

// First hit wins, so the more specific phrases come first.
const SIGN_TABLE: &[(&str, TrafficClass)] = &[
    ("stop sign", TrafficClass::StopSign),
    ("traffic sign", TrafficClass::RegulatorySign),
    ("road sign", TrafficClass::StreetSign),
    ("warning sign", TrafficClass::WarningSign),
    ("speed limit sign", TrafficClass::SpeedLimitSign),
    ("street sign", TrafficClass::StreetSign),
];

/// Classify a detector label as a stoplight or a kind of sign.
///
/// Returns `None` for labels that are not traffic-related, and for bare
/// "stop" labels that never mention a sign.
pub fn classify_traffic(label: &str) -> Option<TrafficClass> {
    let label = label.trim().to_lowercase();

    if STOPLIGHT_KEYWORDS.iter().any(|kw| label.contains(kw)) {
        return Some(TrafficClass::Stoplight);
    }

    if !(label.contains("sign") || label.contains("stop")) {
        return None;
    }

    SIGN_TABLE
        .iter()
        .find(|(kw, _)| label.contains(kw))
        .map(|&(_, class)| class)
        .or_else(|| label.contains("sign").then_some(TrafficClass::OtherSign))
}

/// Per-class tally of traffic detections for one image.
///
/// Also used as the expected breakdown of a signs case; fields left out of
/// a registry entry read as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficCounts {
    pub total_signs: u64,
    pub total_stoplights: u64,
    pub stop_sign: u64,
    pub regulatory_sign: u64,
    pub street_sign: u64,
    pub warning_sign: u64,
    pub speed_limit_sign: u64,
}

impl TrafficCounts {
    /// Count stoplights and signs in a detection list.
    pub fn tally(objects: &[DetectedObject]) -> Self {
        let mut counts = Self::default();
        for class in objects.iter().filter_map(|obj| classify_traffic(&obj.label)) {
            counts.record(class);
        }
        counts
    }

    fn record(&mut self, class: TrafficClass) {
        if class.is_sign() {
            self.total_signs += 1;
        }
        match class {
            TrafficClass::Stoplight => self.total_stoplights += 1,
            TrafficClass::StopSign => self.stop_sign += 1,
            TrafficClass::RegulatorySign => self.regulatory_sign += 1,
            TrafficClass::StreetSign => self.street_sign += 1,
            TrafficClass::WarningSign => self.warning_sign += 1,
            TrafficClass::SpeedLimitSign => self.speed_limit_sign += 1,
            TrafficClass::OtherSign => {}
        }
    }

    /// Signs plus stoplights.
    pub fn total(&self) -> u64 {
        self.total_signs + self.total_stoplights
    }

    fn fields(&self) -> [(&'static str, u64); 7] {
        [
            ("total_signs", self.total_signs),
            ("total_stoplights", self.total_stoplights),
            ("stop_sign", self.stop_sign),
            ("regulatory_sign", self.regulatory_sign),
            ("street_sign", self.street_sign),
            ("warning_sign", self.warning_sign),
            ("speed_limit_sign", self.speed_limit_sign),
        ]
    }

    /// One reason per class whose count differs from `expected`, in field
    /// order. Empty when every class matches.
    pub fn mismatches(&self, expected: &TrafficCounts) -> Vec<String> {
        self.fields()
            .into_iter()
            .zip(expected.fields())
            .filter(|((_, detected), (_, wanted))| detected != wanted)
            .map(|((name, detected), (_, wanted))| {
                format!("{} count {} does not match expected {}", name, detected, wanted)
            })
            .collect()
    }
}
