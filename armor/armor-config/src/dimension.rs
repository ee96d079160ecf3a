//! Named body dimensions and their reference values.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named body measurement, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[allow(missing_docs)]
pub enum Dimension {
    Height,
    HeadCircumference,
    HeadLength,
    HeadWidth,
    HeadHeight,
    NeckCircumference,
    ChestCircumference,
    WaistCircumference,
    HipCircumference,
    ShoulderWidth,
    TorsoLength,
    BackWidth,
    ShoulderCircumference,
    UpperArmLength,
    UpperArmCircumference,
    ElbowCircumference,
    ForearmLength,
    ForearmCircumference,
    WristCircumference,
    HandLength,
    HandWidth,
    PalmCircumference,
    ThighLength,
    ThighCircumference,
    KneeCircumference,
    CalfLength,
    CalfCircumference,
    AnkleCircumference,
    FootLength,
    FootWidth,
}

/// Number of dimensions in a profile.
pub const DIMENSION_COUNT: usize = 30;

/// Reference (size M) value, minimum and maximum, in millimeters.
struct DimensionInfo {
    name: &'static str,
    reference: f64,
    min: f64,
    max: f64,
}

const fn info(name: &'static str, reference: f64, min: f64, max: f64) -> DimensionInfo {
    DimensionInfo {
        name,
        reference,
        min,
        max,
    }
}

/// Indexed by [`Dimension::index`].
const TABLE: [DimensionInfo; DIMENSION_COUNT] = [
    info("height", 1750.0, 1200.0, 2300.0),
    info("head_circumference", 570.0, 420.0, 700.0),
    info("head_length", 200.0, 140.0, 260.0),
    info("head_width", 160.0, 110.0, 210.0),
    info("head_height", 240.0, 170.0, 310.0),
    info("neck_circumference", 400.0, 260.0, 560.0),
    info("chest_circumference", 1000.0, 700.0, 1500.0),
    info("waist_circumference", 850.0, 550.0, 1400.0),
    info("hip_circumference", 1000.0, 700.0, 1500.0),
    info("shoulder_width", 460.0, 320.0, 620.0),
    info("torso_length", 500.0, 350.0, 680.0),
    info("back_width", 400.0, 270.0, 560.0),
    info("shoulder_circumference", 400.0, 260.0, 580.0),
    info("upper_arm_length", 300.0, 200.0, 410.0),
    info("upper_arm_circumference", 320.0, 200.0, 500.0),
    info("elbow_circumference", 280.0, 180.0, 420.0),
    info("forearm_length", 260.0, 170.0, 360.0),
    info("forearm_circumference", 270.0, 170.0, 400.0),
    info("wrist_circumference", 170.0, 120.0, 250.0),
    info("hand_length", 190.0, 140.0, 250.0),
    info("hand_width", 90.0, 60.0, 130.0),
    info("palm_circumference", 220.0, 150.0, 300.0),
    info("thigh_length", 450.0, 300.0, 600.0),
    info("thigh_circumference", 580.0, 380.0, 850.0),
    info("knee_circumference", 400.0, 270.0, 560.0),
    info("calf_length", 400.0, 270.0, 540.0),
    info("calf_circumference", 380.0, 250.0, 560.0),
    info("ankle_circumference", 240.0, 170.0, 340.0),
    info("foot_length", 270.0, 200.0, 340.0),
    info("foot_width", 100.0, 70.0, 140.0),
];

impl Dimension {
    /// Every dimension, in profile order.
    pub const ALL: [Self; DIMENSION_COUNT] = [
        Self::Height,
        Self::HeadCircumference,
        Self::HeadLength,
        Self::HeadWidth,
        Self::HeadHeight,
        Self::NeckCircumference,
        Self::ChestCircumference,
        Self::WaistCircumference,
        Self::HipCircumference,
        Self::ShoulderWidth,
        Self::TorsoLength,
        Self::BackWidth,
        Self::ShoulderCircumference,
        Self::UpperArmLength,
        Self::UpperArmCircumference,
        Self::ElbowCircumference,
        Self::ForearmLength,
        Self::ForearmCircumference,
        Self::WristCircumference,
        Self::HandLength,
        Self::HandWidth,
        Self::PalmCircumference,
        Self::ThighLength,
        Self::ThighCircumference,
        Self::KneeCircumference,
        Self::CalfLength,
        Self::CalfCircumference,
        Self::AnkleCircumference,
        Self::FootLength,
        Self::FootWidth,
    ];

    /// Position in a profile's value array.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Snake-case field name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        TABLE[self.index()].name
    }

    /// Look up a dimension by its field name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }

    /// Size M reference value.
    #[must_use]
    pub const fn reference(self) -> f64 {
        TABLE[self.index()].reference
    }

    /// Allowed `[min, max]` range.
    #[must_use]
    pub const fn range(self) -> (f64, f64) {
        let entry = &TABLE[self.index()];
        (entry.min, entry.max)
    }

    /// Whether the dimension is a girth (used for loft perimeters).
    #[must_use]
    pub fn is_circumference(self) -> bool {
        self.name().ends_with("circumference")
    }

    /// Dimensions re-derived proportionally when this one is overridden.
    #[must_use]
    pub const fn dependents(self) -> &'static [Self] {
        match self {
            Self::Height => &[
                Self::TorsoLength,
                Self::UpperArmLength,
                Self::ForearmLength,
                Self::ThighLength,
                Self::CalfLength,
            ],
            Self::HeadCircumference => &[Self::HeadLength, Self::HeadWidth],
            Self::ShoulderWidth => &[Self::BackWidth],
            Self::HandLength => &[Self::HandWidth],
            Self::FootLength => &[Self::FootWidth],
            _ => &[],
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
