//! Air-quality assessment for index readings
//!
//! Maps the 0-500 IAQ scale onto the qualitative bands used by the sensor
//! vendor, for logging and for anything that wants a word instead of a number.

/// Qualitative band of an IAQ value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IaqLevel {
    /// 0-50
    Excellent,
    /// 51-100
    Good,
    /// 101-150
    LightlyPolluted,
    /// 151-200
    ModeratelyPolluted,
    /// 201-250
    HeavilyPolluted,
    /// 251-350
    SeverelyPolluted,
    /// Above 350
    ExtremelyPolluted,
}

impl IaqLevel {
    /// Assess the band for an IAQ value. Negative values count as excellent.
    pub fn assess(iaq: f32) -> Self {
        if iaq <= 50.0 {
            Self::Excellent
        } else if iaq <= 100.0 {
            Self::Good
        } else if iaq <= 150.0 {
            Self::LightlyPolluted
        } else if iaq <= 200.0 {
            Self::ModeratelyPolluted
        } else if iaq <= 250.0 {
            Self::HeavilyPolluted
        } else if iaq <= 350.0 {
            Self::SeverelyPolluted
        } else {
            Self::ExtremelyPolluted
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::LightlyPolluted => "Lightly polluted",
            Self::ModeratelyPolluted => "Moderately polluted",
            Self::HeavilyPolluted => "Heavily polluted",
            Self::SeverelyPolluted => "Severely polluted",
            Self::ExtremelyPolluted => "Extremely polluted",
        }
    }
}
