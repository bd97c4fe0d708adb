use serde::{Deserialize, Serialize};

/// Leave probability at or above which a candidate is High risk.
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;
/// Leave probability at or above which a candidate is at least Medium risk.
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }

    /// Case-insensitive parse of a tier name. Returns `None` for anything else.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        [RiskTier::Low, RiskTier::Medium, RiskTier::High]
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Badge variant used by the front-end component library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeVariant {
    Secondary,
    Default,
    Destructive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Green,
    Yellow,
    Red,
}

/// Styling hint only; carries no meaning beyond the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationHint {
    pub badge: BadgeVariant,
    pub tone: Tone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    pub hint: PresentationHint,
}

impl From<RiskTier> for RiskAssessment {
    fn from(tier: RiskTier) -> Self {
        let hint = match tier {
            RiskTier::High => PresentationHint {
                badge: BadgeVariant::Destructive,
                tone: Tone::Red,
            },
            RiskTier::Medium => PresentationHint {
                badge: BadgeVariant::Default,
                tone: Tone::Yellow,
            },
            RiskTier::Low => PresentationHint {
                badge: BadgeVariant::Secondary,
                tone: Tone::Green,
            },
        };
        Self { tier, hint }
    }
}

/// Maps a leave probability to a risk tier.
///
/// Total over all of `f64`: values outside [0, 1] are not rejected, they
/// simply land in the lowest or highest tier. NaN compares false against
/// both thresholds and therefore classifies as Low.
pub fn classify(probability: f64) -> RiskAssessment {
    let tier = if probability >= HIGH_RISK_THRESHOLD {
        RiskTier::High
    } else if probability >= MEDIUM_RISK_THRESHOLD {
        RiskTier::Medium
    } else {
        RiskTier::Low
    };
    tier.into()
}

/// Explanatory factors shown next to the tier on the detail screen.
pub fn risk_factors(tier: RiskTier) -> &'static [&'static str] {
    match tier {
        RiskTier::High => &[
            "Frequent job changes",
            "Short tenure periods",
            "Industry instability patterns",
        ],
        RiskTier::Medium => &["Moderate job mobility", "Career transition indicators"],
        RiskTier::Low => &["Stable employment history", "Long-term commitment patterns"],
    }
}
