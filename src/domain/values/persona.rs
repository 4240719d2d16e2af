use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six investor personas. Each maps to exactly one decision policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    ValueQuality,
    DeepValue,
    Garp,
    RiskParity,
    PassiveIndex,
    MomentumGrowth,
}

impl Persona {
    pub const ALL: [Persona; 6] = [
        Persona::ValueQuality,
        Persona::DeepValue,
        Persona::Garp,
        Persona::RiskParity,
        Persona::PassiveIndex,
        Persona::MomentumGrowth,
    ];
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Persona::ValueQuality => write!(f, "value_quality"),
            Persona::DeepValue => write!(f, "deep_value"),
            Persona::Garp => write!(f, "garp"),
            Persona::RiskParity => write!(f, "risk_parity"),
            Persona::PassiveIndex => write!(f, "passive_index"),
            Persona::MomentumGrowth => write!(f, "momentum_growth"),
        }
    }
}

impl FromStr for Persona {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "value_quality" => Ok(Persona::ValueQuality),
            "deep_value" => Ok(Persona::DeepValue),
            "garp" => Ok(Persona::Garp),
            "risk_parity" => Ok(Persona::RiskParity),
            "passive_index" => Ok(Persona::PassiveIndex),
            "momentum_growth" => Ok(Persona::MomentumGrowth),
            _ => Err(format!("Unknown persona: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_from_str_roundtrip() {
        for persona in Persona::ALL {
            let parsed: Persona = persona.to_string().parse().unwrap();
            assert_eq!(parsed, persona);
        }
    }

    #[test]
    fn test_from_str_accepts_hyphens() {
        assert_eq!(
            "value-quality".parse::<Persona>().unwrap(),
            Persona::ValueQuality
        );
        assert!("warren".parse::<Persona>().is_err());
    }
}
