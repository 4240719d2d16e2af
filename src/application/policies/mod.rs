//! The six persona policies and their registry.

pub mod deep_value;
pub mod garp;
pub mod momentum_growth;
pub mod passive_index;
pub mod risk_parity;
pub mod value_quality;

use crate::domain::ports::policy::StrategyPolicy;
use crate::domain::values::persona::Persona;

/// The policy implementing a persona's decision rules.
pub fn policy_for(persona: Persona) -> Box<dyn StrategyPolicy> {
    match persona {
        Persona::ValueQuality => Box::new(value_quality::ValueQualityPolicy),
        Persona::DeepValue => Box::new(deep_value::DeepValuePolicy),
        Persona::Garp => Box::new(garp::GarpPolicy),
        Persona::RiskParity => Box::new(risk_parity::RiskParityPolicy),
        Persona::PassiveIndex => Box::new(passive_index::PassiveIndexPolicy),
        Persona::MomentumGrowth => Box::new(momentum_growth::MomentumGrowthPolicy),
    }
}

/// One policy per persona, in `Persona::ALL` order.
pub fn all_policies() -> Vec<Box<dyn StrategyPolicy>> {
    Persona::ALL.iter().map(|p| policy_for(*p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_exhaustive_and_consistent() {
        let policies = all_policies();
        assert_eq!(policies.len(), Persona::ALL.len());
        for (policy, persona) in policies.iter().zip(Persona::ALL) {
            assert_eq!(policy.persona(), persona);
        }
    }
}
