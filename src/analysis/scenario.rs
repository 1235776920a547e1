use rand::Rng;
use serde::Serialize;

use super::AnalysisFocus;

/// Which canned flag a demo fragment forces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Forced {
    Rbf,
    HighValue,
    Suspicious,
    Exchange,
}

/// Substrings of the bundled sample hashes. Matching is case-insensitive.
const DEMO_FRAGMENTS: &[(&str, Forced)] = &[
    ("a1075", Forced::HighValue),
    ("c3297", Forced::Suspicious),
    ("f4f2b", Forced::Rbf),
    ("e8c4d", Forced::Exchange),
];

/// Sample hashes offered to users; each renders a fixed scenario.
pub const SAMPLE_HASHES: &[(&str, &str)] = &[
    (
        "High-value transfer",
        "a1075db55d416d3ca199f55b6084e2115b9345e16c5cf302fc80e9d5fbf5d48d",
    ),
    (
        "Suspicious mixer flow",
        "c3297e6f0a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5",
    ),
    (
        "RBF fee bump",
        "f4f2b9a8d76e5c4b3a29180716253d4e5f6a7b8c9d0e1f2a3b4c5d6e7f8091a2",
    ),
    (
        "Exchange deposit",
        "e8c4d1f2a3b4c5d6e7f80912a3b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5d6",
    ),
];

/// The four booleans every synthesized field is derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub is_rbf: bool,
    pub is_high_value: bool,
    pub is_suspicious: bool,
    pub is_exchange: bool,
}

impl Scenario {
    /// Canned scenario when the hash contains a demo fragment, coin flips otherwise.
    pub fn for_hash<R: Rng + ?Sized>(hash: &str, focus: AnalysisFocus, rng: &mut R) -> Self {
        Self::canned(hash).unwrap_or_else(|| Self::random(focus, rng))
    }

    /// Every fragment present forces its flag; absent flags are off.
    pub fn canned(hash: &str) -> Option<Self> {
        let hash = hash.to_ascii_lowercase();
        let mut scenario = Scenario::default();
        let mut matched = false;
        for (fragment, forced) in DEMO_FRAGMENTS {
            if hash.contains(fragment) {
                matched = true;
                match forced {
                    Forced::Rbf => scenario.is_rbf = true,
                    Forced::HighValue => scenario.is_high_value = true,
                    Forced::Suspicious => scenario.is_suspicious = true,
                    Forced::Exchange => scenario.is_exchange = true,
                }
            }
        }
        matched.then_some(scenario)
    }

    /// Independent coin flips; the RBF view flips RBF more often.
    pub fn random<R: Rng + ?Sized>(focus: AnalysisFocus, rng: &mut R) -> Self {
        let rbf_threshold = match focus {
            AnalysisFocus::General => 0.7,
            AnalysisFocus::Rbf => 0.4,
        };
        Self {
            is_rbf: rng.gen_range(0.0..1.0) > rbf_threshold,
            is_high_value: rng.gen_range(0.0..1.0) > 0.8,
            is_suspicious: rng.gen_range(0.0..1.0) > 0.85,
            is_exchange: rng.gen_range(0.0..1.0) > 0.6,
        }
    }
}
