use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Critical => "🔴",
            Severity::High => "🟠",
            Severity::Medium => "🟡",
            Severity::Low => "⚪",
        }
    }
}

/// A static threat-intelligence listing. Sources are label strings only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThreatAlert {
    pub id: &'static str,
    pub severity: Severity,
    pub source: &'static str,
    pub title: &'static str,
    pub address: &'static str,
}

pub const THREAT_ALERTS: &[ThreatAlert] = &[
    ThreatAlert {
        id: "TI-001",
        severity: Severity::Critical,
        source: "OFAC SDN",
        title: "Sanctioned entity address received funds",
        address: "1DemoSanctionedWa11etAddressXXXXXX",
    },
    ThreatAlert {
        id: "TI-002",
        severity: Severity::High,
        source: "Chainalysis",
        title: "Mixer withdrawal pattern detected",
        address: "3DemoMixerServiceAddressXXXXXXXXXX",
    },
    ThreatAlert {
        id: "TI-003",
        severity: Severity::High,
        source: "Elliptic",
        title: "Darknet market cluster activity",
        address: "bc1qdemodarknetmarketaddressxxxxxxxxxxxxxx",
    },
    ThreatAlert {
        id: "TI-004",
        severity: Severity::Medium,
        source: "Chainalysis",
        title: "Peel chain originating from exchange hot wallet",
        address: "1DemoPee1ChainHotWa11etXXXXXXXXXXX",
    },
    ThreatAlert {
        id: "TI-005",
        severity: Severity::Critical,
        source: "OFAC SDN",
        title: "Ransomware payment address reused",
        address: "1DemoRansomwarePaymentAddressXXXXX",
    },
    ThreatAlert {
        id: "TI-006",
        severity: Severity::Low,
        source: "Elliptic",
        title: "Dust attack broadcast to tracked addresses",
        address: "bc1qdemodustattacksourceaddressxxxxxxxxxxx",
    },
    ThreatAlert {
        id: "TI-007",
        severity: Severity::Medium,
        source: "Chainalysis",
        title: "RBF fee-bump chain exceeding replacement policy",
        address: "3DemoRbfFeeBumpChainAddressXXXXXXX",
    },
    ThreatAlert {
        id: "TI-008",
        severity: Severity::High,
        source: "Elliptic",
        title: "Bridge exploit proceeds moving",
        address: "0xdemo00000000000000000000000000000b41d9e0",
    },
];

/// `window` consecutive alerts starting at `offset`, wrapping around the list.
pub fn rotate(offset: usize, window: usize) -> Vec<ThreatAlert> {
    let len = THREAT_ALERTS.len();
    THREAT_ALERTS
        .iter()
        .cycle()
        .skip(offset % len)
        .take(window.min(len))
        .copied()
        .collect()
}
