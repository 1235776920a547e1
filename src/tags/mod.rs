use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Addresses the scorer treats as sanctioned. Demo values only.
pub const BLACKLISTED_ADDRESSES: [&str; 3] = [
    "1DemoSanctionedWa11etAddressXXXXXX",
    "3DemoMixerServiceAddressXXXXXXXXXX",
    "bc1qdemodarknetmarketaddressxxxxxxxxxxxxxx",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Sanctioned,
    Exchange,
    Mixer,
    Darknet,
    Unknown,
}

/// A tag identifying an address as belonging to a known entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressTag {
    pub address: String,
    pub entity: String,
    pub entity_type: EntityType,
    pub confidence: f64,
    pub source: Option<String>,
}

/// Which side of a transaction an address appeared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressRole {
    Input,
    Output,
}

/// A match between a transaction address and a known tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagMatch {
    pub tag: AddressTag,
    pub role: AddressRole,
}

/// In-memory lookup for address matching.
#[derive(Debug, Clone, Default)]
pub struct TagLookup {
    map: HashMap<String, AddressTag>,
}

impl TagLookup {
    /// Lookup preloaded with the sanctioned demo addresses.
    pub fn builtin() -> Self {
        let mut lookup = Self::empty();
        for address in BLACKLISTED_ADDRESSES {
            lookup.insert(AddressTag {
                address: address.to_string(),
                entity: "Sanctioned Entity".to_string(),
                entity_type: EntityType::Sanctioned,
                confidence: 1.0,
                source: Some("OFAC SDN".to_string()),
            });
        }
        tracing::debug!("TagLookup loaded {} built-in address tags", lookup.len());
        lookup
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, address: &str) -> Option<&AddressTag> {
        self.map.get(address)
    }

    pub fn is_blacklisted(&self, address: &str) -> bool {
        self.get(address)
            .is_some_and(|tag| tag.entity_type == EntityType::Sanctioned)
    }

    /// Check the input and output side of a transfer against known tags.
    pub fn check_transfer(&self, input: &str, output: &str) -> Vec<TagMatch> {
        [(input, AddressRole::Input), (output, AddressRole::Output)]
            .into_iter()
            .filter_map(|(addr, role)| {
                self.get(addr).map(|tag| TagMatch {
                    tag: tag.clone(),
                    role,
                })
            })
            .collect()
    }

    pub fn insert(&mut self, tag: AddressTag) {
        self.map.insert(tag.address.clone(), tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange_tag(address: &str) -> AddressTag {
        AddressTag {
            address: address.to_string(),
            entity: "Binance".to_string(),
            entity_type: EntityType::Exchange,
            confidence: 0.9,
            source: Some("manual".to_string()),
        }
    }

    #[test]
    fn builtin_has_three_sanctioned_addresses() {
        let lookup = TagLookup::builtin();
        assert_eq!(lookup.len(), 3);
        for addr in BLACKLISTED_ADDRESSES {
            assert!(lookup.is_blacklisted(addr));
        }
    }

    #[test]
    fn exchange_tag_is_not_blacklisted() {
        let mut lookup = TagLookup::builtin();
        lookup.insert(exchange_tag("1ExchangeHotWallet"));
        assert!(!lookup.is_blacklisted("1ExchangeHotWallet"));
        assert!(lookup.get("1ExchangeHotWallet").is_some());
    }

    #[test]
    fn check_transfer_reports_both_sides() {
        let mut lookup = TagLookup::builtin();
        lookup.insert(exchange_tag("1ExchangeHotWallet"));

        let matches = lookup.check_transfer(BLACKLISTED_ADDRESSES[0], "1ExchangeHotWallet");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].role, AddressRole::Input);
        assert_eq!(matches[0].tag.entity_type, EntityType::Sanctioned);
        assert_eq!(matches[1].role, AddressRole::Output);
        assert_eq!(matches[1].tag.entity, "Binance");
    }

    #[test]
    fn unknown_addresses_have_no_matches() {
        let lookup = TagLookup::builtin();
        assert!(lookup.check_transfer("1Nobody", "3Nobody").is_empty());
        assert!(TagLookup::empty().is_empty());
    }
}
