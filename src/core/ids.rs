use rand::Rng;
use tracing::warn;

use super::Coin;
use crate::error::GenerationError;

/// Returned when the entropy source fails while building a txid.
pub const FALLBACK_TXID: &str = "0000000000000000000000000000000000000000000000000000000000000000";
/// Returned when the entropy source fails while building an address.
pub const FALLBACK_ADDRESS: &str = "unavailable";

const BASE58_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const BECH32_CHARSET: &[u8] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const LEGACY_ADDRESS_LEN: usize = 34;
const SEGWIT_ADDRESS_LEN: usize = 42;
const ETH_ADDRESS_BYTES: usize = 20;

/// Generate a cosmetic transaction id: 64 lowercase hex chars, `0x`-prefixed for ETH.
pub fn generate_txid<R: Rng + ?Sized>(coin: Coin, rng: &mut R) -> String {
    match try_generate_txid(coin, rng) {
        Ok(id) => id,
        Err(e) => {
            warn!("txid generation failed ({e}), using sentinel");
            match coin {
                Coin::Btc => FALLBACK_TXID.to_string(),
                Coin::Eth => format!("0x{FALLBACK_TXID}"),
            }
        }
    }
}

/// Generate a plausible-looking address. No checksum, no uniqueness.
pub fn generate_address<R: Rng + ?Sized>(coin: Coin, rng: &mut R) -> String {
    match try_generate_address(coin, rng) {
        Ok(addr) => addr,
        Err(e) => {
            warn!("address generation failed ({e}), using sentinel");
            FALLBACK_ADDRESS.to_string()
        }
    }
}

fn try_generate_txid<R: Rng + ?Sized>(coin: Coin, rng: &mut R) -> Result<String, GenerationError> {
    let mut bytes = [0u8; 32];
    rng.try_fill_bytes(&mut bytes)?;
    let hex = hex::encode(bytes);
    Ok(match coin {
        Coin::Btc => hex,
        Coin::Eth => format!("0x{hex}"),
    })
}

fn try_generate_address<R: Rng + ?Sized>(coin: Coin, rng: &mut R) -> Result<String, GenerationError> {
    match coin {
        Coin::Eth => {
            let mut bytes = [0u8; ETH_ADDRESS_BYTES];
            rng.try_fill_bytes(&mut bytes)?;
            Ok(format!("0x{}", hex::encode(bytes)))
        }
        Coin::Btc => {
            let (prefix, charset, target_len) = match rng.gen_range(0..3) {
                0 => ("1", BASE58_ALPHABET, LEGACY_ADDRESS_LEN),
                1 => ("3", BASE58_ALPHABET, LEGACY_ADDRESS_LEN),
                _ => ("bc1q", BECH32_CHARSET, SEGWIT_ADDRESS_LEN),
            };
            let mut filler = vec![0u8; target_len - prefix.len()];
            rng.try_fill_bytes(&mut filler)?;

            let mut addr = String::with_capacity(target_len);
            addr.push_str(prefix);
            addr.extend(
                filler
                    .iter()
                    .map(|b| charset[*b as usize % charset.len()] as char),
            );
            Ok(addr)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::FailingRng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn is_lower_hex(s: &str) -> bool {
        s.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
    }

    #[test]
    fn btc_txid_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let id = generate_txid(Coin::Btc, &mut rng);
            assert_eq!(id.len(), 64);
            assert!(is_lower_hex(&id), "not hex: {id}");
        }
    }

    #[test]
    fn eth_txid_shape() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..200 {
            let id = generate_txid(Coin::Eth, &mut rng);
            assert!(id.starts_with("0x"));
            assert_eq!(id.len(), 66);
            assert!(is_lower_hex(&id[2..]));
        }
    }

    #[test]
    fn btc_address_prefixes_and_lengths() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen_legacy = false;
        let mut seen_segwit = false;
        for _ in 0..300 {
            let addr = generate_address(Coin::Btc, &mut rng);
            if addr.starts_with("bc1") {
                assert_eq!(addr.len(), 42);
                assert!(addr[4..].bytes().all(|b| BECH32_CHARSET.contains(&b)));
                seen_segwit = true;
            } else {
                assert!(addr.starts_with('1') || addr.starts_with('3'), "{addr}");
                assert_eq!(addr.len(), 34);
                assert!(addr.bytes().all(|b| b.is_ascii_alphanumeric()));
                seen_legacy = true;
            }
        }
        assert!(seen_legacy && seen_segwit);
    }

    #[test]
    fn eth_address_shape() {
        let mut rng = StdRng::seed_from_u64(4);
        let addr = generate_address(Coin::Eth, &mut rng);
        assert_eq!(addr.len(), 42);
        assert!(addr.starts_with("0x"));
        assert!(is_lower_hex(&addr[2..]));
    }

    #[test]
    fn entropy_failure_returns_sentinels() {
        let mut rng = FailingRng;
        assert_eq!(generate_txid(Coin::Btc, &mut rng), FALLBACK_TXID);
        assert_eq!(generate_txid(Coin::Eth, &mut rng), format!("0x{FALLBACK_TXID}"));
        assert_eq!(generate_address(Coin::Btc, &mut rng), FALLBACK_ADDRESS);
        assert_eq!(generate_address(Coin::Eth, &mut rng), FALLBACK_ADDRESS);
    }
}
