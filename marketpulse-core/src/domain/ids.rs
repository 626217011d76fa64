//! Deterministic ID types using BLAKE3.
//!
//! `SignalId` is a content hash of `(symbol, timeframe, timestamp)` — this is
//! what makes `SignalStore::upsert_signal` idempotent on that triple without a
//! round-trip to the store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 32-byte BLAKE3 hash wrapper with hex display and serde as hex string.
macro_rules! hash_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            pub fn from_bytes(data: &[u8]) -> Self {
                Self(*blake3::hash(data).as_bytes())
            }

            pub fn as_hex(&self) -> String {
                self.0.iter().map(|b| format!("{b:02x}")).collect()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), &self.as_hex()[..16])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.as_hex())
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(&self.as_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let hex = String::deserialize(d)?;
                let bytes: Vec<u8> = (0..hex.len())
                    .step_by(2)
                    .map(|i| u8::from_str_radix(&hex[i..i + 2], 16))
                    .collect::<Result<_, _>>()
                    .map_err(serde::de::Error::custom)?;
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| serde::de::Error::custom("expected 32 bytes"))?;
                Ok(Self(arr))
            }
        }
    };
}

hash_id!(SignalId);

impl SignalId {
    /// Deterministic identity key: same (symbol, timeframe, timestamp) always
    /// produces the same id, which is the idempotency mechanism `upsert_signal`
    /// relies on.
    pub fn for_signal(symbol: &str, timeframe: &str, timestamp_millis: i64) -> Self {
        let key = format!("{symbol}|{timeframe}|{timestamp_millis}");
        Self::from_bytes(key.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_triple_same_id() {
        let a = SignalId::for_signal("NIFTY50", "5m", 1_700_000_000_000);
        let b = SignalId::for_signal("NIFTY50", "5m", 1_700_000_000_000);
        assert_eq!(a, b);
    }

    #[test]
    fn different_timestamp_different_id() {
        let a = SignalId::for_signal("NIFTY50", "5m", 1_700_000_000_000);
        let b = SignalId::for_signal("NIFTY50", "5m", 1_700_000_060_000);
        assert_ne!(a, b);
    }

    #[test]
    fn hash_serialization_roundtrip() {
        let id = SignalId::for_signal("BANKNIFTY", "15m", 42);
        let json = serde_json::to_string(&id).unwrap();
        let deser: SignalId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deser);
    }

    #[test]
    fn hash_hex_is_64_chars() {
        let id = SignalId::for_signal("DOWJONES", "1h", 1);
        assert_eq!(id.as_hex().len(), 64);
    }
}
