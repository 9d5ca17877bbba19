//! Snowflake identifiers.
//!
//! Every persisted record (users, friend requests, competitions, participants,
//! invitations) is keyed by a 64-bit time-ordered id:
//! - Bits 63-22: milliseconds since [`Snowflake::EPOCH`]
//! - Bits 21-12: worker id (0-1023)
//! - Bits 11-0:  per-millisecond sequence
//!
//! Ordering ids therefore orders records by creation time, which the ranking rules
//! rely on for deterministic tie-breaks.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const WORKER_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;
const MAX_WORKER_ID: u16 = (1 << WORKER_BITS) - 1;
const SEQUENCE_MASK: i64 = (1 << SEQUENCE_BITS) - 1;

/// 64-bit time-ordered identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(i64);

impl Snowflake {
    /// 2024-01-01 00:00:00 UTC in Unix milliseconds
    pub const EPOCH: i64 = 1_704_067_200_000;

    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    pub fn worker_id(&self) -> u16 {
        ((self.0 >> SEQUENCE_BITS) & i64::from(MAX_WORKER_ID)) as u16
    }

    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        s.trim()
            .parse::<i64>()
            .map(Snowflake)
            .map_err(|_| SnowflakeParseError::InvalidFormat(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("invalid id: {0}")]
    InvalidFormat(String),

    #[error("worker id {0} exceeds {MAX_WORKER_ID}")]
    WorkerIdOutOfRange(u16),
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Snowflake {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<Snowflake> for i64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Snowflake::parse(s)
    }
}

// Strings keep 64-bit ids intact for JavaScript clients
impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(v) => Ok(Snowflake(v)),
            Raw::Str(s) => Snowflake::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Lock-free id generator.
///
/// The last issued `(millis << 12 | sequence)` pair is packed into one atomic so a
/// single compare-and-swap both advances the clock and claims a sequence number.
#[derive(Debug)]
pub struct SnowflakeGenerator {
    worker_id: u16,
    state: AtomicI64,
}

impl SnowflakeGenerator {
    pub fn new(worker_id: u16) -> Result<Self, SnowflakeParseError> {
        if worker_id > MAX_WORKER_ID {
            return Err(SnowflakeParseError::WorkerIdOutOfRange(worker_id));
        }
        Ok(Self {
            worker_id,
            state: AtomicI64::new(0),
        })
    }

    pub fn worker_id(&self) -> u16 {
        self.worker_id
    }

    pub fn generate(&self) -> Snowflake {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let now = Utc::now().timestamp_millis() - Snowflake::EPOCH;
            let last = current >> SEQUENCE_BITS;

            // A clock running backwards keeps issuing from the last seen millisecond;
            // sequence exhaustion borrows the next one.
            let next = if now > last {
                now << SEQUENCE_BITS
            } else if current & SEQUENCE_MASK == SEQUENCE_MASK {
                (last + 1) << SEQUENCE_BITS
            } else {
                current + 1
            };

            match self.state.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    let millis = next >> SEQUENCE_BITS;
                    let sequence = next & SEQUENCE_MASK;
                    return Snowflake(
                        (millis << (WORKER_BITS + SEQUENCE_BITS))
                            | (i64::from(self.worker_id) << SEQUENCE_BITS)
                            | sequence,
                    );
                }
                Err(actual) => current = actual,
            }
        }
    }
}

impl Default for SnowflakeGenerator {
    fn default() -> Self {
        Self {
            worker_id: 0,
            state: AtomicI64::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[test]
    fn test_parse_and_display() {
        let id = Snowflake::parse("123456789").unwrap();
        assert_eq!(id.into_inner(), 123_456_789);
        assert_eq!(id.to_string(), "123456789");
        assert!(Snowflake::parse("abc").is_err());
    }

    #[test]
    fn test_json_is_string_and_accepts_numbers() {
        let id = Snowflake::new(123_456_789_012_345_678);
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"123456789012345678\""
        );

        let from_str: Snowflake = serde_json::from_str("\"42\"").unwrap();
        let from_num: Snowflake = serde_json::from_str("42").unwrap();
        assert_eq!(from_str, from_num);
        assert!(serde_json::from_str::<Snowflake>("\"forty-two\"").is_err());
    }

    #[test]
    fn test_generator_rejects_large_worker_id() {
        assert_eq!(
            SnowflakeGenerator::new(1024).unwrap_err(),
            SnowflakeParseError::WorkerIdOutOfRange(1024)
        );
    }

    #[test]
    fn test_generated_ids_increase_and_keep_worker() {
        let gen = SnowflakeGenerator::new(7).unwrap();
        let mut last = Snowflake::default();
        for _ in 0..5000 {
            let id = gen.generate();
            assert!(id > last);
            assert_eq!(id.worker_id(), 7);
            last = id;
        }
    }

    #[test]
    fn test_id_encodes_mint_time() {
        let gen = SnowflakeGenerator::default();
        let before = Utc::now().timestamp_millis();
        let id = gen.generate();
        let minted = (id.into_inner() >> (WORKER_BITS + SEQUENCE_BITS)) + Snowflake::EPOCH;
        // Sequence exhaustion may borrow a few milliseconds ahead.
        assert!(minted >= before);
        assert!(minted <= Utc::now().timestamp_millis() + 5);
    }

    #[test]
    fn test_concurrent_generation_is_unique() {
        let gen = Arc::new(SnowflakeGenerator::new(1).unwrap());
        let seen = Arc::new(Mutex::new(HashSet::new()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gen = Arc::clone(&gen);
                let seen = Arc::clone(&seen);
                thread::spawn(move || {
                    let ids: Vec<_> = (0..1000).map(|_| gen.generate()).collect();
                    seen.lock().unwrap().extend(ids);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(seen.lock().unwrap().len(), 4000);
    }
}
