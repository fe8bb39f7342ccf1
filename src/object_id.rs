//! Object identifiers - 12-byte document ids
//!
//! Format: 24 hex characters, e.g. `50c4a3fe6b33139354000159`
//!
//! Layout of generated ids:
//! - bytes 0..4: big-endian unix seconds
//! - bytes 4..9: per-process random value
//! - bytes 9..12: big-endian counter

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static PROCESS_SEED: OnceLock<ProcessSeed> = OnceLock::new();
static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Random parts fixed for the lifetime of the process
struct ProcessSeed {
    random: [u8; 5],
    counter_start: u32,
}

/// Unique identifier of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Generate a fresh id
    pub fn new() -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        let seed = process_seed();
        let count = COUNTER
            .fetch_add(1, Ordering::Relaxed)
            .wrapping_add(seed.counter_start);

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&now.to_be_bytes());
        bytes[4..9].copy_from_slice(&seed.random);
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..4]);
        Self(bytes)
    }

    /// Parse a 24 character hex string
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != 24 {
            return Err(Error::InvalidObjectId(format!(
                "expected 24 hex characters, got {}: {:?}",
                s.len(),
                s
            )));
        }

        let mut bytes = [0u8; 12];
        for (i, pair) in s.as_bytes().chunks(2).enumerate() {
            let hi = hex_value(pair[0]);
            let lo = hex_value(pair[1]);
            match (hi, lo) {
                (Some(hi), Some(lo)) => bytes[i] = (hi << 4) | lo,
                _ => return Err(Error::InvalidObjectId(format!("not a hex string: {:?}", s))),
            }
        }
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn process_seed() -> &'static ProcessSeed {
    PROCESS_SEED.get_or_init(|| ProcessSeed {
        random: rand::random(),
        counter_start: rand::random::<u32>() & 0x00ff_ffff,
    })
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ObjectId::parse(&s).map_err(serde::de::Error::custom)
    }
}
