//! src/codec.rs
//!
//! The wire format shared by all three variants. Packets are plain
//! UTF-8 text, pipe-delimited, with no framing beyond the datagram
//! boundary. A trailing NUL byte is tolerated (a relic of fixed-size
//! C buffers on the sending side) and stripped before parsing.

use std::fmt;
use std::str::FromStr;

/// Number of significant digits we emit per field. 17 significant digits
/// round-trips any `f64`, including subnormals and values near the
/// exponent extremes, and comfortably satisfies the "at least 10
/// significant digits" requirement.
const MANTISSA_DIGITS: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError(pub String);

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for DecodeError {}

fn encode_f64(v: f64) -> String {
    format!("{:.*e}", MANTISSA_DIGITS, v)
}

fn decode_f64(field: &str) -> Result<f64, DecodeError> {
    f64::from_str(field.trim())
        .map_err(|e| DecodeError(format!("invalid number {field:?}: {e}")))
}

fn decode_u32(field: &str) -> Result<u32, DecodeError> {
    u32::from_str(field.trim())
        .map_err(|e| DecodeError(format!("invalid epoch {field:?}: {e}")))
}

/// Strips a single trailing NUL byte, if present, then the bytes must be
/// valid UTF-8.
fn strip_and_decode_utf8(bytes: &[u8]) -> Result<&str, DecodeError> {
    let bytes = match bytes.last() {
        Some(0) => &bytes[..bytes.len() - 1],
        _ => bytes,
    };
    std::str::from_utf8(bytes).map_err(|e| DecodeError(format!("not valid utf-8: {e}")))
}

fn split_fields(s: &str, expected: usize) -> Result<Vec<&str>, DecodeError> {
    let fields: Vec<&str> = s.split('|').collect();
    if fields.len() != expected {
        return Err(DecodeError(format!(
            "expected {expected} fields, got {} in {s:?}",
            fields.len()
        )));
    }
    Ok(fields)
}

/// `MeanGossip` wire payload: a single decimal number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanMsg {
    pub w: f64,
}

impl MeanMsg {
    pub fn encode(&self) -> Vec<u8> {
        encode_f64(self.w).into_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let s = strip_and_decode_utf8(bytes)?;
        let w = decode_f64(s)?;
        Ok(Self { w })
    }
}

/// `VarGossip` wire payload: `<m0>|<w>|<w2>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarMsg {
    pub m0: f64,
    pub w: f64,
    pub w2: f64,
}

impl VarMsg {
    pub fn encode(&self) -> Vec<u8> {
        format!(
            "{}|{}|{}",
            encode_f64(self.m0),
            encode_f64(self.w),
            encode_f64(self.w2)
        )
        .into_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let s = strip_and_decode_utf8(bytes)?;
        let fields = split_fields(s, 3)?;
        Ok(Self {
            m0: decode_f64(fields[0])?,
            w: decode_f64(fields[1])?,
            w2: decode_f64(fields[2])?,
        })
    }
}

/// `MultiphaseVarGossip` wire payload: `<epoch>|<m0>|<w>|<w2>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochMsg {
    pub epoch: u32,
    pub m0: f64,
    pub w: f64,
    pub w2: f64,
}

impl EpochMsg {
    pub fn encode(&self) -> Vec<u8> {
        format!(
            "{}|{}|{}|{}",
            self.epoch,
            encode_f64(self.m0),
            encode_f64(self.w),
            encode_f64(self.w2)
        )
        .into_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let s = strip_and_decode_utf8(bytes)?;
        let fields = split_fields(s, 4)?;
        Ok(Self {
            epoch: decode_u32(fields[0])?,
            m0: decode_f64(fields[1])?,
            w: decode_f64(fields[2])?,
            w2: decode_f64(fields[3])?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_round_trip() {
        for w in [0.0_f64, -0.0, 4.5, 1e300, -1e-300, f64::MIN_POSITIVE / 4.0] {
            let decoded = MeanMsg::decode(&MeanMsg { w }.encode()).unwrap();
            assert_eq!(decoded.w.to_bits(), w.to_bits(), "round trip for {w}");
        }
    }

    #[test]
    fn var_round_trip() {
        let msg = VarMsg { m0: -0.5, w: 1.25e-9, w2: 1.5625e-18 };
        let decoded = VarMsg::decode(&msg.encode()).unwrap();
        assert_eq!(decoded, msg);
    }

    /// S6: epoch=7, m0=-0.5, w=1.25e-9, w2=1.5625e-18 round-trips within
    /// 1e-10 relative tolerance.
    #[test]
    fn epoch_round_trip_scenario_s6() {
        let msg = EpochMsg { epoch: 7, m0: -0.5, w: 1.25e-9, w2: 1.5625e-18 };
        let decoded = EpochMsg::decode(&msg.encode()).unwrap();
        assert_eq!(decoded.epoch, msg.epoch);
        for (a, b) in [(decoded.m0, msg.m0), (decoded.w, msg.w), (decoded.w2, msg.w2)] {
            let rel = if b == 0.0 { (a - b).abs() } else { ((a - b) / b).abs() };
            assert!(rel < 1e-10, "{a} vs {b}");
        }
    }

    #[test]
    fn tolerates_trailing_nul() {
        let mut bytes = MeanMsg { w: 3.25 }.encode();
        bytes.push(0);
        let decoded = MeanMsg::decode(&bytes).unwrap();
        assert_eq!(decoded.w, 3.25);
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(VarMsg::decode(b"1.0|2.0").is_err());
        assert!(EpochMsg::decode(b"1|2.0|3.0").is_err());
    }

    #[test]
    fn rejects_malformed_number() {
        assert!(MeanMsg::decode(b"not-a-number").is_err());
        assert!(EpochMsg::decode(b"not-an-epoch|1.0|2.0|3.0").is_err());
    }
}
