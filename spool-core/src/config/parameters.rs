//! Winding parameters and their persisted record
//!
//! The three operator-adjustable values survive power cycles. They are
//! serialized with postcard inside a record carrying a magic number,
//! version and CRC so a blank or corrupted flash sector falls back to
//! defaults.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Magic number to identify a valid parameter record
pub const PARAMETERS_MAGIC: u32 = 0x5350_4F4C; // "SPOL"

/// Current parameter record version
pub const PARAMETERS_VERSION: u8 = 1;

/// Maximum serialized size of a parameter record
pub const MAX_PARAMETER_RECORD_SIZE: usize = 32;

/// Operator-adjustable winding parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WindingParameters {
    /// Spindle turns laid across the winding span
    pub required_turns: f32,
    /// Distance from the origin to the first turn (mm)
    pub start_margin_mm: f32,
    /// Distance kept free at the far end of the travel (mm)
    pub end_margin_mm: f32,
}

impl Default for WindingParameters {
    fn default() -> Self {
        Self {
            required_turns: 27.5,
            start_margin_mm: 40.0,
            end_margin_mm: 40.0,
        }
    }
}

/// Errors decoding or encoding a parameter record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParameterError {
    /// Serialization failed
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Invalid magic or version
    InvalidFormat,
    /// CRC check failed
    CrcMismatch,
}

/// Parameter record stored in flash
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParameterRecord {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Stored parameters
    pub params: WindingParameters,
    /// CRC32 over magic, version and params
    pub crc: u32,
}

impl ParameterRecord {
    /// Wrap parameters in a record with a valid CRC
    pub fn new(params: WindingParameters) -> Self {
        let mut record = Self {
            magic: PARAMETERS_MAGIC,
            version: PARAMETERS_VERSION,
            params,
            crc: 0,
        };
        record.crc = record.calculate_crc();
        record
    }

    /// Check if magic and version match
    pub fn is_valid(&self) -> bool {
        self.magic == PARAMETERS_MAGIC && self.version == PARAMETERS_VERSION
    }

    /// Calculate CRC32 over the record (excluding the crc field itself)
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFF_FFFF;
        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, &self.params.required_turns.to_le_bytes());
        crc = crc32_update(crc, &self.params.start_margin_mm.to_le_bytes());
        crc = crc32_update(crc, &self.params.end_margin_mm.to_le_bytes());
        !crc
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }
}

#[cfg(feature = "serde")]
impl ParameterRecord {
    /// Serialize into `buffer`, returning the used bytes
    pub fn encode<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a mut [u8], ParameterError> {
        postcard::to_slice(self, buffer).map_err(|_| ParameterError::Serialize)
    }

    /// Deserialize and validate a stored record
    pub fn decode(bytes: &[u8]) -> Result<WindingParameters, ParameterError> {
        let record: ParameterRecord =
            postcard::from_bytes(bytes).map_err(|_| ParameterError::Deserialize)?;

        if !record.is_valid() {
            return Err(ParameterError::InvalidFormat);
        }
        if !record.verify_crc() {
            return Err(ParameterError::CrcMismatch);
        }

        Ok(record.params)
    }
}

/// CRC32 update (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_first_run_values() {
        let params = WindingParameters::default();
        assert_eq!(params.required_turns, 27.5);
        assert_eq!(params.start_margin_mm, 40.0);
        assert_eq!(params.end_margin_mm, 40.0);
    }

    #[test]
    fn test_crc_detects_modification() {
        let mut record = ParameterRecord::new(WindingParameters::default());
        assert!(record.is_valid());
        assert!(record.verify_crc());

        record.params.required_turns = 30.0;
        assert!(!record.verify_crc());
    }

    #[test]
    fn test_crc_reference_value() {
        // "123456789" is the standard CRC-32 check input
        assert_eq!(!crc32_update(0xFFFF_FFFF, b"123456789"), 0xCBF4_3926);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_decode_rejects_corrupted_record() {
        let mut buffer = [0u8; MAX_PARAMETER_RECORD_SIZE];
        let mut record = ParameterRecord::new(WindingParameters::default());
        record.crc ^= 1;
        let bytes = record.encode(&mut buffer).unwrap();
        assert_eq!(
            ParameterRecord::decode(bytes),
            Err(ParameterError::CrcMismatch)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_decode_rejects_wrong_version() {
        let mut buffer = [0u8; MAX_PARAMETER_RECORD_SIZE];
        let mut record = ParameterRecord::new(WindingParameters::default());
        record.version = PARAMETERS_VERSION + 1;
        let bytes = record.encode(&mut buffer).unwrap();
        assert_eq!(
            ParameterRecord::decode(bytes),
            Err(ParameterError::InvalidFormat)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_decode_rejects_garbage() {
        assert!(ParameterRecord::decode(&[0xFF; 3]).is_err());
    }
}
