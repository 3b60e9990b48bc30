//! Single-line share codes for arenas.
//!
//! A code reads `rally:v1:<columns>x<rows>:<payload>` where the payload is
//! the unpadded base64 of one bit per cell, row-major, least significant bit
//! first, set for obstacles.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use rally_core::{GridError, Int, Matrix};
use thiserror::Error;

const CODE_DOMAIN: &str = "rally";
const CODE_VERSION: &str = "v1";
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while decoding an arena code.
#[derive(Debug, Error)]
pub(crate) enum ArenaCodeError {
    /// The code was empty or contained only whitespace.
    #[error("arena code was empty")]
    Empty,
    /// A `:`-separated field was missing.
    #[error("arena code is missing the {0} field")]
    MissingField(&'static str),
    /// The code does not start with the expected domain.
    #[error("arena code prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The code uses an unknown version.
    #[error("arena code version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The dimensions field could not be parsed.
    #[error("could not parse arena dimensions '{0}'")]
    InvalidDimensions(String),
    /// The payload was not valid base64.
    #[error("could not decode arena payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The payload length disagrees with the dimensions.
    #[error("arena payload holds {found} bytes, expected {expected}")]
    PayloadLength {
        /// Bytes required by the dimensions.
        expected: u64,
        /// Bytes present in the payload.
        found: usize,
    },
    /// The decoded grid was rejected.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Encodes `arena` into a share code.
#[must_use]
pub(crate) fn encode(arena: &Matrix) -> String {
    let mut bits = vec![0_u8; arena.cell_count().div_ceil(8)];
    for (index, cell) in arena.cells().iter().enumerate() {
        if !cell.is_zero() {
            bits[index / 8] |= 1 << (index % 8);
        }
    }
    format!(
        "{CODE_DOMAIN}:{CODE_VERSION}:{}x{}:{}",
        arena.columns(),
        arena.rows(),
        STANDARD_NO_PAD.encode(bits)
    )
}

/// Decodes a share code back into an arena. Obstacles decode as one.
pub(crate) fn decode(code: &str) -> Result<Matrix, ArenaCodeError> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(ArenaCodeError::Empty);
    }

    let mut fields = trimmed.split(FIELD_DELIMITER);
    let domain = fields.next().ok_or(ArenaCodeError::MissingField("prefix"))?;
    let version = fields
        .next()
        .ok_or(ArenaCodeError::MissingField("version"))?;
    let dimensions = fields
        .next()
        .ok_or(ArenaCodeError::MissingField("dimensions"))?;
    let payload = fields
        .next()
        .ok_or(ArenaCodeError::MissingField("payload"))?;

    if domain != CODE_DOMAIN {
        return Err(ArenaCodeError::InvalidPrefix(domain.to_owned()));
    }
    if version != CODE_VERSION {
        return Err(ArenaCodeError::UnsupportedVersion(version.to_owned()));
    }

    let (columns, rows) = parse_dimensions(dimensions)?;
    let bits = STANDARD_NO_PAD.decode(payload.as_bytes())?;
    let expected = packed_len(columns, rows);
    if u64::try_from(bits.len()).ok() != Some(expected) {
        return Err(ArenaCodeError::PayloadLength {
            expected,
            found: bits.len(),
        });
    }

    let mut arena = Matrix::empty(columns, rows)?;
    for cell in arena.coords().collect::<Vec<_>>() {
        let Some(index) = arena.index_of(cell) else {
            continue;
        };
        if bits[index / 8] & (1 << (index % 8)) != 0 {
            arena.set(cell, Int::ONE)?;
        }
    }
    Ok(arena)
}

/// Payload bytes needed for one bit per cell.
fn packed_len(columns: u32, rows: u32) -> u64 {
    (u64::from(columns) * u64::from(rows)).div_ceil(8)
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), ArenaCodeError> {
    let invalid = || ArenaCodeError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;
    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;
    if columns == 0 || rows == 0 {
        return Err(invalid());
    }
    Ok((columns, rows))
}
