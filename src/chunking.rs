//! Fixed-duration waveform chunking.
//!
//! Splits a decoded waveform into non-overlapping segments in sample order.
//! Every chunk holds `chunk_duration_secs * sample_rate` samples except the
//! last, which holds the remainder.

use crate::error::{Result, TranscriberError};

/// Number of samples per chunk for the given rate and duration.
fn chunk_samples(sample_rate: u32, chunk_duration_secs: u32) -> Result<usize> {
    if sample_rate == 0 {
        return Err(TranscriberError::InvalidParameter(
            "sample rate must be greater than 0".to_string(),
        ));
    }
    if chunk_duration_secs == 0 {
        return Err(TranscriberError::InvalidParameter(
            "chunk duration must be greater than 0".to_string(),
        ));
    }
    Ok(sample_rate as usize * chunk_duration_secs as usize)
}

/// Split a waveform into fixed-duration chunks.
///
/// Returns borrowed sub-slices covering the entire waveform with no gaps and
/// no overlap. An empty waveform yields an empty vec.
pub fn split_waveform(
    samples: &[f32],
    sample_rate: u32,
    chunk_duration_secs: u32,
) -> Result<Vec<&[f32]>> {
    let size = chunk_samples(sample_rate, chunk_duration_secs)?;
    Ok(samples.chunks(size).collect())
}

/// Number of chunks `split_waveform` yields: `ceil(total / chunk_samples)`.
pub fn chunk_count(
    total_samples: usize,
    sample_rate: u32,
    chunk_duration_secs: u32,
) -> Result<usize> {
    let size = chunk_samples(sample_rate, chunk_duration_secs)?;
    Ok(total_samples.div_ceil(size))
}
