use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::error::{Result, TranscriberError};

/// Decoded PCM audio: mono f32 samples in [-1.0, 1.0] at a known rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}

/// Extracts transcription-ready audio from uploaded videos via ffmpeg.
#[derive(Debug, Clone)]
pub struct AudioExtractor {
    /// Default sample rate for transcription (Whisper optimal)
    target_sample_rate: u32,
}

impl AudioExtractor {
    pub fn new(target_sample_rate: u32) -> Self {
        Self { target_sample_rate }
    }

    pub fn target_sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    /// Audio artifact path for a task. Intermediate audio is scoped per task
    /// id so concurrent uploads never overwrite each other.
    pub fn audio_output_path(&self, upload_dir: &Path, task_id: &str) -> PathBuf {
        upload_dir.join(format!("{}.wav", task_id))
    }

    /// Extract the audio track from a video as 16-bit PCM mono WAV.
    pub async fn extract_for_transcription(
        &self,
        video_path: &Path,
        audio_path: &Path,
    ) -> Result<()> {
        info!("🎵 Extracting audio: {}", video_path.display());

        let video = video_path.to_str().ok_or_else(|| {
            TranscriberError::AudioExtraction("invalid UTF-8 in video path".to_string())
        })?;
        let audio = audio_path.to_str().ok_or_else(|| {
            TranscriberError::AudioExtraction("invalid UTF-8 in audio path".to_string())
        })?;

        let status = tokio::process::Command::new("ffmpeg")
            .args([
                "-i", video,
                "-vn", // No video stream
                "-acodec", "pcm_s16le", // 16-bit PCM
                "-ar", &self.target_sample_rate.to_string(),
                "-ac", "1", // Mono channel
                "-f", "wav",
                "-y", // Overwrite existing
                audio,
            ])
            .status()
            .await
            .map_err(|e| {
                TranscriberError::AudioExtraction(format!("failed to run ffmpeg: {}", e))
            })?;

        if !status.success() {
            return Err(TranscriberError::AudioExtraction(format!(
                "ffmpeg failed for {}",
                video_path.display()
            )));
        }

        if !audio_path.exists() {
            return Err(TranscriberError::AudioExtraction(format!(
                "extracted audio missing at {}",
                audio_path.display()
            )));
        }

        info!("✅ Audio extracted: {}", audio_path.display());
        Ok(())
    }
}

/// Load a WAV file into a mono f32 waveform.
///
/// 16-bit samples are scaled to [-1.0, 1.0]; stereo is downmixed by
/// averaging channel pairs.
pub fn load_waveform(audio_path: &Path) -> Result<Waveform> {
    let mut reader = hound::WavReader::open(audio_path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
    };

    let samples = if spec.channels == 2 {
        samples
            .chunks_exact(2)
            .map(|pair| (pair[0] + pair[1]) / 2.0)
            .collect()
    } else {
        samples
    };

    Ok(Waveform {
        samples,
        sample_rate: spec.sample_rate,
    })
}
