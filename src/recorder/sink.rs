use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use super::settings::RecordingSettings;
use crate::engine::AudioFrame;

/// Encoder sink writing 16-bit mono WAV.
///
/// Codec fidelity is a platform-engine concern; the built-in sink always
/// writes integer PCM and logs when the caller's linear-PCM options ask
/// for something else. Frames must already be converted to the target
/// rate and channel count.
pub struct WavSink {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    path: PathBuf,
    samples_written: usize,
}

impl WavSink {
    pub fn create(path: &Path, settings: &RecordingSettings) -> Result<Self> {
        if settings.linear_pcm_bit_depth != 16 {
            warn!(
                "linear PCM bit depth {} unsupported by the built-in sink, using 16",
                settings.linear_pcm_bit_depth
            );
        }
        if settings.linear_pcm_is_big_endian {
            warn!("big-endian PCM unsupported by the built-in sink, writing little-endian");
        }
        if settings.linear_pcm_is_float {
            warn!("float PCM unsupported by the built-in sink, writing integer samples");
        }

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: settings.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = hound::WavWriter::create(path, spec)
            .with_context(|| format!("failed to create output file: {}", path.display()))?;

        Ok(Self {
            writer: Some(writer),
            path: path.to_path_buf(),
            samples_written: 0,
        })
    }

    pub fn write_frame(&mut self, frame: &AudioFrame) -> Result<()> {
        if let Some(writer) = &mut self.writer {
            for &sample in &frame.samples {
                writer
                    .write_sample(sample)
                    .context("failed to write sample")?;
            }
            self.samples_written += frame.samples.len();
        }
        Ok(())
    }

    pub fn samples_written(&self) -> usize {
        self.samples_written
    }

    pub fn finish(mut self) -> Result<PathBuf> {
        if let Some(writer) = self.writer.take() {
            writer
                .finalize()
                .with_context(|| format!("failed to finalize {}", self.path.display()))?;
        }
        Ok(self.path.clone())
    }
}

impl Drop for WavSink {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.finalize() {
                warn!("failed to finalize WAV sink on drop: {}", e);
            }
        }
    }
}
