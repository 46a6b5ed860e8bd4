use std::fs::File;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// Probe a written media file for its duration.
///
/// Used by the recorder at stop time and by the deviceless playback
/// engine. Failure here is tolerated by callers (duration reports as
/// zero); the recorded file is still considered valid.
pub fn probe_duration(path: impl AsRef<Path>) -> Result<Duration> {
    let path = path.as_ref();

    let file = File::open(path)
        .with_context(|| format!("failed to open media file: {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .with_context(|| format!("unrecognized media container: {}", path.display()))?;

    let track = probed
        .format
        .default_track()
        .context("media file has no default track")?;

    let params = &track.codec_params;
    let time_base = params.time_base.context("track has no time base")?;
    let frames = params.n_frames.context("track frame count unknown")?;

    let time = time_base.calc_time(frames);
    let duration = Duration::from_secs_f64(time.seconds as f64 + time.frac);

    debug!("probed {}: {:.3}s", path.display(), duration.as_secs_f64());

    Ok(duration)
}

/// Duration in whole milliseconds, rounding toward zero
pub fn to_millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}
