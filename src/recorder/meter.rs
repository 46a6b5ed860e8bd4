use std::sync::Mutex;

use crate::engine::AudioFrame;

/// Power floor reported for silence, matching the platform convention
const SILENCE_DB: f32 = -160.0;

/// Smoothing factor for the legacy average-power reading
const SMOOTHING: f32 = 0.8;

#[derive(Debug, Clone, Copy)]
struct Levels {
    average_db: f32,
    peak_db: f32,
}

/// Amplitude meter fed by the capture fan-out.
///
/// Two mutually exclusive reporting modes, fixed for the life of the
/// session: legacy returns the smoothed average power in dBFS; linear
/// converts peak power to a linear amplitude via `10^(dB/20)`.
#[derive(Debug)]
pub struct Meter {
    levels: Mutex<Levels>,
}

impl Meter {
    pub fn new() -> Self {
        Self {
            levels: Mutex::new(Levels {
                average_db: SILENCE_DB,
                peak_db: SILENCE_DB,
            }),
        }
    }

    pub fn update(&self, frame: &AudioFrame) {
        if frame.samples.is_empty() {
            return;
        }

        let mut peak = 0.0f32;
        let mut sum_squares = 0.0f64;
        for &sample in &frame.samples {
            let normalized = sample as f32 / i16::MAX as f32;
            peak = peak.max(normalized.abs());
            sum_squares += (normalized as f64) * (normalized as f64);
        }
        let rms = (sum_squares / frame.samples.len() as f64).sqrt() as f32;

        let peak_db = to_db(peak);
        let rms_db = to_db(rms);

        let mut levels = self.levels.lock().expect("meter lock poisoned");
        levels.peak_db = peak_db;
        levels.average_db = SMOOTHING * levels.average_db + (1.0 - SMOOTHING) * rms_db;
    }

    /// Current amplitude in the session's fixed mode
    pub fn amplitude(&self, use_legacy: bool) -> f64 {
        let levels = self.levels.lock().expect("meter lock poisoned");
        if use_legacy {
            levels.average_db as f64
        } else {
            10f64.powf(levels.peak_db as f64 / 20.0)
        }
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::new()
    }
}

fn to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        SILENCE_DB
    } else {
        (20.0 * linear.log10()).max(SILENCE_DB)
    }
}
