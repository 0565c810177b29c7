use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::AppError;

/// Output rate of the synthesis engine.
pub const SAMPLE_RATE: u32 = 24_000;

/// Scale samples by `volume`, keeping them inside [-1.0, 1.0].
pub fn apply_volume(samples: &mut [f32], volume: f32) {
    if volume == 1.0 {
        return;
    }

    for sample in samples.iter_mut() {
        *sample = (*sample * volume).clamp(-1.0, 1.0);
    }
}

/// 16-bit PCM quantization, truncating toward zero.
pub fn to_pcm16(sample: f32) -> i16 {
    (sample * 32767.0) as i16
}

/// Convert audio samples to a mono 16-bit WAV file
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, AppError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut buffer = Vec::new();
    {
        let cursor = Cursor::new(&mut buffer);
        let mut writer = WavWriter::new(cursor, spec).map_err(|e| {
            AppError::SynthesisFailure(format!("Failed to create WAV writer: {}", e))
        })?;

        for sample in samples {
            writer
                .write_sample(to_pcm16(*sample))
                .map_err(|e| AppError::SynthesisFailure(format!("Failed to write sample: {}", e)))?;
        }

        writer
            .finalize()
            .map_err(|e| AppError::SynthesisFailure(format!("Failed to finalize WAV: {}", e)))?;
    }

    Ok(buffer)
}
