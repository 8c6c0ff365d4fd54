use crate::{ClerkError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

/// Frames handed to the sinc resampler per call
const CHUNK_FRAMES: usize = 1024;

/// Mono streaming resampler
///
/// Input arrives in whatever block sizes the capture device delivers. Samples
/// are buffered until a full chunk is available so the filter state stays
/// continuous across blocks.
pub struct AudioResampler {
    resampler: Option<SincFixedIn<f32>>,
    pending: Vec<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl AudioResampler {
    /// Create a new mono resampler
    ///
    /// # Arguments
    /// * `input_rate` - Input sample rate
    /// * `output_rate` - Output sample rate
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(ClerkError::ConfigError(
                "Sample rates must be greater than 0".into(),
            ));
        }

        let resampler = if input_rate == output_rate {
            None
        } else {
            let params = SincInterpolationParameters {
                sinc_len: 256,
                f_cutoff: 0.95,
                interpolation: SincInterpolationType::Linear,
                oversampling_factor: 256,
                window: WindowFunction::BlackmanHarris2,
            };

            let resampler = SincFixedIn::<f32>::new(
                output_rate as f64 / input_rate as f64,
                2.0,
                params,
                CHUNK_FRAMES,
                1,
            )
            .map_err(|e| {
                ClerkError::AudioProcessingError(format!("Failed to create resampler: {}", e))
            })?;
            Some(resampler)
        };

        debug!("Created resampler: {} Hz -> {} Hz", input_rate, output_rate);

        Ok(Self {
            resampler,
            pending: Vec::with_capacity(CHUNK_FRAMES * 2),
            input_rate,
            output_rate,
        })
    }

    /// Feed a block of samples and return whatever output is ready
    pub fn process(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(input.to_vec());
        };

        self.pending.extend_from_slice(input);

        let mut output = Vec::new();
        while self.pending.len() >= resampler.input_frames_next() {
            let needed = resampler.input_frames_next();
            let chunk: Vec<f32> = self.pending.drain(..needed).collect();
            let processed = resampler
                .process(&[chunk], None)
                .map_err(|e| ClerkError::AudioProcessingError(format!("Resampling failed: {}", e)))?;
            output.extend_from_slice(&processed[0]);
        }

        Ok(output)
    }

    /// Resample any buffered remainder, padding the final chunk with silence
    pub fn flush(&mut self) -> Result<Vec<f32>> {
        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(Vec::new());
        };
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }

        let remaining = std::mem::take(&mut self.pending);
        let expected =
            ((remaining.len() as f64) * self.output_rate as f64 / self.input_rate as f64).ceil() as usize;

        let processed = resampler
            .process_partial(Some(&[remaining][..]), None)
            .map_err(|e| ClerkError::AudioProcessingError(format!("Resampling failed: {}", e)))?;

        let mut output = processed.into_iter().next().unwrap_or_default();
        output.truncate(expected);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameters() {
        assert!(AudioResampler::new(0, 16000).is_err());
        assert!(AudioResampler::new(48000, 0).is_err());
    }

    #[test]
    fn test_same_rate_passthrough() {
        let mut resampler = AudioResampler::new(16000, 16000).unwrap();
        let input = vec![0.1, 0.2, 0.3];
        assert_eq!(resampler.process(&input).unwrap(), input);
        assert!(resampler.flush().unwrap().is_empty());
    }

    #[test]
    fn test_small_blocks_are_buffered() {
        let mut resampler = AudioResampler::new(48000, 16000).unwrap();
        let block = vec![0.0f32; 480];

        // 480 < one chunk: nothing comes out yet
        assert!(resampler.process(&block).unwrap().is_empty());

        let mut total = 0;
        for _ in 0..99 {
            total += resampler.process(&block).unwrap().len();
        }
        total += resampler.flush().unwrap().len();

        // 48000 input frames -> roughly 16000 output frames
        assert!(total > 15000 && total <= 16100, "got {total}");
    }

    #[test]
    fn test_flush_drains_pending() {
        let mut resampler = AudioResampler::new(44100, 16000).unwrap();
        assert!(resampler.process(&[0.5; 441]).unwrap().is_empty());
        assert_eq!(resampler.flush().unwrap().len(), 160);
        assert!(resampler.flush().unwrap().is_empty());
    }
}
