use crate::{ClerkError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Microphone capture on the default input device
///
/// Samples are down-mixed to mono f32 and forwarded at the device rate.
pub struct AudioInput {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    stream: Option<Stream>,
    is_recording: Arc<Mutex<bool>>,
}

impl AudioInput {
    /// Create a new audio input with the default input device
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| ClerkError::AudioDeviceError("No input device available".into()))?;

        info!("Using input device: {}", device.name().unwrap_or_else(|_| "Unknown".to_string()));

        let supported = device
            .default_input_config()
            .map_err(|e| ClerkError::AudioDeviceError(format!("Failed to get input config: {}", e)))?;

        Ok(Self {
            device,
            sample_format: supported.sample_format(),
            config: supported.into(),
            stream: None,
            is_recording: Arc::new(Mutex::new(false)),
        })
    }

    /// Get the sample rate of the input device
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Get the number of channels
    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Start recording audio and send mono samples to the provided channel
    pub fn start_recording(&mut self, audio_tx: Sender<Vec<f32>>) -> Result<()> {
        if *self.is_recording.lock() {
            warn!("Already recording");
            return Ok(());
        }

        let stream = match self.sample_format {
            SampleFormat::F32 => self.build_stream::<f32>(audio_tx)?,
            SampleFormat::I16 => self.build_stream::<i16>(audio_tx)?,
            SampleFormat::U16 => self.build_stream::<u16>(audio_tx)?,
            SampleFormat::I32 => self.build_stream::<i32>(audio_tx)?,
            other => {
                return Err(ClerkError::AudioDeviceError(format!(
                    "Unsupported input sample format: {:?}",
                    other
                )))
            }
        };

        stream
            .play()
            .map_err(|e| ClerkError::AudioDeviceError(format!("Failed to start input stream: {}", e)))?;

        *self.is_recording.lock() = true;
        self.stream = Some(stream);

        info!("Started audio recording");
        Ok(())
    }

    fn build_stream<T>(&self, audio_tx: Sender<Vec<f32>>) -> Result<Stream>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let channels = self.config.channels.max(1) as usize;
        let is_recording = Arc::clone(&self.is_recording);

        let err_fn = |err| {
            error!("Audio input stream error: {}", err);
        };

        self.device
            .build_input_stream(
                &self.config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    if !*is_recording.lock() {
                        return;
                    }

                    let samples: Vec<f32> = data
                        .chunks(channels)
                        .map(|frame| {
                            frame.iter().map(|s| s.to_sample::<f32>()).sum::<f32>() / frame.len() as f32
                        })
                        .collect();

                    if let Err(e) = audio_tx.try_send(samples) {
                        debug!("Failed to send audio data: {}", e);
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| ClerkError::AudioDeviceError(format!("Failed to build input stream: {}", e)))
    }

    /// Stop recording audio
    pub fn stop_recording(&mut self) -> Result<()> {
        *self.is_recording.lock() = false;

        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("Stopped audio recording");
        }

        Ok(())
    }

    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        *self.is_recording.lock()
    }
}

impl Drop for AudioInput {
    fn drop(&mut self) {
        let _ = self.stop_recording();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn test_audio_input_creation() {
        // Machines without a microphone skip the assertions
        if let Ok(input) = AudioInput::new() {
            assert!(input.sample_rate() > 0);
            assert!(input.channels() > 0);
        }
    }

    #[test]
    fn test_recording_state() {
        if let Ok(mut input) = AudioInput::new() {
            assert!(!input.is_recording());

            let (tx, _rx) = bounded(10);
            if input.start_recording(tx).is_ok() {
                assert!(input.is_recording());

                let _ = input.stop_recording();
                assert!(!input.is_recording());
            }
        }
    }
}
