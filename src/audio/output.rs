use crate::{ClerkError, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::io::Cursor;
use tracing::{debug, info};

/// Speaker playback on the default output device
pub struct AudioOutput {
    // Dropping the stream silences every sink attached to it
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioOutput {
    /// Open the default output device
    pub fn new() -> Result<Self> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| ClerkError::AudioDeviceError(format!("Failed to open output device: {}", e)))?;

        info!("Opened default output device");

        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    /// Play an in-memory WAV file, blocking until it finishes
    pub fn play_wav(&self, bytes: Vec<u8>) -> Result<()> {
        let sink = Sink::try_new(&self.handle)
            .map_err(|e| ClerkError::AudioDeviceError(format!("Failed to create sink: {}", e)))?;

        let source = Decoder::new(Cursor::new(bytes))
            .map_err(|e| ClerkError::AudioProcessingError(format!("Failed to decode audio: {}", e)))?;

        sink.append(source);
        sink.sleep_until_end();

        debug!("Playback finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_garbage() {
        if let Ok(output) = AudioOutput::new() {
            assert!(output.play_wav(b"not audio".to_vec()).is_err());
        }
    }
}
