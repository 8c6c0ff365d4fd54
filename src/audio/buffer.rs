use ringbuf::{traits::*, HeapRb};

/// Fixed-size sample history that overwrites its oldest samples when full
///
/// Used to keep the audio just before speech onset so the start of the first
/// word is not clipped.
pub struct AudioRingBuffer {
    buffer: HeapRb<f32>,
}

impl AudioRingBuffer {
    /// Create a new ring buffer with the specified capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: HeapRb::new(capacity.max(1)),
        }
    }

    /// Write samples, dropping the oldest ones if the buffer is full
    pub fn write(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.buffer.push_overwrite(sample);
        }
    }

    /// Remove and return everything currently held, oldest first
    pub fn drain(&mut self) -> Vec<f32> {
        let mut samples = Vec::with_capacity(self.buffer.occupied_len());
        while let Some(sample) = self.buffer.try_pop() {
            samples.push(sample);
        }
        samples
    }

    /// Get the number of samples available to read
    pub fn len(&self) -> usize {
        self.buffer.occupied_len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Get the capacity of the buffer
    pub fn capacity(&self) -> usize {
        self.buffer.capacity().get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_drain() {
        let mut buffer = AudioRingBuffer::new(1024);
        let data: Vec<f32> = (0..100).map(|i| i as f32).collect();

        buffer.write(&data);
        assert_eq!(buffer.len(), 100);

        let drained = buffer.drain();
        assert_eq!(drained, data);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_overflow_keeps_newest() {
        let mut buffer = AudioRingBuffer::new(10);
        let data: Vec<f32> = (0..20).map(|i| i as f32).collect();

        buffer.write(&data);
        assert_eq!(buffer.len(), 10);
        assert_eq!(buffer.capacity(), 10);

        let expected: Vec<f32> = (10..20).map(|i| i as f32).collect();
        assert_eq!(buffer.drain(), expected);
    }

    #[test]
    fn test_clear() {
        let mut buffer = AudioRingBuffer::new(4);
        buffer.write(&[0.1, 0.2]);
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
