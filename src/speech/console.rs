//! Text console stand-in for the microphone and speaker

use crate::speech::SpeechInterface;
use crate::{ClerkError, Result};
use std::io::{self, BufRead, StdinLock, Stdout, Write};

/// Reads utterances line by line and prints replies
pub struct ConsoleSpeech<R, W> {
    input: R,
    output: W,
}

impl ConsoleSpeech<StdinLock<'static>, Stdout> {
    /// Console bound to the process stdin/stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleSpeech<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> SpeechInterface for ConsoleSpeech<R, W> {
    fn listen(&mut self) -> Result<String> {
        write!(self.output, "You: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ClerkError::TranscriptionError("Console input closed".into()));
        }
        Ok(line.trim().to_string())
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "Clerk: {}", text)?;
        self.output.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_listen_reads_trimmed_lines() {
        let mut console = ConsoleSpeech::new(Cursor::new("  hello there \n\nbye\n"), Vec::new());
        assert_eq!(console.listen().unwrap(), "hello there");
        assert_eq!(console.listen().unwrap(), "");
        assert_eq!(console.listen().unwrap(), "bye");
    }

    #[test]
    fn test_closed_input_is_an_error() {
        let mut console = ConsoleSpeech::new(Cursor::new(""), Vec::new());
        assert!(matches!(
            console.listen(),
            Err(ClerkError::TranscriptionError(_))
        ));
    }

    #[test]
    fn test_speak_writes_reply() {
        let mut console = ConsoleSpeech::new(Cursor::new(""), Vec::new());
        console.speak("Hey there, how can I help?").unwrap();
        let output = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(output, "Clerk: Hey there, how can I help?\n");
    }
}
