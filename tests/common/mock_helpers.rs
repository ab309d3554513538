//! Mock construction helpers

use speakline::{EngineFactory, SpeakLineError, SpeechEngine};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Everything a [`RecordingEngine`] saw, shared with the test
#[derive(Debug, Default)]
pub struct Recording {
    pub rate: Option<u32>,
    pub volume: Option<f32>,
    pub spoken: Vec<String>,
    pub stopped: bool,
}

/// Speech engine that records calls instead of producing audio
pub struct RecordingEngine {
    recording: Arc<Mutex<Recording>>,
    speak_delay: Duration,
    fail_on: Option<String>,
}

impl RecordingEngine {
    pub fn new(recording: Arc<Mutex<Recording>>) -> Self {
        Self {
            recording,
            speak_delay: Duration::ZERO,
            fail_on: None,
        }
    }

    /// Make every `speak` call block for `delay`
    pub fn with_speak_delay(mut self, delay: Duration) -> Self {
        self.speak_delay = delay;
        self
    }

    /// Fail when asked to speak exactly `line`
    pub fn failing_on(mut self, line: &str) -> Self {
        self.fail_on = Some(line.to_string());
        self
    }

    pub fn into_factory(self) -> EngineFactory {
        Box::new(move || Ok(Box::new(self) as Box<dyn SpeechEngine>))
    }
}

impl SpeechEngine for RecordingEngine {
    fn set_rate(&mut self, words_per_minute: u32) -> speakline::Result<()> {
        self.recording.lock().unwrap().rate = Some(words_per_minute);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> speakline::Result<()> {
        self.recording.lock().unwrap().volume = Some(volume);
        Ok(())
    }

    fn speak(&mut self, text: &str) -> speakline::Result<()> {
        if self.fail_on.as_deref() == Some(text) {
            return Err(SpeakLineError::Speech(format!("refused {:?}", text)));
        }
        std::thread::sleep(self.speak_delay);
        self.recording.lock().unwrap().spoken.push(text.to_string());
        Ok(())
    }

    fn synthesize_to_file(&mut self, text: &str, path: &Path) -> speakline::Result<()> {
        std::fs::write(path, text)?;
        Ok(())
    }

    fn stop(&mut self) -> speakline::Result<()> {
        self.recording.lock().unwrap().stopped = true;
        Ok(())
    }
}

/// Cloneable in-memory writer standing in for stdout
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn printed_lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
