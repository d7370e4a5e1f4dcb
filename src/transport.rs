//! Event publication and inbound control signals.
//!
//! The message bus itself is external. Events leave through an
//! [`EventSink`]; control signals arrive on a channel drained without
//! blocking between frames.

use crate::{
    config::{EventOutput, OutputConfig},
    events::{Event, EventRecord},
    landmarks::LandmarkSet,
    Error, Result,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufWriter, Write},
    sync::{
        mpsc::{self, Receiver, Sender, TryRecvError},
        Arc, Mutex,
    },
};

/// Destination of published events
pub trait EventSink {
    /// Publish one event produced on `frame`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the event cannot be delivered.
    fn publish(&mut self, frame: u64, event: &Event) -> Result<()>;

    /// Flush buffered events
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if buffered events cannot be delivered.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One JSON object per line
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn publish(&mut self, frame: u64, event: &Event) -> Result<()> {
        let record = EventRecord::new(frame, event);
        serde_json::to_writer(&mut self.writer, &record)
            .map_err(|e| Error::Transport(format!("Failed to encode event: {e}")))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| Error::Transport(format!("Failed to write event: {e}")))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| Error::Transport(format!("Failed to flush events: {e}")))
    }
}

/// Events as log lines only
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn publish(&mut self, frame: u64, event: &Event) -> Result<()> {
        info!("[frame {frame}] {event}");
        Ok(())
    }
}

/// Keeps every event in memory
///
/// Clones share one buffer, so a handle kept by the caller sees what the
/// application published.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<(u64, Event)>>>,
}

impl MemorySink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the published `(frame, event)` pairs
    #[must_use]
    pub fn events(&self) -> Vec<(u64, Event)> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl EventSink for MemorySink {
    fn publish(&mut self, frame: u64, event: &Event) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| Error::Transport("Event buffer poisoned".to_string()))?
            .push((frame, event.clone()));
        Ok(())
    }
}

/// Create the configured event sink
///
/// # Errors
///
/// Returns an error if the event file cannot be created.
pub fn create_sink(config: &OutputConfig) -> Result<Box<dyn EventSink>> {
    match config.events {
        EventOutput::Stdout => Ok(Box::new(JsonLinesSink::new(std::io::stdout()))),
        EventOutput::Log => Ok(Box::new(LogSink)),
        EventOutput::File => {
            let path = config
                .events_path
                .as_ref()
                .ok_or_else(|| Error::ConfigError("No event file configured".to_string()))?;
            let file = File::create(path)?;
            debug!("Writing events to {}", path.display());
            Ok(Box::new(JsonLinesSink::new(BufWriter::new(file))))
        }
    }
}

#[derive(Serialize)]
struct ContactSample<'a> {
    frame: u64,
    landmarks: &'a LandmarkSet,
}

/// Appends contact samples as JSON Lines
pub struct ContactRecorder {
    writer: Box<dyn Write>,
    samples: usize,
}

impl ContactRecorder {
    /// Write samples to `writer`
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer, samples: 0 }
    }

    /// Record every contact face of `frame`
    ///
    /// # Errors
    ///
    /// Returns an error if a sample cannot be written.
    pub fn record(&mut self, frame: u64, contacts: &[LandmarkSet]) -> Result<()> {
        for landmarks in contacts {
            serde_json::to_writer(&mut self.writer, &ContactSample { frame, landmarks })?;
            self.writer.write_all(b"\n")?;
            self.samples += 1;
        }
        Ok(())
    }

    /// Samples written so far
    #[must_use]
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Flush the underlying writer
    ///
    /// # Errors
    ///
    /// Returns an error if the writer cannot be flushed.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Inbound control signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlSignal {
    /// The interaction controller entered a new activity state
    StateChanged(String),
    /// Terminate the loop at the next iteration boundary
    Stop,
    /// A new child session started
    NewSession,
}

/// Non-blocking receiver of control signals
pub struct ControlInbox {
    receiver: Receiver<ControlSignal>,
}

impl ControlInbox {
    /// Create an inbox and the sender feeding it
    #[must_use]
    pub fn channel() -> (Sender<ControlSignal>, Self) {
        let (sender, receiver) = mpsc::channel();
        (sender, Self { receiver })
    }

    /// Take every pending signal in arrival order
    ///
    /// A disconnected sender simply yields no further signals.
    pub fn drain(&self) -> Vec<ControlSignal> {
        let mut signals = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(signal) => signals.push(signal),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Direction;

    #[test]
    fn test_json_lines_sink() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.publish(3, &Event::Gaze { direction: Direction::Up }).unwrap();
        sink.publish(4, &Event::Smile).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["frame"], 3);
        assert_eq!(first["topic"], "lookAt");
        assert_eq!(first["direction"], "up");
    }

    #[test]
    fn test_memory_sink() {
        let handle = MemorySink::new();
        let mut sink = handle.clone();
        sink.publish(0, &Event::Size { value: 12 }).unwrap();
        assert_eq!(handle.events(), vec![(0, Event::Size { value: 12 })]);
    }

    #[test]
    fn test_control_signal_encoding() {
        let stop: ControlSignal = serde_json::from_str("\"stop\"").unwrap();
        assert_eq!(stop, ControlSignal::Stop);
        let state: ControlSignal = serde_json::from_str(r#"{"state_changed":"WAITING_FOR_FEEDBACK"}"#).unwrap();
        assert_eq!(state, ControlSignal::StateChanged("WAITING_FOR_FEEDBACK".to_string()));
    }

    #[test]
    fn test_inbox_drains_in_order() {
        let (sender, inbox) = ControlInbox::channel();
        assert!(inbox.drain().is_empty());

        sender.send(ControlSignal::NewSession).unwrap();
        sender.send(ControlSignal::Stop).unwrap();
        assert_eq!(inbox.drain(), vec![ControlSignal::NewSession, ControlSignal::Stop]);

        drop(sender);
        assert!(inbox.drain().is_empty());
    }
}
