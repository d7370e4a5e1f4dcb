//! Main application loop.
//!
//! Reads the observation stream one record at a time, runs each frame
//! through the [`FramePipeline`], publishes the resulting events and
//! handles control signals between frames. Termination is only checked at
//! the iteration boundary so a frame is never half processed.

use crate::{
    config::Config,
    detectors::FlowSource,
    pipeline::{FramePipeline, FrameReport},
    replay::{FrameRecord, Record, ReplayReader},
    transport::{create_sink, ContactRecorder, ControlInbox, ControlSignal, EventSink},
    Result,
};
use log::{debug, info, warn};
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter},
    time::{Duration, Instant},
};

/// Counters reported when the loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames run through the pipeline
    pub frames: u64,
    /// Events handed to the sink
    pub events_published: u64,
    /// Events the sink rejected
    pub publish_failures: u64,
    /// Contact samples recorded
    pub contacts: u64,
    /// New sessions announced on the control channel
    pub sessions: u64,
    /// True when a stop signal ended the loop before the stream did
    pub stopped: bool,
}

/// Main application struct
pub struct VisionApp<R> {
    reader: ReplayReader<R>,
    pipeline: FramePipeline,
    sink: Box<dyn EventSink>,
    contacts: Option<ContactRecorder>,
    inbox: Option<ControlInbox>,
    frame_interval: Option<Duration>,
    stop_requested: bool,
    summary: RunSummary,
}

impl VisionApp<BufReader<File>> {
    /// Build the application described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the input stream
    /// is missing, or an output file cannot be created.
    pub fn from_config(config: &Config) -> Result<Self> {
        info!("Initializing engagement vision pipeline");
        config.validate()?;

        let input = config.validate_input()?;
        info!("Replaying observations from {}", input.display());
        let reader = ReplayReader::open(input)?;

        let sink = create_sink(&config.output)?;
        let mut app = Self::new(config, reader, sink);

        if let Some(path) = &config.output.contacts_path {
            info!("Recording contact samples to {}", path.display());
            let file = File::create(path)?;
            app = app.with_contacts(ContactRecorder::new(Box::new(BufWriter::new(file))));
        }

        Ok(app)
    }
}

impl<R: BufRead> VisionApp<R> {
    /// Create an application over an already opened stream
    ///
    /// # Panics
    ///
    /// Panics on detector parameters that [`Config::validate`] rejects
    #[must_use]
    pub fn new(config: &Config, reader: ReplayReader<R>, sink: Box<dyn EventSink>) -> Self {
        let frame_interval =
            (config.input.frame_rate > 0).then(|| Duration::from_secs(1) / config.input.frame_rate);

        Self {
            reader,
            pipeline: FramePipeline::new(config),
            sink,
            contacts: None,
            inbox: None,
            frame_interval,
            stop_requested: false,
            summary: RunSummary::default(),
        }
    }

    /// Record contact samples
    #[must_use]
    pub fn with_contacts(mut self, recorder: ContactRecorder) -> Self {
        self.contacts = Some(recorder);
        self
    }

    /// Accept control signals from another thread
    #[must_use]
    pub fn with_inbox(mut self, inbox: ControlInbox) -> Self {
        self.inbox = Some(inbox);
        self
    }

    /// Pipeline state
    #[must_use]
    pub fn pipeline(&self) -> &FramePipeline {
        &self.pipeline
    }

    /// Run the main application loop until the stream ends or a stop arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be read or decoded, or if a
    /// contact sample cannot be written. Event publication failures are
    /// logged and counted instead.
    pub fn run(&mut self) -> Result<RunSummary> {
        info!("Starting main application loop");
        let start_time = Instant::now();

        loop {
            self.drain_inbox();
            if self.stop_requested {
                info!("Stop requested");
                self.summary.stopped = true;
                break;
            }

            let Some(record) = self.reader.next_record()? else {
                info!("End of observation stream reached");
                break;
            };

            match record {
                Record::Control { signal } => self.handle_control(signal),
                Record::Frame(frame) => {
                    let frame_start = Instant::now();
                    self.process_frame(frame)?;
                    self.pace(frame_start);
                }
            }
        }

        self.sink.flush()?;
        if let Some(recorder) = &mut self.contacts {
            recorder.flush()?;
        }

        let elapsed = start_time.elapsed().as_secs_f64();
        info!(
            "Processed {} frames in {:.2}s, published {} events ({} failed)",
            self.summary.frames, elapsed, self.summary.events_published, self.summary.publish_failures
        );
        Ok(self.summary)
    }

    fn process_frame(&mut self, mut frame: FrameRecord) -> Result<()> {
        let input = frame.to_input();
        let flow = frame.flow.as_mut().map(|f| f as &mut dyn FlowSource);
        let report = self.pipeline.process(&input, flow);
        self.summary.frames += 1;

        self.publish(&report);

        if let Some(recorder) = &mut self.contacts {
            recorder.record(report.frame, &report.contacts)?;
        }
        self.summary.contacts += report.contacts.len() as u64;

        Ok(())
    }

    fn publish(&mut self, report: &FrameReport) {
        for event in &report.events {
            debug!("[frame {}] {event}", report.frame);
            match self.sink.publish(report.frame, event) {
                Ok(()) => self.summary.events_published += 1,
                Err(e) => {
                    warn!("Failed to publish {}: {e}", event.topic());
                    self.summary.publish_failures += 1;
                }
            }
        }
    }

    fn drain_inbox(&mut self) {
        let signals = self.inbox.as_ref().map(ControlInbox::drain).unwrap_or_default();
        for signal in signals {
            self.handle_control(signal);
        }
    }

    fn handle_control(&mut self, signal: ControlSignal) {
        match signal {
            ControlSignal::StateChanged(state) => self.pipeline.set_external_state(&state),
            ControlSignal::Stop => self.stop_requested = true,
            ControlSignal::NewSession => {
                self.summary.sessions += 1;
                info!("New session started ({} so far)", self.summary.sessions);
            }
        }
    }

    fn pace(&self, frame_start: Instant) {
        if let Some(interval) = self.frame_interval {
            if let Some(remaining) = interval.checked_sub(frame_start.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
    }
}
