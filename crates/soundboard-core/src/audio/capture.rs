use crate::{
    AudioError, CoreResult,
    audio::{AudioCapture, CaptureHandle, Resampler, SAMPLE_RATE, expected_samples},
};

use std::{
    panic::Location,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, {Arc, Mutex},
    },
    time::{Duration, Instant},
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Extra device time buffered past the requested duration, so a late
/// stop never cuts the end of the clip.
const BUFFER_SLACK: Duration = Duration::from_secs(1);

/// How often the capture worker checks the stop flag.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long `begin` waits for the device to report that it is recording.
const DEVICE_READY_TIMEOUT: Duration = Duration::from_secs(3);

pub struct AudioCapturer {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    samples: Arc<Mutex<Vec<f32>>>,
    /// Signals the audio callback to stop writing. Set to `true` before
    /// dropping the stream so no in-flight callback writes after the lock is
    /// acquired in `stop()`.
    shutdown: Arc<AtomicBool>,
}

impl AudioCapturer {
    /// Open the named input device, or the default one when `device_name`
    /// is `None` or no device carries that name.
    #[track_caller]
    #[instrument]
    pub fn new(device_name: Option<&str>) -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = device_name
            .and_then(|wanted| find_input_device(&host, wanted))
            .or_else(|| host.default_input_device())
            .ok_or(AudioError::NoMicrophoneFound {
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config = device
            .default_input_config()
            .map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to get config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "AudioCapturer initialized"
        );

        Ok(Self {
            device,
            config: config.into(),
            stream: None,
            samples: Arc::new(Mutex::new(Vec::new())),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Start the input stream, buffering at most `max_duration` (plus a
    /// little slack) of device audio. Later samples are dropped, so the
    /// start of the clip is always kept.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&mut self, max_duration: Duration) -> CoreResult<()> {
        let samples = Arc::clone(&self.samples);
        let shutdown = Arc::clone(&self.shutdown);
        let limit = buffer_limit(
            self.config.sample_rate,
            self.config.channels,
            max_duration + BUFFER_SLACK,
        );
        debug!(limit, "Capture buffer limit");

        self.shutdown.store(false, Ordering::Release);

        samples
            .lock()
            .map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to lock samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .clear();

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    // A poisoned mutex still holds valid samples.
                    let mut buf = samples.lock().unwrap_or_else(|e| {
                        error!("Sample buffer lock poisoned, recovering: {}", e);
                        e.into_inner()
                    });
                    append_within_limit(&mut buf, data, limit);
                },
                |err| {
                    error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to build stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| AudioError::DeviceError {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.stream = Some(stream);
        info!("Audio capture started");

        Ok(())
    }

    /// Stop the stream and return the interleaved samples captured so far.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> CoreResult<Vec<f32>> {
        self.shutdown.store(true, Ordering::Release);

        if let Some(stream) = self.stream.take() {
            drop(stream);
            // Some backends return from drop() before the last callback ends.
            std::thread::sleep(Duration::from_millis(5));
            info!("Audio capture stopped");
        }

        let samples: Vec<f32> = self
            .samples
            .lock()
            .map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to lock samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .drain(..)
            .collect();

        debug!(sample_count = samples.len(), "Captured audio samples");

        Ok(samples)
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }
}

#[allow(deprecated)]
fn find_input_device(host: &cpal::Host, wanted: &str) -> Option<Device> {
    let found = host
        .input_devices()
        .ok()?
        .find(|d| d.name().map(|n| n == wanted).unwrap_or(false));

    if found.is_none() {
        warn!(device = wanted, "Configured input device not found, using default");
    }

    found
}

/// Microphone capture backed by CPAL.
///
/// Each [`begin`](AudioCapture::begin) opens the device on a fresh worker
/// thread (a CPAL `Stream` is not `Send`) and converts the result to the
/// fixed recording format: mono, 44.1 kHz, 16-bit.
#[derive(Debug, Clone, Default)]
pub struct CpalCapture {
    device_name: Option<String>,
}

impl CpalCapture {
    /// Capture from `device_name`, or the default input device when `None`.
    pub fn new(device_name: Option<String>) -> Self {
        Self { device_name }
    }
}

impl AudioCapture for CpalCapture {
    #[track_caller]
    #[instrument(skip(self))]
    fn begin(&self, duration: Duration) -> CoreResult<CaptureHandle> {
        let device_name = self.device_name.clone();
        let (ready_tx, ready_rx) = mpsc::channel::<CoreResult<()>>();

        let handle = CaptureHandle::spawn(move |stop| {
            record_blocking(device_name.as_deref(), duration, &stop, ready_tx)
        });

        match ready_rx.recv_timeout(DEVICE_READY_TIMEOUT) {
            Ok(Ok(())) => Ok(handle),
            Ok(Err(e)) => Err(e),
            Err(_) => {
                handle.stop();
                Err(AudioError::DeviceError {
                    reason: "Input device did not start in time".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }
}

/// Worker-thread body: record for `duration` unless `stop` is raised.
fn record_blocking(
    device_name: Option<&str>,
    duration: Duration,
    stop: &AtomicBool,
    ready_tx: mpsc::Sender<CoreResult<()>>,
) -> CoreResult<Vec<i16>> {
    let mut capturer = match AudioCapturer::new(device_name).and_then(|mut c| {
        c.start(duration)?;
        Ok(c)
    }) {
        Ok(c) => {
            let _ = ready_tx.send(Ok(()));
            c
        }
        Err(e) => {
            let reason = e.to_string();
            let _ = ready_tx.send(Err(e));
            return Err(AudioError::DeviceError {
                reason,
                location: ErrorLocation::from(Location::caller()),
            });
        }
    };

    let started = Instant::now();
    while started.elapsed() < duration {
        if stop.load(Ordering::Acquire) {
            // Partial buffer is dropped with the capturer.
            let _ = capturer.stop();
            return Err(AudioError::CaptureStopped {
                location: ErrorLocation::from(Location::caller()),
            });
        }
        std::thread::sleep(STOP_POLL_INTERVAL);
    }

    let interleaved = capturer.stop()?;
    if interleaved.is_empty() {
        return Err(AudioError::NoAudioCaptured {
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let mono = downmix_to_mono(&interleaved, capturer.channels());

    let resampled = if capturer.sample_rate() != SAMPLE_RATE {
        let mut resampler = Resampler::new(capturer.sample_rate(), SAMPLE_RATE)?;
        resampler.resample(&mono)?
    } else {
        mono
    };

    let mut pcm = to_pcm16(&resampled);
    pcm.truncate(expected_samples(duration));

    info!(
        sample_count = pcm.len(),
        duration_ms = duration.as_millis(),
        "Capture complete"
    );

    Ok(pcm)
}

/// Interleaved samples a device produces in `duration`, saturating instead
/// of overflowing for absurd durations.
pub(crate) fn buffer_limit(sample_rate: u32, channels: u16, duration: Duration) -> usize {
    let per_second = u128::from(sample_rate) * u128::from(channels.max(1));
    let samples = per_second * duration.as_millis() / 1000;
    usize::try_from(samples).unwrap_or(usize::MAX)
}

/// Append `data` to `buf` without growing it past `limit`.
pub(crate) fn append_within_limit(buf: &mut Vec<f32>, data: &[f32], limit: usize) {
    let room = limit.saturating_sub(buf.len());
    buf.extend(data.iter().take(room).copied());
}

/// Average interleaved frames into a single channel.
pub(crate) fn downmix_to_mono(interleaved: &[f32], channels: u16) -> Vec<f32> {
    let channels = usize::from(channels.max(1));
    if channels == 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Convert normalized float samples to signed 16-bit PCM, clamping overs.
pub(crate) fn to_pcm16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16)
        .collect()
}
