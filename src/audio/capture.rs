//! Live microphone capture using CPAL.
//!
//! The data callback does the minimum: feed samples to the slicer and send
//! completed chunks down a channel. No file I/O and no locks are taken on
//! the device callback thread, so disk trouble can never cause underruns.

use crate::audio::slicer::{AudioChunk, ChunkSlicer};
use crate::error::{Result, WhisperLiteError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;
use tracing::warn;

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// Suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers while
/// probing audio backends. Harmless but confusing to users.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2.
/// Safe as long as no other thread is concurrently manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// List the names of available audio input devices.
pub fn list_devices() -> Result<Vec<String>> {
    let devices = with_suppressed_stderr(|| {
        let host = cpal::default_host();
        host.input_devices()
    })
    .map_err(|e| WhisperLiteError::AudioCapture {
        message: format!("Failed to enumerate input devices: {}", e),
    })?;

    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is only touched from the thread that owns the
/// capture object; methods are called synchronously.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Live microphone capture that emits fixed-duration chunks.
///
/// Owns the audio device handle exclusively. The slicer lives inside the
/// stream callback; completed chunks are sent over a crossbeam channel to
/// the transcription worker. On stop, buffered samples shorter than a full
/// chunk are discarded.
pub struct AudioCapture {
    device: cpal::Device,
    stream: Option<SendableStream>,
    sample_rate: u32,
    channels: u16,
    chunk_duration_secs: f64,
}

impl AudioCapture {
    /// Resolve the input device and prepare for capture.
    ///
    /// # Errors
    /// `AudioDeviceNotFound` if no input device (or none matching
    /// `device_name`) is available. Fatal at startup.
    pub fn new(
        device_name: Option<&str>,
        sample_rate: u32,
        channels: u16,
        chunk_duration_secs: f64,
    ) -> Result<Self> {
        let device = with_suppressed_stderr(|| {
            let host = cpal::default_host();

            if let Some(name) = device_name {
                let mut devices =
                    host.input_devices()
                        .map_err(|e| WhisperLiteError::AudioCapture {
                            message: format!("Failed to enumerate devices: {}", e),
                        })?;
                devices
                    .find(|d| d.name().is_ok_and(|n| n == name))
                    .ok_or_else(|| WhisperLiteError::AudioDeviceNotFound {
                        device: name.to_string(),
                    })
            } else {
                host.default_input_device()
                    .ok_or_else(|| WhisperLiteError::AudioDeviceNotFound {
                        device: "default".to_string(),
                    })
            }
        })?;

        Ok(Self {
            device,
            stream: None,
            sample_rate,
            channels,
            chunk_duration_secs,
        })
    }

    /// Name of the resolved device, if the backend reports one.
    pub fn device_name(&self) -> Option<String> {
        self.device.name().ok()
    }

    /// Build and start the input stream, sending chunks into `tx`.
    ///
    /// Tries an i16 stream first (PipeWire/PulseAudio convert transparently),
    /// then falls back to f32 with software conversion.
    pub fn start(&mut self, tx: Sender<AudioChunk>) -> Result<()> {
        let config = cpal::StreamConfig {
            channels: self.channels,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_callback = |err| {
            warn!(error = %err, "audio stream error");
        };

        // i16 path
        let mut slicer = ChunkSlicer::new(self.chunk_duration_secs, self.sample_rate, self.channels);
        let chunk_tx = tx.clone();
        if let Ok(stream) = self.device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                for chunk in slicer.push(data) {
                    // Receiver gone means the session is shutting down.
                    if chunk_tx.send(chunk).is_err() {
                        return;
                    }
                }
            },
            err_callback,
            None,
        ) {
            stream.play().map_err(|e| WhisperLiteError::AudioCapture {
                message: format!("Failed to start audio stream: {}", e),
            })?;
            self.stream = Some(SendableStream(stream));
            return Ok(());
        }

        // f32 fallback for devices that only expose float formats
        let mut slicer = ChunkSlicer::new(self.chunk_duration_secs, self.sample_rate, self.channels);
        let stream = self
            .device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let converted: Vec<i16> = data
                        .iter()
                        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                        .collect();
                    for chunk in slicer.push(&converted) {
                        if tx.send(chunk).is_err() {
                            return;
                        }
                    }
                },
                err_callback,
                None,
            )
            .map_err(|e| WhisperLiteError::AudioCapture {
                message: format!("Failed to build input stream: {}", e),
            })?;

        stream.play().map_err(|e| WhisperLiteError::AudioCapture {
            message: format!("Failed to start audio stream: {}", e),
        })?;
        self.stream = Some(SendableStream(stream));
        Ok(())
    }

    /// Stop capture and release the device.
    ///
    /// Any partial chunk still inside the slicer is discarded, matching the
    /// documented stop behavior.
    pub fn stop(&mut self) {
        if let Some(SendableStream(stream)) = self.stream.take() {
            if let Err(e) = stream.pause() {
                warn!(error = %e, "failed to pause audio stream");
            }
            drop(stream);
        }
    }

    /// Whether a stream is currently running.
    pub fn is_capturing(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        self.stop();
    }
}
