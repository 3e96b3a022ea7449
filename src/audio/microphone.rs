//! Microphone capture over cpal
//!
//! A dedicated thread owns the input stream (cpal streams are not `Send`),
//! runs the capture worker from the stream callback, and keeps the stream
//! alive until the run flag clears. Stopping clears the flag and joins the
//! thread; the controller queues the worker's stop command first, so the
//! worker goes inactive before the stream is detached.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Device;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use super::capture::{CaptureWorker, WorkerChannels};
use super::convert::downmix_to_mono;
use super::source::{AudioSource, StreamInfo};
use crate::error::CaptureError;

/// Microphone input backed by the platform's default audio host.
pub struct CpalMicrophone {
    /// Optional device name substring from configuration
    device_name: Option<String>,
    running: Arc<AtomicBool>,
    capture_thread: Option<thread::JoinHandle<()>>,
}

impl CpalMicrophone {
    pub fn new(device_name: Option<String>) -> Self {
        Self {
            device_name,
            running: Arc::new(AtomicBool::new(false)),
            capture_thread: None,
        }
    }

    fn open_device(&self) -> Result<Device, CaptureError> {
        let host = cpal::default_host();

        match &self.device_name {
            Some(name) => find_device_by_name(&host, name),
            None => host
                .default_input_device()
                .ok_or_else(|| CaptureError::MicrophoneAccess("no input device available".into())),
        }
    }
}

#[async_trait]
impl AudioSource for CpalMicrophone {
    async fn start(&mut self, channels: WorkerChannels) -> Result<StreamInfo, CaptureError> {
        if self.is_capturing() {
            return Err(CaptureError::StreamBuild("capture already running".into()));
        }

        let device = self.open_device()?;
        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let config = device
            .default_input_config()
            .map_err(|e| CaptureError::DeviceConfig(e.to_string()))?;
        let sample_rate = config.sample_rate().0;
        let channel_count = config.channels();

        info!(
            "Opening microphone: {} ({} Hz, {} channels)",
            device_name, sample_rate, channel_count
        );

        let mut worker = CaptureWorker::new(sample_rate, channels);

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let (ready_tx, ready_rx) = oneshot::channel();

        let handle = thread::spawn(move || {
            let stream = device.build_input_stream(
                &config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if channel_count > 1 {
                        let mono = downmix_to_mono(data, channel_count as usize);
                        worker.on_frame(&mono);
                    } else {
                        worker.on_frame(data);
                    }
                },
                |err| error!("Audio stream error: {}", err),
                None,
            );

            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = ready_tx.send(Err(CaptureError::StreamBuild(e.to_string())));
                    return;
                }
            };

            if let Err(e) = stream.play() {
                let _ = ready_tx.send(Err(CaptureError::StreamPlay(e.to_string())));
                return;
            }

            let _ = ready_tx.send(Ok(()));

            // Keep the stream alive until stop clears the flag
            while running.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(50));
            }

            drop(stream);
        });

        let ready = ready_rx
            .await
            .map_err(|_| CaptureError::StreamBuild("capture thread exited early".into()));

        match ready {
            Ok(Ok(())) => {
                self.capture_thread = Some(handle);
                Ok(StreamInfo {
                    device: device_name,
                    sample_rate,
                    channels: channel_count,
                })
            }
            Ok(Err(e)) | Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(e)
            }
        }
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.capture_thread.take() {
            // Joining waits out at most one poll interval; keep it off the runtime
            let _ = tokio::task::spawn_blocking(move || {
                if handle.join().is_err() {
                    warn!("Capture thread panicked during shutdown");
                }
            })
            .await;
            info!("Microphone capture stopped");
        }

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "cpal-microphone"
    }
}

/// List the names of all available input devices.
pub fn list_input_devices() -> Result<Vec<String>, CaptureError> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| CaptureError::DeviceConfig(e.to_string()))?;

    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

fn find_device_by_name(host: &cpal::Host, name: &str) -> Result<Device, CaptureError> {
    let devices = host
        .input_devices()
        .map_err(|e| CaptureError::DeviceConfig(e.to_string()))?;

    for device in devices {
        if let Ok(device_name) = device.name() {
            if device_name.contains(name) {
                return Ok(device);
            }
        }
    }

    Err(CaptureError::MicrophoneAccess(format!(
        "input device not found: {name}"
    )))
}
