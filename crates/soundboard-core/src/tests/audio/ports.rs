use crate::{AudioError, CaptureHandle};

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

/// WHAT: A finished capture hands its buffer back to the caller
/// WHY: The recording workflow saves exactly what the worker captured
#[test]
#[allow(clippy::unwrap_used)]
fn given_completed_job_when_finishing_then_buffer_returned() {
    // Given: A capture job that produces 10 samples
    let handle = CaptureHandle::spawn(|_stop| Ok(vec![7i16; 10]));

    // When: Waiting for the result
    let samples = handle.finish(Duration::from_secs(1)).unwrap();

    // Then: The buffer arrives intact
    assert_eq!(samples, vec![7i16; 10]);
}

/// WHAT: Stopping raises the flag the worker polls and waits for it to exit
/// WHY: Cancellation must end the capture immediately and drop the buffer
#[test]
fn given_running_job_when_stopped_then_worker_observes_flag() {
    // Given: A job that spins until told to stop
    let observed = Arc::new(AtomicBool::new(false));
    let observed_in_job = Arc::clone(&observed);
    let handle = CaptureHandle::spawn(move |stop| {
        while !stop.load(Ordering::Acquire) {
            std::thread::sleep(Duration::from_millis(1));
        }
        observed_in_job.store(true, Ordering::Release);
        Ok(vec![1i16; 3])
    });

    // When: Stopping the capture
    handle.stop();

    // Then: The worker has seen the stop flag before stop() returned
    assert!(observed.load(Ordering::Acquire));
}

/// WHAT: A capture that never completes times out with a device error
/// WHY: A hung input device must not freeze the caller forever
#[test]
fn given_hung_job_when_finishing_with_timeout_then_device_error() {
    // Given: A job that only exits once stopped
    let handle = CaptureHandle::spawn(|stop| {
        while !stop.load(Ordering::Acquire) {
            std::thread::sleep(Duration::from_millis(1));
        }
        Ok(Vec::new())
    });

    // When: Waiting briefly
    let result = handle.finish(Duration::from_millis(20));

    // Then: DeviceError is returned
    assert!(matches!(result, Err(AudioError::DeviceError { .. })));
}

/// WHAT: Worker errors propagate through finish
/// WHY: Device failures mid-capture must surface to the workflow
#[test]
fn given_failing_job_when_finishing_then_error_propagated() {
    // Given: A job that fails at once
    let handle = CaptureHandle::spawn(|_stop| {
        Err(AudioError::NoMicrophoneFound {
            location: error_location::ErrorLocation::from(std::panic::Location::caller()),
        })
    });

    // When: Waiting for the result
    let result = handle.finish(Duration::from_secs(1));

    // Then: The worker's error comes back
    assert!(matches!(result, Err(AudioError::NoMicrophoneFound { .. })));
}

/// Poll until the worker has reported, or give up after a second.
fn poll_until_reported(handle: &mut CaptureHandle) -> Option<AudioError> {
    for _ in 0..200 {
        if let Some(e) = handle.poll_failure() {
            return Some(e);
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    None
}

/// WHAT: A worker that fails mid-capture is seen without waiting for finish
/// WHY: An unplugged microphone must end the recording at the next tick
#[test]
fn given_job_failing_midway_when_polled_then_failure_reported() {
    // Given: A job that fails as if the device vanished
    let mut handle = CaptureHandle::spawn(|_stop| {
        Err(AudioError::DeviceError {
            reason: "device unplugged".to_string(),
            location: error_location::ErrorLocation::from(std::panic::Location::caller()),
        })
    });

    // When: Polling
    let failure = poll_until_reported(&mut handle);

    // Then: The device error is reported
    assert!(matches!(failure, Some(AudioError::DeviceError { .. })));
}

/// WHAT: A running or successful worker never reports a failure, and an early
/// buffer is still returned by finish
/// WHY: Polling must not lose the recording
#[test]
#[allow(clippy::unwrap_used)]
fn given_job_done_early_when_polled_then_buffer_kept_for_finish() {
    // Given: A job that completes at once
    let mut handle = CaptureHandle::spawn(|_stop| Ok(vec![3i16; 4]));
    std::thread::sleep(Duration::from_millis(50));

    // When: Polling twice, then finishing
    assert!(handle.poll_failure().is_none());
    assert!(handle.poll_failure().is_none());
    let samples = handle.finish(Duration::from_secs(1)).unwrap();

    // Then: The buffer survived the polls
    assert_eq!(samples, vec![3i16; 4]);
}
