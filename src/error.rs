//! Error types for the transmitter.

use std::ffi::CString;

/// The error type for transmitting time signals.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to get default audio output device")]
	NoOutputDevice,
	#[error("Failed to build audio stream: {0}")]
	BuildStream(#[from] cpal::BuildStreamError),
	#[error("Failed to play audio stream: {0}")]
	PlayStream(#[from] cpal::PlayStreamError),
	#[error("Failed to get current system time")]
	Clock,
	/// The host environment could not be updated with the timezone in the payload.
	#[error("Failed to set timezone {0:?}")]
	Timezone(CString),
	/// The audio stream reported an error while transmitting.
	#[error("Audio stream failed during transmission")]
	StreamFailed,
	/// The audio output stopped accepting seconds before transmission finished.
	#[error("Audio output closed before transmission completed")]
	ChannelClosed
}
