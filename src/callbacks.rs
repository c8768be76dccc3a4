//! Host-supplied I/O and diagnostic callbacks.
//!
//! The container never touches a filesystem directly; every byte in and out, and every
//! diagnostic message, passes through these caller-supplied closures.

use crate::error::Error;
use std::fmt::{self, Debug, Formatter};

/// Reads `size` bytes of `filename` at `offset`, returning the actual buffer read (which may be
/// shorter than requested) or `None` on failure.
pub type ReadCallback<'a> = dyn FnMut(&str, u32, &mut u32) -> Option<Vec<u8>> + 'a;

/// Writes `buffer` to `filename` at `offset`.
pub type WriteCallback<'a> = dyn FnMut(&str, &[u8], u32) + 'a;

/// Reports a non-fatal diagnostic message to the caller.
pub type ErrorCallback<'a> = dyn FnMut(&str) + 'a;

/// The three callbacks a [`Container`](crate::container::Container) operation is driven by.
pub struct Callbacks<'a> {
    /// Supplies bytes for external reads (side stream files, `datx` payloads).
    pub read: Option<Box<ReadCallback<'a>>>,
    /// Accepts bytes for external writes.
    pub write: Option<Box<WriteCallback<'a>>>,
    /// Receives formatted diagnostic messages for non-fatal failures.
    pub error: Option<Box<ErrorCallback<'a>>>,
}

impl<'a> Callbacks<'a> {
    /// Callbacks with every hook absent; reads of external data will fail with
    /// [`crate::error::ErrorKind::IoFailed`] and diagnostics are silently dropped.
    #[must_use]
    pub fn none() -> Self {
        Self {
            read: None,
            write: None,
            error: None,
        }
    }

    /// Invokes the error callback, if set, with `err`'s formatted message. Used for non-fatal
    /// paths such as skipping an unrecognized class name.
    pub(crate) fn report(&mut self, err: &Error) {
        if let Some(callback) = &mut self.error {
            callback(&err.to_string());
        }
    }

    pub(crate) fn read_external(&mut self, filename: &str, offset: u32) -> Option<Vec<u8>> {
        let callback = self.read.as_mut()?;
        let mut size = 0;
        callback(filename, offset, &mut size)
    }

    pub(crate) fn write_external(&mut self, filename: &str, buffer: &[u8], offset: u32) {
        if let Some(callback) = &mut self.write {
            callback(filename, buffer, offset);
        }
    }
}

impl Debug for Callbacks<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("read", &self.read.as_ref().map(|_| "<callback>"))
            .field("write", &self.write.as_ref().map(|_| "<callback>"))
            .field("error", &self.error.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl Default for Callbacks<'_> {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod test {
    use super::Callbacks;
    use crate::error::{Error, ErrorKind};

    #[test]
    fn report_invokes_error_callback_with_formatted_message() {
        let mut seen = None;
        let mut callbacks = Callbacks {
            read: None,
            write: None,
            error: Some(Box::new(|msg: &str| seen = Some(msg.to_string()))),
        };

        callbacks.report(&Error::new(ErrorKind::EmptyFile));
        drop(callbacks);
        assert!(seen.unwrap().contains("zero entries"));
    }

    #[test]
    fn read_external_returns_none_without_a_read_callback() {
        let mut callbacks = Callbacks::none();
        assert!(callbacks.read_external("file.hst", 0).is_none());
    }
}
