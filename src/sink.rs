// src/sink.rs

//! PixelPhotonSink trait - the capability the pixellator drives.
//!
//! This is the only interface the engine requires of its downstream
//! collaborator (histogram accumulation, live display, storage, ...).
//!
//! ## Calling model
//! - All methods are invoked synchronously, in the caller's context, while
//!   an event is being handled. A sink that blocks stalls the acquisition
//!   feed.
//! - Callback order is causal: a frame's `handle_begin_frame` precedes every
//!   `handle_pixel_photon` of that frame, and its `handle_end_frame` follows
//!   them all.
//! - `handle_error` carries advisory data-level problems; the stream keeps
//!   flowing afterwards.
//! - `handle_finish` is called exactly once, after which the driving
//!   pixellator accepts no further events.

use crate::events::PixelPhotonEvent;

/// Receiver for pixellation output.
pub trait PixelPhotonSink {
    /// Frame `frame` has started; its photons follow.
    fn handle_begin_frame(&mut self, frame: u64);

    /// Frame `frame` is complete. Not called for a trailing frame whose
    /// completeness could never be established.
    fn handle_end_frame(&mut self, frame: u64);

    /// A photon resolved to a pixel of the currently open frame.
    fn handle_pixel_photon(&mut self, event: &PixelPhotonEvent);

    /// Advisory error in the input stream; processing continues.
    fn handle_error(&mut self, message: &str);

    /// No further events will arrive.
    fn handle_finish(&mut self);
}

impl<S: PixelPhotonSink + ?Sized> PixelPhotonSink for &mut S {
    fn handle_begin_frame(&mut self, frame: u64) {
        (**self).handle_begin_frame(frame);
    }

    fn handle_end_frame(&mut self, frame: u64) {
        (**self).handle_end_frame(frame);
    }

    fn handle_pixel_photon(&mut self, event: &PixelPhotonEvent) {
        (**self).handle_pixel_photon(event);
    }

    fn handle_error(&mut self, message: &str) {
        (**self).handle_error(message);
    }

    fn handle_finish(&mut self) {
        (**self).handle_finish();
    }
}

impl<S: PixelPhotonSink + ?Sized> PixelPhotonSink for Box<S> {
    fn handle_begin_frame(&mut self, frame: u64) {
        (**self).handle_begin_frame(frame);
    }

    fn handle_end_frame(&mut self, frame: u64) {
        (**self).handle_end_frame(frame);
    }

    fn handle_pixel_photon(&mut self, event: &PixelPhotonEvent) {
        (**self).handle_pixel_photon(event);
    }

    fn handle_error(&mut self, message: &str) {
        (**self).handle_error(message);
    }

    fn handle_finish(&mut self) {
        (**self).handle_finish();
    }
}
