//! Revive Print Kiosk host.
//!
//! The headless core of a walk-up print kiosk: an HTTP intake service that
//! receives uploads from the QR-linked web page, a scratch store with
//! reference-counted document lifetimes, a page-preview renderer, and a print
//! controller that submits jobs to the spooler and polls them to completion.
//! A display front-end drives the control loop through [`kiosk::KioskEvent`]s
//! and reads [`session::SessionState`] back.

pub mod config;
pub mod document;
pub mod intake;
pub mod kiosk;
pub mod pages;
pub mod preview;
pub mod print_job;
pub mod session;
pub mod spooler;

pub use document::{DocumentHandle, UploadedDocument};
pub use kiosk::{Kiosk, KioskEvent, UserAction};
pub use session::{Screen, SessionState};
