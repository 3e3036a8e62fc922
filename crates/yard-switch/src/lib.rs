//! `yard-switch`: the exclusive resource behind every physical switch.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`lock`]    | `SwitchLock`, `SwitchGuard`, `Acquisition`                |
//!
//! # Fairness model
//!
//! Every caller of [`SwitchLock::try_acquire`] draws a ticket and joins a
//! FIFO queue.  The switch is granted only to the ticket at the head of the
//! queue, so a late arrival can never cut in front of an earlier waiter.
//! A waiter whose timeout expires (or whose run is cancelled) leaves the
//! queue and the next ticket becomes the head.

pub mod lock;


pub use lock::{Acquisition, SwitchGuard, SwitchLock};
