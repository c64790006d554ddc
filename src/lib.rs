//! A lightweight library for attaching callbacks to viewport width
//! breakpoints.
//!
//! A [`Breakpoints`] registry maps named size ranges to width conditions.
//! Subscribers are notified when a named breakpoint is entered or left, and
//! when the current breakpoint changes. Truth comes from a host
//! [`MediaMatcher`]: the built-in [`Viewport`] simulates one by holding a
//! width, and [`UnsupportedMedia`] is the degraded always-false fallback.
//!
//! ```
//! use std::rc::Rc;
//!
//! use breakpoints::{Breakpoints, Listener, Viewport};
//!
//! let viewport = Viewport::new(1024.0);
//! let breakpoints = Breakpoints::new(Rc::new(viewport.clone()));
//! breakpoints.define_defaults();
//!
//! assert_eq!(breakpoints.is("md"), Some(true));
//!
//! breakpoints.on(
//!     "sm",
//!     Listener::Enter(Rc::new(|query| println!("entered {}", query.name()))),
//! );
//!
//! viewport.set_width(800.0);
//! assert_eq!(breakpoints.current().unwrap().name(), "sm");
//! ```
//!
//! Everything is single-threaded and synchronous: state transitions happen
//! inside the host's truth-change notifications, and unsubscribing is the
//! only cancellation mechanism.

mod callbacks;
mod change;
mod matcher;
mod media;
mod query;
mod registry;
mod size;

pub use callbacks::{CallbackId, Callbacks, Handler};
pub use change::{BreakpointChange, ChangeHandler, ChangeNotifier};
pub use matcher::{MatchListener, MediaMatcher, UnsupportedMedia, Viewport, WatchId};
pub use media::{MediaCondition, WidthRange};
pub use query::{EventKind, MediaQuery, QueryHandler};
pub use registry::{defaults, Breakpoints, DefineOptions, Listener, Unsubscribe, DEFAULT_UNIT};
pub use size::Size;
