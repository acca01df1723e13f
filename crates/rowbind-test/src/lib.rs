//! Test support for code built on rowbind.
//!
//! - [`MockElement`]: an in-memory page that implements [`rowbind::Element`]
//! - [`Recorder`]: insertion, filter and sort services that log their calls
//!
//! ```
//! use rowbind::{Element, Locator};
//! use rowbind_test::{text_table, MockElement};
//!
//! let page = MockElement::new("body")
//!     .child(text_table("users", &["name"], &[&["Ann"], &["Bob"]]))
//!     .into_ref();
//! assert_eq!(page.find_all(&Locator::css("#users tbody tr")).len(), 2);
//! ```

mod mock;
mod recorder;

pub use mock::{text_table, MockElement};
pub use recorder::{Recorded, Recorder, RecordingService};
