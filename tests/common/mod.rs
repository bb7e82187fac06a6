//! Common test infrastructure for Walltone integration tests.
//!
//! Each test file compiles its own copy of this module, so items may appear
//! unused from the perspective of a single test file even though they're
//! used elsewhere.

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod assertions;
pub mod fixtures;
pub mod mock_server;
pub mod mock_strategy;
pub mod mock_surface;

pub use assertions::*;
pub use mock_server::MockImageServer;
pub use mock_strategy::{FailingStrategy, SlowStrategy, StaticStrategy};
pub use mock_surface::{RecordingSurface, SurfaceCall};
