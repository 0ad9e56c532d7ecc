// Composition root.
//
// Responsibilities
// - Read config from environment.
// - Instantiate the store adapter and wire it into the use case handlers.
// - Expose the HTTP router to the binary.

pub mod config;
pub mod http;
pub mod state;
