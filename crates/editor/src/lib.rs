// Library crate: the editing core plus the headless harness and script
// protocol used by integration tests and the command-line driver.

pub mod command;
pub mod edit;
pub mod external;
pub mod fixtures;
pub mod geometry;
pub mod harness;
pub mod interaction;
pub mod state;
pub mod viewport;
