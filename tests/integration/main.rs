//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no printer,
//! relay or chat required.

mod job_lifecycle_tests;
mod mock_ports;
mod power_sequence_tests;
mod runtime_tests;
