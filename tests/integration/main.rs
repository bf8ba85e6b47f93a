//! Integration tests for Link-Ripper
//!
//! These tests use wiremock to stand in for the pages being ripped, and
//! drive the HTTP API through the router without binding a port.

mod rip_tests;
mod server_tests;
