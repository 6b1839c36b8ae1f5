//! API endpoint integration tests
//!
//! Drives the composed router for the auth, teams and invitation endpoints.

#![allow(dead_code)]

mod auth;
mod common;
mod invitations;
mod teams;
