// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # VMC SDDC
//!
//! Lifecycle management for a single VMware Cloud on AWS SDDC owned by one user.
//!
//! ## Overview
//!
//! The tool answers three requests against the VMC API:
//!
//! - **Create**: locate the SDDC owned by the configured user, create it if it
//!   is missing, wait until it is ready and describe it
//! - **Delete**: delete the owned SDDC if there is one, and wait until it is gone
//! - **Status**: describe the owned SDDC without changing anything
//!
//! ## Architecture
//!
//! 1. **Authentication**: a CSP refresh token is exchanged for a session token
//! 2. **Location**: the org's SDDC list is filtered by owner
//! 3. **Orchestration**: create or delete requests are issued and the SDDC
//!    state is polled with backoff until a terminal state or the deadline
//!
//! ## Modules
//!
//! - [`config`]: Configuration parsing and validation
//! - [`vmc`]: CSP authentication, VMC API client and lifecycle orchestration
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! vmc:
//!   org_id: 2a4b0c6e-0000-0000-0000-000000000000
//!   user_name: alice@example.com
//!
//! sddc:
//!   name: lab
//!   num_hosts: 1
//!   region: US_WEST_2
//!   subnet_id: subnet-0a1b2c3d
//!   connected_account_id: 4f1c0000-0000-0000-0000-000000000000
//!   vxlan_subnet: 10.2.0.0/16
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod vmc;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Action, Cli, OutputFormatter};
pub use config::{ConfigParser, ConfigValidator, VmcConfig};
pub use error::{Result, VmcError};
pub use vmc::{CspAuthenticator, LifecycleOrchestrator, VmcClient};
