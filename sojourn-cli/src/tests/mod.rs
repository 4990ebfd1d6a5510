//! Shared test harness modules for the Sojourn CLI.

use super::*;

mod helpers;
mod plan_unit;
mod steps;
