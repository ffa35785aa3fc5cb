// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod engine;
pub mod errors;
pub mod models;
pub mod money;
pub mod storage;
pub mod utils;

pub use engine::{Clock, Engine, FixedClock, SystemClock};
pub use errors::{EngineError, ErrorKind, Result};
pub use storage::{SqliteStore, Store};
