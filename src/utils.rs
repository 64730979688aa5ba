//! This module contains the console logger used by the ycmflags library

pub mod log;
