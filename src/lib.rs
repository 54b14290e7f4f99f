#![cfg_attr(not(test), no_std)]

//! pico_beacon - firmware for a battery-powered locating device
//!
//! The device acquires satellite fixes over a serial NMEA stream, lets
//! an operator configure a target point over a console, estimates the
//! distance to the target, and must never silently hang: a hardware
//! watchdog is refreshed only while the health supervisor can prove
//! that every monitored task is still responsive.

// Platform abstraction layer (traits + mock implementations)
pub mod platform;

// Device drivers using platform abstraction
pub mod devices;

// Core infrastructure (logging, health supervision)
pub mod core;

// Subsystems (operator console, distance monitor)
pub mod subsystems;
