pub mod annotations;
pub mod compliance;
pub mod config;
pub mod detector;
pub mod image_utils;
pub mod object_detection;
pub mod pipeline;
pub mod presentation;
