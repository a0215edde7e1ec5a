//! templeton generates project files from a YAML configuration of
//! path/content template pairs.
//! It discovers the variables the templates need, collects and validates
//! their values, copies static assets and renders every file.

/// Static asset replication
pub mod assets;

/// Command-line interface module for the templeton application
pub mod cli;

/// Configuration loading (structured or flat YAML)
pub mod config;

/// Shared constants: delimiters, permissions, date layouts
pub mod constants;

/// Data mappings and the ways values are supplied up front
pub mod context;

/// Error types and handling for the templeton application
pub mod error;

/// Variable discovery over parsed templates
pub mod extract;

/// Logger initialisation
pub mod logger;

/// Rendering descriptors to files under the output root
pub mod processor;

/// User input and interaction handling
pub mod prompt;

/// Template parsing and rendering functionality
pub mod template;

/// Input validation rules
pub mod validate;
