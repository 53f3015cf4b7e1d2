//! # dotcode
//!
//! A Rust library for generating DotCode symbols with Reed-Solomon error
//! correction. DotCode is the dot-matrix symbology used by high-speed
//! industrial printers: data lives on half the cells of a checkerboard grid,
//! so a rectangle of almost any shape can carry a message.
//!
//! ## Features
//!
//! - **Automatic compaction**: Four encodation modes (numeric pairs, text,
//!   controls, raw binary) selected byte by byte for a compact stream
//! - **Reed-Solomon Error Correction**: GF(113) check codewords, roughly one
//!   per two data codewords, interleaved for long messages
//! - **Flexible shape**: Automatic sizing near a 3:2 aspect, or any fixed
//!   width from 5 to 200 columns
//! - **GS1, ECI, macros and structured append**: Full message-level
//!   feature set including multi-symbol messages
//!
//! ## Quick Start
//!
//! ```rust
//! use dotcode::DotCodeBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Simplest usage - provide only data, shape and mask are chosen automatically
//! let symbol = DotCodeBuilder::new(b"Hello, World!").build()?;
//!
//! println!("{} rows x {} columns", symbol.height(), symbol.width());
//! # Ok(())
//! # }
//! ```
//!
//! ### Full Configuration
//!
//! ```rust
//! use dotcode::{DotCodeBuilder, Segment};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let symbol = DotCodeBuilder::new(b"part one")
//!     .eci(3)                                   // ECI for the first segment
//!     .add_segment(Segment::with_eci(b"part two", 9))
//!     .width(40)                                // fixed width, height derived
//!     .mask(2)                                  // skip the mask search
//!     .build()?;
//!
//! assert_eq!(symbol.width(), 40);
//! # Ok(())
//! # }
//! ```
//!
//! ### GS1 and Structured Append
//!
//! ```rust
//! use dotcode::DotCodeBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // GS1 Application Identifier data; FNC1 separators are implied by mode
//! let symbol = DotCodeBuilder::new(b"0195012345678903").gs1(true).build()?;
//!
//! // Second symbol of a three-symbol message
//! let symbol = DotCodeBuilder::new(b"middle part").structured_append(2, 3).build()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Rendering
//!
//! The built [`DotCode`] exposes its grid cell by cell via [`DotCode::get`];
//! dark dots are the printed ones, and cells off the data checkerboard are
//! [`Module::Void`].

pub mod builder;
pub(crate) mod common;

pub use builder::{Color, DotCode, DotCodeBuilder, Module};
pub use common::error::{Axis, DotCodeError, DotCodeResult};
pub use common::mask::MaskPattern;
pub use common::metadata::{Metadata, Segment, StructuredAppend, Warning};
