//! Content filters for Quarry.
//!
//! A [`FilterList`] is the ordered set of transforms that applies to one
//! path in one [`Direction`]. Content moving into storage is cleaned
//! (external driver), has `$Id$` keywords collapsed, and has CRLF line
//! endings normalised to LF. Content moving into the working tree goes
//! through the same filters in reverse.
//!
//! Which filters apply to a path is decided by gitattributes-style
//! [`AttributeRule`]s in the [`FilterConfig`]; a [`Filters`] value compiles
//! the rules once and loads lists per path.

pub mod attributes;
pub mod config;
pub mod crlf;
pub mod driver;
pub mod error;
pub mod ident;
pub mod list;

pub use attributes::{Attributes, PathAttributes};
pub use config::{AttributeRule, AutoCrlf, DriverConfig, Eol, FilterConfig};
pub use crlf::{CrlfFilter, TextDetection};
pub use driver::DriverFilter;
pub use error::{FilterError, FilterResult};
pub use ident::IdentFilter;
pub use list::{Direction, Filter, FilterList, FilterSource, Filters};
