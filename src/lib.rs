//! A JSON parser that explains its failures.
//!
//! On invalid input [`parse`] hands back the stack of dead ends the grammar
//! hit, and [`render_diagnostic`] turns the most specific one into a message
//! pinpointing the line and column, naming the construct that failed, and
//! showing worked examples of what would have been accepted:
//!
//! ```text
//! Cannot parse this object.
//!
//! 6|    }
//!       ^
//! Expected a key value separator: ':'.
//! ```
//!
//! Parsing a valid document:
//!
//! ```
//! use jsondiag::{parse, Value};
//!
//! let value = parse("[1, true, null]").unwrap();
//! assert_eq!(
//!     value,
//!     Value::Array(vec![Value::Number(1.0), Value::Bool(true), Value::Null])
//! );
//! ```
//!
//! Rendering a failure:
//!
//! ```
//! use jsondiag::{parse, render_diagnostic};
//!
//! let src = r#"{ "name" }"#;
//! let dead_ends = parse(src).unwrap_err();
//! let message = render_diagnostic(src, &dead_ends).unwrap();
//! assert!(message.starts_with("Cannot parse this object."));
//! assert!(message.ends_with("Expected a key value separator: ':'."));
//! ```

pub mod combinators;
pub mod diagnostics;
pub mod parser;
pub mod value;

pub use diagnostics::render_diagnostic;
pub use parser::{parse, Context, DeadEnd, Failure, Problem};
pub use value::Value;
