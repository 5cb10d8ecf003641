//! Blocklist rule normalization.
//!
//! Published blocklists mix several dialects:
//!
//! - **Hosts File**: `0.0.0.0 ads.example.com` lines with `#` comments
//! - **`AdBlock`**: `||ads.example.com^` rules with `!` comments, exceptions
//!   (`@@`), regex rules (`/.../`) and options (`$third-party`)
//! - **Domain List**: bare `ads.example.com` lines
//!
//! This module classifies each line into a [`ParsedLine`], applies the
//! operator [`Whitelist`], and renders the surviving domains into one of the
//! [`OutputFormat`](crate::config::OutputFormat)s.
//!
//! # Example
//!
//! ```
//! use hostsync::config::OutputFormat;
//! use hostsync::rules::{Whitelist, render, validate};
//!
//! let content = "! EasyList\n||ads.example.com^\n@@||ok.example.com^\n||cdn.example.net^";
//! assert!(validate(content));
//!
//! let whitelist = Whitelist::new(["*.example.net"]);
//! let output = render(content, &whitelist, Some(OutputFormat::Hosts)).unwrap();
//! assert_eq!(output.content, "! EasyList\n0.0.0.0 ads.example.com");
//! ```

mod domain;
mod parser;
mod render;
mod validate;
mod whitelist;

pub use domain::{is_ip_address, is_valid_domain, is_valid_ipv4};
pub use parser::{ParsedLine, WildcardMode, parse_line};
pub use render::{
    RenderError, RenderedOutput, SINKHOLE_ADDRESS, SOA_RECORD, content_hash, convert,
    filter_whitelist, render,
};
pub use validate::validate;
pub use whitelist::Whitelist;
