//! The TCP cluster transport: framed, heartbeated duplex links between nodes.
//!
//! [`transport::ClusterTransport`] is a [`crate::transport::Transport`] like
//! [`crate::transport::InProcessTransport`], but envelopes whose target
//! lives on another node cross a length-framed TCP connection instead of
//! being handed straight to the local actor table. [`protocol`] owns the
//! wire shape; [`config`] and [`error`] are its configuration and error
//! taxonomy.

pub mod config;
pub mod error;
pub mod protocol;
pub mod transport;

pub use config::ClusterTransportConfig;
pub use error::ClusterError;
pub use transport::ClusterTransport;
