//! Clients for third-party services the domain layer talks to.

pub mod gemini;
