//! HTTP request/response types shared by the adapter and transports
//!
//! The adapter never touches the network itself: it hands a [`Method`], a
//! REST path and a [`Parameters`](crate::params::Parameters) set to a
//! [`Transport`](crate::traits::Transport) and interprets the returned
//! [`RawResponse`].

use std::fmt;

/// HTTP verb used for an appliance call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and body of an appliance answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 or 201, the statuses the appliance uses for accepted writes
    pub fn is_write_success(&self) -> bool {
        matches!(self.status, 200 | 201)
    }

    /// 200 or 204, the statuses the appliance uses for accepted deletions
    pub fn is_delete_success(&self) -> bool {
        matches!(self.status, 200 | 204)
    }
}
