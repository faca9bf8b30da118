// src/middleware/client.rs
// DOCUMENTATION: Caller network details for rate limiting and review fingerprints

use actix_web::{dev::Payload, http::header, FromRequest, HttpRequest};
use std::future::{ready, Ready};

/// Client IP (proxy-aware) and user agent of the current request
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    pub fn from_http(req: &HttpRequest) -> Self {
        let ip = req
            .connection_info()
            .realip_remote_addr()
            .map(strip_port);
        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        ClientInfo { ip, user_agent }
    }

    /// IP for rate-limit keys; requests without one share a bucket
    pub fn ip_or_unknown(&self) -> &str {
        self.ip.as_deref().unwrap_or("unknown")
    }
}

/// "1.2.3.4:5678" -> "1.2.3.4"; bracketed IPv6 keeps the address only
fn strip_port(addr: &str) -> String {
    if let Some(rest) = addr.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest).to_string();
    }
    match addr.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => {
            host.to_string()
        }
        _ => addr.to_string(),
    }
}

impl FromRequest for ClientInfo {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(ClientInfo::from_http(req)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("10.0.0.7:51234"), "10.0.0.7");
        assert_eq!(strip_port("10.0.0.7"), "10.0.0.7");
        assert_eq!(strip_port("[2001:db8::1]:443"), "2001:db8::1");
        assert_eq!(strip_port("2001:db8::1"), "2001:db8::1");
    }

    #[test]
    fn test_forwarded_ip_and_agent() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.9"))
            .insert_header((header::USER_AGENT, "koreabiz-test/1.0"))
            .to_http_request();

        let info = ClientInfo::from_http(&req);
        assert_eq!(info.ip.as_deref(), Some("203.0.113.9"));
        assert_eq!(info.user_agent.as_deref(), Some("koreabiz-test/1.0"));
        assert_eq!(ClientInfo::default().ip_or_unknown(), "unknown");
    }
}
