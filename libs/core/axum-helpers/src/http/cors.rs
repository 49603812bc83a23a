use axum::http::{HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Builds the CORS layer from a comma separated origin list such as
/// `http://localhost:3000,https://shop.example.com`.
///
/// Errors when the list is empty or an origin is not a valid header value.
pub fn cors_layer_from_origins(origins: &str) -> io::Result<CorsLayer> {
    let allowed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<HeaderValue>().map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Invalid CORS origin '{}': {}", s, e),
                )
            })
        })
        .collect::<io::Result<_>>()?;

    if allowed.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "CORS_ALLOWED_ORIGIN cannot be empty",
        ));
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_comma_separated_origins() {
        assert!(cors_layer_from_origins("http://localhost:3000, https://shop.example.com").is_ok());
    }

    #[test]
    fn test_rejects_empty_list() {
        let err = cors_layer_from_origins(" , ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_rejects_invalid_header_value() {
        let err = cors_layer_from_origins("http://ok.example.com,bad\norigin").unwrap_err();
        assert!(err.to_string().contains("Invalid CORS origin"));
    }
}
