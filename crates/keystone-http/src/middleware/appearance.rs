//! Web appearance preference, read from the `appearance` cookie.

use axum::extract::Request;
use axum::http::header::COOKIE;
use axum::middleware::Next;
use axum::response::Response;

const COOKIE_NAME: &str = "appearance";

/// Colour scheme requested by the browser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Appearance {
    Light,
    Dark,
    #[default]
    System,
}

impl Appearance {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

/// Reads the appearance cookie; unknown or missing values mean `System`.
pub fn appearance_of(req: &Request) -> Appearance {
    req.headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .and_then(|(_, value)| Appearance::parse(value.trim()))
        .unwrap_or_default()
}

pub async fn appearance_middleware(mut req: Request, next: Next) -> Response {
    let appearance = appearance_of(&req);
    req.extensions_mut().insert(appearance);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn with_cookie(cookie: &str) -> Request {
        axum::http::Request::builder()
            .header(COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn reads_cookie_among_others() {
        let req = with_cookie("sidebar_state=true; appearance=dark; other=1");
        assert_eq!(appearance_of(&req), Appearance::Dark);
    }

    #[test]
    fn defaults_to_system() {
        assert_eq!(appearance_of(&with_cookie("appearance=neon")), Appearance::System);
        let bare = axum::http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(appearance_of(&bare), Appearance::System);
    }
}
