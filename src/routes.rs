use std::fmt;
use std::str::FromStr;

use crate::auth::AuthMode;
use crate::error::BoardError;
use crate::models::{CompanyId, JobId};

/// Parses an id coming from outside the program (CLI argument, route path).
pub fn parse_id(raw: &str) -> Result<i64, BoardError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| BoardError::InvalidId(raw.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Jobs,
    Job(JobId),
    Saved,
    Applications,
    Companies,
    Company(CompanyId),
    Resume,
    Auth(AuthMode),
    Profile,
}

impl FromStr for Route {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, query) = match s.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (s, None),
        };
        let segments: Vec<&str> = path.split('/').filter(|seg| !seg.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["jobs"] => Route::Jobs,
            ["job", id] => Route::Job(parse_id(id)?),
            ["saved"] => Route::Saved,
            ["applications"] => Route::Applications,
            ["companies"] => Route::Companies,
            ["company", id] => Route::Company(parse_id(id)?),
            ["resume"] => Route::Resume,
            ["auth"] => {
                let signup = query
                    .map(|q| q.split('&').any(|pair| pair == "mode=signup"))
                    .unwrap_or(false);
                Route::Auth(if signup { AuthMode::SignUp } else { AuthMode::SignIn })
            }
            ["profile"] => Route::Profile,
            _ => return Err(BoardError::UnknownRoute(s.to_string())),
        };
        Ok(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::Jobs => write!(f, "/jobs"),
            Route::Job(id) => write!(f, "/job/{}", id),
            Route::Saved => write!(f, "/saved"),
            Route::Applications => write!(f, "/applications"),
            Route::Companies => write!(f, "/companies"),
            Route::Company(id) => write!(f, "/company/{}", id),
            Route::Resume => write!(f, "/resume"),
            Route::Auth(AuthMode::SignIn) => write!(f, "/auth"),
            Route::Auth(AuthMode::SignUp) => write!(f, "/auth?mode=signup"),
            Route::Profile => write!(f, "/profile"),
        }
    }
}

pub fn share_link(base_url: &str, route: Route) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), route)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("3"), Ok(3));
        assert_eq!(parse_id(" 42 "), Ok(42));
        assert_eq!(parse_id("abc"), Err(BoardError::InvalidId("abc".to_string())));
        assert!(parse_id("3abc").is_err());
        assert!(parse_id("").is_err());
    }

    #[test]
    fn test_parse_routes() {
        assert_eq!("/".parse::<Route>(), Ok(Route::Home));
        assert_eq!("/jobs".parse::<Route>(), Ok(Route::Jobs));
        assert_eq!("/job/7".parse::<Route>(), Ok(Route::Job(7)));
        assert_eq!("/company/2/".parse::<Route>(), Ok(Route::Company(2)));
        assert_eq!("/auth".parse::<Route>(), Ok(Route::Auth(AuthMode::SignIn)));
        assert_eq!(
            "/auth?mode=signup".parse::<Route>(),
            Ok(Route::Auth(AuthMode::SignUp))
        );
        assert!(matches!("/job/x".parse::<Route>(), Err(BoardError::InvalidId(_))));
        assert!(matches!("/nope".parse::<Route>(), Err(BoardError::UnknownRoute(_))));
    }

    #[test]
    fn test_display_round_trips() {
        let routes = [
            Route::Home,
            Route::Job(3),
            Route::Company(9),
            Route::Auth(AuthMode::SignUp),
            Route::Profile,
        ];
        for route in routes {
            assert_eq!(route.to_string().parse::<Route>(), Ok(route));
        }
    }

    #[test]
    fn test_share_link() {
        assert_eq!(
            share_link("http://localhost:5173/", Route::Job(3)),
            "http://localhost:5173/job/3"
        );
    }
}
