use std::fmt::Display;
use std::str::FromStr;

const DETAIL_PREFIX: &str = "/asset/";

/// The two screens of the app, addressed like the paths of the web version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Listing,
    Detail(String),
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Listing => write!(f, "/"),
            Route::Detail(id) => write!(f, "{DETAIL_PREFIX}{id}"),
        }
    }
}

impl FromStr for Route {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "/" {
            return Ok(Route::Listing);
        }
        match s.strip_prefix(DETAIL_PREFIX) {
            Some(id) if !id.is_empty() && !id.contains('/') => Ok(Route::Detail(id.to_string())),
            _ => Err(anyhow::anyhow!("Invalid route: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_round_trip() {
        assert_eq!("/".parse::<Route>().unwrap(), Route::Listing);
        assert_eq!(
            "/asset/bitcoin".parse::<Route>().unwrap(),
            Route::Detail("bitcoin".to_string())
        );
        assert_eq!(Route::Detail("usd-coin".to_string()).to_string(), "/asset/usd-coin");
        assert_eq!(Route::Listing.to_string(), "/");
    }

    #[test]
    fn test_invalid_routes() {
        assert!("/asset/".parse::<Route>().is_err());
        assert!("/asset/a/b".parse::<Route>().is_err());
        assert!("/markets".parse::<Route>().is_err());
    }
}
