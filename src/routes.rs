//! Hash Routes
//!
//! `#/login`, `#/boards`, `#/boards/<id>` and `#/timeline`. Anything else
//! lands on the board list.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Boards,
    Board(String),
    Timeline,
}

impl Route {
    /// Parse `location.hash`, with or without the leading `#`
    pub fn parse(hash: &str) -> Self {
        let path = hash.trim_start_matches('#').trim_start_matches('/');
        let mut parts = path.split('/').filter(|p| !p.is_empty());
        match (parts.next(), parts.next(), parts.next()) {
            (Some("login"), None, _) => Route::Login,
            (Some("timeline"), None, _) => Route::Timeline,
            (Some("boards"), Some(id), None) => Route::Board(decode(id)),
            _ => Route::Boards,
        }
    }

    pub fn to_hash(&self) -> String {
        match self {
            Route::Login => "#/login".to_string(),
            Route::Boards => "#/boards".to_string(),
            Route::Board(id) => format!("#/boards/{}", encode(id)),
            Route::Timeline => "#/timeline".to_string(),
        }
    }

    pub fn is_private(&self) -> bool {
        !matches!(self, Route::Login)
    }

    pub fn board_id(&self) -> Option<&str> {
        match self {
            Route::Board(id) => Some(id),
            _ => None,
        }
    }
}

/// Route actually shown: private pages need a session, and a signed-in
/// user has no business on the login page
pub fn guard(requested: Route, authenticated: bool) -> Route {
    match (requested.is_private(), authenticated) {
        (true, false) => Route::Login,
        (false, true) => Route::Boards,
        _ => requested,
    }
}

fn encode(id: &str) -> String {
    percent_encoding::utf8_percent_encode(id, percent_encoding::NON_ALPHANUMERIC).to_string()
}

fn decode(segment: &str) -> String {
    percent_encoding::percent_decode_str(segment)
        .decode_utf8_lossy()
        .into_owned()
}

/// Current route from the address bar
pub fn current() -> Route {
    let hash = web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default();
    Route::parse(&hash)
}

pub fn navigate(route: &Route) {
    if let Some(window) = web_sys::window() {
        if window.location().set_hash(&route.to_hash()).is_err() {
            log::warn!("failed to navigate to {:?}", route);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(Route::parse("#/login"), Route::Login);
        assert_eq!(Route::parse("#/boards"), Route::Boards);
        assert_eq!(Route::parse("#/boards/b1"), Route::Board("b1".into()));
        assert_eq!(Route::parse("#/timeline"), Route::Timeline);
        assert_eq!(Route::parse(""), Route::Boards);
        assert_eq!(Route::parse("#/"), Route::Boards);
        assert_eq!(Route::parse("#/nowhere"), Route::Boards);
        assert_eq!(Route::parse("#/boards/b1/extra"), Route::Boards);
    }

    #[test]
    fn test_board_id_round_trips_through_hash() {
        let route = Route::Board("a b/c".into());
        assert_eq!(route.to_hash(), "#/boards/a%20b%2Fc");
        assert_eq!(Route::parse(&route.to_hash()), route);
    }

    #[test]
    fn test_guard() {
        assert_eq!(guard(Route::Timeline, false), Route::Login);
        assert_eq!(guard(Route::Board("b1".into()), true), Route::Board("b1".into()));
        assert_eq!(guard(Route::Login, true), Route::Boards);
        assert_eq!(guard(Route::Login, false), Route::Login);
    }
}
