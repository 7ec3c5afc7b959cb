use serde::Serialize;

/// The screens of the client.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The card feed. Requires a session.
    Home,
    SignIn,
    SignUp,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::SignIn => "/signin",
            Route::SignUp => "/signup",
        }
    }

    /// Where a request for `path` actually lands.
    ///
    /// The feed is protected, the auth screens bounce signed-in users to the
    /// feed, and unknown paths redirect by authentication state.
    pub fn resolve(path: &str, authenticated: bool) -> Route {
        match (path, authenticated) {
            (_, true) => Route::Home,
            ("/signup", false) => Route::SignUp,
            (_, false) => Route::SignIn,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
