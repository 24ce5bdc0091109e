// handlers/welcome.rs - GET / handler

/// GET / - Public greeting, no auth
pub async fn welcome() -> &'static str {
    "Welcome"
}
