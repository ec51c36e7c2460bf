use actix_cors::Cors;

/// Permissive CORS for the POS front-ends. Offline-first clients are served
/// from arbitrary origins (local files, device webviews).
pub fn create_cors() -> Cors {
    Cors::default()
        .allowed_origin_fn(|_, _req_head| true)
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}
