// Biblioteca raíz del crate `groupmatch`.
// Reexporta los módulos principales y la acción administrativa
// `run_match_action` que ejecuta el flujo completo de matching.
pub mod models;
pub mod algorithm;
pub mod api_json;
pub mod historial;
pub mod admin;

/// Ejecuta la acción administrativa completa (reexport para facilitar uso desde `main`)
pub use admin::run_match_action;
