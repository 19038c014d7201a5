// Historial de corridas de matching: sumidero de persistencia (SQLite o
// Postgres) y consultas de reporte sobre la asignación vigente de un término.
pub mod db;
pub mod insertions;
pub mod queries;
