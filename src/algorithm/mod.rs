// Núcleo algorítmico: fusión por amistad, relleno por cursos,
// asignación de cursos comunes y orquestador del matching.
pub mod grupos;
pub mod relleno;
pub mod cursos_comunes;
pub mod matcher;

/// Tamaño mínimo de un grupo emparejado (inclusive)
pub const MIN_GRUPO: usize = 3;
/// Tamaño máximo de un grupo emparejado (exclusive)
pub const MAX_GRUPO: usize = 6;
