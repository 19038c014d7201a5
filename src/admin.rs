// Acción administrativa: cargar snapshot, ejecutar el matching, imprimir el
// resultado como JSON y persistirlo en el historial.
use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::Instant;
use crate::algorithm::matcher;
use crate::api_json;
use crate::historial;
use crate::models::ResultadoMatch;

/// Flujo completo de la acción "ejecutar matching". El resultado solo se
/// persiste si la corrida termina sin errores; stdout queda reservado para el
/// JSON del resultado.
pub fn run_match_action(ruta: &Path) -> Result<ResultadoMatch, Box<dyn Error>> {
    let _ = dotenv::dotenv();
    eprintln!("📂 [admin] leyendo snapshot {}", ruta.display());
    let contenido = fs::read_to_string(ruta)
        .map_err(|e| format!("no se pudo leer el snapshot {}: {}", ruta.display(), e))?;

    let input = api_json::parse_pool_input(&contenido)?;
    let input = api_json::resolver_cursos(input);
    let mut pool = api_json::construir_pool(input)?;

    let inicio = Instant::now();
    let resultado = matcher::ejecutar_matching(&mut pool)?;
    let duracion_ms = inicio.elapsed().as_millis() as i64;

    println!("{}", serde_json::to_string_pretty(&resultado)?);

    historial::db::init_db()?;
    historial::insertions::guardar_resultado(&pool.termino, &resultado, duracion_ms)?;
    eprintln!(
        "✅ [admin] {} grupos, {} sin grupo ({} ms)",
        resultado.grupos.len(),
        resultado.sin_grupo.len(),
        duracion_ms
    );
    Ok(resultado)
}
