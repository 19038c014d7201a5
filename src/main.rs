// --- Motor de Matching de Grupos de Estudio - Archivo principal ---

use std::env;
use std::path::PathBuf;
use std::process;

fn main() {
    println!("=== Motor de Matching de Grupos de Estudio ===");
    let ruta = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/postulantes.json"));
    if let Err(e) = groupmatch::run_match_action(&ruta) {
        eprintln!("❌ error: {}", e);
        process::exit(1);
    }
}
