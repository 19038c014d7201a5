use chrono::Utc;
use postgres::{Client, NoTls};
use rusqlite::{params, Connection};
use std::env;
use std::error::Error;
use crate::historial::db::historial_db_path;
use crate::models::{ResultadoMatch, Termino};

/// Persiste el resultado de una corrida: una fila en `corridas` más el
/// reemplazo completo de la asignación vigente del término (`grupos`,
/// `grupo_miembros`, `grupo_cursos`). Todo dentro de una sola transacción.
pub fn guardar_resultado(
    termino: &Termino,
    resultado: &ResultadoMatch,
    duration_ms: i64,
) -> Result<(), Box<dyn Error>> {
    let _ = dotenv::dotenv();
    let ts = Utc::now().to_rfc3339();
    let resultado_json = serde_json::to_string(resultado)?;

    if let Ok(url) = env::var("HISTORIAL_DB_URL") {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            return guardar_resultado_postgres(url, termino, resultado, duration_ms, ts, resultado_json);
        }
    }

    let mut conn = Connection::open(historial_db_path())?;
    let tx = conn.transaction()?;
    let anio = termino.anio;
    let semestre = termino.semestre as i32;

    tx.execute(
        "INSERT INTO corridas (ts, anio, semestre, num_grupos, num_sin_grupo, duration_ms, resultado_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            ts,
            anio,
            semestre,
            resultado.grupos.len() as i64,
            resultado.sin_grupo.len() as i64,
            duration_ms,
            resultado_json,
        ],
    )?;

    // la asignación vigente del término se reemplaza completa
    tx.execute("DELETE FROM grupos WHERE anio = ?1 AND semestre = ?2", params![anio, semestre])?;
    tx.execute("DELETE FROM grupo_miembros WHERE anio = ?1 AND semestre = ?2", params![anio, semestre])?;
    tx.execute("DELETE FROM grupo_cursos WHERE anio = ?1 AND semestre = ?2", params![anio, semestre])?;

    for g in &resultado.grupos {
        tx.execute(
            "INSERT INTO grupos (anio, semestre, tag) VALUES (?1, ?2, ?3)",
            params![anio, semestre, g.tag],
        )?;
        for (pos, id) in g.miembros.iter().enumerate() {
            tx.execute(
                "INSERT INTO grupo_miembros (anio, semestre, tag, postulante_id, posicion)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![anio, semestre, g.tag, *id as i64, pos as i64],
            )?;
        }
        for (pos, curso) in g.cursos.iter().enumerate() {
            tx.execute(
                "INSERT INTO grupo_cursos (anio, semestre, tag, curso, posicion)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![anio, semestre, g.tag, curso, pos as i64],
            )?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn guardar_resultado_postgres(
    url: String,
    termino: &Termino,
    resultado: &ResultadoMatch,
    duration_ms: i64,
    ts: String,
    resultado_json: String,
) -> Result<(), Box<dyn Error>> {
    let anio = termino.anio;
    let semestre = termino.semestre as i32;
    let num_grupos = resultado.grupos.len() as i64;
    let num_sin_grupo = resultado.sin_grupo.len() as i64;
    // datos planos para mover al hilo del cliente
    let grupos: Vec<(i32, Vec<i64>, Vec<String>)> = resultado
        .grupos
        .iter()
        .map(|g| (g.tag, g.miembros.iter().map(|&m| m as i64).collect(), g.cursos.clone()))
        .collect();

    let handle = std::thread::spawn(move || -> Result<(), Box<dyn Error + Send + 'static>> {
        let mut client = Client::connect(&url, NoTls)
            .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
        let mut tx = client
            .transaction()
            .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
        tx.execute(
            "INSERT INTO corridas (ts, anio, semestre, num_grupos, num_sin_grupo, duration_ms, resultado_json)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
            &[&ts, &anio, &semestre, &num_grupos, &num_sin_grupo, &duration_ms, &resultado_json],
        )
        .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
        tx.execute("DELETE FROM grupos WHERE anio = $1 AND semestre = $2", &[&anio, &semestre])
            .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
        tx.execute("DELETE FROM grupo_miembros WHERE anio = $1 AND semestre = $2", &[&anio, &semestre])
            .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
        tx.execute("DELETE FROM grupo_cursos WHERE anio = $1 AND semestre = $2", &[&anio, &semestre])
            .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
        for (tag, miembros, cursos) in &grupos {
            tx.execute(
                "INSERT INTO grupos (anio, semestre, tag) VALUES ($1, $2, $3)",
                &[&anio, &semestre, tag],
            )
            .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
            for (pos, id) in miembros.iter().enumerate() {
                let pos = pos as i32;
                tx.execute(
                    "INSERT INTO grupo_miembros (anio, semestre, tag, postulante_id, posicion)
                     VALUES ($1, $2, $3, $4, $5)",
                    &[&anio, &semestre, tag, id, &pos],
                )
                .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
            }
            for (pos, curso) in cursos.iter().enumerate() {
                let pos = pos as i32;
                tx.execute(
                    "INSERT INTO grupo_cursos (anio, semestre, tag, curso, posicion)
                     VALUES ($1, $2, $3, $4, $5)",
                    &[&anio, &semestre, tag, curso, &pos],
                )
                .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
            }
        }
        tx.commit().map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
        Ok(())
    });
    match handle.join() {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e as Box<dyn Error>),
        Err(e) => Err(format!("thread join error: {:?}", e).into()),
    }
}
