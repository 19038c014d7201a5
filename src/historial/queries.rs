use postgres::{Client, NoTls};
use rusqlite::{params, Connection};
use std::env;
use std::error::Error;
use crate::historial::db::historial_db_path;
use crate::models::{GrupoMatch, Termino};

fn postgres_url() -> Option<String> {
    let _ = dotenv::dotenv();
    match env::var("HISTORIAL_DB_URL") {
        Ok(url) if url.starts_with("postgres://") || url.starts_with("postgresql://") => Some(url),
        _ => None,
    }
}

/// Asignación vigente de un término: grupos con sus miembros y cursos en el
/// orden persistido, ordenados por tag ascendente.
pub fn grupos_del_termino(termino: &Termino) -> Result<Vec<GrupoMatch>, Box<dyn Error>> {
    let anio = termino.anio;
    let semestre = termino.semestre as i32;

    if let Some(url) = postgres_url() {
        let handle = std::thread::spawn(move || -> Result<Vec<GrupoMatch>, Box<dyn Error + Send + 'static>> {
            let mut client = Client::connect(&url, NoTls)
                .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
            let tags = client
                .query(
                    "SELECT tag FROM grupos WHERE anio = $1 AND semestre = $2 ORDER BY tag",
                    &[&anio, &semestre],
                )
                .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
            let mut out = Vec::new();
            for fila in tags.iter() {
                let tag: i32 = fila.get(0);
                let miembros = client
                    .query(
                        "SELECT postulante_id FROM grupo_miembros
                         WHERE anio = $1 AND semestre = $2 AND tag = $3 ORDER BY posicion",
                        &[&anio, &semestre, &tag],
                    )
                    .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?
                    .iter()
                    .map(|r| r.get::<_, i64>(0) as u64)
                    .collect();
                let cursos = client
                    .query(
                        "SELECT curso FROM grupo_cursos
                         WHERE anio = $1 AND semestre = $2 AND tag = $3 ORDER BY posicion",
                        &[&anio, &semestre, &tag],
                    )
                    .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?
                    .iter()
                    .map(|r| r.get::<_, String>(0))
                    .collect();
                out.push(GrupoMatch { tag, miembros, cursos });
            }
            Ok(out)
        });
        return match handle.join() {
            Ok(res) => res.map_err(|e| e as Box<dyn Error>),
            Err(e) => Err(format!("thread join error: {:?}", e).into()),
        };
    }

    let conn = Connection::open(historial_db_path())?;
    let mut stmt = conn.prepare("SELECT tag FROM grupos WHERE anio = ?1 AND semestre = ?2 ORDER BY tag")?;
    let tags: Vec<i32> = stmt
        .query_map(params![anio, semestre], |fila| fila.get(0))?
        .collect::<Result<_, _>>()?;

    let mut out = Vec::new();
    for tag in tags {
        let mut stmt = conn.prepare(
            "SELECT postulante_id FROM grupo_miembros
             WHERE anio = ?1 AND semestre = ?2 AND tag = ?3 ORDER BY posicion",
        )?;
        let miembros: Vec<u64> = stmt
            .query_map(params![anio, semestre, tag], |fila| fila.get::<_, i64>(0))?
            .collect::<Result<Vec<i64>, _>>()?
            .into_iter()
            .map(|m| m as u64)
            .collect();
        let cursos = cursos_de_grupo_sqlite(&conn, anio, semestre, tag)?;
        out.push(GrupoMatch { tag, miembros, cursos });
    }
    Ok(out)
}

/// Cursos asignados a un grupo (lectura para el endpoint de cursos del equipo)
pub fn cursos_de_grupo(termino: &Termino, tag: i32) -> Result<Vec<String>, Box<dyn Error>> {
    let anio = termino.anio;
    let semestre = termino.semestre as i32;

    if let Some(url) = postgres_url() {
        let handle = std::thread::spawn(move || -> Result<Vec<String>, Box<dyn Error + Send + 'static>> {
            let mut client = Client::connect(&url, NoTls)
                .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
            let filas = client
                .query(
                    "SELECT curso FROM grupo_cursos
                     WHERE anio = $1 AND semestre = $2 AND tag = $3 ORDER BY posicion",
                    &[&anio, &semestre, &tag],
                )
                .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
            Ok(filas.iter().map(|r| r.get::<_, String>(0)).collect())
        });
        return match handle.join() {
            Ok(res) => res.map_err(|e| e as Box<dyn Error>),
            Err(e) => Err(format!("thread join error: {:?}", e).into()),
        };
    }

    let conn = Connection::open(historial_db_path())?;
    cursos_de_grupo_sqlite(&conn, anio, semestre, tag)
}

fn cursos_de_grupo_sqlite(
    conn: &Connection,
    anio: i32,
    semestre: i32,
    tag: i32,
) -> Result<Vec<String>, Box<dyn Error>> {
    let mut stmt = conn.prepare(
        "SELECT curso FROM grupo_cursos
         WHERE anio = ?1 AND semestre = ?2 AND tag = ?3 ORDER BY posicion",
    )?;
    let cursos = stmt
        .query_map(params![anio, semestre, tag], |fila| fila.get(0))?
        .collect::<Result<_, _>>()?;
    Ok(cursos)
}

/// Tag más alto persistido para el término (0 si no hay ninguno). Semilla del
/// espacio de tags para la siguiente corrida.
pub fn max_tag_usado(termino: &Termino) -> Result<i32, Box<dyn Error>> {
    let anio = termino.anio;
    let semestre = termino.semestre as i32;

    if let Some(url) = postgres_url() {
        let handle = std::thread::spawn(move || -> Result<i32, Box<dyn Error + Send + 'static>> {
            let mut client = Client::connect(&url, NoTls)
                .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
            let fila = client
                .query_one(
                    "SELECT COALESCE(MAX(tag), 0) FROM grupos WHERE anio = $1 AND semestre = $2",
                    &[&anio, &semestre],
                )
                .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
            Ok(fila.get(0))
        });
        return match handle.join() {
            Ok(res) => res.map_err(|e| e as Box<dyn Error>),
            Err(e) => Err(format!("thread join error: {:?}", e).into()),
        };
    }

    let conn = Connection::open(historial_db_path())?;
    let tag: i32 = conn.query_row(
        "SELECT COALESCE(MAX(tag), 0) FROM grupos WHERE anio = ?1 AND semestre = ?2",
        params![anio, semestre],
        |fila| fila.get(0),
    )?;
    Ok(tag)
}

/// Últimas corridas registradas: (id, ts, num_grupos, num_sin_grupo, duration_ms)
pub fn resumen_corridas(limit: i64) -> Result<Vec<(i64, String, i64, i64, i64)>, Box<dyn Error>> {
    if let Some(url) = postgres_url() {
        let handle = std::thread::spawn(
            move || -> Result<Vec<(i64, String, i64, i64, i64)>, Box<dyn Error + Send + 'static>> {
                let mut client = Client::connect(&url, NoTls)
                    .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
                let filas = client
                    .query(
                        "SELECT id, ts, num_grupos, num_sin_grupo, COALESCE(duration_ms, 0)
                         FROM corridas ORDER BY id DESC LIMIT $1",
                        &[&limit],
                    )
                    .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
                Ok(filas
                    .iter()
                    .map(|r| (r.get(0), r.get(1), r.get(2), r.get(3), r.get(4)))
                    .collect())
            },
        );
        return match handle.join() {
            Ok(res) => res.map_err(|e| e as Box<dyn Error>),
            Err(e) => Err(format!("thread join error: {:?}", e).into()),
        };
    }

    let conn = Connection::open(historial_db_path())?;
    let mut stmt = conn.prepare(
        "SELECT id, ts, num_grupos, num_sin_grupo, COALESCE(duration_ms, 0)
         FROM corridas ORDER BY id DESC LIMIT ?1",
    )?;
    let filas = stmt
        .query_map(params![limit], |fila| {
            Ok((fila.get(0)?, fila.get(1)?, fila.get(2)?, fila.get(3)?, fila.get(4)?))
        })?
        .collect::<Result<_, _>>()?;
    Ok(filas)
}
