use rusqlite::Connection;
use std::env;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::PathBuf;

// Cliente Postgres para soporte de DB remota
use postgres::{Client, NoTls};

/// Abstracción sencilla para conexiones del historial que puede ser SQLite o
/// Postgres. Para Postgres guardamos la URL y realizamos las operaciones en un
/// hilo separado.
pub enum HistorialConn {
    Sqlite(Connection),
    /// Contiene la URL completa (postgres://...)
    PostgresConfig(String),
}

impl fmt::Debug for HistorialConn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistorialConn::Sqlite(_) => write!(f, "HistorialConn::Sqlite(..)"),
            HistorialConn::PostgresConfig(_) => write!(f, "HistorialConn::PostgresConfig(..)"),
        }
    }
}

// load .env at module init if present
fn load_dotenv() {
    let _ = dotenv::dotenv();
}

/// Ruta del archivo SQLite del historial. Expuesta para que los otros
/// submódulos abran conexiones de vida corta. Honra HISTORIAL_DB_PATH /
/// HISTORIAL_DB_URL.
pub fn historial_db_path() -> PathBuf {
    load_dotenv();
    if let Ok(p) = env::var("HISTORIAL_DB_PATH") {
        PathBuf::from(p)
    } else if let Ok(p) = env::var("HISTORIAL_DB_URL") {
        if p.starts_with("sqlite://") {
            PathBuf::from(p.trim_start_matches("sqlite://"))
        } else if p.starts_with("file://") {
            PathBuf::from(p.trim_start_matches("file://"))
        } else {
            // URLs remotas (postgres://...) no producen PathBuf local
            PathBuf::from("historial/matching.db")
        }
    } else {
        PathBuf::from("historial/matching.db")
    }
}

/// Abre una conexión al historial. Acepta sqlite://, file:// y postgres://.
pub fn open_historial_connection() -> Result<HistorialConn, Box<dyn Error>> {
    load_dotenv();
    if let Ok(url) = env::var("HISTORIAL_DB_URL") {
        if url.starts_with("sqlite://") || url.starts_with("file://") {
            let conn = Connection::open(historial_db_path())?;
            return Ok(HistorialConn::Sqlite(conn));
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            return Ok(HistorialConn::PostgresConfig(url));
        } else {
            return Err(format!("HISTORIAL_DB_URL usa un esquema no soportado: {}", url).into());
        }
    }
    let conn = Connection::open(historial_db_path())?;
    Ok(HistorialConn::Sqlite(conn))
}

/// Inicializa el historial (directorio + archivo sqlite + tablas)
pub fn init_db() -> Result<(), Box<dyn Error>> {
    load_dotenv();
    let usa_sqlite_local = match env::var("HISTORIAL_DB_URL") {
        Ok(url) => url.starts_with("sqlite://") || url.starts_with("file://"),
        Err(_) => true,
    };
    if usa_sqlite_local {
        let db_path = historial_db_path();
        if let Some(dir) = db_path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
    }

    match open_historial_connection()? {
        HistorialConn::Sqlite(conn) => {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS corridas (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    ts TEXT NOT NULL,
                    anio INTEGER NOT NULL,
                    semestre INTEGER NOT NULL,
                    num_grupos INTEGER NOT NULL,
                    num_sin_grupo INTEGER NOT NULL,
                    duration_ms INTEGER,
                    resultado_json TEXT
                );

                CREATE TABLE IF NOT EXISTS grupos (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    anio INTEGER NOT NULL,
                    semestre INTEGER NOT NULL,
                    tag INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS grupo_miembros (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    anio INTEGER NOT NULL,
                    semestre INTEGER NOT NULL,
                    tag INTEGER NOT NULL,
                    postulante_id INTEGER NOT NULL,
                    posicion INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS grupo_cursos (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    anio INTEGER NOT NULL,
                    semestre INTEGER NOT NULL,
                    tag INTEGER NOT NULL,
                    curso TEXT NOT NULL,
                    posicion INTEGER NOT NULL
                );",
            )?;
            Ok(())
        }
        HistorialConn::PostgresConfig(url) => {
            // Crear tablas en un hilo dedicado para evitar conflictos de runtime
            let handle = std::thread::spawn(move || -> Result<(), Box<dyn Error + Send + 'static>> {
                let mut client = Client::connect(&url, NoTls)
                    .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
                client
                    .batch_execute(
                        "CREATE TABLE IF NOT EXISTS corridas (
                            id BIGSERIAL PRIMARY KEY,
                            ts TEXT NOT NULL,
                            anio INTEGER NOT NULL,
                            semestre INTEGER NOT NULL,
                            num_grupos BIGINT NOT NULL,
                            num_sin_grupo BIGINT NOT NULL,
                            duration_ms BIGINT,
                            resultado_json TEXT
                        );

                        CREATE TABLE IF NOT EXISTS grupos (
                            id BIGSERIAL PRIMARY KEY,
                            anio INTEGER NOT NULL,
                            semestre INTEGER NOT NULL,
                            tag INTEGER NOT NULL
                        );

                        CREATE TABLE IF NOT EXISTS grupo_miembros (
                            id BIGSERIAL PRIMARY KEY,
                            anio INTEGER NOT NULL,
                            semestre INTEGER NOT NULL,
                            tag INTEGER NOT NULL,
                            postulante_id BIGINT NOT NULL,
                            posicion INTEGER NOT NULL
                        );

                        CREATE TABLE IF NOT EXISTS grupo_cursos (
                            id BIGSERIAL PRIMARY KEY,
                            anio INTEGER NOT NULL,
                            semestre INTEGER NOT NULL,
                            tag INTEGER NOT NULL,
                            curso TEXT NOT NULL,
                            posicion INTEGER NOT NULL
                        );",
                    )
                    .map_err(|e| Box::new(e) as Box<dyn Error + Send + 'static>)?;
                Ok(())
            });
            match handle.join() {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e as Box<dyn Error>),
                Err(e) => Err(format!("thread join error: {:?}", e).into()),
            }
        }
    }
}
