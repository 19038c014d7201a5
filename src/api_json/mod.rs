use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use crate::algorithm::grupos;
use crate::models::{Amistad, Curso, EstadoAmistad, Pool, Termino};

/// Umbral de similitud Jaro-Winkler para resolver nombres de curso
const UMBRAL_SIMILITUD: f64 = 0.90;

/// Snapshot de entrada para una corrida de matching
///
/// # Estructura del JSON esperado:
/// ```json
/// {
///   "termino": {"anio": 2025, "semestre": 1},
///   "cursos": [
///     {"codigo": "CS101", "nombre": "Introduction to Computer Science"},
///     {"codigo": "CS201", "nombre": "Data Structures"}
///   ],
///   "postulantes": [
///     {
///       "id": 1,
///       "nombre": "Kim Gayoung",
///       "cursos_preferidos": ["CS101", "CS201"],
///       "amigos_aceptados": [2],
///       "tag_grupo_actual": null
///     }
///   ],
///   "max_tag_usado": 0
/// }
/// ```
///
/// # Campos:
/// - `termino`: término académico de la corrida (requerido)
/// - `cursos`: catálogo del término en orden de enumeración canónico
/// - `postulantes`: pool de postulantes en orden de inscripción
/// - `max_tag_usado`: tag más alto ya usado en el término (semilla del contador)
#[derive(Debug, Serialize, Deserialize)]
pub struct PoolInput {
    pub termino: Termino,
    pub cursos: Vec<Curso>,
    pub postulantes: Vec<PostulanteInput>,
    #[serde(default)]
    pub max_tag_usado: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostulanteInput {
    pub id: u64,
    pub nombre: String,
    /// Preferencias en orden; pueden venir como código o como nombre de curso
    pub cursos_preferidos: Vec<String>,
    /// Ids de postulantes con amistad ya aceptada (no dirigido)
    #[serde(default)]
    pub amigos_aceptados: Vec<u64>,
    /// Tag del grupo al que ya pertenece, si está siendo reevaluado
    #[serde(default)]
    pub tag_grupo_actual: Option<i32>,
}

pub fn parse_pool_input(json_str: &str) -> Result<PoolInput, serde_json::Error> {
    serde_json::from_str::<PoolInput>(json_str)
}

/// Normaliza un nombre para comparaciones: minúsculas, sin acentos, solo
/// alfanuméricos y espacios simples.
pub fn normalize_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.to_lowercase().chars() {
        let c = match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'ñ' => 'n',
            _ => c,
        };
        if c.is_alphanumeric() {
            out.push(c);
        } else if c.is_whitespace() && !out.ends_with(' ') {
            out.push(' ');
        }
    }
    out.trim().to_string()
}

/// Resuelve las entradas de `cursos_preferidos` contra el catálogo: las que
/// ya son códigos se conservan; las que parecen nombres se mapean a su código
/// (igualdad normalizada, luego Jaro-Winkler sobre el nombre normalizado).
/// Las entradas irresolubles se descartan con una advertencia.
pub fn resolver_cursos(input: PoolInput) -> PoolInput {
    resolver_cursos_with_resolver(input, |catalogo, entrada| {
        resolver_contra_catalogo(catalogo, entrada)
    })
}

/// Versión parametrizable para pruebas: recibe un `resolver` que intenta
/// mapear una entrada de preferencia a un código del catálogo. Esto permite
/// mockear la resolución sin depender del catálogo real en los tests.
pub fn resolver_cursos_with_resolver<F>(mut input: PoolInput, resolver: F) -> PoolInput
where
    F: Fn(&[Curso], &str) -> Option<String>,
{
    let catalogo = input.cursos.clone();
    for postulante in &mut input.postulantes {
        let mut resueltos = Vec::with_capacity(postulante.cursos_preferidos.len());
        for entrada in postulante.cursos_preferidos.drain(..) {
            match resolver(&catalogo, &entrada) {
                Some(codigo) => resueltos.push(codigo),
                None => eprintln!(
                    "⚠️ [api_json] preferencia no resuelta para postulante {}: '{}'",
                    postulante.id, entrada
                ),
            }
        }
        postulante.cursos_preferidos = resueltos;
    }
    input
}

fn resolver_contra_catalogo(catalogo: &[Curso], entrada: &str) -> Option<String> {
    // código exacto primero
    if let Some(c) = catalogo.iter().find(|c| c.codigo == entrada) {
        return Some(c.codigo.clone());
    }
    // nombre con igualdad normalizada
    let objetivo = normalize_name(entrada);
    if let Some(c) = catalogo.iter().find(|c| normalize_name(&c.nombre) == objetivo) {
        return Some(c.codigo.clone());
    }
    // mejor candidato difuso sobre el nombre normalizado
    let mut mejor: Option<(f64, &Curso)> = None;
    for c in catalogo {
        let puntaje = strsim::jaro_winkler(&normalize_name(&c.nombre), &objetivo);
        if puntaje >= UMBRAL_SIMILITUD && mejor.map_or(true, |(p, _)| puntaje > p) {
            mejor = Some((puntaje, c));
        }
    }
    mejor.map(|(_, c)| c.codigo.clone())
}

/// Construye el `Pool` de trabajo a partir de un snapshot ya resuelto.
/// Un snapshot inválido se rechaza completo: id de postulante duplicado,
/// auto-amistad, id de amigo desconocido o `tag_grupo_actual` no positivo.
pub fn construir_pool(input: PoolInput) -> Result<Pool, Box<dyn std::error::Error>> {
    let mut pool = Pool::nuevo(input.termino, input.cursos);
    pool.max_tag_usado = input.max_tag_usado;

    let ids: HashSet<u64> = input.postulantes.iter().map(|p| p.id).collect();
    if ids.len() != input.postulantes.len() {
        return Err("snapshot inválido: id de postulante duplicado".into());
    }

    for p in &input.postulantes {
        pool.agregar_postulante(p.id, &p.nombre, p.cursos_preferidos.clone());
    }

    // aristas aceptadas no dirigidas, normalizadas (menor, mayor)
    let mut pares: Vec<(u64, u64)> = Vec::new();
    for p in &input.postulantes {
        for &amigo in &p.amigos_aceptados {
            if amigo == p.id {
                return Err(format!(
                    "snapshot inválido: auto-amistad del postulante {}",
                    p.id
                )
                .into());
            }
            if !ids.contains(&amigo) {
                return Err(format!(
                    "snapshot inválido: el postulante {} refiere al amigo desconocido {}",
                    p.id, amigo
                )
                .into());
            }
            let par = if p.id < amigo { (p.id, amigo) } else { (amigo, p.id) };
            if !pares.contains(&par) {
                pares.push(par);
            }
        }
    }
    for (a, b) in pares {
        pool.amistades.push(Amistad {
            solicitante: a,
            receptor: b,
            estado: EstadoAmistad::Aceptada,
        });
    }

    // reconstrucción de grupos existentes, miembros en orden de snapshot
    let mut por_tag: Vec<(i32, Vec<u64>)> = Vec::new();
    for p in &input.postulantes {
        if let Some(tag) = p.tag_grupo_actual {
            if tag <= 0 {
                return Err(format!(
                    "snapshot inválido: tag_grupo_actual {} del postulante {} no es positivo",
                    tag, p.id
                )
                .into());
            }
            match por_tag.iter_mut().find(|(t, _)| *t == tag) {
                Some((_, miembros)) => miembros.push(p.id),
                None => por_tag.push((tag, vec![p.id])),
            }
        }
    }
    for (tag, miembros) in por_tag {
        grupos::crear_grupo(&mut pool, tag, &miembros);
    }

    Ok(pool)
}
