/// grupos.rs - Constructor de grupos: fusión por amistad y mutadores de membresía
use std::error::Error;
use crate::algorithm::cursos_comunes;
use crate::models::{Grupo, Pool};

/// Crea un grupo nuevo con el tag dado y le asigna los miembros iniciales.
/// Devuelve el índice del grupo dentro de `pool.grupos`.
pub fn crear_grupo(pool: &mut Pool, tag: i32, ids: &[u64]) -> usize {
    let termino = pool.termino;
    pool.grupos.push(Grupo {
        tag,
        termino,
        miembros: Vec::new(),
        cursos: Vec::new(),
    });
    let idx = pool.grupos.len() - 1;
    asignar_miembros(pool, idx, ids);
    idx
}

/// Incorpora `ids` al grupo `grupo_idx`. Un postulante que ya es miembro se
/// ignora; uno que pertenece a otro grupo lo abandona primero (lo que puede
/// neutralizar al grupo viejo). Toda llamada termina recalculando los cursos
/// comunes del grupo afectado.
pub fn asignar_miembros(pool: &mut Pool, grupo_idx: usize, ids: &[u64]) {
    for &id in ids {
        let Some(p_idx) = pool.idx_postulante(id) else {
            continue;
        };
        match pool.postulantes[p_idx].grupo {
            Some(g) if g == grupo_idx => continue,
            Some(otro) => remover_miembro(pool, otro, id),
            None => {}
        }
        pool.grupos[grupo_idx].miembros.push(id);
        pool.postulantes[p_idx].grupo = Some(grupo_idx);
    }
    cursos_comunes::asignar_cursos_comunes(pool, grupo_idx);
}

/// Saca a `id` del grupo y recalcula los cursos comunes; si el grupo queda
/// vacío, el recálculo lo neutraliza (tag centinela, cursos vacíos).
pub fn remover_miembro(pool: &mut Pool, grupo_idx: usize, id: u64) {
    pool.grupos[grupo_idx].miembros.retain(|&m| m != id);
    if let Some(p_idx) = pool.idx_postulante(id) {
        if pool.postulantes[p_idx].grupo == Some(grupo_idx) {
            pool.postulantes[p_idx].grupo = None;
        }
    }
    cursos_comunes::asignar_cursos_comunes(pool, grupo_idx);
}

/// Fusiona a los postulantes `a` y `b` (conectados por una amistad aceptada)
/// en un mismo grupo. Casos, evaluados en este orden:
///
/// 1. Ambos ya están en el mismo grupo: no-op idempotente.
/// 2. Ambos están en grupos distintos: violación de invariante, la corrida
///    falla (nunca se fusionan dos grupos multi-miembro en silencio).
/// 3. Exactamente uno tiene grupo: el otro se incorpora a ese grupo.
/// 4. Ninguno tiene grupo: se crea un grupo nuevo con `tag = *contador` y
///    el contador avanza.
pub fn fusionar_por_amistad(
    pool: &mut Pool,
    a: u64,
    b: u64,
    contador: &mut i32,
) -> Result<usize, Box<dyn Error>> {
    let grupo_de = |pool: &Pool, id: u64| {
        pool.idx_postulante(id).and_then(|i| pool.postulantes[i].grupo)
    };
    match (grupo_de(pool, a), grupo_de(pool, b)) {
        (Some(ga), Some(gb)) if ga == gb => Ok(ga),
        (Some(_), Some(_)) => Err(format!(
            "estado inconsistente: los postulantes {} y {} pertenecen a grupos distintos",
            a, b
        )
        .into()),
        (Some(ga), None) => {
            asignar_miembros(pool, ga, &[b]);
            Ok(ga)
        }
        (None, Some(gb)) => {
            asignar_miembros(pool, gb, &[a]);
            Ok(gb)
        }
        (None, None) => {
            let tag = *contador;
            *contador += 1;
            Ok(crear_grupo(pool, tag, &[a, b]))
        }
    }
}
