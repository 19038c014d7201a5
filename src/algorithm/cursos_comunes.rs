/// cursos_comunes.rs - Asignador de cursos comunes de un grupo
use std::collections::HashSet;
use crate::models::{Pool, TAG_VACIO};

/// Recalcula desde cero el conjunto de cursos de un grupo a partir de las
/// preferencias de su membresía actual:
///
/// 1. Sin miembros: cursos vacíos, tag centinela.
/// 2. Se cuenta cuántos miembros prefieren cada curso (las repeticiones
///    dentro de la lista de un mismo miembro cuentan una sola vez).
/// 3. Se seleccionan los cursos con conteo >= 2, ordenados por conteo
///    descendente; empates resueltos por el orden de enumeración del catálogo.
/// 4. Si ningún curso alcanza conteo >= 2, el respaldo es la unión de todas
///    las preferencias, sin duplicados, en orden de primera aparición.
/// 5. La lista almacenada se reemplaza por completo, nunca se parcha.
///
/// La función es determinista e idempotente respecto de la membresía.
pub fn asignar_cursos_comunes(pool: &mut Pool, grupo_idx: usize) {
    if pool.grupos[grupo_idx].miembros.is_empty() {
        pool.grupos[grupo_idx].cursos.clear();
        pool.grupos[grupo_idx].tag = TAG_VACIO;
        return;
    }

    // conteo en orden de primera aparición sobre la lista ordenada de miembros
    let miembros = pool.grupos[grupo_idx].miembros.clone();
    let mut conteo: Vec<(String, usize)> = Vec::new();
    for id in miembros {
        let Some(p_idx) = pool.idx_postulante(id) else {
            continue;
        };
        let mut vistos: HashSet<String> = HashSet::new();
        for curso in &pool.postulantes[p_idx].cursos_preferidos {
            if !vistos.insert(curso.clone()) {
                continue;
            }
            match conteo.iter_mut().find(|(c, _)| c == curso) {
                Some(entrada) => entrada.1 += 1,
                None => conteo.push((curso.clone(), 1)),
            }
        }
    }

    let mut comunes: Vec<(String, usize)> = conteo
        .iter()
        .filter(|(_, n)| *n >= 2)
        .cloned()
        .collect();
    comunes.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| orden_catalogo(pool, &a.0).cmp(&orden_catalogo(pool, &b.0)))
    });

    pool.grupos[grupo_idx].cursos = if comunes.is_empty() {
        // respaldo: unión deduplicada en orden de primera aparición
        conteo.into_iter().map(|(c, _)| c).collect()
    } else {
        comunes.into_iter().map(|(c, _)| c).collect()
    };
}

// Clave total de orden: posición en el catálogo; códigos fuera del catálogo
// quedan después, ordenados por código.
fn orden_catalogo(pool: &Pool, codigo: &str) -> (usize, String) {
    match pool.posicion_curso(codigo) {
        Some(pos) => (pos, String::new()),
        None => (usize::MAX, codigo.to_string()),
    }
}
