/// relleno.rs - Relleno por cursos: agrupa a los postulantes que quedaron
/// sin grupo tras la fusión por amistad, por curso preferido principal.
use crate::algorithm::{grupos, MIN_GRUPO};
use crate::models::Pool;

/// Tamaños de trozo para particionar `n` postulantes en grupos de 3..=5.
/// Regla adaptativa: tomar 5, pero tomar 3 cuando quedan 6 o 7, de modo que
/// cualquier n >= 3 se particiona completo (resto final siempre <= 2).
pub fn particion_tamanos(mut n: usize) -> Vec<usize> {
    let mut tamanos = Vec::new();
    while n >= MIN_GRUPO {
        let t = match n {
            3..=5 => n,
            6 | 7 => 3,
            _ => 5,
        };
        tamanos.push(t);
        n -= t;
    }
    tamanos
}

/// Forma grupos adicionales con los postulantes `sin_grupo`:
///
/// 1. Se agrupan por su curso más preferido (primera entrada de la lista;
///    quienes no tienen preferencias forman un cúmulo final). El orden de
///    cúmulos sigue la enumeración del catálogo, luego los códigos fuera del
///    catálogo por código; dentro de un cúmulo se conserva el orden de
///    inscripción.
/// 2. Cada cúmulo se particiona en trozos de 3..=5 (`particion_tamanos`).
/// 3. Los sobrantes que no llenan un trozo mínimo se combinan entre cúmulos
///    (en orden de cúmulo) y se particionan con la misma regla; el resto
///    final (<= 2 postulantes) queda sin emparejar.
///
/// Devuelve los índices de los grupos creados. Con menos de `MIN_GRUPO`
/// postulantes en total no se crea ningún grupo.
pub fn rellenar_por_cursos(pool: &mut Pool, sin_grupo: &[u64], contador: &mut i32) -> Vec<usize> {
    let mut cumulos: Vec<(Option<String>, Vec<u64>)> = Vec::new();
    for &id in sin_grupo {
        let Some(p_idx) = pool.idx_postulante(id) else {
            continue;
        };
        let clave = pool.postulantes[p_idx].cursos_preferidos.first().cloned();
        match cumulos.iter_mut().find(|(k, _)| *k == clave) {
            Some((_, ids)) => ids.push(id),
            None => cumulos.push((clave, vec![id])),
        }
    }
    cumulos.sort_by(|a, b| clave_cumulo(pool, &a.0).cmp(&clave_cumulo(pool, &b.0)));

    let mut creados = Vec::new();
    let mut sobrantes: Vec<u64> = Vec::new();
    for (_, ids) in &cumulos {
        let consumidos = formar_grupos(pool, ids, contador, &mut creados);
        sobrantes.extend_from_slice(&ids[consumidos..]);
    }
    // los sobrantes de cualquier par de cúmulos pueden combinarse
    let consumidos = formar_grupos(pool, &sobrantes, contador, &mut creados);
    debug_assert!(sobrantes.len() - consumidos < MIN_GRUPO);
    creados
}

// Particiona `ids` en trozos y crea un grupo por trozo; devuelve cuántos
// postulantes quedaron efectivamente agrupados (prefijo de `ids`).
fn formar_grupos(
    pool: &mut Pool,
    ids: &[u64],
    contador: &mut i32,
    creados: &mut Vec<usize>,
) -> usize {
    let mut pos = 0;
    for t in particion_tamanos(ids.len()) {
        let trozo = &ids[pos..pos + t];
        pos += t;
        let tag = *contador;
        *contador += 1;
        creados.push(grupos::crear_grupo(pool, tag, trozo));
    }
    pos
}

// Orden total de cúmulos: catálogo primero, códigos desconocidos después
// (por código), el cúmulo sin preferencias al final.
fn clave_cumulo(pool: &Pool, clave: &Option<String>) -> (u8, usize, String) {
    match clave {
        Some(codigo) => match pool.posicion_curso(codigo) {
            Some(pos) => (0, pos, String::new()),
            None => (1, 0, codigo.clone()),
        },
        None => (2, 0, String::new()),
    }
}
