/// matcher.rs - Orquestador del matching: corre la tubería completa sobre un
/// clon del pool y solo confirma el estado si la corrida termina sin errores.
use std::collections::HashSet;
use std::error::Error;
use crate::algorithm::{cursos_comunes, grupos, relleno, MAX_GRUPO, MIN_GRUPO};
use crate::models::{GrupoMatch, Pool, ResultadoMatch};

/// Punto de entrada único por acción administrativa.
///
/// 1. Trabaja sobre un clon del pool; una corrida fallida no deja rastro.
/// 2. Siembra el contador de tags por encima del máximo ya usado en el
///    término (los tags nunca se reutilizan dentro de un término).
/// 3. Itera los pares aceptados en orden determinista y fusiona por amistad.
///    Un par cuyos dos extremos ya estaban agrupados al iniciar la corrida es
///    una colocación asentada: las cotas de tamaño de una corrida previa
///    pudieron dividir o disolver su grupo, y esa separación se respeta como
///    no-op en lugar de re-fusionar o fallar. El error duro de fusión queda
///    reservado para separaciones fabricadas dentro de la misma corrida.
/// 4. Aplica las cotas de tamaño a los grupos formados por amistad: los
///    menores que `MIN_GRUPO` se disuelven (sus miembros vuelven al pool) y
///    los de `MAX_GRUPO` o más se dividen en trozos de 3..=5 en orden de
///    incorporación, conservando el primer trozo el tag original.
/// 5. Rellena por cursos a los que siguen sin grupo.
/// 6. Recalcula los cursos comunes de todo grupo activo.
/// 7. Devuelve los grupos con tag positivo ordenados por tag y los
///    postulantes sin grupo ordenados por id.
///
/// Idempotente entre corridas completas: sobre un pool sin cambios, una
/// segunda corrida solo produce no-ops y el mapeo tag -> miembros es idéntico.
pub fn ejecutar_matching(pool: &mut Pool) -> Result<ResultadoMatch, Box<dyn Error>> {
    let mut trabajo = pool.clone();
    let mut contador = trabajo.max_tag_usado.max(trabajo.max_tag_activo()) + 1;

    let pares = trabajo.pares_aceptados();
    eprintln!(
        "🤝 [matcher] {} postulantes, {} pares aceptados, contador inicial {}",
        trabajo.postulantes.len(),
        pares.len(),
        contador
    );
    // colocaciones asentadas antes de esta corrida: sus pares no se re-fusionan
    let asentados: HashSet<u64> = trabajo
        .postulantes
        .iter()
        .filter(|p| p.grupo.is_some())
        .map(|p| p.id)
        .collect();
    for (a, b) in pares {
        if asentados.contains(&a) && asentados.contains(&b) {
            continue;
        }
        grupos::fusionar_por_amistad(&mut trabajo, a, b, &mut contador)?;
    }

    aplicar_cotas_de_tamano(&mut trabajo, &mut contador);

    let pendientes = ids_sin_grupo(&trabajo);
    let creados = relleno::rellenar_por_cursos(&mut trabajo, &pendientes, &mut contador);
    eprintln!("📚 [matcher] relleno por cursos creó {} grupos", creados.len());

    recalcular_cursos_activos(&mut trabajo);

    let resultado = armar_resultado(&trabajo);
    *pool = trabajo;
    Ok(resultado)
}

/// Variante solo-cursos: ignora las amistades y forma grupos únicamente por
/// preferencia de curso compartida. Misma siembra de contador, mismo armado
/// de resultado.
pub fn match_por_cursos(pool: &mut Pool) -> Result<ResultadoMatch, Box<dyn Error>> {
    let mut trabajo = pool.clone();
    let mut contador = trabajo.max_tag_usado.max(trabajo.max_tag_activo()) + 1;

    let pendientes = ids_sin_grupo(&trabajo);
    relleno::rellenar_por_cursos(&mut trabajo, &pendientes, &mut contador);
    recalcular_cursos_activos(&mut trabajo);

    let resultado = armar_resultado(&trabajo);
    *pool = trabajo;
    Ok(resultado)
}

// Cotas de tamaño sobre los grupos construidos por amistad. Solo se revisan
// los grupos que existían al entrar; los que crea la división ya nacen dentro
// de las cotas.
fn aplicar_cotas_de_tamano(pool: &mut Pool, contador: &mut i32) {
    let existentes = pool.grupos.len();
    for idx in 0..existentes {
        if pool.grupos[idx].tag <= 0 {
            continue;
        }
        let n = pool.grupos[idx].miembros.len();
        if n < MIN_GRUPO {
            disolver_grupo(pool, idx);
        } else if n >= MAX_GRUPO {
            dividir_grupo(pool, idx, contador);
        }
    }
}

// Los miembros vuelven al pool sin grupo; el registro queda neutralizado por
// el recálculo de cursos sobre la membresía vacía.
fn disolver_grupo(pool: &mut Pool, grupo_idx: usize) {
    let miembros = std::mem::take(&mut pool.grupos[grupo_idx].miembros);
    for id in &miembros {
        if let Some(p_idx) = pool.idx_postulante(*id) {
            pool.postulantes[p_idx].grupo = None;
        }
    }
    cursos_comunes::asignar_cursos_comunes(pool, grupo_idx);
}

// División en orden de incorporación: el primer trozo conserva el tag
// original, los siguientes reciben tags frescos.
fn dividir_grupo(pool: &mut Pool, grupo_idx: usize, contador: &mut i32) {
    let miembros = pool.grupos[grupo_idx].miembros.clone();
    let tamanos = relleno::particion_tamanos(miembros.len());
    let primero = tamanos[0];

    pool.grupos[grupo_idx].miembros.truncate(primero);
    for id in &miembros[primero..] {
        if let Some(p_idx) = pool.idx_postulante(*id) {
            pool.postulantes[p_idx].grupo = None;
        }
    }
    cursos_comunes::asignar_cursos_comunes(pool, grupo_idx);

    let mut pos = primero;
    for t in &tamanos[1..] {
        let trozo = &miembros[pos..pos + t];
        pos += t;
        let tag = *contador;
        *contador += 1;
        grupos::crear_grupo(pool, tag, trozo);
    }
}

fn ids_sin_grupo(pool: &Pool) -> Vec<u64> {
    let mut ids: Vec<u64> = pool
        .postulantes
        .iter()
        .filter(|p| p.grupo.is_none())
        .map(|p| p.id)
        .collect();
    ids.sort_unstable();
    ids
}

// Pasada final idempotente: garantiza que toda mutación de membresía quedó
// reflejada en los cursos comunes.
fn recalcular_cursos_activos(pool: &mut Pool) {
    for idx in 0..pool.grupos.len() {
        if pool.grupos[idx].tag > 0 {
            cursos_comunes::asignar_cursos_comunes(pool, idx);
        }
    }
}

fn armar_resultado(pool: &Pool) -> ResultadoMatch {
    let mut grupos: Vec<GrupoMatch> = pool
        .grupos
        .iter()
        .filter(|g| g.tag > 0)
        .map(|g| GrupoMatch {
            tag: g.tag,
            miembros: g.miembros.clone(),
            cursos: g.cursos.clone(),
        })
        .collect();
    grupos.sort_by_key(|g| g.tag);
    ResultadoMatch {
        grupos,
        sin_grupo: ids_sin_grupo(pool),
    }
}
