use std::collections::BTreeMap;
use groupmatch::algorithm::grupos::crear_grupo;
use groupmatch::algorithm::matcher::{ejecutar_matching, match_por_cursos};
use groupmatch::models::{Amistad, Curso, EstadoAmistad, Pool, ResultadoMatch, Termino};

fn pool_vacio() -> Pool {
    let termino = Termino { anio: 2025, semestre: 1 };
    let catalogo = vec![
        Curso { codigo: "C1".into(), nombre: "Curso Uno".into() },
        Curso { codigo: "C2".into(), nombre: "Curso Dos".into() },
        Curso { codigo: "C3".into(), nombre: "Curso Tres".into() },
    ];
    Pool::nuevo(termino, catalogo)
}

fn agregar(pool: &mut Pool, id: u64, prefs: &[&str]) {
    let cursos = prefs.iter().map(|c| c.to_string()).collect();
    pool.agregar_postulante(id, &format!("P{}", id), cursos);
}

fn amistad_aceptada(pool: &mut Pool, a: u64, b: u64) {
    pool.amistades.push(Amistad { solicitante: a, receptor: b, estado: EstadoAmistad::Aceptada });
}

fn asercion_tamanos(resultado: &ResultadoMatch) {
    for g in &resultado.grupos {
        let n = g.miembros.len();
        assert!(
            (3..6).contains(&n),
            "grupo tag {} viola la cota de tamaño: {} miembros",
            g.tag,
            n
        );
    }
}

fn mapeo_tags(resultado: &ResultadoMatch) -> BTreeMap<i32, Vec<u64>> {
    resultado
        .grupos
        .iter()
        .map(|g| {
            let mut m = g.miembros.clone();
            m.sort_unstable();
            (g.tag, m)
        })
        .collect()
}

#[test]
fn test_pool_vacio_devuelve_resultado_vacio() {
    let mut pool = pool_vacio();
    let resultado = ejecutar_matching(&mut pool).unwrap();
    assert!(resultado.grupos.is_empty());
    assert!(resultado.sin_grupo.is_empty());
}

#[test]
fn test_dos_amigos_no_bastan_y_se_combinan_con_el_relleno() {
    let mut pool = pool_vacio();
    agregar(&mut pool, 1, &["C1"]);
    agregar(&mut pool, 2, &["C1"]);
    agregar(&mut pool, 3, &["C1"]);
    amistad_aceptada(&mut pool, 1, 2);

    let resultado = ejecutar_matching(&mut pool).unwrap();
    asercion_tamanos(&resultado);
    assert!(
        !resultado.grupos.iter().any(|g| g.miembros.len() == 2),
        "el par de amigos nunca se emite solo como grupo de 2"
    );
    assert_eq!(resultado.grupos.len(), 1);
    let mut miembros = resultado.grupos[0].miembros.clone();
    miembros.sort_unstable();
    assert_eq!(miembros, vec![1, 2, 3], "amigos disueltos más el tercero forman el grupo de 3");
    assert_eq!(resultado.grupos[0].cursos, vec!["C1".to_string()]);
    assert!(resultado.sin_grupo.is_empty());
}

#[test]
fn test_nueve_postulantes_tres_cursos() {
    let mut pool = pool_vacio();
    for id in 1..=3 {
        agregar(&mut pool, id, &["C1"]);
    }
    for id in 4..=6 {
        agregar(&mut pool, id, &["C2"]);
    }
    for id in 7..=9 {
        agregar(&mut pool, id, &["C3"]);
    }

    let resultado = ejecutar_matching(&mut pool).unwrap();
    asercion_tamanos(&resultado);
    assert_eq!(resultado.grupos.len(), 3, "exactamente 3 grupos de 3");
    assert!(resultado.sin_grupo.is_empty(), "cero sin grupo");
    for (g, curso) in resultado.grupos.iter().zip(["C1", "C2", "C3"]) {
        assert_eq!(g.miembros.len(), 3);
        assert_eq!(g.cursos, vec![curso.to_string()]);
    }
}

#[test]
fn test_monotonicidad_de_amistad() {
    let mut pool = pool_vacio();
    for id in 1..=5 {
        agregar(&mut pool, id, &["C1"]);
    }
    for (a, b) in [(1, 2), (2, 3), (3, 4), (4, 5)] {
        amistad_aceptada(&mut pool, a, b);
    }

    let resultado = ejecutar_matching(&mut pool).unwrap();
    asercion_tamanos(&resultado);
    assert_eq!(resultado.grupos.len(), 1);
    for (a, b) in pool.pares_aceptados() {
        let ga = pool.postulantes[pool.idx_postulante(a).unwrap()].grupo;
        let gb = pool.postulantes[pool.idx_postulante(b).unwrap()].grupo;
        assert_eq!(ga, gb, "par aceptado ({}, {}) debe quedar en el mismo grupo", a, b);
    }
}

#[test]
fn test_cadena_de_siete_amigos_se_divide() {
    let mut pool = pool_vacio();
    for id in 1..=7 {
        agregar(&mut pool, id, &["C1"]);
    }
    for par in (1..7).map(|a| (a, a + 1)) {
        amistad_aceptada(&mut pool, par.0, par.1);
    }

    let resultado = ejecutar_matching(&mut pool).unwrap();
    asercion_tamanos(&resultado);
    assert_eq!(resultado.grupos.len(), 2, "7 encadenados se dividen en dos grupos");
    assert_eq!(resultado.grupos[0].miembros, vec![1, 2, 3], "el primer trozo conserva el tag");
    assert_eq!(resultado.grupos[0].tag, 1);
    assert_eq!(resultado.grupos[1].miembros, vec![4, 5, 6, 7]);
    assert!(resultado.sin_grupo.is_empty());
}

#[test]
fn test_idempotencia_entre_corridas() {
    let mut pool = pool_vacio();
    for id in 1..=3 {
        agregar(&mut pool, id, &["C1"]);
    }
    amistad_aceptada(&mut pool, 1, 2);
    amistad_aceptada(&mut pool, 2, 3);
    for id in 4..=9 {
        agregar(&mut pool, id, &["C2"]);
    }

    let primera = ejecutar_matching(&mut pool).unwrap();
    let segunda = ejecutar_matching(&mut pool).unwrap();
    assert_eq!(
        mapeo_tags(&primera),
        mapeo_tags(&segunda),
        "sin cambios en el pool, el mapeo tag -> miembros es idéntico"
    );
    assert_eq!(primera.sin_grupo, segunda.sin_grupo);
}

#[test]
fn test_idempotencia_tras_dividir_una_cadena() {
    let mut pool = pool_vacio();
    for id in 1..=7 {
        agregar(&mut pool, id, &["C1"]);
    }
    for par in (1..7).map(|a| (a, a + 1)) {
        amistad_aceptada(&mut pool, par.0, par.1);
    }

    // la primera corrida divide la cadena en {1,2,3} y {4,5,6,7}; el par
    // (3, 4) queda con sus extremos en grupos distintos
    let primera = ejecutar_matching(&mut pool).unwrap();
    let segunda = ejecutar_matching(&mut pool).expect("la segunda corrida no debe fallar");
    assert_eq!(mapeo_tags(&primera), mapeo_tags(&segunda));
    assert_eq!(primera.sin_grupo, segunda.sin_grupo);
}

#[test]
fn test_idempotencia_tras_disolver_amigos_en_cumulos_distintos() {
    let mut pool = pool_vacio();
    // los amigos 1 y 2 prefieren cursos distintos: al disolver su grupo de 2,
    // el relleno los coloca en grupos diferentes
    agregar(&mut pool, 1, &["C1"]);
    agregar(&mut pool, 2, &["C2"]);
    amistad_aceptada(&mut pool, 1, 2);
    for id in 3..=4 {
        agregar(&mut pool, id, &["C1"]);
    }
    for id in 5..=6 {
        agregar(&mut pool, id, &["C2"]);
    }

    let primera = ejecutar_matching(&mut pool).unwrap();
    asercion_tamanos(&primera);
    let g1 = pool.postulantes[pool.idx_postulante(1).unwrap()].grupo;
    let g2 = pool.postulantes[pool.idx_postulante(2).unwrap()].grupo;
    assert_ne!(g1, g2, "los amigos disueltos quedaron en grupos distintos");

    let segunda = ejecutar_matching(&mut pool).expect("la segunda corrida no debe fallar");
    assert_eq!(mapeo_tags(&primera), mapeo_tags(&segunda));
    assert_eq!(primera.sin_grupo, segunda.sin_grupo);
}

#[test]
fn test_tags_unicos_y_sembrados_sobre_el_maximo_usado() {
    let mut pool = pool_vacio();
    pool.max_tag_usado = 10;
    for id in 1..=6 {
        agregar(&mut pool, id, &[if id <= 3 { "C1" } else { "C2" }]);
    }

    let resultado = ejecutar_matching(&mut pool).unwrap();
    let mut tags: Vec<i32> = resultado.grupos.iter().map(|g| g.tag).collect();
    assert_eq!(tags, vec![11, 12], "los tags arrancan sobre el máximo ya usado");
    tags.dedup();
    assert_eq!(tags.len(), resultado.grupos.len(), "tags positivos distintos");
}

#[test]
fn test_fusion_inconsistente_en_la_corrida_falla_atomicamente() {
    let mut pool = pool_vacio();
    for id in 1..=4 {
        agregar(&mut pool, id, &["C1"]);
    }
    // pares ascendentes (1,4), (2,3), (3,4): los dos primeros crean dos
    // grupos dentro de la corrida y el tercero los enlaza
    amistad_aceptada(&mut pool, 1, 4);
    amistad_aceptada(&mut pool, 2, 3);
    amistad_aceptada(&mut pool, 3, 4);

    let err = ejecutar_matching(&mut pool)
        .expect_err("dos grupos formados en la misma corrida y enlazados deben fallar");
    assert!(err.to_string().contains("inconsistente"));
    assert!(pool.grupos.is_empty(), "una corrida fallida no deja rastro en el pool");
    assert!(pool.postulantes.iter().all(|p| p.grupo.is_none()));
}

#[test]
fn test_par_separado_antes_de_la_corrida_es_colocacion_asentada() {
    let mut pool = pool_vacio();
    for id in 1..=6 {
        agregar(&mut pool, id, &["C1"]);
    }
    // estado de una corrida previa: el par (1, 4) quedó en grupos distintos
    crear_grupo(&mut pool, 1, &[1, 2, 3]);
    crear_grupo(&mut pool, 2, &[4, 5, 6]);
    amistad_aceptada(&mut pool, 1, 4);

    let resultado = ejecutar_matching(&mut pool).expect("la separación asentada no debe fallar");
    asercion_tamanos(&resultado);
    assert_eq!(mapeo_tags(&resultado), BTreeMap::from([(1, vec![1, 2, 3]), (2, vec![4, 5, 6])]));
}

#[test]
fn test_match_por_cursos_ignora_amistades() {
    let mut pool = pool_vacio();
    for id in 1..=3 {
        agregar(&mut pool, id, &["C1"]);
    }
    for id in 4..=6 {
        agregar(&mut pool, id, &["C2"]);
    }
    // amistad entre cúmulos distintos: la variante solo-cursos no la considera
    amistad_aceptada(&mut pool, 1, 4);

    let resultado = match_por_cursos(&mut pool).unwrap();
    asercion_tamanos(&resultado);
    assert_eq!(resultado.grupos.len(), 2);
    let mut primero = resultado.grupos[0].miembros.clone();
    primero.sort_unstable();
    assert_eq!(primero, vec![1, 2, 3], "agrupa por curso, no por amistad");
}
