use groupmatch::algorithm::grupos::{
    asignar_miembros, crear_grupo, fusionar_por_amistad, remover_miembro,
};
use groupmatch::models::{Curso, Pool, Termino, TAG_VACIO};

fn pool_demo() -> Pool {
    let termino = Termino { anio: 2025, semestre: 1 };
    let catalogo = vec![
        Curso { codigo: "C1".into(), nombre: "Curso Uno".into() },
        Curso { codigo: "C2".into(), nombre: "Curso Dos".into() },
        Curso { codigo: "C3".into(), nombre: "Curso Tres".into() },
    ];
    let mut pool = Pool::nuevo(termino, catalogo);
    pool.agregar_postulante(1, "Ana", vec!["C1".into(), "C2".into()]);
    pool.agregar_postulante(2, "Benito", vec!["C1".into()]);
    pool.agregar_postulante(3, "Carla", vec!["C2".into()]);
    pool.agregar_postulante(4, "Diego", vec!["C3".into()]);
    pool
}

#[test]
fn test_fusion_crea_grupo_nuevo() {
    let mut pool = pool_demo();
    let mut contador = 1;
    let idx = fusionar_por_amistad(&mut pool, 1, 2, &mut contador).unwrap();
    assert_eq!(pool.grupos[idx].tag, 1, "el primer grupo toma el tag inicial");
    assert_eq!(pool.grupos[idx].miembros, vec![1, 2]);
    assert_eq!(contador, 2, "el contador avanza al crear un grupo");
}

#[test]
fn test_fusion_mismo_grupo_es_noop() {
    let mut pool = pool_demo();
    let mut contador = 1;
    let idx = fusionar_por_amistad(&mut pool, 1, 2, &mut contador).unwrap();
    let idx2 = fusionar_por_amistad(&mut pool, 1, 2, &mut contador).unwrap();
    assert_eq!(idx, idx2, "mismo grupo: no-op idempotente");
    assert_eq!(contador, 2, "un no-op no consume tags");
    assert_eq!(pool.grupos[idx].miembros, vec![1, 2]);
}

#[test]
fn test_fusion_con_uno_ya_agrupado() {
    let mut pool = pool_demo();
    let mut contador = 1;
    let idx = fusionar_por_amistad(&mut pool, 1, 2, &mut contador).unwrap();
    let idx2 = fusionar_por_amistad(&mut pool, 2, 3, &mut contador).unwrap();
    assert_eq!(idx, idx2, "el postulante sin grupo se incorpora al existente");
    assert_eq!(pool.grupos[idx].miembros, vec![1, 2, 3]);
    assert_eq!(contador, 2, "incorporarse a un grupo no consume tags");
}

#[test]
fn test_fusion_grupos_distintos_falla() {
    let mut pool = pool_demo();
    let mut contador = 1;
    fusionar_por_amistad(&mut pool, 1, 2, &mut contador).unwrap();
    fusionar_por_amistad(&mut pool, 3, 4, &mut contador).unwrap();
    let err = fusionar_por_amistad(&mut pool, 1, 3, &mut contador)
        .expect_err("dos grupos distintos deben rechazarse");
    let msg = err.to_string();
    assert!(msg.contains('1') && msg.contains('3'), "el error nombra a ambos postulantes: {}", msg);
}

#[test]
fn test_remover_recalcula_y_neutraliza() {
    let mut pool = pool_demo();
    let idx = crear_grupo(&mut pool, 1, &[1, 2]);
    assert_eq!(pool.grupos[idx].cursos, vec!["C1".to_string()], "C1 es común a ambos");

    remover_miembro(&mut pool, idx, 1);
    assert_eq!(pool.grupos[idx].miembros, vec![2]);
    assert_eq!(
        pool.grupos[idx].cursos,
        vec!["C1".to_string()],
        "los cursos se recalculan solo con los miembros restantes"
    );

    remover_miembro(&mut pool, idx, 2);
    assert!(pool.grupos[idx].miembros.is_empty());
    assert_eq!(pool.grupos[idx].tag, TAG_VACIO, "grupo vacío queda con tag centinela");
    assert!(pool.grupos[idx].cursos.is_empty(), "grupo vacío queda sin cursos");
}

#[test]
fn test_grupo_de_tres_pierde_un_miembro() {
    let mut pool = pool_demo();
    // prefs: 1 -> [C1, C2], 2 -> [C1], 3 -> [C2]
    let idx = crear_grupo(&mut pool, 1, &[1, 2, 3]);
    assert_eq!(pool.grupos[idx].cursos, vec!["C1".to_string(), "C2".to_string()]);

    remover_miembro(&mut pool, idx, 2);
    assert_eq!(pool.grupos[idx].miembros, vec![1, 3]);
    assert_eq!(
        pool.grupos[idx].cursos,
        vec!["C2".to_string()],
        "solo C2 sigue siendo común entre los 2 miembros restantes"
    );
}

#[test]
fn test_asignar_mueve_desde_grupo_viejo() {
    let mut pool = pool_demo();
    let viejo = crear_grupo(&mut pool, 1, &[1, 2]);
    let nuevo = crear_grupo(&mut pool, 2, &[3, 4]);

    asignar_miembros(&mut pool, nuevo, &[2]);
    assert_eq!(pool.grupos[viejo].miembros, vec![1], "el miembro abandona el grupo viejo");
    assert_eq!(pool.grupos[nuevo].miembros, vec![3, 4, 2]);
    assert_eq!(
        pool.grupos[viejo].cursos,
        vec!["C1".to_string(), "C2".to_string()],
        "el grupo viejo recalcula con su único miembro (respaldo por unión)"
    );

    // mover al último miembro neutraliza al grupo viejo
    asignar_miembros(&mut pool, nuevo, &[1]);
    assert_eq!(pool.grupos[viejo].tag, TAG_VACIO);
    assert!(pool.grupos[viejo].cursos.is_empty());
}

#[test]
fn test_asignar_es_idempotente_por_miembro() {
    let mut pool = pool_demo();
    let idx = crear_grupo(&mut pool, 1, &[1, 2]);
    asignar_miembros(&mut pool, idx, &[2]);
    assert_eq!(pool.grupos[idx].miembros, vec![1, 2], "reasignar un miembro no lo duplica");
}
