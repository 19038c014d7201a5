// Estructuras de datos principales del motor de matching

use std::collections::HashMap;
use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;

/// Tag reservado para grupos que perdieron a todos sus miembros.
/// El registro se conserva pero queda excluido de cualquier salida.
pub const TAG_VACIO: i32 = -1;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Curso {
    pub codigo: String,
    pub nombre: String,
}

/// Término académico al que pertenece una corrida. Los tags son únicos por término.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Termino {
    pub anio: i32,
    pub semestre: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EstadoAmistad {
    Pendiente,
    Aceptada,
    Rechazada,
}

/// Un registro por solicitud de amistad. El estado es el único campo mutable;
/// las vistas enviadas/recibidas por postulante se calculan, no se almacenan.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Amistad {
    pub solicitante: u64,
    pub receptor: u64,
    pub estado: EstadoAmistad,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Postulante {
    pub id: u64,
    pub nombre: String,
    /// Cursos preferidos en orden de preferencia (códigos del catálogo)
    pub cursos_preferidos: Vec<String>,
    /// Índice del grupo actual dentro de `Pool::grupos` (referencia, sin propiedad)
    #[serde(skip)]
    pub grupo: Option<usize>,
}

/// Grupo de estudio. Invariantes: un grupo no vacío siempre tiene `tag >= 1`;
/// al perder el último miembro se neutraliza (`tag = TAG_VACIO`, cursos vacíos).
#[derive(Debug, Clone, serde::Serialize)]
pub struct Grupo {
    pub tag: i32,
    pub termino: Termino,
    /// Miembros en orden de incorporación
    pub miembros: Vec<u64>,
    /// Cursos comunes asignados; derivado, recalculado completo en cada cambio de membresía
    pub cursos: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GrupoMatch {
    pub tag: i32,
    pub miembros: Vec<u64>,
    pub cursos: Vec<String>,
}

/// Resultado de una corrida del orquestador: grupos ordenados por tag,
/// postulantes sin grupo ordenados por id.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ResultadoMatch {
    pub grupos: Vec<GrupoMatch>,
    pub sin_grupo: Vec<u64>,
}

/// Estado de trabajo en memoria: postulantes, amistades, grupos y catálogo
/// de un término. El pool es dueño de todo; los grupos son dueños exclusivos
/// de sus listas de miembros y cursos.
#[derive(Debug, Clone)]
pub struct Pool {
    pub termino: Termino,
    /// Catálogo en orden de enumeración canónico (desempates de cursos)
    pub catalogo: Vec<Curso>,
    /// Postulantes en orden de inscripción
    pub postulantes: Vec<Postulante>,
    pub amistades: Vec<Amistad>,
    pub grupos: Vec<Grupo>,
    /// Tag más alto ya usado en el término según el colaborador externo
    pub max_tag_usado: i32,
}

impl Pool {
    pub fn nuevo(termino: Termino, catalogo: Vec<Curso>) -> Self {
        Pool {
            termino,
            catalogo,
            postulantes: Vec::new(),
            amistades: Vec::new(),
            grupos: Vec::new(),
            max_tag_usado: 0,
        }
    }

    pub fn agregar_postulante(&mut self, id: u64, nombre: &str, cursos_preferidos: Vec<String>) {
        self.postulantes.push(Postulante {
            id,
            nombre: nombre.to_string(),
            cursos_preferidos,
            grupo: None,
        });
    }

    pub fn idx_postulante(&self, id: u64) -> Option<usize> {
        self.postulantes.iter().position(|p| p.id == id)
    }

    /// Posición de un código dentro del catálogo (orden de enumeración canónico)
    pub fn posicion_curso(&self, codigo: &str) -> Option<usize> {
        self.catalogo.iter().position(|c| c.codigo == codigo)
    }

    /// Tag más alto entre los grupos activos actuales (0 si no hay ninguno)
    pub fn max_tag_activo(&self) -> i32 {
        self.grupos
            .iter()
            .map(|g| g.tag)
            .filter(|&t| t > 0)
            .max()
            .unwrap_or(0)
    }

    /// Registra nuevas solicitudes de amistad desde `solicitante` hacia
    /// `destinatarios`. Una nueva acción de agregar amigos elimina primero las
    /// solicitudes salientes previas del solicitante; si el destinatario ya
    /// había enviado la solicitud inversa, ese registro se acepta en lugar de
    /// duplicarse.
    pub fn agregar_amigos(&mut self, solicitante: u64, destinatarios: &[u64]) {
        self.amistades.retain(|a| a.solicitante != solicitante);
        for &dest in destinatarios {
            if dest == solicitante {
                continue;
            }
            match self
                .amistades
                .iter_mut()
                .find(|a| a.solicitante == dest && a.receptor == solicitante)
            {
                Some(inversa) => inversa.estado = EstadoAmistad::Aceptada,
                None => self.amistades.push(Amistad {
                    solicitante,
                    receptor: dest,
                    estado: EstadoAmistad::Pendiente,
                }),
            }
        }
    }

    pub fn aceptar_solicitud(
        &mut self,
        receptor: u64,
        solicitante: u64,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.cambiar_estado_solicitud(receptor, solicitante, EstadoAmistad::Aceptada)
    }

    /// Rechaza una solicitud pendiente. El registro se conserva con estado
    /// Rechazada y deja de participar en el matching.
    pub fn rechazar_solicitud(
        &mut self,
        receptor: u64,
        solicitante: u64,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.cambiar_estado_solicitud(receptor, solicitante, EstadoAmistad::Rechazada)
    }

    fn cambiar_estado_solicitud(
        &mut self,
        receptor: u64,
        solicitante: u64,
        nuevo: EstadoAmistad,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match self.amistades.iter_mut().find(|a| {
            a.solicitante == solicitante
                && a.receptor == receptor
                && a.estado == EstadoAmistad::Pendiente
        }) {
            Some(a) => {
                a.estado = nuevo;
                Ok(())
            }
            None => Err(format!(
                "no hay solicitud pendiente de {} hacia {}",
                solicitante, receptor
            )
            .into()),
        }
    }

    /// Solicitudes pendientes enviadas por `id`, en orden de registro
    pub fn solicitudes_enviadas(&self, id: u64) -> Vec<u64> {
        self.amistades
            .iter()
            .filter(|a| a.solicitante == id && a.estado == EstadoAmistad::Pendiente)
            .map(|a| a.receptor)
            .collect()
    }

    /// Solicitudes pendientes recibidas por `id`, en orden de registro
    pub fn solicitudes_recibidas(&self, id: u64) -> Vec<u64> {
        self.amistades
            .iter()
            .filter(|a| a.receptor == id && a.estado == EstadoAmistad::Pendiente)
            .map(|a| a.solicitante)
            .collect()
    }

    /// Amigos con amistad aceptada (ambas direcciones), ordenados por id
    pub fn amigos_aceptados(&self, id: u64) -> Vec<u64> {
        let mut amigos: Vec<u64> = self
            .amistades
            .iter()
            .filter(|a| a.estado == EstadoAmistad::Aceptada)
            .filter_map(|a| {
                if a.solicitante == id {
                    Some(a.receptor)
                } else if a.receptor == id {
                    Some(a.solicitante)
                } else {
                    None
                }
            })
            .collect();
        amigos.sort_unstable();
        amigos.dedup();
        amigos
    }

    /// Pares aceptados no dirigidos, normalizados `(menor, mayor)`, sin
    /// duplicados, en orden ascendente. Este es el orden determinista de
    /// iteración de pares del orquestador: las aristas se materializan en un
    /// grafo no dirigido para deduplicar registros recíprocos.
    pub fn pares_aceptados(&self) -> Vec<(u64, u64)> {
        let mut grafo = UnGraph::<u64, ()>::new_undirected();
        let mut nodos = HashMap::new();
        for p in &self.postulantes {
            nodos.insert(p.id, grafo.add_node(p.id));
        }
        for a in &self.amistades {
            if a.estado != EstadoAmistad::Aceptada {
                continue;
            }
            if let (Some(&na), Some(&nb)) = (nodos.get(&a.solicitante), nodos.get(&a.receptor)) {
                if na != nb && grafo.find_edge(na, nb).is_none() {
                    grafo.add_edge(na, nb, ());
                }
            }
        }
        let mut pares: Vec<(u64, u64)> = grafo
            .edge_references()
            .map(|e| {
                let x = grafo[e.source()];
                let y = grafo[e.target()];
                if x < y { (x, y) } else { (y, x) }
            })
            .collect();
        pares.sort_unstable();
        pares.dedup();
        pares
    }
}
