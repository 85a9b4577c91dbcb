//! Load Definitions - Sobrecargas Superficiales
//!
//! Dos tipos de carga actuan sobre la plataforma superior del talud:
//! - Carga distribuida uniforme (kPa) con offset desde la corona y
//!   longitud opcional (sin longitud la carga se extiende hasta el borde
//!   izquierdo del modelo)
//! - Carga lineal (kN/m) en un punto de la plataforma
//!
//! Ambas comparten el contrato "fuerza aditiva por dovela": una unica
//! operacion `strip_force` que devuelve el aporte de la carga al peso de
//! la dovela delimitada por [strip_left, strip_right].

use crate::validation::require_finite;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Carga distribuida uniforme sobre la plataforma superior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Udl {
    /// Magnitud (kPa)
    pub magnitude: f64,

    /// Offset del borde derecho de la carga desde la corona (m)
    pub offset: f64,

    /// Longitud de la carga (m); None = continua hasta el borde izquierdo
    pub length: Option<f64>,

    /// Color de despliegue
    pub color: String,

    /// La carga se desplaza durante un analisis dinamico
    pub dynamic_offset: bool,

    /// Coordenada x izquierda derivada sobre la plataforma (m)
    pub left_x: f64,

    /// Coordenada x derecha derivada sobre la plataforma (m)
    pub right_x: f64,
}

impl Udl {
    /// Crear una carga distribuida. Magnitudes y offsets negativos se
    /// toman en valor absoluto; longitud cero equivale a carga continua.
    pub fn new(magnitude: f64, offset: f64, length: Option<f64>) -> Result<Self> {
        require_finite(magnitude, "udl magnitude")?;
        require_finite(offset, "udl offset")?;

        let length = match length {
            Some(l) => {
                require_finite(l, "udl length")?;
                let l = l.abs();
                if l == 0.0 {
                    None
                } else {
                    Some(l)
                }
            }
            None => None,
        };

        Ok(Self {
            magnitude: magnitude.abs(),
            offset: offset.abs(),
            length,
            color: "red".to_string(),
            dynamic_offset: false,
            left_x: 0.0,
            right_x: 0.0,
        })
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_dynamic_offset(mut self) -> Self {
        self.dynamic_offset = true;
        self
    }
}

/// Carga lineal sobre la plataforma superior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineLoad {
    /// Magnitud (kN/m)
    pub magnitude: f64,

    /// Offset desde la corona (m)
    pub offset: f64,

    /// Color de despliegue
    pub color: String,

    /// La carga se desplaza durante un analisis dinamico
    pub dynamic_offset: bool,

    /// Coordenada x derivada sobre la plataforma (m)
    pub x: f64,
}

impl LineLoad {
    pub fn new(magnitude: f64, offset: f64) -> Result<Self> {
        require_finite(magnitude, "line load magnitude")?;
        require_finite(offset, "line load offset")?;

        Ok(Self {
            magnitude: magnitude.abs(),
            offset: offset.abs(),
            color: "blue".to_string(),
            dynamic_offset: false,
            x: 0.0,
        })
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_dynamic_offset(mut self) -> Self {
        self.dynamic_offset = true;
        self
    }
}

/// Carga superficial: variante etiquetada con el contrato comun de
/// contribucion por dovela
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SurfaceLoad {
    Distributed(Udl),
    Line(LineLoad),
}

impl SurfaceLoad {
    pub fn magnitude(&self) -> f64 {
        match self {
            SurfaceLoad::Distributed(udl) => udl.magnitude,
            SurfaceLoad::Line(ll) => ll.magnitude,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        match self {
            SurfaceLoad::Distributed(udl) => udl.dynamic_offset,
            SurfaceLoad::Line(ll) => ll.dynamic_offset,
        }
    }

    pub(crate) fn set_offset(&mut self, offset: f64) {
        match self {
            SurfaceLoad::Distributed(udl) => udl.offset = offset,
            SurfaceLoad::Line(ll) => ll.offset = offset,
        }
    }

    /// Recalcula las coordenadas derivadas contra la corona actual
    pub(crate) fn update_coordinates(&mut self, crest_x: f64) {
        match self {
            SurfaceLoad::Distributed(udl) => {
                udl.right_x = crest_x - udl.offset;
                udl.left_x = match udl.length {
                    Some(length) => (udl.right_x - length).max(0.0),
                    None => 0.0,
                };
            }
            SurfaceLoad::Line(ll) => {
                ll.x = (crest_x - ll.offset).max(0.0);
            }
        }
    }

    /// Longitud externa minima del modelo para contener la carga completa
    pub(crate) fn min_external_length(&self) -> f64 {
        match self {
            SurfaceLoad::Distributed(udl) => (udl.offset + udl.length.unwrap_or(3.0)) * 2.5,
            SurfaceLoad::Line(ll) => ll.offset * 3.0,
        }
    }

    /// Coordenada x del borde izquierdo, usada para sembrar puntos de
    /// entrada de busqueda junto a la discontinuidad
    pub(crate) fn left_edge_x(&self) -> f64 {
        match self {
            SurfaceLoad::Distributed(udl) => udl.left_x,
            SurfaceLoad::Line(ll) => ll.x,
        }
    }

    /// Aporte de la carga (kN) a la dovela [strip_left, strip_right].
    ///
    /// Para la carga distribuida hay cuatro casos segun el traslape de la
    /// dovela con [left_x, right_x]; la carga lineal usa un intervalo
    /// semiabierto para que dovelas adyacentes no dupliquen ni pierdan la
    /// carga en el limite.
    pub fn strip_force(&self, strip_left: f64, strip_right: f64) -> f64 {
        match self {
            SurfaceLoad::Distributed(udl) => {
                if udl.left_x <= strip_left && udl.right_x >= strip_right {
                    // dovela completamente dentro de la carga
                    (strip_right - strip_left) * udl.magnitude
                } else if strip_left <= udl.left_x && strip_right >= udl.left_x {
                    // dovela sobre el borde izquierdo de la carga
                    (strip_right - udl.left_x) * udl.magnitude
                } else if strip_left <= udl.right_x && strip_right >= udl.right_x {
                    // dovela sobre el borde derecho de la carga
                    (udl.right_x - strip_left) * udl.magnitude
                } else {
                    0.0
                }
            }
            SurfaceLoad::Line(ll) => {
                if strip_left <= ll.x && ll.x < strip_right {
                    ll.magnitude
                } else {
                    0.0
                }
            }
        }
    }
}
