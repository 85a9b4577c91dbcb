//! Boundary Model - Frontera Externa del Modelo
//!
//! La frontera externa es una polilinea cerrada de siete vertices con
//! perfil trapezoidal: origen, esquina superior izquierda, corona, pie,
//! borde derecho superior, esquina inferior derecha y regreso al origen.
//! Las dimensiones externas se amplian automaticamente respecto a la cara
//! del talud para que las superficies de falla no queden truncadas por el
//! borde del modelo.

use crate::validation::{require_positive, require_range, require_strictly_positive};
use crate::{Point2, Result, StabilityError};
use serde::{Deserialize, Serialize};
use talud_core::circle_line_intersection;

/// Tolerancia en x (m) para eliminar intersecciones duplicadas entre un
/// circulo y la frontera
pub const INTERSECTION_DEDUP_TOL: f64 = 0.01;

/// Dimensiones externas minimas del modelo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryOptions {
    /// Longitud externa minima (m)
    pub min_ext_length: f64,

    /// Altura externa minima (m)
    pub min_ext_height: f64,
}

impl Default for BoundaryOptions {
    fn default() -> Self {
        Self {
            min_ext_length: 10.0,
            min_ext_height: 6.0,
        }
    }
}

/// Frontera externa construida desde la altura y el angulo (o la longitud)
/// de la cara del talud
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalBoundary {
    vertices: [Point2; 7],
    height: f64,
    length: f64,
    gradient: f64,
    crest: Point2,
    toe: Point2,
    external_length: f64,
    external_height: f64,
}

impl ExternalBoundary {
    /// Construye la frontera. Exactamente uno de `angle` (grados) o
    /// `length` (m) debe estar presente; con angulo la longitud de la cara
    /// es height / tan(angle). La longitud se limita por debajo a 0.001 m
    /// para que un talud vertical produzca un gradiente finito muy grande.
    pub fn new(
        height: f64,
        angle: Option<f64>,
        length: Option<f64>,
        options: &BoundaryOptions,
    ) -> Result<Self> {
        require_strictly_positive(height, "height")?;

        if angle.is_some() && length.is_some() {
            return Err(StabilityError::InvalidGeometry(
                "specify either the slope angle or the slope length, not both".to_string(),
            ));
        }

        if let Some(a) = angle {
            require_range(a, "angle", 0.0, 90.0)?;
            if a == 0.0 {
                return Err(StabilityError::InvalidGeometry(
                    "slope angle cannot be zero".to_string(),
                ));
            }
        }
        if let Some(l) = length {
            require_positive(l, "length")?;
        }

        let length = match length {
            Some(l) => l,
            None => match angle {
                Some(a) => height / a.to_radians().tan(),
                None => {
                    return Err(StabilityError::InvalidGeometry(
                        "require angle of slope or length of slope to initialise".to_string(),
                    ))
                }
            },
        };

        // evita divisiones por cero aguas abajo
        let length = length.max(0.001);

        let total_height = (3.0 * height)
            .max(options.min_ext_height)
            .max(5.0 * length / 2.0);
        let total_length = (5.0 * length)
            .max(options.min_ext_length)
            .max(4.0 * height);

        let dx = (total_length - length) / 2.0;
        let crest = Point2::new(dx, total_height);
        let toe = Point2::new(dx + length, total_height - height);

        let vertices = [
            Point2::ZERO,
            Point2::new(0.0, crest.y),
            crest,
            toe,
            Point2::new(total_length, toe.y),
            Point2::new(total_length, 0.0),
            Point2::ZERO,
        ];

        Ok(Self {
            vertices,
            height,
            length,
            gradient: height / length,
            crest,
            toe,
            external_length: total_length,
            external_height: total_height,
        })
    }

    pub fn vertices(&self) -> &[Point2; 7] {
        &self.vertices
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn gradient(&self) -> f64 {
        self.gradient
    }

    /// Coordenada de la corona (borde superior de la cara)
    pub fn crest(&self) -> Point2 {
        self.crest
    }

    /// Coordenada del pie (borde inferior de la cara)
    pub fn toe(&self) -> Point2 {
        self.toe
    }

    pub fn external_length(&self) -> f64 {
        self.external_length
    }

    pub fn external_height(&self) -> f64 {
        self.external_height
    }

    /// Elevacion de la superficie del terreno en `x`, o None fuera del
    /// dominio del modelo
    pub fn y_at(&self, x: f64) -> Option<f64> {
        if x < 0.0 || x > self.external_length {
            None
        } else if x <= self.crest.x {
            Some(self.crest.y)
        } else if x >= self.toe.x {
            Some(self.toe.y)
        } else {
            Some(self.crest.y - (x - self.crest.x) * self.gradient)
        }
    }

    /// Coordenada x donde la superficie del terreno alcanza la elevacion
    /// `y`: la cara del talud entre pie y corona, la plataforma inferior
    /// por debajo del pie, None por encima de la corona
    pub fn x_at(&self, y: f64) -> Option<f64> {
        if y < self.toe.y {
            Some(self.external_length)
        } else if y < self.external_height {
            Some(self.crest.x + (self.crest.y - y) / self.gradient)
        } else if y == self.crest.y {
            Some(self.crest.x)
        } else {
            None
        }
    }

    /// Intersecciones de un circulo con el perfil externo, ordenadas por x
    /// y depuradas con la tolerancia [`INTERSECTION_DEDUP_TOL`].
    ///
    /// De la plataforma superior solo interesa la interseccion izquierda
    /// (la falla siempre entra por la izquierda) y de la inferior solo la
    /// derecha; las intersecciones con la cara se conservan todas dentro
    /// de su tramo.
    pub fn circle_intersections(&self, centre: Point2, radius: f64) -> Vec<Point2> {
        let mut points: Vec<Point2> = Vec::new();

        let mut top_hits = circle_line_intersection(
            Point2::new(0.0, self.crest.y),
            self.crest,
            centre,
            radius,
        );
        top_hits.sort_by(|a, b| a.x.total_cmp(&b.x));
        if let Some(&p) = top_hits.first() {
            if p.x >= 0.0 && p.x <= self.crest.x {
                points.push(p);
            }
        }

        let mut bot_hits = circle_line_intersection(
            self.toe,
            Point2::new(self.external_length, self.toe.y),
            centre,
            radius,
        );
        bot_hits.sort_by(|a, b| a.x.total_cmp(&b.x));
        if let Some(&p) = bot_hits.last() {
            if p.x >= self.toe.x && p.x <= self.external_length {
                points.push(p);
            }
        }

        for p in circle_line_intersection(self.crest, self.toe, centre, radius) {
            if p.x >= self.crest.x && p.x <= self.toe.x {
                points.push(p);
            }
        }

        points.sort_by(|a, b| a.x.total_cmp(&b.x));

        let mut unique: Vec<Point2> = Vec::new();
        let mut last_x = -1.0;
        for p in points {
            if (p.x - last_x).abs() > INTERSECTION_DEDUP_TOL {
                unique.push(p);
            }
            last_x = p.x;
        }

        unique
    }
}

/// Limites de busqueda: dos bandas admisibles en x, una para los puntos
/// de entrada sobre la plataforma superior y otra para los de salida
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisLimits {
    pub left_outer: f64,
    pub left_inner: f64,
    pub right_inner: f64,
    pub right_outer: f64,
}

impl AnalysisLimits {
    /// Limites por defecto: sin restriccion (todo el modelo)
    pub fn unrestricted(boundary: &ExternalBoundary) -> Self {
        Self {
            left_outer: 0.0,
            left_inner: boundary.crest().x,
            right_inner: boundary.crest().x,
            right_outer: boundary.external_length(),
        }
    }

    /// Aplica actualizaciones parciales: los valores ausentes conservan el
    /// limite actual, los presentes se validan, se ajustan a los bordes
    /// duros del modelo y se verifica el orden resultante.
    pub fn with_updates(
        &self,
        left_outer: Option<f64>,
        left_inner: Option<f64>,
        right_inner: Option<f64>,
        right_outer: Option<f64>,
        boundary: &ExternalBoundary,
    ) -> Result<Self> {
        let left_outer = match left_outer {
            Some(v) => {
                require_positive(v, "left_outer")?;
                v
            }
            None => self.left_outer,
        };
        let left_inner = match left_inner {
            Some(v) => {
                require_strictly_positive(v, "left_inner")?;
                v
            }
            None => self.left_inner,
        };
        let right_inner = match right_inner {
            Some(v) => {
                require_strictly_positive(v, "right_inner")?;
                v
            }
            None => self.right_inner,
        };
        let right_outer = match right_outer {
            Some(v) => {
                require_strictly_positive(v, "right_outer")?;
                v
            }
            None => self.right_outer,
        };

        // bordes duros del modelo
        let left_outer = left_outer.max(0.0);
        let left_inner = left_inner.min(boundary.crest().x);
        let right_inner = right_inner.max(boundary.crest().x);
        let right_outer = right_outer.min(boundary.external_length());

        if left_outer >= left_inner || right_inner >= right_outer {
            return Err(StabilityError::InvalidGeometry(
                "analysis limits out of order or conflicting".to_string(),
            ));
        }

        Ok(Self {
            left_outer,
            left_inner,
            right_inner,
            right_outer,
        })
    }
}
