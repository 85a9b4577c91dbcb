//! Search Generator - Generacion de Superficies de Falla
//!
//! Enumera circulos de prueba geometricamente validos parametrizados por
//! puntos de entrada y salida sobre la frontera externa:
//! - Los puntos de entrada se distribuyen sobre la banda superior de los
//!   limites de busqueda, con puntos extra junto al borde izquierdo de
//!   cada carga para muestrear cerca de las discontinuidades
//! - Los puntos de salida se distribuyen sobre la banda inferior
//! - Cada par entrada/salida genera una familia de radios usando la
//!   identidad de cuerdas que se intersecan (a*b = c*d)
//!
//! El circulo inicial de cada familia tiene tangente vertical en la
//! entrada; el radio se infla un 10% para evitar denominadores m_alpha
//! degenerados en el metodo de Bishop.

use crate::boundary::{AnalysisLimits, ExternalBoundary};
use crate::loads::SurfaceLoad;
use crate::Point2;
use serde::{Deserialize, Serialize};

/// Opciones del analisis de estabilidad
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Dovelas verticales por circulo de prueba, en [10, 500]
    pub slices: usize,

    /// Numero objetivo de superficies de prueba, en [500, 100000]
    pub iterations: usize,

    /// Longitud minima de cuerda entre entrada y salida (m)
    pub min_failure_distance: f64,

    /// Tolerancia de convergencia sobre el FOS en Bishop
    pub tolerance: f64,

    /// Maximo de iteraciones de punto fijo en Bishop
    pub max_iterations: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            slices: 25,
            iterations: 1000,
            min_failure_distance: 0.0,
            tolerance: 0.005,
            max_iterations: 15,
        }
    }
}

/// Actualizacion parcial de las opciones de analisis
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AnalysisOptionsUpdate {
    pub slices: Option<usize>,
    pub iterations: Option<usize>,
    pub min_failure_distance: Option<f64>,
    pub tolerance: Option<f64>,
    pub max_iterations: Option<usize>,
}

/// Circulo de falla de prueba
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlipCircle {
    pub centre: Point2,
    pub radius: f64,
}

/// Superficie de prueba: circulo mas sus intersecciones con la frontera
/// (entrada a la izquierda, salida a la derecha) y el FOS calculado
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialSurface {
    pub circle: SlipCircle,
    pub entry: Point2,
    pub exit: Point2,
    pub fos: Option<f64>,
}

/// Generador de superficies de prueba sobre un modelo inmutable
#[derive(Debug, Clone, Copy)]
pub struct PlaneGenerator<'a> {
    pub boundary: &'a ExternalBoundary,
    pub limits: &'a AnalysisLimits,
    pub loads: &'a [SurfaceLoad],
    pub options: &'a AnalysisOptions,
}

impl<'a> PlaneGenerator<'a> {
    /// Radios por familia: al menos 5, creciendo con el numero objetivo
    /// de superficies
    pub fn circles_per_family(&self) -> usize {
        (self.options.iterations / 1000).max(5)
    }

    /// Enumeracion completa de pares entrada/salida con sus familias de
    /// radios
    pub fn generate(&self) -> Vec<TrialSurface> {
        let iterations = self.options.iterations;
        let num_circles = self.circles_per_family();

        let combinations = iterations as f64 / num_circles as f64;
        let mut num_top = combinations.sqrt() as usize;
        let mut num_bot = num_top;

        while num_top * num_bot * num_circles < iterations {
            num_bot += 1;
        }

        // reserva puntos de la banda superior para colocarlos junto a las
        // cargas registradas
        let num_top = num_top.saturating_sub(self.loads.len()).max(2);

        let crest_y = self.boundary.crest().y;

        let mut entry_points: Vec<Point2> = (0..num_top)
            .map(|n| {
                let t = n as f64 / (num_top - 1) as f64;
                Point2::new(
                    self.limits.left_outer + t * (self.limits.left_inner - self.limits.left_outer),
                    crest_y,
                )
            })
            .collect();

        for load in self.loads {
            entry_points.push(Point2::new(load.left_edge_x() - 0.001, crest_y));
        }

        let exit_points: Vec<Point2> = (1..=num_bot)
            .filter_map(|n| {
                let x = self.limits.right_inner
                    + (n as f64 / num_bot as f64)
                        * (self.limits.right_outer - self.limits.right_inner);
                self.boundary.y_at(x).map(|y| Point2::new(x, y))
            })
            .collect();

        let mut search = Vec::new();

        for entry in &entry_points {
            for exit in &exit_points {
                if entry.distance_to(exit) > self.options.min_failure_distance {
                    search.extend(self.radius_family(*entry, *exit, num_circles));
                }
            }
        }

        search
    }

    /// Familia de circulos por los puntos de cuerda `l_c` y `r_c`.
    ///
    /// El circulo de partida tiene el centro alineado con la entrada
    /// (tangente vertical); los siguientes reducen la distancia
    /// cuerda-borde linealmente y recuperan el radio con la identidad de
    /// cuerdas. Un radio cuyo circulo no corta la frontera en dos puntos
    /// distintos se salta sin truncar la familia.
    pub fn radius_family(
        &self,
        l_c: Point2,
        r_c: Point2,
        num_circles: usize,
    ) -> Vec<TrialSurface> {
        let beta = ((l_c.y - r_c.y) / (r_c.x - l_c.x)).atan();
        let half_chord = l_c.distance_to(&r_c) / 2.0;

        let start_radius = half_chord / beta.cos() * 1.1;
        let start_chord_to_centre = (start_radius * start_radius - half_chord * half_chord).sqrt();
        let start_chord_to_edge = start_radius - start_chord_to_centre;

        // identidad de cuerdas: half_chord^2 = e * (2R - e)
        let chord_product = half_chord * half_chord;
        let midpoint = l_c.midpoint(&r_c);

        let mut family = Vec::new();

        for i in 0..num_circles {
            let chord_to_edge =
                start_chord_to_edge * (num_circles - i) as f64 / num_circles as f64;
            let radius = (chord_product + chord_to_edge * chord_to_edge) / (2.0 * chord_to_edge);

            let chord_to_centre = radius - chord_to_edge;
            let centre = Point2::new(
                midpoint.x + beta.sin() * chord_to_centre,
                midpoint.y + beta.cos() * chord_to_centre,
            );

            let hits = self.boundary.circle_intersections(centre, radius);
            if hits.len() < 2 {
                continue;
            }

            family.push(TrialSurface {
                circle: SlipCircle { centre, radius },
                entry: hits[0],
                exit: hits[hits.len() - 1],
                fos: None,
            });
        }

        family
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryOptions;

    fn boundary() -> ExternalBoundary {
        ExternalBoundary::new(1.0, None, Some(1.0), &BoundaryOptions::default()).unwrap()
    }

    #[test]
    fn test_family_circles_pass_through_chord() {
        let b = boundary();
        let limits = AnalysisLimits::unrestricted(&b);
        let options = AnalysisOptions::default();
        let generator = PlaneGenerator {
            boundary: &b,
            limits: &limits,
            loads: &[],
            options: &options,
        };

        let l_c = Point2::new(3.0, 6.0);
        let r_c = Point2::new(7.0, 5.0);
        let family = generator.radius_family(l_c, r_c, 5);

        assert!(!family.is_empty());
        for surface in &family {
            // el circulo construido pasa por ambos extremos de la cuerda
            let d_l = surface.circle.centre.distance_to(&l_c);
            let d_r = surface.circle.centre.distance_to(&r_c);
            assert!((d_l - surface.circle.radius).abs() < 1e-6);
            assert!((d_r - surface.circle.radius).abs() < 1e-6);

            // la entrada queda a la izquierda de la salida
            assert!(surface.entry.x < surface.exit.x);
        }
    }

    #[test]
    fn test_generate_produces_surfaces() {
        let b = boundary();
        let limits = AnalysisLimits::unrestricted(&b);
        let options = AnalysisOptions::default();
        let generator = PlaneGenerator {
            boundary: &b,
            limits: &limits,
            loads: &[],
            options: &options,
        };

        let surfaces = generator.generate();
        assert!(!surfaces.is_empty());

        for surface in &surfaces {
            assert!(surface.entry.x < surface.exit.x);
            assert!(surface.fos.is_none());
        }
    }

    #[test]
    fn test_min_failure_distance_filters_pairs() {
        let b = boundary();
        let limits = AnalysisLimits::unrestricted(&b);

        let open = AnalysisOptions::default();
        let restricted = AnalysisOptions {
            min_failure_distance: 3.0,
            ..Default::default()
        };

        let all = PlaneGenerator {
            boundary: &b,
            limits: &limits,
            loads: &[],
            options: &open,
        }
        .generate();
        let filtered = PlaneGenerator {
            boundary: &b,
            limits: &limits,
            loads: &[],
            options: &restricted,
        }
        .generate();

        assert!(filtered.len() < all.len());
        for surface in &filtered {
            assert!(surface.entry.distance_to(&surface.exit) > 1.0);
        }
    }
}
