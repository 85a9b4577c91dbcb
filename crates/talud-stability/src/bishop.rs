//! Bishop Solver - Factor de Seguridad por el Metodo de Dovelas
//!
//! Calcula el factor de seguridad de una superficie de falla circular:
//! 1. Rebanado de la masa deslizante en dovelas verticales de ancho
//!    constante entre las intersecciones del circulo con la frontera
//! 2. Semilla con el Metodo Ordinario (Fellenius), no iterativo
//! 3. Iteracion de punto fijo de Bishop Simplificado hasta converger en
//!    la tolerancia o agotar las iteraciones
//!
//! Convencion de signos: alpha es positivo para dovelas a la izquierda
//! del centro del circulo (lado cuesta arriba) y negativo a la derecha,
//! de modo que el lado alto empuja y el lado bajo retiene.
//!
//! # Referencia:
//! - Bishop, A.W. (1955) The use of the slip circle in the stability
//!   analysis of slopes
//! - Duncan, Wright & Brandon (2014) Soil Strength and Slope Stability

use crate::boundary::ExternalBoundary;
use crate::loads::SurfaceLoad;
use crate::materials::SoilProfile;
use crate::search::{AnalysisOptions, TrialSurface};
use crate::water::WaterProfile;
use crate::GAMMA_WATER;

/// Ancho minimo de dovela (m); por debajo el rebanado es degenerado
const MIN_SLICE_WIDTH: f64 = 1e-6;

/// Dovela resuelta sobre la superficie de prueba
struct Slice {
    /// Coordenada x del centro de la dovela
    centre_x: f64,
    /// Elevacion de la base (sobre el circulo)
    y_base: f64,
    /// Elevacion de la superficie del terreno
    y_top: f64,
    /// Inclinacion de la base (radianes)
    alpha: f64,
    /// Peso total incluyendo sobrecargas (kN)
    weight: f64,
    /// Cohesion en la base (kPa)
    cohesion: f64,
    /// tan(phi) en la base
    friction_tan: f64,
}

/// Evaluador de superficies de prueba sobre un modelo inmutable
#[derive(Debug, Clone, Copy)]
pub struct BishopSolver<'a> {
    pub boundary: &'a ExternalBoundary,
    pub profile: &'a SoilProfile,
    pub loads: &'a [SurfaceLoad],
    pub water: Option<WaterProfile>,
    pub options: &'a AnalysisOptions,
}

impl<'a> BishopSolver<'a> {
    /// Factor de seguridad de la superficie, o None si la superficie se
    /// rechaza (rebanado degenerado, dovela fuera del modelo o suma de
    /// momentos no motriz).
    pub fn factor_of_safety(&self, surface: &TrialSurface) -> Option<f64> {
        let width = (surface.exit.x - surface.entry.x) / self.options.slices as f64;
        if width <= MIN_SLICE_WIDTH {
            return None;
        }

        let seed = self.ordinary(surface, width)?;
        self.iterate(surface, width, seed)
    }

    /// x donde el nivel freatico corta la superficie del terreno; infinito
    /// cuando no hay interseccion (el factor H no aplica en ese caso)
    fn water_surface_x(&self) -> f64 {
        self.water
            .and_then(|w| self.boundary.x_at(w.elevation))
            .unwrap_or(f64::INFINITY)
    }

    /// Resuelve la dovela `index` de la superficie, o None si la
    /// superficie del terreno no esta definida en su centro.
    fn slice_at(&self, surface: &TrialSurface, width: f64, index: usize) -> Option<Slice> {
        let circle = &surface.circle;
        let centre_x = surface.entry.x + width / 2.0 + index as f64 * width;

        let dx = centre_x - circle.centre.x;
        // el argumento se fija en cero para que el redondeo en los
        // extremos de la cuerda no produzca NaN
        let y_base = circle.centre.y - (circle.radius * circle.radius - dx * dx).max(0.0).sqrt();

        let y_top = self.boundary.y_at(centre_x)?;
        let y_top = y_top.max(y_base);

        let alpha = ((circle.centre.x - centre_x) / (circle.centre.y - y_base)).atan();

        let mut weight = self.profile.strip_weight(width, y_top, y_base);
        for load in self.loads {
            weight += load.strip_force(centre_x - width / 2.0, centre_x + width / 2.0);
        }

        let material = self.profile.material_at(y_base)?;

        Some(Slice {
            centre_x,
            y_base,
            y_top,
            alpha,
            weight,
            cohesion: material.cohesion,
            friction_tan: material.friction_tan(),
        })
    }

    /// Metodo Ordinario (sueco): balance directo de momentos, sin
    /// iteracion. La presion de poros actua sobre la longitud inclinada
    /// de la base.
    fn ordinary(&self, surface: &TrialSurface, width: f64) -> Option<f64> {
        let water_x = self.water_surface_x();
        let toe_x = self.boundary.toe().x;

        let mut resisting = 0.0;
        let mut pushing = 0.0;

        for index in 0..self.options.slices {
            let slice = self.slice_at(surface, width, index)?;
            let inclined_length = width / slice.alpha.cos();

            let pore_force = match self.water {
                Some(water) => {
                    water.head_above_base(slice.y_top, slice.y_base)
                        * GAMMA_WATER
                        * inclined_length
                        * water.factor_at(slice.centre_x, water_x, toe_x)
                }
                None => 0.0,
            };

            resisting += slice.cohesion * inclined_length
                + (slice.weight * slice.alpha.cos() - pore_force).max(0.0) * slice.friction_tan;
            pushing += slice.weight * slice.alpha.sin();
        }

        if pushing <= 0.0 {
            return None;
        }

        Some(resisting / pushing)
    }

    /// Iteracion de punto fijo de Bishop Simplificado. La presion de
    /// poros actua sobre el ancho horizontal de la dovela (convencion de
    /// Bishop, distinta de la semilla ordinaria).
    fn iterate(&self, surface: &TrialSurface, width: f64, seed: f64) -> Option<f64> {
        let water_x = self.water_surface_x();
        let toe_x = self.boundary.toe().x;

        let mut previous = seed;

        for _ in 0..self.options.max_iterations {
            let mut resisting = 0.0;
            let mut pushing = 0.0;

            for index in 0..self.options.slices {
                let slice = self.slice_at(surface, width, index)?;

                let pore_force = match self.water {
                    Some(water) => {
                        water.head_above_base(slice.y_top, slice.y_base)
                            * GAMMA_WATER
                            * width
                            * water.factor_at(slice.centre_x, water_x, toe_x)
                    }
                    None => 0.0,
                };

                let m_alpha =
                    slice.alpha.cos() + slice.alpha.sin() * slice.friction_tan / previous;

                resisting += (slice.cohesion * width
                    + (slice.weight - pore_force) * slice.friction_tan)
                    / m_alpha;
                pushing += slice.weight * slice.alpha.sin();
            }

            if pushing <= 0.0 {
                return None;
            }
            if resisting < 0.0 {
                return None;
            }

            let fos = resisting / pushing;
            if (previous - fos).abs() < self.options.tolerance {
                return Some(fos);
            }
            previous = fos;
        }

        Some(previous)
    }
}
