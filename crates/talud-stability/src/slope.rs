//! Slope Container - Modelo del Talud y Registro de Resultados
//!
//! `Slope` es el contenedor que posee todas las entradas del analisis
//! (frontera externa, perfil de suelo, cargas, nivel freatico, limites y
//! opciones) junto con el registro de resultados. Cualquier mutacion de
//! las entradas invalida el registro: los accesores de la superficie
//! critica fallan hasta que se vuelve a correr `analyse_slope`.
//!
//! Los planos individuales registrados por el usuario y los resultados
//! del analisis dinamico sobreviven a las mutaciones; los primeros solo
//! se limpian con `remove_individual_planes` y los segundos se
//! reconstruyen en cada `analyse_dynamic`.

use crate::bishop::BishopSolver;
use crate::boundary::{AnalysisLimits, BoundaryOptions, ExternalBoundary};
use crate::dynamic::{self, DynamicOutcome};
use crate::loads::{LineLoad, SurfaceLoad, Udl};
use crate::materials::{Material, SoilProfile};
use crate::search::{
    AnalysisOptions, AnalysisOptionsUpdate, PlaneGenerator, SlipCircle, TrialSurface,
};
use crate::validation::{
    require_finite, require_positive, require_strictly_positive,
};
use crate::water::WaterProfile;
use crate::{Point2, Result, StabilityError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Modelo de talud bidimensional con su registro de resultados
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slope {
    boundary: ExternalBoundary,
    boundary_options: BoundaryOptions,
    profile: SoilProfile,
    loads: Vec<SurfaceLoad>,
    water_rl: Option<f64>,
    water_factor: f64,
    limits: AnalysisLimits,
    options: AnalysisOptions,
    individual_planes: Vec<TrialSurface>,
    search: Vec<TrialSurface>,
    dynamic_results: Vec<(f64, f64)>,
}

impl Slope {
    /// Crea el talud desde su altura y exactamente uno de angulo (grados)
    /// o longitud (m); sin ninguno de los dos el angulo es 30 grados.
    pub fn new(height: f64, angle: Option<f64>, length: Option<f64>) -> Result<Self> {
        let angle = match (angle, length) {
            (None, None) => Some(30.0),
            (a, _) => a,
        };

        let boundary_options = BoundaryOptions::default();
        let boundary = ExternalBoundary::new(height, angle, length, &boundary_options)?;
        let limits = AnalysisLimits::unrestricted(&boundary);

        let mut slope = Self {
            boundary,
            boundary_options,
            profile: SoilProfile::default(),
            loads: Vec::new(),
            water_rl: None,
            water_factor: 1.0,
            limits,
            options: AnalysisOptions::default(),
            individual_planes: Vec::new(),
            search: Vec::new(),
            dynamic_results: Vec::new(),
        };

        slope.update_water_analysis_options(true, 1.0)?;

        Ok(slope)
    }

    // ------------------------------------------------------------------
    // Mutadores de geometria
    // ------------------------------------------------------------------

    /// Reconstruye la frontera externa. Invalida resultados, regresa los
    /// limites de busqueda a su valor por defecto y recalcula las
    /// coordenadas derivadas de cargas y estratos.
    pub fn set_external_boundary(
        &mut self,
        height: f64,
        angle: Option<f64>,
        length: Option<f64>,
    ) -> Result<()> {
        let angle = match (angle, length) {
            (None, None) => Some(30.0),
            (a, _) => a,
        };

        self.boundary = ExternalBoundary::new(height, angle, length, &self.boundary_options)?;
        self.after_boundary_rebuild();
        Ok(())
    }

    /// Dimensiones externas minimas del modelo; reconstruye la frontera
    /// conservando la cara actual del talud.
    pub fn update_boundary_options(
        &mut self,
        min_ext_length: Option<f64>,
        min_ext_height: Option<f64>,
    ) -> Result<()> {
        if let Some(l) = min_ext_length {
            require_strictly_positive(l, "MIN_EXT_L")?;
            self.boundary_options.min_ext_length = l;
        }
        if let Some(h) = min_ext_height {
            require_strictly_positive(h, "MIN_EXT_H")?;
            self.boundary_options.min_ext_height = h;
        }

        self.rebuild_boundary()
    }

    fn rebuild_boundary(&mut self) -> Result<()> {
        self.boundary = ExternalBoundary::new(
            self.boundary.height(),
            None,
            Some(self.boundary.length()),
            &self.boundary_options,
        )?;
        self.after_boundary_rebuild();
        Ok(())
    }

    fn after_boundary_rebuild(&mut self) {
        self.profile.reassign_rls(self.boundary.crest().y);
        self.update_load_coordinates();
        self.limits = AnalysisLimits::unrestricted(&self.boundary);
        self.reset_results();
    }

    // ------------------------------------------------------------------
    // Mutadores de materiales
    // ------------------------------------------------------------------

    /// Agrega materiales al perfil. El conjunto resultante se ordena por
    /// profundidad; profundidades duplicadas son un error. Un estrato mas
    /// profundo que el modelo actual amplia la altura externa.
    pub fn set_materials(&mut self, materials: Vec<Material>) -> Result<()> {
        let mut all = self.profile.materials();
        all.extend(materials);

        let deepest = all.iter().map(|m| m.depth_to_bottom).fold(0.0, f64::max);
        if deepest > self.boundary.external_height() {
            self.boundary_options.min_ext_height = deepest;
            self.rebuild_boundary()?;
        }

        self.profile.assign(all, self.boundary.crest().y)?;
        self.reset_results();
        Ok(())
    }

    /// Quita un material identificado por valor (su profundidad al fondo)
    pub fn remove_material(&mut self, material: &Material) {
        self.remove_material_at_depth(material.depth_to_bottom);
    }

    pub fn remove_material_at_depth(&mut self, depth: f64) {
        self.profile.remove_at_depth(depth);
        self.reset_results();
    }

    pub fn remove_all_materials(&mut self) {
        self.profile.clear();
        self.reset_results();
    }

    // ------------------------------------------------------------------
    // Mutadores de cargas
    // ------------------------------------------------------------------

    /// Registra cargas distribuidas sobre la plataforma superior. Cargas
    /// de magnitud cero se ignoran; el modelo se amplia si hace falta
    /// para contener la carga completa.
    pub fn set_udls(&mut self, udls: Vec<Udl>) -> Result<()> {
        for udl in udls {
            if udl.magnitude > 0.0 {
                self.loads.push(SurfaceLoad::Distributed(udl));
            }
        }

        self.ensure_load_extents()?;
        self.update_load_coordinates();
        self.reset_results();
        Ok(())
    }

    /// Quita las cargas distribuidas que coincidan por valor
    /// (offset, magnitud y longitud)
    pub fn remove_udls(&mut self, udls: &[Udl]) {
        self.loads.retain(|load| match load {
            SurfaceLoad::Distributed(existing) => !udls.iter().any(|u| {
                u.offset == existing.offset
                    && u.magnitude == existing.magnitude
                    && u.length == existing.length
            }),
            SurfaceLoad::Line(_) => true,
        });
        self.reset_results();
    }

    pub fn remove_all_udls(&mut self) {
        self.loads
            .retain(|load| !matches!(load, SurfaceLoad::Distributed(_)));
        self.reset_results();
    }

    /// Registra cargas lineales sobre la plataforma superior
    pub fn set_line_loads(&mut self, line_loads: Vec<LineLoad>) -> Result<()> {
        for ll in line_loads {
            if ll.magnitude > 0.0 {
                self.loads.push(SurfaceLoad::Line(ll));
            }
        }

        self.ensure_load_extents()?;
        self.update_load_coordinates();
        self.reset_results();
        Ok(())
    }

    /// Quita las cargas lineales que coincidan por valor (offset y
    /// magnitud)
    pub fn remove_line_loads(&mut self, line_loads: &[LineLoad]) {
        self.loads.retain(|load| match load {
            SurfaceLoad::Line(existing) => !line_loads
                .iter()
                .any(|l| l.offset == existing.offset && l.magnitude == existing.magnitude),
            SurfaceLoad::Distributed(_) => true,
        });
        self.reset_results();
    }

    pub fn remove_all_line_loads(&mut self) {
        self.loads
            .retain(|load| !matches!(load, SurfaceLoad::Line(_)));
        self.reset_results();
    }

    fn ensure_load_extents(&mut self) -> Result<()> {
        let required = self
            .loads
            .iter()
            .map(|load| load.min_external_length())
            .fold(0.0, f64::max);

        if required > self.boundary_options.min_ext_length {
            self.boundary_options.min_ext_length = required;
            self.rebuild_boundary()?;
        }

        Ok(())
    }

    fn update_load_coordinates(&mut self) {
        let crest_x = self.boundary.crest().x;
        for load in &mut self.loads {
            load.update_coordinates(crest_x);
        }
    }

    // ------------------------------------------------------------------
    // Mutadores de agua
    // ------------------------------------------------------------------

    /// Fija el nivel freatico a `depth` metros bajo la corona
    pub fn set_water_table(&mut self, depth: f64) -> Result<()> {
        require_positive(depth, "water depth")?;
        self.water_rl = Some((self.boundary.crest().y - depth).max(0.0));
        self.reset_results();
        Ok(())
    }

    pub fn remove_water_table(&mut self) {
        self.water_rl = None;
        self.reset_results();
    }

    /// Factor H sobre la altura de presion hidrostatica. Con `auto` el
    /// factor es cos^2 del angulo de la cara; el valor manual se limita
    /// a [0, 1].
    pub fn update_water_analysis_options(&mut self, auto: bool, h: f64) -> Result<()> {
        if auto {
            let face_angle = self.boundary.gradient().atan();
            self.water_factor = face_angle.cos().powi(2);
        } else {
            require_finite(h, "H")?;
            self.water_factor = h.clamp(0.0, 1.0);
        }

        self.reset_results();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Mutadores de limites y opciones
    // ------------------------------------------------------------------

    /// Actualizacion parcial de los limites de busqueda; los valores
    /// ausentes conservan el limite vigente.
    pub fn set_analysis_limits(
        &mut self,
        left_outer: Option<f64>,
        left_inner: Option<f64>,
        right_inner: Option<f64>,
        right_outer: Option<f64>,
    ) -> Result<()> {
        self.limits = self.limits.with_updates(
            left_outer,
            left_inner,
            right_inner,
            right_outer,
            &self.boundary,
        )?;
        self.reset_results();
        Ok(())
    }

    pub fn remove_analysis_limits(&mut self) {
        self.limits = AnalysisLimits::unrestricted(&self.boundary);
        self.reset_results();
    }

    /// Actualizacion parcial de las opciones de analisis. Dovelas e
    /// iteraciones se ajustan a sus rangos validos en lugar de fallar.
    pub fn update_analysis_options(&mut self, update: AnalysisOptionsUpdate) -> Result<()> {
        if let Some(slices) = update.slices {
            self.options.slices = slices.clamp(10, 500);
        }
        if let Some(iterations) = update.iterations {
            self.options.iterations = iterations.clamp(500, 100_000);
        }
        if let Some(distance) = update.min_failure_distance {
            require_positive(distance, "min_failure_distance")?;
            self.options.min_failure_distance =
                distance.min(self.boundary.external_length() * 0.9);
        }
        if let Some(tolerance) = update.tolerance {
            require_strictly_positive(tolerance, "tolerance")?;
            self.options.tolerance = tolerance;
        }
        if let Some(max_iterations) = update.max_iterations {
            self.options.max_iterations = max_iterations;
        }

        self.reset_results();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Planos individuales
    // ------------------------------------------------------------------

    /// Registra una familia de circulos entre dos puntos de la superficie
    /// del terreno. Con planos individuales registrados, la enumeracion
    /// automatica queda suprimida.
    pub fn add_single_entry_exit_plane(
        &mut self,
        entry_x: f64,
        exit_x: f64,
        num_circles: usize,
    ) -> Result<()> {
        let entry_y = self.boundary.y_at(entry_x).ok_or_else(|| {
            StabilityError::InvalidParameter {
                name: "entry_x".to_string(),
                reason: "point lies outside the external boundary".to_string(),
            }
        })?;
        let exit_y = self
            .boundary
            .y_at(exit_x)
            .ok_or_else(|| StabilityError::InvalidParameter {
                name: "exit_x".to_string(),
                reason: "point lies outside the external boundary".to_string(),
            })?;

        let planes = self.plane_generator().radius_family(
            Point2::new(entry_x, entry_y),
            Point2::new(exit_x, exit_y),
            num_circles,
        );
        self.individual_planes.extend(planes);
        self.reset_results();
        Ok(())
    }

    /// Registra un circulo explicito. Un circulo que no corta la frontera
    /// en dos puntos distintos se descarta en silencio.
    pub fn add_single_circular_plane(&mut self, c_x: f64, c_y: f64, radius: f64) -> Result<()> {
        require_strictly_positive(c_x, "c_x")?;
        require_strictly_positive(c_y, "c_y")?;
        require_strictly_positive(radius, "radius")?;

        let centre = Point2::new(c_x, c_y);
        let hits = self.boundary.circle_intersections(centre, radius);

        if hits.len() >= 2 {
            self.individual_planes.push(TrialSurface {
                circle: SlipCircle { centre, radius },
                entry: hits[0],
                exit: hits[hits.len() - 1],
                fos: None,
            });
        } else {
            debug!(
                "circular plane at ({}, {}) r = {} does not intersect the boundary twice",
                c_x, c_y, radius
            );
        }

        self.reset_results();
        Ok(())
    }

    pub fn remove_individual_planes(&mut self) {
        self.individual_planes.clear();
        self.reset_results();
    }

    // ------------------------------------------------------------------
    // Analisis
    // ------------------------------------------------------------------

    fn plane_generator(&self) -> PlaneGenerator<'_> {
        PlaneGenerator {
            boundary: &self.boundary,
            limits: &self.limits,
            loads: &self.loads,
            options: &self.options,
        }
    }

    fn solver(&self) -> BishopSolver<'_> {
        BishopSolver {
            boundary: &self.boundary,
            profile: &self.profile,
            loads: &self.loads,
            water: self
                .water_rl
                .map(|rl| WaterProfile::new(rl, self.water_factor)),
            options: &self.options,
        }
    }

    /// Evalua todas las superficies de prueba (las individuales si hay,
    /// la enumeracion automatica si no) y llena el registro ordenado por
    /// FOS ascendente. `max_fos` limita las superficies almacenadas.
    pub fn analyse_slope(&mut self, max_fos: Option<f64>) -> Result<()> {
        if self.profile.is_empty() {
            return Err(StabilityError::InvalidGeometry(
                "at least one material must be assigned before analysis".to_string(),
            ));
        }

        let surfaces = if self.individual_planes.is_empty() {
            self.plane_generator().generate()
        } else {
            self.individual_planes.clone()
        };

        debug!("generated {} trial surfaces", surfaces.len());

        let solver = self.solver();

        let mut evaluated: Vec<TrialSurface> = surfaces
            .into_par_iter()
            .filter_map(|mut surface| {
                let fos = solver.factor_of_safety(&surface)?;
                if !fos.is_finite() {
                    return None;
                }
                surface.fos = Some(fos);
                Some(surface)
            })
            .collect();

        evaluated.sort_by(|a, b| {
            let fa = a.fos.unwrap_or(f64::INFINITY);
            let fb = b.fos.unwrap_or(f64::INFINITY);
            fa.total_cmp(&fb)
        });

        if let Some(cap) = max_fos {
            evaluated.retain(|surface| surface.fos.unwrap_or(f64::INFINITY) <= cap);
        }

        debug!("{} surfaces produced a finite factor of safety", evaluated.len());

        self.search = evaluated;
        Ok(())
    }

    /// Busca el offset critico de las cargas dinamicas para el FOS
    /// objetivo (ver modulo `dynamic`).
    pub fn analyse_dynamic(&mut self, critical_fos: f64) -> Result<DynamicOutcome> {
        let outcome = dynamic::converge(self, critical_fos)?;
        self.dynamic_results.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(outcome)
    }

    /// Mueve el offset de todas las cargas dinamicas, recalculando las
    /// coordenadas derivadas y la extension del modelo si hace falta.
    pub(crate) fn apply_dynamic_offset(&mut self, offset: f64) -> Result<()> {
        for load in &mut self.loads {
            if load.is_dynamic() {
                load.set_offset(offset);
            }
        }

        self.ensure_load_extents()?;
        self.update_load_coordinates();
        self.reset_results();
        Ok(())
    }

    pub(crate) fn push_dynamic_result(&mut self, offset: f64, fos: f64) {
        self.dynamic_results.push((offset, fos));
    }

    pub(crate) fn clear_dynamic_results(&mut self) {
        self.dynamic_results.clear();
    }

    fn reset_results(&mut self) {
        self.search.clear();
    }

    // ------------------------------------------------------------------
    // Accesores
    // ------------------------------------------------------------------

    /// Factor de seguridad critico del ultimo analisis
    pub fn min_fos(&self) -> Result<f64> {
        self.search
            .first()
            .and_then(|s| s.fos)
            .ok_or_else(no_valid_surface)
    }

    /// Circulo de la superficie critica
    pub fn min_fos_circle(&self) -> Result<SlipCircle> {
        self.search
            .first()
            .map(|s| s.circle)
            .ok_or_else(no_valid_surface)
    }

    /// Intersecciones de la superficie critica con la frontera
    pub fn min_fos_endpoints(&self) -> Result<(Point2, Point2)> {
        self.search
            .first()
            .map(|s| (s.entry, s.exit))
            .ok_or_else(no_valid_surface)
    }

    /// Registro completo del ultimo analisis, ordenado por FOS ascendente
    pub fn results(&self) -> &[TrialSurface] {
        &self.search
    }

    /// Pares (offset, FOS) del ultimo analisis dinamico, ordenados por FOS
    pub fn dynamic_results(&self) -> &[(f64, f64)] {
        &self.dynamic_results
    }

    pub fn external_boundary(&self) -> &ExternalBoundary {
        &self.boundary
    }

    /// Coordenada de la corona del talud
    pub fn top_coordinates(&self) -> Point2 {
        self.boundary.crest()
    }

    /// Coordenada del pie del talud
    pub fn bottom_coordinates(&self) -> Point2 {
        self.boundary.toe()
    }

    pub fn soil_profile(&self) -> &SoilProfile {
        &self.profile
    }

    pub fn loads(&self) -> &[SurfaceLoad] {
        &self.loads
    }

    /// Elevacion del nivel freatico, si esta definido
    pub fn water_table_rl(&self) -> Option<f64> {
        self.water_rl
    }

    pub fn limits(&self) -> &AnalysisLimits {
        &self.limits
    }

    pub fn analysis_options(&self) -> &AnalysisOptions {
        &self.options
    }
}

impl Default for Slope {
    fn default() -> Self {
        Self::new(1.0, Some(30.0), None).expect("default slope parameters are valid")
    }
}

fn no_valid_surface() -> StabilityError {
    StabilityError::NoValidSurface(
        "the search ledger is empty; run analyse_slope first".to_string(),
    )
}
