//! Talud Stability - Sistema de Analisis de Estabilidad de Taludes
//!
//! Este modulo implementa un sistema completo de analisis de estabilidad
//! de taludes en dos dimensiones basado en:
//! - Geometria externa parametrica (altura, angulo o longitud)
//! - Perfil de suelo estratificado con propiedades por estrato
//! - Sobrecargas superficiales (distribuidas y lineales)
//! - Nivel freatico con factor de reduccion de carga hidraulica
//! - Busqueda de superficies de falla circulares (entrada/salida + radios)
//! - Metodo de Bishop Simplificado con semilla del Metodo Ordinario
//! - Analisis dinamico de cargas moviles contra un FOS objetivo
//!
//! La geometria basica se resuelve en forma cerrada (via talud-core).

pub mod bishop;
pub mod boundary;
pub mod dynamic;
pub mod loads;
pub mod materials;
pub mod search;
pub mod slope;
pub mod water;

mod validation;

// Re-exports
pub use bishop::BishopSolver;
pub use boundary::{AnalysisLimits, BoundaryOptions, ExternalBoundary};
pub use dynamic::DynamicOutcome;
pub use loads::{LineLoad, SurfaceLoad, Udl};
pub use materials::{Material, SoilProfile, Stratum, MATERIAL_COLORS};
pub use search::{AnalysisOptions, AnalysisOptionsUpdate, PlaneGenerator, SlipCircle, TrialSurface};
pub use slope::Slope;
pub use water::WaterProfile;

/// Punto 2D en coordenadas de seccion (ver talud-core)
pub type Point2 = talud_core::Point2;

/// Peso unitario del agua (kN/m^3)
pub const GAMMA_WATER: f64 = 9.81;

/// Error types para el modulo
#[derive(Debug, thiserror::Error)]
pub enum StabilityError {
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("No valid failure surface: {0}")]
    NoValidSurface(String),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for StabilityError {
    fn from(err: anyhow::Error) -> Self {
        StabilityError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StabilityError>;
