//! Dynamic Analysis - Carga Movil contra un FOS Objetivo
//!
//! Busca el offset critico de las cargas moviles: el punto mas cercano a
//! la corona donde el talud todavia alcanza el factor de seguridad
//! objetivo. Todas las cargas marcadas como dinamicas comparten el mismo
//! offset durante la busqueda; las estaticas conservan el suyo.
//!
//! El procedimiento evalua primero los dos extremos (carga en la corona y
//! carga al pie de la plataforma) y solo si el objetivo queda entre ambos
//! corre hasta 10 pasos de biseccion ponderada por la pendiente local de
//! la curva offset-FOS.

use crate::slope::Slope;
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Resultado del analisis dinamico
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DynamicOutcome {
    /// Con la carga en la corona el talud ya supera el FOS objetivo
    AlreadyStable,
    /// Ni con la carga al extremo de la plataforma se alcanza el objetivo
    TargetUnreachable,
    /// La busqueda convergio a un offset intermedio
    Converged,
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Corre la busqueda del offset critico. Cada evaluacion queda registrada
/// como (offset, FOS) en el talud; el llamador ordena el registro final.
pub(crate) fn converge(slope: &mut Slope, critical_fos: f64) -> Result<DynamicOutcome> {
    slope.clear_dynamic_results();

    let mut right = 0.0;
    let mut left = slope.external_boundary().length() - 0.01;

    // caso extremo: cargas en la corona; si el talud es seguro no hay
    // nada que buscar
    slope.apply_dynamic_offset(right)?;
    slope.analyse_slope(None)?;
    let mut right_fos = slope.min_fos()?;
    slope.push_dynamic_result(right, right_fos);
    debug!("dynamic offset {:.3} m -> FOS {:.3}", right, right_fos);

    if right_fos > critical_fos {
        return Ok(DynamicOutcome::AlreadyStable);
    }

    // caso extremo: cargas lo mas lejos posible de la corona; si el talud
    // sigue inseguro el objetivo es inalcanzable
    slope.apply_dynamic_offset(left)?;
    slope.analyse_slope(None)?;
    let mut left_fos = slope.min_fos()?;
    slope.push_dynamic_result(left, left_fos);
    debug!("dynamic offset {:.3} m -> FOS {:.3}", left, left_fos);

    if left_fos < critical_fos {
        return Ok(DynamicOutcome::TargetUnreachable);
    }

    let mut previous_fos = 0.0;

    for _ in 0..10 {
        // punto medio ponderado por la pendiente de la curva offset-FOS
        let gradient = (left_fos - right_fos) / (left - right);
        let midpoint = right + (critical_fos - right_fos) / gradient;

        slope.apply_dynamic_offset(midpoint)?;
        slope.analyse_slope(None)?;
        let fos = slope.min_fos()?;
        slope.push_dynamic_result(midpoint, fos);
        debug!("dynamic offset {:.3} m -> FOS {:.3}", midpoint, fos);

        // si los dos ultimos FOS son identicos la carga quedo fuera de la
        // zona de influencia y no hay convergencia que declarar
        if previous_fos != fos
            && ((previous_fos - fos).abs() <= 0.01 || (fos - critical_fos).abs() <= 0.01)
            && round3(fos) >= critical_fos
        {
            break;
        }

        if fos < critical_fos {
            right = midpoint;
            right_fos = fos;
        } else {
            left = midpoint;
            left_fos = fos;
        }

        previous_fos = fos;
    }

    Ok(DynamicOutcome::Converged)
}
