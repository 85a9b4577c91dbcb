//! Validacion de parametros escalares
//!
//! Chequeos de dominio aplicados en el momento de la mutacion, nunca
//! diferidos al analisis. Cada error lleva el nombre del parametro.

use crate::{Result, StabilityError};

fn invalid(name: &str, reason: String) -> StabilityError {
    StabilityError::InvalidParameter {
        name: name.to_string(),
        reason,
    }
}

/// El valor debe ser un numero finito (ni NaN ni infinito).
pub(crate) fn require_finite(value: f64, name: &str) -> Result<()> {
    if !value.is_finite() {
        return Err(invalid(name, format!("should be a finite number, not {value}")));
    }
    Ok(())
}

/// Numero finito >= 0.
pub(crate) fn require_positive(value: f64, name: &str) -> Result<()> {
    require_finite(value, name)?;
    if value < 0.0 {
        return Err(invalid(name, format!("should be >= 0, not {value}")));
    }
    Ok(())
}

/// Numero finito > 0.
pub(crate) fn require_strictly_positive(value: f64, name: &str) -> Result<()> {
    require_finite(value, name)?;
    if value <= 0.0 {
        return Err(invalid(name, format!("should be > 0, not {value}")));
    }
    Ok(())
}

/// Numero finito dentro de [low, high].
pub(crate) fn require_range(value: f64, name: &str, low: f64, high: f64) -> Result<()> {
    require_finite(value, name)?;
    if value < low || value > high {
        return Err(invalid(
            name,
            format!("should be between {low} and {high}, not {value}"),
        ));
    }
    Ok(())
}
