//! Water Model - Nivel Freatico
//!
//! La superficie freatica es horizontal en la elevacion asignada a la
//! izquierda del pie del talud y sigue la superficie del terreno en el
//! resto del modelo (tratamiento conservador). El factor de carga H reduce
//! la altura de presion hidrostatica solo en la zona entre el punto donde
//! el nivel freatico corta la cara del talud y el pie; fuera de esa zona
//! la altura completa aplica.

use serde::{Deserialize, Serialize};

/// Nivel freatico con su factor de reduccion de carga
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterProfile {
    /// Elevacion de la superficie freatica (m, RL)
    pub elevation: f64,

    /// Factor sobre la altura de presion, en [0, 1]
    pub head_factor: f64,
}

impl WaterProfile {
    pub fn new(elevation: f64, head_factor: f64) -> Self {
        Self {
            elevation,
            head_factor,
        }
    }

    /// Altura de agua sobre la base de la dovela (m), nunca negativa y
    /// limitada por la superficie de la dovela
    pub fn head_above_base(&self, y_top: f64, y_bottom: f64) -> f64 {
        (self.elevation.min(y_top) - y_bottom).max(0.0)
    }

    /// Factor efectivo para una dovela centrada en `s_x`: el factor H
    /// entre la interseccion freatica con la cara (`surface_x`) y el pie
    /// (`toe_x`), 1.0 en el resto del modelo
    pub fn factor_at(&self, s_x: f64, surface_x: f64, toe_x: f64) -> f64 {
        if surface_x < s_x && s_x < toe_x {
            self.head_factor
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_clamped_by_slice_top() {
        let w = WaterProfile::new(5.0, 0.5);

        // nivel por encima de la dovela: manda la superficie de la dovela
        assert!((w.head_above_base(4.0, 2.0) - 2.0).abs() < 1e-12);
        // nivel dentro de la dovela
        assert!((w.head_above_base(6.0, 2.0) - 3.0).abs() < 1e-12);
        // dovela seca
        assert_eq!(w.head_above_base(8.0, 6.0), 0.0);
    }

    #[test]
    fn test_factor_only_on_face_zone() {
        let w = WaterProfile::new(5.0, 0.5);

        assert_eq!(w.factor_at(4.8, 4.5, 5.5), 0.5);
        assert_eq!(w.factor_at(3.0, 4.5, 5.5), 1.0);
        assert_eq!(w.factor_at(6.0, 4.5, 5.5), 1.0);
        // los extremos del intervalo usan altura completa
        assert_eq!(w.factor_at(4.5, 4.5, 5.5), 1.0);
    }
}
