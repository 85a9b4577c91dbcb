//! Material Definitions - Perfil de Suelo Estratificado
//!
//! Define los materiales geotecnicos y el perfil estratificado del talud:
//! - Cada material ocupa un estrato horizontal limitado por su profundidad
//!   al fondo medida desde la corona del talud
//! - El estrato mas profundo se extiende hasta el fondo del modelo
//! - El peso de una dovela se integra estrato por estrato, con manejo de
//!   inclusion parcial cuando un limite de estrato cae dentro de la dovela

use crate::validation::{require_finite, require_positive, require_range};
use crate::Result;
use crate::StabilityError;
use serde::{Deserialize, Serialize};

/// Paleta de colores asignados automaticamente a los estratos
pub const MATERIAL_COLORS: [&str; 10] = [
    "#efa59c", "#77e1ca", "#cdacfc", "#f2c6a7", "#7edff4", "#f2a8c3", "#cde9ba", "#f2c1fa",
    "#f1dba3", "#a3acf7",
];

/// Material geotecnico
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Peso unitario (kN/m^3)
    pub unit_weight: f64,

    /// Angulo de friccion interna (grados)
    pub friction_angle: f64,

    /// Cohesion (kPa)
    pub cohesion: f64,

    /// Profundidad al fondo del estrato desde la corona (m)
    pub depth_to_bottom: f64,

    /// Nombre del estrato (opcional)
    pub name: String,

    /// Color de despliegue (opcional, vacio = asignacion automatica)
    pub color: String,
}

impl Material {
    /// Crear un material validando los rangos de sus propiedades.
    ///
    /// Valores negativos de cohesion o profundidad se toman en valor
    /// absoluto, igual que en versiones anteriores del motor.
    pub fn new(
        unit_weight: f64,
        friction_angle: f64,
        cohesion: f64,
        depth_to_bottom: f64,
    ) -> Result<Self> {
        require_range(unit_weight, "unit_weight", 1.0, 50.0)?;
        require_positive(friction_angle, "friction_angle")?;
        require_finite(cohesion, "cohesion")?;
        require_finite(depth_to_bottom, "depth_to_bottom")?;

        Ok(Self {
            unit_weight,
            friction_angle,
            cohesion: cohesion.abs(),
            depth_to_bottom: depth_to_bottom.abs(),
            name: String::new(),
            color: String::new(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// tan(phi) con phi convertido a radianes
    pub(crate) fn friction_tan(&self) -> f64 {
        self.friction_angle.to_radians().tan()
    }
}

/// Estrato del perfil: material mas su elevacion de fondo asignada (RL)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stratum {
    pub material: Material,

    /// Elevacion absoluta del fondo del estrato (m)
    pub bottom_rl: f64,

    /// Color resuelto para despliegue
    pub color: String,
}

/// Perfil de suelo: estratos ordenados del mas somero al mas profundo
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoilProfile {
    strata: Vec<Stratum>,
}

impl SoilProfile {
    pub fn is_empty(&self) -> bool {
        self.strata.is_empty()
    }

    pub fn len(&self) -> usize {
        self.strata.len()
    }

    pub fn strata(&self) -> &[Stratum] {
        &self.strata
    }

    /// Profundidad del estrato mas profundo (m desde la corona)
    pub fn max_depth(&self) -> Option<f64> {
        self.strata.last().map(|s| s.material.depth_to_bottom)
    }

    /// Reemplaza el perfil completo: ordena por profundidad, rechaza
    /// profundidades duplicadas y asigna elevaciones y colores.
    pub fn assign(&mut self, mut materials: Vec<Material>, crest_rl: f64) -> Result<()> {
        materials.sort_by(|a, b| a.depth_to_bottom.total_cmp(&b.depth_to_bottom));

        for pair in materials.windows(2) {
            if pair[0].depth_to_bottom == pair[1].depth_to_bottom {
                return Err(StabilityError::InvalidGeometry(format!(
                    "two materials share depth_to_bottom = {}",
                    pair[0].depth_to_bottom
                )));
            }
        }

        self.strata = materials
            .into_iter()
            .enumerate()
            .map(|(i, material)| {
                let color = if material.color.is_empty() {
                    MATERIAL_COLORS[i % MATERIAL_COLORS.len()].to_string()
                } else {
                    material.color.clone()
                };
                Stratum {
                    bottom_rl: crest_rl - material.depth_to_bottom,
                    color,
                    material,
                }
            })
            .collect();

        Ok(())
    }

    /// Recalcula las elevaciones de fondo contra una nueva corona.
    /// Se llama cuando la frontera externa se reconstruye.
    pub fn reassign_rls(&mut self, crest_rl: f64) {
        for stratum in &mut self.strata {
            stratum.bottom_rl = crest_rl - stratum.material.depth_to_bottom;
        }
    }

    /// Copia de los materiales asignados, sin elevaciones, en orden de
    /// profundidad
    pub fn materials(&self) -> Vec<Material> {
        self.strata.iter().map(|s| s.material.clone()).collect()
    }

    /// Elimina el material con la profundidad indicada, si existe
    pub fn remove_at_depth(&mut self, depth: f64) {
        self.strata
            .retain(|s| s.material.depth_to_bottom != depth);
    }

    pub fn clear(&mut self) {
        self.strata.clear();
    }

    /// Material en la elevacion `y`: el estrato mas somero cuyo fondo queda
    /// por debajo de `y`, o el mas profundo si `y` queda bajo todos.
    pub fn material_at(&self, y: f64) -> Option<&Material> {
        for stratum in &self.strata {
            if stratum.bottom_rl < y {
                return Some(&stratum.material);
            }
        }
        self.strata.last().map(|s| &s.material)
    }

    /// Peso de una dovela vertical de ancho `b` entre las elevaciones
    /// `y_top` y `y_bottom` (kN por metro de espesor).
    ///
    /// Recorre los estratos de somero a profundo acumulando
    /// gamma * b * altura del tramo; un limite de estrato dentro de la
    /// dovela parte la contribucion en ese punto.
    pub fn strip_weight(&self, b: f64, y_top: f64, y_bottom: f64) -> f64 {
        let mut weight = 0.0;
        let mut top = y_top;

        for stratum in &self.strata {
            // estratos que terminan por encima de la dovela no aportan
            if stratum.bottom_rl >= y_top {
                continue;
            }
            if stratum.bottom_rl > y_bottom {
                weight += b * stratum.material.unit_weight * (top - stratum.bottom_rl);
                top = stratum.bottom_rl;
            } else {
                // el fondo de la dovela queda dentro de este estrato
                weight += b * stratum.material.unit_weight * (top - y_bottom);
                top = stratum.bottom_rl;
                break;
            }
        }

        // la dovela sigue por debajo del estrato mas profundo
        if top > y_bottom {
            if let Some(last) = self.strata.last() {
                weight += b * last.material.unit_weight * (top - y_bottom);
            }
        }

        weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> SoilProfile {
        let mut p = SoilProfile::default();
        p.assign(
            vec![
                Material::new(20.0, 35.0, 0.0, 0.5).unwrap(),
                Material::new(18.0, 30.0, 2.0, 2.0).unwrap(),
                Material::new(16.0, 28.0, 0.0, 5.0).unwrap(),
            ],
            10.0,
        )
        .unwrap();
        p
    }

    #[test]
    fn test_assign_sorts_and_sets_rls() {
        let mut p = SoilProfile::default();
        p.assign(
            vec![
                Material::new(16.0, 28.0, 0.0, 5.0).unwrap(),
                Material::new(20.0, 35.0, 0.0, 0.5).unwrap(),
            ],
            10.0,
        )
        .unwrap();

        let depths: Vec<f64> = p
            .strata()
            .iter()
            .map(|s| s.material.depth_to_bottom)
            .collect();
        assert_eq!(depths, vec![0.5, 5.0]);
        assert_eq!(p.strata()[0].bottom_rl, 9.5);
        assert_eq!(p.strata()[1].bottom_rl, 5.0);
    }

    #[test]
    fn test_duplicate_depth_rejected() {
        let mut p = SoilProfile::default();
        let result = p.assign(
            vec![
                Material::new(20.0, 35.0, 0.0, 1.0).unwrap(),
                Material::new(18.0, 30.0, 2.0, 1.0).unwrap(),
            ],
            10.0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_material_lookup() {
        let p = profile();

        // dentro del primer estrato
        assert_eq!(p.material_at(9.8).unwrap().unit_weight, 20.0);
        // dentro del segundo
        assert_eq!(p.material_at(9.0).unwrap().unit_weight, 18.0);
        // por debajo de todos: el mas profundo
        assert_eq!(p.material_at(1.0).unwrap().unit_weight, 16.0);
    }

    #[test]
    fn test_strip_weight_single_stratum() {
        let p = profile();

        // dovela contenida en el primer estrato: 20 * 1 * 0.3
        let w = p.strip_weight(1.0, 10.0, 9.7);
        assert!((w - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_strip_weight_crosses_boundary() {
        let p = profile();

        // de 10.0 a 9.0: 0.5 m en el primero (20) + 0.5 m en el segundo (18)
        let w = p.strip_weight(1.0, 10.0, 9.0);
        assert!((w - (20.0 * 0.5 + 18.0 * 0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_strip_weight_below_deepest() {
        let p = profile();

        // de 5.0 a 3.0: todo bajo el estrato mas profundo asignado
        let w = p.strip_weight(1.0, 5.0, 3.0);
        assert!((w - 16.0 * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_cohesion_folded() {
        let m = Material::new(20.0, 35.0, -2.0, 1.0).unwrap();
        assert_eq!(m.cohesion, 2.0);
    }

    #[test]
    fn test_unit_weight_out_of_range() {
        assert!(Material::new(0.5, 35.0, 0.0, 1.0).is_err());
        assert!(Material::new(55.0, 35.0, 0.0, 1.0).is_err());
    }
}
