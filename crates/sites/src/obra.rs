use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nexium_core::{DomainError, DomainResult, Entity, ObraId};

/// Obra lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ObraStatus {
    #[default]
    Planejamento,
    EmAndamento,
    Pausada,
    Concluida,
}

/// A tracked construction site / project (`obras`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obra {
    pub id: ObraId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "endereco", default)]
    pub address: String,
    #[serde(default)]
    pub status: ObraStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Completion percentage, 0..=100.
    #[serde(rename = "progresso", default)]
    pub progress: u8,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateObra {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateObra {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: Option<ObraStatus>,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Obra {
    pub fn create(cmd: CreateObra, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = validate_name(&cmd.name)?;
        let (latitude, longitude) = validate_coordinates(cmd.latitude, cmd.longitude)?;

        Ok(Self {
            id: ObraId::new(),
            name,
            address: cmd.address.trim().to_string(),
            status: ObraStatus::Planejamento,
            latitude,
            longitude,
            progress: 0,
            created_at: now,
        })
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    pub fn set_coordinates(&mut self, latitude: f64, longitude: f64) -> DomainResult<()> {
        let (lat, lon) = validate_coordinates(Some(latitude), Some(longitude))?;
        self.latitude = lat;
        self.longitude = lon;
        Ok(())
    }

    /// Apply a partial update, validating before mutating anything.
    pub fn apply_update(&mut self, update: UpdateObra) -> DomainResult<()> {
        let name = update.name.as_deref().map(validate_name).transpose()?;
        if let Some(p) = update.progress {
            if p > 100 {
                return Err(DomainError::validation("progress must be between 0 and 100"));
            }
        }
        let coords = match (update.latitude, update.longitude) {
            (None, None) => None,
            (lat, lon) => Some(validate_coordinates(
                lat.or(self.latitude),
                lon.or(self.longitude),
            )?),
        };

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(address) = update.address {
            self.address = address.trim().to_string();
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(p) = update.progress {
            self.progress = p;
        }
        if self.status == ObraStatus::Concluida {
            self.progress = 100;
        }
        if let Some((lat, lon)) = coords {
            self.latitude = lat;
            self.longitude = lon;
        }
        Ok(())
    }
}

impl Entity for Obra {
    type Id = ObraId;

    fn id(&self) -> ObraId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("obra name cannot be empty"));
    }
    Ok(name.to_string())
}

fn validate_coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> DomainResult<(Option<f64>, Option<f64>)> {
    match (latitude, longitude) {
        (None, None) => Ok((None, None)),
        (Some(lat), Some(lon)) => {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                return Err(DomainError::validation("coordinates out of range"));
            }
            Ok((Some(lat), Some(lon)))
        }
        _ => Err(DomainError::validation(
            "latitude and longitude must be given together",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obra() -> Obra {
        Obra::create(
            CreateObra {
                name: "Residencial Aurora".to_string(),
                address: "Rua das Flores, 100, Curitiba".to_string(),
                latitude: None,
                longitude: None,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn new_obra_starts_in_planning() {
        let o = obra();
        assert_eq!(o.status, ObraStatus::Planejamento);
        assert_eq!(o.progress, 0);
        assert!(!o.has_coordinates());
    }

    #[test]
    fn half_coordinates_are_rejected() {
        let err = Obra::create(
            CreateObra {
                name: "X".to_string(),
                address: String::new(),
                latitude: Some(-25.4),
                longitude: None,
            },
            Utc::now(),
        );
        assert!(matches!(err, Err(DomainError::Validation(_))));
    }

    #[test]
    fn concluding_sets_progress_to_full() {
        let mut o = obra();
        o.apply_update(UpdateObra {
            status: Some(ObraStatus::Concluida),
            ..UpdateObra::default()
        })
        .unwrap();
        assert_eq!(o.progress, 100);
    }

    #[test]
    fn concluded_obra_keeps_full_progress_in_the_same_update() {
        let mut o = obra();
        o.apply_update(UpdateObra {
            status: Some(ObraStatus::Concluida),
            progress: Some(40),
            ..UpdateObra::default()
        })
        .unwrap();
        assert_eq!(o.status, ObraStatus::Concluida);
        assert_eq!(o.progress, 100);

        o.apply_update(UpdateObra {
            progress: Some(70),
            ..UpdateObra::default()
        })
        .unwrap();
        assert_eq!(o.progress, 100);
    }

    #[test]
    fn invalid_update_leaves_obra_untouched() {
        let mut o = obra();
        let before = o.clone();
        let err = o.apply_update(UpdateObra {
            name: Some("Novo nome".to_string()),
            progress: Some(150),
            ..UpdateObra::default()
        });
        assert!(err.is_err());
        assert_eq!(o, before);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_value(ObraStatus::EmAndamento).unwrap();
        assert_eq!(json, "em_andamento");
    }
}
