//! Wire shapes of the catalog endpoints
//!
//! The catalog service names its parent links per level (`facultadId` on
//! schools, `escuelaId` on spaces); they are flattened into
//! [`CatalogOption::parent_id`].

use campus_core::{CatalogId, CatalogOption};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FacultadDto {
    id: CatalogId,
    #[serde(alias = "name")]
    nombre: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EscuelaDto {
    id: CatalogId,
    #[serde(alias = "name")]
    nombre: String,
    #[serde(default)]
    facultad_id: Option<CatalogId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EspacioDto {
    id: CatalogId,
    #[serde(alias = "name")]
    nombre: String,
    #[serde(default)]
    escuela_id: Option<CatalogId>,
}

impl From<FacultadDto> for CatalogOption {
    fn from(dto: FacultadDto) -> Self {
        CatalogOption::new(dto.id, dto.nombre)
    }
}

impl From<EscuelaDto> for CatalogOption {
    fn from(dto: EscuelaDto) -> Self {
        CatalogOption {
            id: dto.id,
            name: dto.nombre,
            parent_id: dto.facultad_id,
        }
    }
}

impl From<EspacioDto> for CatalogOption {
    fn from(dto: EspacioDto) -> Self {
        CatalogOption {
            id: dto.id,
            name: dto.nombre,
            parent_id: dto.escuela_id,
        }
    }
}
