//! Segment and search-radius choices offered to users.

use serde::Serialize;
use utoipa::ToSchema;

/// Catalog entry meaning "use the free-text segment instead"
pub const OTHER_SEGMENT: &str = "Outro";

pub const COMMERCIAL_SEGMENTS: &[&str] = &[
    "Açougue",
    "Mercado",
    "Mercearia",
    "Padaria",
    "Lanchonete",
    "Sorveteria",
    "Loja de cosméticos",
    "Loja de roupas",
    "Loja de presentes",
    "Petshop",
    "Clínica estética",
    "Distribuidora pequena",
    "Loja de autopeças",
];

pub const INDUSTRIAL_SEGMENTS: &[&str] = &[
    "Alimentícia",
    "Bebidas",
    "Cosmética",
    "Química",
    "Limpeza",
    "Plásticos",
    "Metalúrgica",
    "Eletrônica",
    "Têxtil",
    "Cervejaria artesanal",
    "Pet food",
    "Embalagens",
    "Logística / atacado",
];

pub const RADIUS_OPTIONS: &[&str] = &[
    "Apenas na cidade",
    "5 km",
    "10 km",
    "25 km",
    "50 km",
    "100 km",
    "Estado inteiro",
    "Brasil inteiro",
];

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Catalog {
    pub commercial_segments: Vec<String>,
    pub industrial_segments: Vec<String>,
    pub radius_options: Vec<String>,
    pub other_segment: String,
}

pub fn catalog() -> Catalog {
    Catalog {
        commercial_segments: owned(COMMERCIAL_SEGMENTS),
        industrial_segments: owned(INDUSTRIAL_SEGMENTS),
        radius_options: owned(RADIUS_OPTIONS),
        other_segment: OTHER_SEGMENT.to_string(),
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}
