//! Fixed option catalogs printed on the paper shift-report form.
//!
//! Submitted keys are matched against these lists case-insensitively and with
//! typographic apostrophes folded, so `"centro"` and `"CENTRO"` are the same zone.

/// Quantity-bearing object, submitted as `{ "marcado": bool, "quantidade": n }`
pub const CONES_KEY: &str = "cones";

/// Unit printed after the cone count ("5 CONE(S)")
pub const CONES_UNIT_LABEL: &str = "CONE(S)";

/// "None of the above" entry, submitted as `{ "marcado": bool, "outros": text }`
pub const NONE_OF_THE_ABOVE_KEY: &str = "NENHUMA DAS OPÇÕES";

/// Plain checkbox objects
pub const FLAG_OBJECTS: &[&str] = &[
    "CELULAR",
    "CARREGADOR DO CELULAR",
    "CAMÊRA CORPORAL",
    "CARREGADOR DE CAMÊRA CORPORAL",
    "OUTROS / TIRAR FOTO OU VÍDEO",
];

pub const PATROL_ZONES: &[&str] = &[
    "DISTRITO BOCA DA MATA",
    "POVOADO OLHOS D’ÁGUA",
    "DISTRITO SANTO ANTÔNIO",
    "VILA JOSÉ PAULINO",
    "CENTRO",
    "USINA BRASILEIRA",
    "POVOADO SAPUCAIA",
    "POVOADO BOA FÉ",
    "DISTRITO BRANCA DE ATALAIA",
    "PATRULHAMENTO PREVENTIVO: POVOADO OURICURI",
    "PATRULHAMENTO PREVENTIVO: POVOADO PORONGABA",
];

pub const INCIDENT_CATEGORIES: &[&str] = &[
    "PERTURBAÇÃO DO SOSSEGO",
    "ACIDENTE DE TRÂNSITO",
    "VIOLÊNCIA DOMÉSTICA",
    "FURTO / ROUBO",
    "DANO AO PATRIMÔNIO PÚBLICO",
    "APOIO A OUTROS ÓRGÃOS",
    "ATENDIMENTO AO PÚBLICO",
];

/// How a found-object key is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Quantity,
    Flag,
    Other,
}

/// Canonical form used to compare submitted keys with catalog entries
pub fn fold_key(key: &str) -> String {
    key.trim().replace(['’', '‘'], "'").to_uppercase()
}

/// Find the catalog entry matching a submitted key
pub fn lookup<'a>(catalog: &[&'a str], key: &str) -> Option<&'a str> {
    let folded = fold_key(key);
    catalog.iter().copied().find(|entry| fold_key(entry) == folded)
}

/// Classify a found-object key, returning its canonical label
pub fn object_kind(key: &str) -> Option<(ObjectKind, &'static str)> {
    if let Some(label) = lookup(&[CONES_KEY], key) {
        return Some((ObjectKind::Quantity, label));
    }
    if let Some(label) = lookup(&[NONE_OF_THE_ABOVE_KEY], key) {
        return Some((ObjectKind::Other, label));
    }
    lookup(FLAG_OBJECTS, key).map(|label| (ObjectKind::Flag, label))
}

/// Position of a found-object key in the printed form order.
///
/// Keys outside the catalog sort after the checkboxes and before
/// "none of the above".
pub fn object_rank(key: &str) -> usize {
    match object_kind(key) {
        Some((ObjectKind::Quantity, _)) => 0,
        Some((ObjectKind::Flag, label)) => FLAG_OBJECTS
            .iter()
            .position(|entry| *entry == label)
            .map_or(0, |i| i + 1),
        None => FLAG_OBJECTS.len() + 1,
        Some((ObjectKind::Other, _)) => FLAG_OBJECTS.len() + 2,
    }
}
