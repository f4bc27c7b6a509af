//! Curated translation data. Static; not configurable at runtime.

/// High-frequency professions whose machine translation is unreliable.
/// Keyed by the lower-cased English term.
pub(super) const MANUAL_TRANSLATIONS: &[(&str, &str)] = &[
    ("plumber", "rörmokare"),
    ("dentist", "tandläkare"),
    ("doctor", "läkare"),
    ("driver", "förare"),
];

/// Canonical Swedish occupation labels for professions as users type them.
/// Looked up verbatim, then title-cased.
pub(super) const MANUAL_FIX: &[(&str, &str)] = &[
    ("Accountant", "Redovisningsekonom"),
    ("Assistant Nurse", "Undersköterska"),
    ("Bus Driver", "Bussförare"),
    ("Carpenter", "Träarbetare/Snickare"),
    ("Chef", "Kock"),
    ("Cleaner", "Lokalvårdare"),
    ("Electrician", "Installationselektriker"),
    ("Nurse", "Sjuksköterska, grundutbildad"),
    ("Preschool Teacher", "Förskollärare"),
    ("Software Developer", "Mjukvaruutvecklare"),
    ("Truck Driver", "Lastbilsförare"),
    ("Warehouse Worker", "Lagerarbetare"),
];

/// English terms that always count as too general to aggregate.
pub const COMMON_PROFESSIONS: &[&str] = &[
    "manager",
    "engineer",
    "developer",
    "assistant",
    "consultant",
    "specialist",
    "technician",
    "teacher",
    "driver",
    "analyst",
    "designer",
    "coordinator",
    "administrator",
    "operator",
    "worker",
    "sales",
];

pub(super) fn manual_translation(lower: &str) -> Option<&'static str> {
    MANUAL_TRANSLATIONS
        .iter()
        .find(|(en, _)| *en == lower)
        .map(|(_, sv)| *sv)
}

pub(super) fn manual_fix(key: &str) -> Option<&'static str> {
    MANUAL_FIX
        .iter()
        .find(|(en, _)| *en == key)
        .map(|(_, sv)| *sv)
}
