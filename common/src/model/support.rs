/// Job boards through which an appel d'offres can be sourced.
///
/// The list mirrors the dropdown offered in the record forms. "Autre" is the
/// escape hatch: when selected, the stored value comes from the free-text
/// `autre_support` field instead.
pub const SUPPORTS_AO: &[&str] = &[
    "LinkedIn",
    "Indeed",
    "Tanit",
    "Monster",
    "France Travail",
    "APEC",
    "Autre",
];

/// Dropdown value that switches the support to the free-text field.
pub const AUTRE: &str = "Autre";

/// Resolves the effective support value from the two form fields.
pub fn resolve_support(support_ao: &str, autre_support: &str) -> String {
    if support_ao == AUTRE {
        autre_support.trim().to_string()
    } else {
        support_ao.to_string()
    }
}

/// True when the value is not one of the predefined boards, i.e. it was
/// entered through the "Autre" free-text field.
pub fn is_custom_support(value: &str) -> bool {
    !SUPPORTS_AO.contains(&value)
}
