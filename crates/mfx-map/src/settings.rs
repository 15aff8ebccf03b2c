use mfx_model::FormId;

/// Name of the export registered from a plain list of form ids.
pub const DEFAULT_MULTI_EXPORT_NAME: &str = "Gravity Forms Multi Export";

/// Parse a comma-separated form id list such as `"1, 2 ,3"`.
///
/// Whitespace anywhere is ignored; empty or non-numeric segments are dropped.
pub fn parse_form_id_list(raw: &str) -> Vec<FormId> {
    let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
    compact
        .split(',')
        .filter_map(|segment| segment.parse::<u32>().ok())
        .map(FormId::new)
        .collect()
}
