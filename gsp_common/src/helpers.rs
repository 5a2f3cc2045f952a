/// Interprets common truthy and falsy spellings of an environment flag. Unset or unrecognised values fall back to
/// `default`.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let Some(value) = value else {
        return default;
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => true,
        "0" | "false" | "no" | "off" | "disabled" => false,
        _ => default,
    }
}
