/// `[attribute="value"]` with the value escaped for a quoted CSS string.
pub(crate) fn attribute_selector(attribute: &str, value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '"' | '\\' => {
                escaped.push('\\');
                escaped.push(character);
            }
            '\n' => escaped.push_str("\\a "),
            _ => escaped.push(character),
        }
    }
    format!("[{attribute}=\"{escaped}\"]")
}

pub(crate) fn badge_class_list(badge_class: &str) -> String {
    format!("device-status {badge_class}")
}

pub(crate) fn toast_class_list(severity_class: &str) -> String {
    format!("toast {severity_class}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_selector_quotes_plain_values() {
        assert_eq!(
            attribute_selector("data-stat", "total_devices"),
            "[data-stat=\"total_devices\"]"
        );
        assert_eq!(
            attribute_selector("data-device-id", "SL001"),
            "[data-device-id=\"SL001\"]"
        );
    }

    #[test]
    fn attribute_selector_escapes_quotes_and_backslashes() {
        assert_eq!(
            attribute_selector("data-device-id", "a\"b\\c"),
            "[data-device-id=\"a\\\"b\\\\c\"]"
        );
        assert_eq!(attribute_selector("data-stat", "x\ny"), "[data-stat=\"x\\a y\"]");
    }

    #[test]
    fn class_lists_keep_base_class() {
        assert_eq!(badge_class_list("status-active"), "device-status status-active");
        assert_eq!(toast_class_list("toast-error"), "toast toast-error");
    }
}
