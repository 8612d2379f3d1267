use bdoc_common::OffsetType;

/// Length of the text in UTF-16 code units
pub fn code_unit_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Length of the text in Unicode code points
pub fn code_point_len(text: &str) -> usize {
    text.chars().count()
}

/// Length of the text measured in the given unit system
///
/// # Arguments
/// * `text` - The document text
/// * `offset_type` - Unit system to count in
pub fn text_len(text: &str, offset_type: OffsetType) -> usize {
    match offset_type {
        OffsetType::CodeUnit => code_unit_len(text),
        OffsetType::CodePoint => code_point_len(text),
    }
}

pub(crate) fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

pub(crate) fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_lengths_agree() {
        let text = "line 1\nline 2";
        assert_eq!(code_unit_len(text), 13);
        assert_eq!(code_point_len(text), 13);
    }

    #[test]
    fn test_supplementary_plane_counts_twice_in_code_units() {
        let text = "💩!";
        assert_eq!(code_unit_len(text), 3);
        assert_eq!(code_point_len(text), 2);
        assert_eq!(text_len(text, OffsetType::CodeUnit), 3);
        assert_eq!(text_len(text, OffsetType::CodePoint), 2);
    }

    #[test]
    fn test_bmp_multibyte_is_one_unit() {
        // Three bytes each in UTF-8 but one UTF-16 unit each
        let text = "日本語";
        assert_eq!(code_unit_len(text), 3);
        assert_eq!(code_point_len(text), 3);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(code_unit_len(""), 0);
        assert_eq!(code_point_len(""), 0);
    }

    #[test]
    fn test_surrogate_ranges() {
        let units: Vec<u16> = "😀".encode_utf16().collect();
        assert!(is_high_surrogate(units[0]));
        assert!(is_low_surrogate(units[1]));
        assert!(!is_high_surrogate(u16::from(b'a')));
        assert!(!is_low_surrogate(u16::from(b'a')));
    }
}
