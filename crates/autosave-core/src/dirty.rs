//! Dirty tracking against the last committed value.

use crate::state::FieldState;

/// `true` when the current value differs from the committed one.
///
/// Text compares by content and files by handle identity.
#[must_use]
pub fn is_dirty(state: &FieldState) -> bool {
    state.value != state.committed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{RawValue, UploadedFile};

    #[test]
    fn seeded_state_is_clean_until_edited() {
        let mut state = FieldState::seeded(RawValue::from("Jakarta"));
        assert!(!is_dirty(&state));

        state.value = RawValue::from("Bandung");
        assert!(is_dirty(&state));

        state.value = RawValue::from("Jakarta");
        assert!(!is_dirty(&state));
    }

    #[test]
    fn reselected_file_is_dirty() {
        let file = UploadedFile::new("ktp.png", "image/png", vec![7; 8]);
        let mut state = FieldState::seeded(RawValue::file(file.clone()));
        state.value = RawValue::file(file);
        assert!(is_dirty(&state));
    }
}
