//! Input mask for Indonesian tax numbers (NPWP).

const GROUPS: [(usize, char); 5] = [(2, '.'), (5, '.'), (8, '.'), (9, '-'), (12, '.')];
const DIGITS: usize = 15;

/// Format raw input as `NN.NNN.NNN.N-NNN.NNN`.
///
/// Non-digits are dropped and input beyond fifteen digits is ignored, so the
/// mask can run on every keystroke, including on already formatted text.
#[must_use]
pub fn format_npwp(input: &str) -> String {
    let mut formatted = String::with_capacity(DIGITS + GROUPS.len());
    for (index, digit) in input
        .chars()
        .filter(char::is_ascii_digit)
        .take(DIGITS)
        .enumerate()
    {
        if let Some((_, separator)) = GROUPS.iter().find(|(at, _)| *at == index) {
            formatted.push(*separator);
        }
        formatted.push(digit);
    }
    formatted
}
