//! Advance widths of the standard Helvetica faces, used to center and wrap text.
//!
//! Values are the AFM widths in 1/1000 em for printable ASCII. Accented Latin
//! letters measure as their base letter.

use super::layout::FontStyle;

const FIRST_CHAR: u32 = 32;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // p..~
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width used for glyphs outside the tables
const DEFAULT_WIDTH: u16 = 556;

fn base_letter(c: char) -> char {
    match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'Ç' => 'C',
        'ç' => 'c',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ñ' => 'N',
        'ñ' => 'n',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        '‘' | '’' => '\'',
        '“' | '”' => '"',
        '–' | '—' => '-',
        other => other,
    }
}

/// Advance width of one character in 1/1000 em
pub fn char_width(c: char, style: FontStyle) -> u16 {
    let table = match style {
        FontStyle::Regular => &HELVETICA,
        FontStyle::Bold => &HELVETICA_BOLD,
    };

    let code = base_letter(c) as u32;
    code.checked_sub(FIRST_CHAR)
        .and_then(|i| table.get(i as usize))
        .copied()
        .unwrap_or(DEFAULT_WIDTH)
}

/// Width of a string in points at the given font size
pub fn text_width(text: &str, style: FontStyle, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c, style))).sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap to `max_width` points.
///
/// Words wider than a whole line are split between characters. Always returns
/// at least one line.
pub fn wrap(text: &str, style: FontStyle, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if text_width(&candidate, style, size) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if text_width(word, style, size) <= max_width {
            current = word.to_string();
        } else {
            for c in word.chars() {
                current.push(c);
                if text_width(&current, style, size) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_width() {
        assert_eq!(char_width(' ', FontStyle::Regular), 278);
        assert_eq!(char_width('A', FontStyle::Regular), 667);
        assert_eq!(char_width('A', FontStyle::Bold), 722);
        assert_eq!(char_width('~', FontStyle::Regular), 584);
        assert_eq!(char_width('Ã', FontStyle::Regular), 667);
        assert_eq!(char_width('€', FontStyle::Regular), DEFAULT_WIDTH);
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let w12 = text_width("CENTRO", FontStyle::Regular, 12.0);
        let w24 = text_width("CENTRO", FontStyle::Regular, 24.0);
        assert!((w24 - 2.0 * w12).abs() < 0.001);
    }

    #[test]
    fn test_wrap_keeps_short_text_on_one_line() {
        assert_eq!(
            wrap("PATRULHA SEM OCORRENCIAS", FontStyle::Regular, 12.0, 468.0),
            vec!["PATRULHA SEM OCORRENCIAS"]
        );
        assert_eq!(wrap("", FontStyle::Regular, 12.0, 468.0), vec![""]);
    }

    #[test]
    fn test_wrap_breaks_on_words_within_width() {
        let text = "RONDA ".repeat(40);
        let lines = wrap(&text, FontStyle::Regular, 12.0, 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, FontStyle::Regular, 12.0) <= 200.0);
            assert!(!line.starts_with(' ') && !line.ends_with(' '));
        }
        assert_eq!(lines.join(" "), text.trim());
    }

    #[test]
    fn test_wrap_splits_overlong_word() {
        let word = "A".repeat(100);
        let lines = wrap(&word, FontStyle::Regular, 12.0, 100.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(text_width(line, FontStyle::Regular, 12.0) <= 100.0);
        }
    }
}
