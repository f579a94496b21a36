//! OCR output cleaning: line assembly and context-aware field repair.

use once_cell::sync::Lazy;
use regex::Regex;

static NOT_MRZ_CHARSET: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Z0-9<]").unwrap());

/// Minimum cleaned length a line must reach on its own to be trusted.
const MIN_LONG_LINE: usize = 25;
/// Minimum filler count for a "fillered" short line to be trusted.
const MIN_FILLERS: usize = 2;
/// Minimum total length for a fillered short line to be trusted.
const MIN_FILLERED_LEN: usize = 10;

/// Uppercases and strips everything outside `[A-Z0-9<]` from one line.
fn strip_to_mrz_charset(line: &str) -> String {
    NOT_MRZ_CHARSET.replace_all(&line.to_ascii_uppercase(), "").into_owned()
}

/// Result of cleaning raw OCR text: either natural newline-delimited lines
/// survived, or the whole block collapsed to a single fillered string for
/// fixed-width recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cleaned {
    /// 2 or 3 lines selected from natural line breaks, in original order.
    Lines(Vec<String>),
    /// No trustworthy natural lines; a single uppercased/fillered block.
    Block(String),
}

impl Cleaned {
    /// Cleaned, newline-stripped character count, used to compare strategies.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Cleaned::Lines(lines) => lines.iter().map(String::len).sum(),
            Cleaned::Block(block) => block.len(),
        }
    }

    /// True if this cleaning produced no usable text at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The cleaned text joined with newlines between natural lines, or the
    /// raw block if no natural lines survived.
    #[must_use]
    pub fn joined(&self) -> String {
        match self {
            Cleaned::Lines(lines) => lines.join("\n"),
            Cleaned::Block(block) => block.clone(),
        }
    }
}

/// Cleans raw OCR text per the `cleanMRZText` algorithm: split on CR/LF,
/// strip each line to the MRZ charset, keep lines that are either long
/// enough on their own or fillered enough, then select the 2 or 3 longest
/// surviving lines preserving original order. Falls back to a single
/// fillered block when fewer than 2 lines qualify.
#[must_use]
pub fn clean_mrz_text(raw: &str) -> Cleaned {
    let candidates: Vec<String> = raw
        .lines()
        .map(strip_to_mrz_charset)
        .filter(|line| {
            line.len() >= MIN_LONG_LINE
                || (line.matches('<').count() >= MIN_FILLERS && line.len() >= MIN_FILLERED_LEN)
        })
        .collect();

    if candidates.len() >= 2 {
        let mut indexed: Vec<(usize, String)> = candidates.into_iter().enumerate().collect();
        indexed.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        let take = if indexed.len() >= 3 && indexed[2].1.len() >= MIN_LONG_LINE { 3 } else { 2 };
        let mut selected: Vec<(usize, String)> = indexed.into_iter().take(take).collect();
        selected.sort_by_key(|(idx, _)| *idx);
        Cleaned::Lines(selected.into_iter().map(|(_, line)| line).collect())
    } else {
        Cleaned::Block(strip_to_mrz_charset(&raw.replace(['\r', '\n'], "")))
    }
}

/// Idempotent: `clean(clean(x)) == clean(x)`, since cleaning an already
/// newline-joined, charset-restricted `Cleaned::Lines` output reselects the
/// same lines; a `Cleaned::Block` is already fully stripped and has no
/// newlines left to re-split.
#[must_use]
pub fn clean_is_idempotent(raw: &str) -> bool {
    let once = clean_mrz_text(raw);
    let twice = clean_mrz_text(&once.joined());
    once == twice
}

/// Right-pads `line` with `<` up to `len`, or truncates if it is longer.
#[must_use]
pub fn pad_to(line: &str, len: usize) -> String {
    if line.len() >= len {
        line[..len].to_owned()
    } else {
        let mut padded = line.to_owned();
        padded.extend(std::iter::repeat('<').take(len - line.len()));
        padded
    }
}

/// Fixed-width splits `block` into `count` lines of `width` characters,
/// right-padding the last chunk with `<` if the block runs short. Idempotent
/// on already-padded input of the same width.
#[must_use]
pub fn split_fixed_width(block: &str, count: usize, width: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let start = i * width;
            let end = (start + width).min(block.len());
            let chunk = if start < block.len() { &block[start..end] } else { "" };
            pad_to(chunk, width)
        })
        .collect()
}

/// Context-aware cleaning for a purely numeric field (dates, check digits):
/// maps `O -> 0`, `I`/`L -> 1`, then strips anything left that is not a
/// digit. Must run *after* positional extraction — never before, since
/// positional offsets have to see the raw OCR characters. Document numbers
/// are alphanumeric and use [`clean_alphanumeric_field`] instead, since
/// this digit-confusion repair would strip their legitimate letters.
#[must_use]
pub fn clean_numeric_field(field: &str) -> String {
    field
        .chars()
        .map(|c| match c {
            'O' => '0',
            'I' | 'L' => '1',
            other => other,
        })
        .filter(char::is_ascii_digit)
        .collect()
}

/// Context-aware cleaning for an alphanumeric field (document numbers):
/// strips anything outside `[A-Za-z0-9]`, without the digit/letter
/// OCR-confusion substitutions `clean_numeric_field`/`clean_alpha_field`
/// apply. Document numbers legitimately mix letters and digits, so there is
/// no single direction to repair a confused character in.
#[must_use]
pub fn clean_alphanumeric_field(field: &str) -> String {
    field.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Context-aware cleaning for an alphabetic field (names): maps
/// `0 -> O`, `1 -> I`, then strips anything left that is not a letter.
#[must_use]
pub fn clean_alpha_field(field: &str) -> String {
    field
        .chars()
        .map(|c| match c {
            '0' => 'O',
            '1' => 'I',
            other => other,
        })
        .filter(char::is_ascii_alphabetic)
        .collect()
}

/// Like [`clean_alpha_field`], but preserves existing ASCII spaces instead
/// of stripping them, for already word-split name components.
#[must_use]
pub fn clean_alpha_preserving_spaces(field: &str) -> String {
    field
        .chars()
        .map(|c| match c {
            '0' => 'O',
            '1' => 'I',
            other => other,
        })
        .filter(|c| c.is_ascii_alphabetic() || *c == ' ')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_three_lines_when_third_is_long_enough() {
        let raw = "I<UTOD231458907<<<<<<<<<<<<<<<\n7408122F1204159UTO<<<<<<<<<<<6\nERIKSSON<<ANNA<MARIA<<<<<<<<<<";
        match clean_mrz_text(raw) {
            Cleaned::Lines(lines) => assert_eq!(lines.len(), 3),
            Cleaned::Block(_) => panic!("expected natural lines"),
        }
    }

    #[test]
    fn collapses_to_block_when_no_lines_qualify() {
        match clean_mrz_text("abc\ndef") {
            Cleaned::Block(block) => assert_eq!(block, "ABCDEF"),
            Cleaned::Lines(_) => panic!("expected a block"),
        }
    }

    #[test]
    fn idempotent_on_natural_lines() {
        let raw = "I<UTOD231458907<<<<<<<<<<<<<<<\n7408122F1204159UTO<<<<<<<<<<<6\nERIKSSON<<ANNA<MARIA<<<<<<<<<<";
        assert!(clean_is_idempotent(raw));
    }

    #[test]
    fn split_fixed_width_pads_short_tail() {
        let lines = split_fixed_width("ABC", 2, 5);
        assert_eq!(lines, vec!["ABC<<".to_string(), "<<<<<".to_string()]);
    }

    #[test]
    fn split_then_join_is_idempotent_on_padded_input() {
        let lines = split_fixed_width("ABCDE12345", 2, 5);
        let rejoined = lines.join("");
        let lines2 = split_fixed_width(&rejoined, 2, 5);
        assert_eq!(lines, lines2);
    }

    #[test]
    fn numeric_cleaner_restores_digit_confusions() {
        assert_eq!(clean_numeric_field("I204I59"), "1204159");
    }

    #[test]
    fn alpha_cleaner_restores_letter_confusions() {
        assert_eq!(clean_alpha_field("0ANNA"), "OANNA");
    }

    #[test]
    fn alphanumeric_cleaner_preserves_letters_and_digits() {
        assert_eq!(clean_alphanumeric_field("D23145890"), "D23145890");
        assert_eq!(clean_alphanumeric_field("L898902C3"), "L898902C3");
    }
}
